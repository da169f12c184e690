//! Ranged AI policy: держать дистанцию, выровняться по вертикали, стрелять с упреждением

use bevy::prelude::*;

use super::ai::{is_vertically_aligned, AiDecision};

/// Геометрия stand-off поведения
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandOffParams {
    /// Расширенный радиус обнаружения (detection × multiplier)
    pub detection_range: f32,
    pub attack_range: f32,
    /// Ближе отступаем
    pub min_attack_distance: f32,
    pub vertical_tolerance: f32,
}

/// Ranged решение.
///
/// ```text
/// dist < min            → отступить прямо от игрока
/// min ≤ dist ≤ range    → выровнен? Attack : вертикальная корректировка
/// range < dist ≤ detect → сближение
/// иначе                 → Idle
/// ```
pub fn decide_ranged(enemy: Vec2, player: Vec2, params: &StandOffParams) -> AiDecision {
    let offset = player - enemy;
    let distance = offset.length();

    if distance > params.detection_range {
        return AiDecision::Idle;
    }

    if distance < params.min_attack_distance {
        let away = (-offset).normalize_or_zero();
        // Игрок ровно в точке врага: отступаем вправо
        let direction = if away == Vec2::ZERO { Vec2::X } else { away };
        return AiDecision::Move { direction };
    }

    if distance <= params.attack_range {
        if is_vertically_aligned(enemy, player, params.vertical_tolerance) {
            return AiDecision::Attack;
        }
        return AiDecision::Move {
            direction: Vec2::new(0.0, offset.y.signum()),
        };
    }

    AiDecision::Move {
        direction: offset.normalize_or_zero(),
    }
}

/// Точка прицеливания с упреждением.
///
/// time_of_flight = distance / projectile_speed;
/// aim = target + target_velocity · time_of_flight · lead_factor.
/// Неподвижная цель → aim == target.
pub fn predict_aim_point(
    shooter: Vec2,
    target: Vec2,
    target_velocity: Vec2,
    projectile_speed: f32,
    lead_factor: f32,
) -> Vec2 {
    if projectile_speed <= 0.0 {
        return target;
    }
    let time_of_flight = shooter.distance(target) / projectile_speed;
    target + target_velocity * time_of_flight * lead_factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> StandOffParams {
        StandOffParams {
            detection_range: 480.0,
            attack_range: 400.0,
            min_attack_distance: 150.0,
            vertical_tolerance: 40.0,
        }
    }

    #[test]
    fn test_stationary_target_no_lead() {
        let target = Vec2::new(300.0, 480.0);
        let aim = predict_aim_point(Vec2::new(600.0, 480.0), target, Vec2::ZERO, 300.0, 0.3);
        assert_eq!(aim, target);
    }

    #[test]
    fn test_moving_target_lead() {
        // 300px при 300px/s → 1s полёта; 0.3 * 160px/s = 48px упреждения
        let aim = predict_aim_point(
            Vec2::new(600.0, 480.0),
            Vec2::new(300.0, 480.0),
            Vec2::new(160.0, 0.0),
            300.0,
            0.3,
        );
        assert!((aim.x - 348.0).abs() < 1e-3, "aim = {:?}", aim);
        assert_eq!(aim.y, 480.0);
    }

    #[test]
    fn test_retreats_when_too_close() {
        let decision = decide_ranged(Vec2::new(600.0, 480.0), Vec2::new(500.0, 480.0), &params());
        assert_eq!(decision, AiDecision::Move { direction: Vec2::new(1.0, 0.0) });
    }

    #[test]
    fn test_realigns_vertically_in_range() {
        let decision = decide_ranged(Vec2::new(800.0, 430.0), Vec2::new(500.0, 530.0), &params());
        assert_eq!(decision, AiDecision::Move { direction: Vec2::new(0.0, 1.0) });
    }

    #[test]
    fn test_fires_when_aligned_in_band() {
        let decision = decide_ranged(Vec2::new(800.0, 490.0), Vec2::new(500.0, 480.0), &params());
        assert_eq!(decision, AiDecision::Attack);
    }

    #[test]
    fn test_closes_from_extended_detection() {
        let decision = decide_ranged(Vec2::new(950.0, 480.0), Vec2::new(500.0, 480.0), &params());
        assert_eq!(decision, AiDecision::Move { direction: Vec2::new(-1.0, 0.0) });
    }
}
