//! Melee AI policy: сближение по одной оси → атака
//!
//! Решение: чистая функция от геометрии, без side effects.
//! Enemy применяет результат (velocity/state/windup) сам.

use bevy::prelude::*;

/// Что враг хочет сделать в этом decision tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AiDecision {
    /// Игрок вне detection range: стоим
    Idle,
    /// Идти в направлении (единичный вектор)
    Move { direction: Vec2 },
    /// Выровнены и в range: начать windup если cooldown позволяет
    Attack,
}

/// Геометрические параметры политики
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngageParams {
    pub detection_range: f32,
    pub attack_range: f32,
    pub vertical_tolerance: f32,
}

/// Выровнен ли враг по вертикали (belt-scroller: бить можно только на одной "полосе")
pub fn is_vertically_aligned(enemy: Vec2, player: Vec2, tolerance: f32) -> bool {
    (player.y - enemy.y).abs() <= tolerance
}

/// Melee решение.
///
/// Двигаемся по той оси, где превышение допуска больше
/// (горизонталь: attack_range, вертикаль: vertical_tolerance).
pub fn decide_melee(enemy: Vec2, player: Vec2, params: &EngageParams) -> AiDecision {
    let offset = player - enemy;
    if offset.length() > params.detection_range {
        return AiDecision::Idle;
    }

    let horizontal_excess = (offset.x.abs() - params.attack_range).max(0.0);
    let vertical_excess = (offset.y.abs() - params.vertical_tolerance).max(0.0);

    if horizontal_excess == 0.0 && vertical_excess == 0.0 {
        return AiDecision::Attack;
    }

    let direction = if horizontal_excess >= vertical_excess {
        Vec2::new(offset.x.signum(), 0.0)
    } else {
        Vec2::new(0.0, offset.y.signum())
    };
    AiDecision::Move { direction }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EngageParams {
        EngageParams {
            detection_range: 320.0,
            attack_range: 60.0,
            vertical_tolerance: 28.0,
        }
    }

    #[test]
    fn test_idle_outside_detection() {
        let decision = decide_melee(Vec2::new(1000.0, 400.0), Vec2::new(500.0, 400.0), &params());
        assert_eq!(decision, AiDecision::Idle);
    }

    #[test]
    fn test_closes_horizontal_gap_first() {
        let decision = decide_melee(Vec2::new(700.0, 430.0), Vec2::new(500.0, 480.0), &params());
        // Горизонтальное превышение 140 > вертикального 22
        assert_eq!(decision, AiDecision::Move { direction: Vec2::new(-1.0, 0.0) });
    }

    #[test]
    fn test_aligns_vertically_when_in_horizontal_range() {
        let decision = decide_melee(Vec2::new(540.0, 430.0), Vec2::new(500.0, 530.0), &params());
        assert_eq!(decision, AiDecision::Move { direction: Vec2::new(0.0, 1.0) });
    }

    #[test]
    fn test_attacks_when_aligned() {
        let decision = decide_melee(Vec2::new(550.0, 490.0), Vec2::new(500.0, 480.0), &params());
        assert_eq!(decision, AiDecision::Attack);
    }
}
