//! Scaling врагов по уровню + награда за убийство

/// Прирост награды за каждый уровень сверх первого
pub const EXPERIENCE_GROWTH_PER_LEVEL: f64 = 0.3;

// Компенсация погрешности f64 перед floor (1.9 * 30 = 56.999…)
const FLOOR_EPSILON: f64 = 1e-6;

/// floor(base · (1 + (level - 1) · 0.3) · class_multiplier)
///
/// Melee: `class_multiplier = 1.0`, ranged: 1.2 по умолчанию.
pub fn experience_reward(base: u32, level: u32, class_multiplier: f32) -> u32 {
    let level_factor = 1.0 + level.saturating_sub(1) as f64 * EXPERIENCE_GROWTH_PER_LEVEL;
    let reward = base as f64 * level_factor * class_multiplier as f64;
    (reward + FLOOR_EPSILON).floor().max(0.0) as u32
}

/// Линейный рост стата: value · (1 + growth · (level - 1)) · class_multiplier
pub fn scaled_stat(value: f32, growth_per_level: f32, level: u32, class_multiplier: f32) -> f32 {
    value * (1.0 + growth_per_level * level.saturating_sub(1) as f32) * class_multiplier
}

/// Max health врага с округлением (минимум 1)
pub fn scaled_health(max_health: u32, growth_per_level: f32, level: u32, class_multiplier: f32) -> u32 {
    scaled_stat(max_health as f32, growth_per_level, level, class_multiplier)
        .round()
        .max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_melee_reward_by_level() {
        assert_eq!(experience_reward(30, 1, 1.0), 30);
        assert_eq!(experience_reward(30, 2, 1.0), 39);
        assert_eq!(experience_reward(30, 3, 1.0), 48);
        assert_eq!(experience_reward(30, 4, 1.0), 57);
    }

    #[test]
    fn test_ranged_reward_bonus() {
        assert_eq!(experience_reward(30, 1, 1.2), 36);
        // 39 * 1.2 = 46.8 → 46
        assert_eq!(experience_reward(30, 2, 1.2), 46);
    }

    #[test]
    fn test_health_scaling() {
        assert_eq!(scaled_health(80, 0.15, 1, 1.0), 80);
        assert_eq!(scaled_health(80, 0.15, 3, 1.0), 104);
        // Ranged: 80 * 0.7 = 56
        assert_eq!(scaled_health(80, 0.15, 1, 0.7), 56);
    }
}
