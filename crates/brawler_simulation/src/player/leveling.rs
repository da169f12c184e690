//! Кривая опыта игрока
//!
//! threshold(level) = floor(BASE × MULTIPLIER^(level-1))
//! Defaults: BASE=100, MULTIPLIER=1.5 → 100, 150, 225, 337, 506, ...

use crate::config::LevelingConfig;

/// Бонусы, выданные за один level-up (speed = 0 если упёрлись в cap)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LevelUpBonuses {
    pub max_health: u32,
    pub attack_damage: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelCurve {
    pub base: u32,
    pub multiplier: f32,
}

impl LevelCurve {
    pub fn from_config(config: &LevelingConfig) -> Self {
        Self {
            base: config.base,
            multiplier: config.multiplier,
        }
    }

    /// Опыт, нужный для перехода с `level` на `level + 1`.
    /// Никогда не 0, иначе цикл level-up не сойдётся.
    pub fn threshold_for(&self, level: u32) -> u32 {
        let exponent = level.saturating_sub(1) as i32;
        let raw = self.base as f64 * (self.multiplier as f64).powi(exponent);
        raw.floor().clamp(1.0, u32::MAX as f64) as u32
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self::from_config(&LevelingConfig::default())
    }
}
