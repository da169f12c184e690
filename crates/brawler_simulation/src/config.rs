//! Баланс симуляции: все тюнингуемые числа в одном месте
//!
//! Defaults захардкожены в `Default` impl'ах, override через RON:
//!
//! ```ron
//! (
//!     player: (max_health: 150, attack_damage: 25.0),
//!     spawner: (max_enemies: 6),
//! )
//! ```
//!
//! Валидации нет: за spawn_interval = 0 и прочие невалидные значения
//! отвечает тот, кто собирает конфиг.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Корневой конфиг (Bevy resource)
#[derive(Resource, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub player: PlayerConfig,
    pub leveling: LevelingConfig,
    pub enemy: EnemyConfig,
    pub ranged: RangedConfig,
    pub spawner: SpawnerConfig,
    pub world: WorldConfig,
}

impl SimulationConfig {
    /// Парсит RON; отсутствующие поля берутся из defaults
    pub fn from_ron_str(source: &str) -> ron::error::SpannedResult<Self> {
        ron::from_str(source)
    }
}

/// Параметры игрока (уровень 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: u32,
    pub attack_damage: f32,
    /// Пикселей в секунду
    pub speed: f32,
    /// Радиус attack intent (пиксели)
    pub attack_range: f32,
    pub attack_cooldown_ms: u64,
    /// Длительность ATTACKING (анимация удара)
    pub attack_duration_ms: u64,
    pub stun_duration_ms: u64,
    pub invulnerability_ms: u64,
    /// Задержка между die() и терминальным PlayerDied (fade-out)
    pub death_fade_ms: u64,
    /// Доля урона, проходящая сквозь блок
    pub block_damage_factor: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            attack_damage: 20.0,
            speed: 160.0,
            attack_range: 70.0,
            attack_cooldown_ms: 500,
            attack_duration_ms: 300,
            stun_duration_ms: 800,
            invulnerability_ms: 1000,
            death_fade_ms: 1000,
            block_damage_factor: 0.1,
        }
    }
}

/// Кривая опыта и бонусы за уровень
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelingConfig {
    /// Порог опыта для 1 → 2
    pub base: u32,
    /// threshold(level) = floor(base × multiplier^(level-1))
    pub multiplier: f32,
    pub health_per_level: u32,
    pub damage_per_level: f32,
    pub speed_per_level: f32,
    /// После достижения cap бонус скорости не даётся
    pub speed_cap: f32,
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self {
            base: 100,
            multiplier: 1.5,
            health_per_level: 20,
            damage_per_level: 5.0,
            speed_per_level: 10.0,
            speed_cap: 300.0,
        }
    }
}

/// Melee враг (baseline для всех врагов)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub max_health: u32,
    pub attack_damage: f32,
    pub speed: f32,
    pub detection_range: f32,
    /// Горизонтальная дистанция удара
    pub attack_range: f32,
    /// Допуск по вертикали для выравнивания перед ударом
    pub vertical_tolerance: f32,
    /// Throttle AI решений (независимо от tick rate)
    pub action_cooldown_ms: u64,
    pub attack_cooldown_ms: u64,
    /// Telegraph перед ударом
    pub windup_ms: u64,
    pub attack_duration_ms: u64,
    pub hurt_duration_ms: u64,
    pub invulnerability_ms: u64,
    pub block_duration_ms: u64,
    /// Задержка удаления трупа (death tint должен успеть прочитаться)
    pub removal_delay_ms: u64,
    /// Шанс попытки блока на каждом входящем ударе
    pub block_chance: f32,
    /// Шанс что попытка блока удалась
    pub block_success_probability: f32,
    pub block_damage_factor: f32,
    pub item_drop_chance: f32,
    pub base_experience: u32,
    /// Рост max_health за уровень выше первого (доля)
    pub health_growth_per_level: f32,
    pub damage_growth_per_level: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_health: 80,
            attack_damage: 10.0,
            speed: 80.0,
            detection_range: 320.0,
            attack_range: 60.0,
            vertical_tolerance: 28.0,
            action_cooldown_ms: 1500,
            attack_cooldown_ms: 1000,
            windup_ms: 800,
            attack_duration_ms: 400,
            hurt_duration_ms: 400,
            invulnerability_ms: 500,
            block_duration_ms: 300,
            removal_delay_ms: 1000,
            block_chance: 0.3,
            block_success_probability: 0.7,
            block_damage_factor: 0.3,
            item_drop_chance: 0.35,
            base_experience: 30,
            health_growth_per_level: 0.15,
            damage_growth_per_level: 0.10,
        }
    }
}

/// Ranged специализация (поверх EnemyConfig)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedConfig {
    /// Ranged враги хрупкие: max_health × multiplier
    pub health_multiplier: f32,
    pub attack_range: f32,
    /// Stand-off дистанция
    pub min_attack_distance: f32,
    pub projectile_speed: f32,
    pub projectile_range: f32,
    /// Доля экстраполяции скорости цели при упреждении
    pub lead_factor: f32,
    /// Смещение точки спавна снаряда вперёд (без self-collision)
    pub muzzle_offset: f32,
    /// Detection band для сближения = detection_range × multiplier
    pub extended_detection_multiplier: f32,
    pub vertical_tolerance: f32,
    pub experience_multiplier: f32,
    /// Радиус попадания снаряда
    pub hit_radius: f32,
}

impl Default for RangedConfig {
    fn default() -> Self {
        Self {
            health_multiplier: 0.7,
            attack_range: 400.0,
            min_attack_distance: 150.0,
            projectile_speed: 300.0,
            projectile_range: 500.0,
            lead_factor: 0.3,
            muzzle_offset: 24.0,
            extended_detection_multiplier: 1.5,
            vertical_tolerance: 40.0,
            experience_multiplier: 1.2,
            hit_radius: 24.0,
        }
    }
}

/// Раскладка spawn points и ограничения популяции
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub first_spawn_x: f32,
    pub spawn_interval: f32,
    /// Spawn points генерируются до этой координаты X
    pub level_length: f32,
    /// Два чередующихся lateral band'а
    pub lane_top_y: f32,
    pub lane_bottom_y: f32,
    pub trigger_distance: f32,
    pub max_enemies: usize,
    pub ranged_spawn_chance: f32,
    /// Шанс что враг будет на уровень выше игрока
    pub level_up_chance: f32,
    pub player_display_height: f32,
    pub enemy_frame_height: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            first_spawn_x: 600.0,
            spawn_interval: 450.0,
            level_length: 6000.0,
            lane_top_y: 430.0,
            lane_bottom_y: 530.0,
            trigger_distance: 500.0,
            max_enemies: 4,
            ranged_spawn_chance: 0.3,
            level_up_chance: 0.25,
            player_display_height: 96.0,
            enemy_frame_height: 64.0,
        }
    }
}

/// Границы мира (culling снарядов, clamp позиций)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub player_spawn_x: f32,
    pub player_spawn_y: f32,
    /// Шаг SimClock на один FixedUpdate
    pub step_ms: u64,
    /// Потолок недренированных событий; сверх него старые разрешённые выбрасываются
    pub max_pending_events: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 6400.0,
            max_y: 720.0,
            player_spawn_x: 100.0,
            player_spawn_y: 480.0,
            step_ms: 16,
            max_pending_events: 4096,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_balance_sheet() {
        let config = SimulationConfig::default();
        assert_eq!(config.player.attack_cooldown_ms, 500);
        assert_eq!(config.player.attack_duration_ms, 300);
        assert_eq!(config.leveling.base, 100);
        assert_eq!(config.leveling.multiplier, 1.5);
        assert_eq!(config.enemy.action_cooldown_ms, 1500);
        assert_eq!(config.enemy.windup_ms, 800);
        assert_eq!(config.enemy.vertical_tolerance, 28.0);
        assert_eq!(config.ranged.lead_factor, 0.3);
    }

    #[test]
    fn test_ron_partial_override() {
        let config = SimulationConfig::from_ron_str(
            "(player: (max_health: 150), spawner: (max_enemies: 6))",
        )
        .expect("valid RON");

        assert_eq!(config.player.max_health, 150);
        assert_eq!(config.player.attack_cooldown_ms, 500); // default
        assert_eq!(config.spawner.max_enemies, 6);
        assert_eq!(config.enemy, EnemyConfig::default());
    }

    #[test]
    fn test_ron_malformed_is_error() {
        assert!(SimulationConfig::from_ron_str("(player: (max_health: \"lots\"))").is_err());
    }
}
