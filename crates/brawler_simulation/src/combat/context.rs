//! CombatContext: всё, что враг получает на тик вместо глобального scene lookup

use bevy::prelude::*;
use rand::RngCore;

use crate::events::EventQueue;
use crate::inventory::InventoryPort;
use crate::projectile::ProjectilePool;
use crate::timers::Millis;
use crate::world::WorldBounds;

/// Read-only снимок игрока на текущий тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSnapshot {
    pub position: Vec2,
    /// px/s, для упреждения ranged врагов
    pub velocity: Vec2,
    pub alive: bool,
}

/// Dependency injection для `Enemy::update` / `EnemySpawner`
/// (вместо глобального доступа к игроку и инвентарю)
pub struct CombatContext<'a> {
    pub now: Millis,
    /// Шаг интеграции позиций (секунды)
    pub dt_secs: f32,
    pub player: PlayerSnapshot,
    pub bounds: WorldBounds,
    pub rng: &'a mut dyn RngCore,
    pub events: &'a mut EventQueue,
    pub projectiles: &'a mut ProjectilePool,
    /// Куда складывать дроп
    pub inventory: &'a mut dyn InventoryPort,
}
