//! CombatWorld: координатор одного тика
//!
//! Порядок тика:
//! ```text
//! 1. Player::update (таймеры) + интеграция позиции игрока
//! 2. EnemySpawner::update (враги в порядке вставки → compaction → триггеры)
//! 3. ProjectilePool::advance (range / bounds culling)
//! 4. CombatResolver: attack intents этого тика → take_damage
//! 5. CombatResolver: снаряды против игрока
//! 6. EnemyDied → опыт + дроп (через InventoryPort)
//! ```
//!
//! Хост (Bevy layer или тест) дренит события после каждого тика. Без
//! дренажа очередь ограничена `WorldConfig::max_pending_events`: лишние
//! уже разрешённые события выбрасываются с начала.

use bevy::prelude::*;
use rand::RngCore;

use crate::combat::{CombatContext, CombatResolver, PlayerSnapshot};
use crate::config::{SimulationConfig, WorldConfig};
use crate::events::{CombatEvent, EnemyDeath, EventQueue};
use crate::inventory::{FailureReason, ItemCatalog, SlotInventory, UseItemResult};
use crate::player::Player;
use crate::projectile::ProjectilePool;
use crate::spawner::EnemySpawner;
use crate::timers::Millis;

/// Прямоугольник играбельного мира
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct WorldBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl WorldBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(
            Vec2::new(config.min_x, config.min_y),
            Vec2::new(config.max_x, config.max_y),
        )
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }
}

/// Input игрока (host → simulation)
#[derive(Event, Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Move { direction: Vec2 },
    Stop,
    Attack,
    StartBlocking,
    StopBlocking,
    UseItem { slot: usize },
}

#[derive(Resource, Debug, Clone)]
pub struct CombatWorld {
    pub player: Player,
    pub spawner: EnemySpawner,
    pub projectiles: ProjectilePool,
    pub inventory: SlotInventory,
    pub catalog: ItemCatalog,
    pub bounds: WorldBounds,
    hit_radius: f32,
    events: EventQueue,
    /// События до этой метки уже разрешены resolver'ом
    resolved_mark: usize,
    last_tick: Option<Millis>,
    config: SimulationConfig,
}

impl CombatWorld {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            player: Self::spawn_player(config),
            spawner: EnemySpawner::new(config),
            projectiles: ProjectilePool::new(),
            inventory: SlotInventory::default(),
            catalog: ItemCatalog::default(),
            bounds: WorldBounds::from_config(&config.world),
            hit_radius: config.ranged.hit_radius,
            events: EventQueue::new(),
            resolved_mark: 0,
            last_tick: None,
            config: config.clone(),
        }
    }

    fn spawn_player(config: &SimulationConfig) -> Player {
        Player::new(
            config,
            Vec2::new(config.world.player_spawn_x, config.world.player_spawn_y),
        )
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Забрать все события; ожидается раз в тик
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.resolved_mark = 0;
        self.events.drain()
    }

    /// Один шаг симуляции к моменту `now` (монотонные ms хоста)
    pub fn tick(&mut self, now: Millis, rng: &mut dyn RngCore) {
        let dt_secs = match self.last_tick {
            Some(last) => now.saturating_sub(last) as f32 / 1000.0,
            None => 0.0,
        };
        self.last_tick = Some(now);
        self.enforce_event_cap();

        self.player.update(now, &mut self.events);
        self.integrate_player(dt_secs);

        let snapshot = PlayerSnapshot {
            position: self.player.position(),
            velocity: self.player.velocity(),
            alive: self.player.is_alive(),
        };
        let mut ctx = CombatContext {
            now,
            dt_secs,
            player: snapshot,
            bounds: self.bounds,
            rng: &mut *rng,
            events: &mut self.events,
            projectiles: &mut self.projectiles,
            inventory: &mut self.inventory,
        };
        self.spawner.update(&mut ctx, self.player.level);

        self.projectiles.advance(dt_secs, &self.bounds);
        self.resolve(now, dt_secs, rng);
    }

    /// Неразрешённые intents (команды между тиками) не трогаем
    fn enforce_event_cap(&mut self) {
        let excess = self.events.len().saturating_sub(self.config.world.max_pending_events);
        if excess == 0 {
            return;
        }
        let dropped = self.events.trim_front(excess.min(self.resolved_mark));
        self.resolved_mark -= dropped;
        if dropped > 0 {
            crate::logger::log_warning(&format!(
                "Event queue not drained: dropped {} oldest events",
                dropped
            ));
        }
    }

    fn integrate_player(&mut self, dt_secs: f32) {
        let actor = &mut self.player.actor;
        if !actor.is_alive() || actor.velocity == Vec2::ZERO {
            return;
        }
        actor.position = self.bounds.clamp(actor.position + actor.velocity * dt_secs);
    }

    fn resolve(&mut self, now: Millis, dt_secs: f32, rng: &mut dyn RngCore) {
        let intents: Vec<_> = self
            .events
            .since(self.resolved_mark)
            .iter()
            .filter_map(|event| match event {
                CombatEvent::Attack(intent) => Some(intent.clone()),
                _ => None,
            })
            .collect();

        for intent in &intents {
            CombatResolver::resolve_attack(
                intent,
                now,
                &mut self.player,
                self.spawner.enemies_mut(),
                rng,
                &mut self.events,
            );
        }

        CombatResolver::resolve_projectiles(
            &mut self.projectiles,
            &mut self.player,
            self.hit_radius,
            now,
            &mut self.events,
        );

        let deaths: Vec<EnemyDeath> = self
            .events
            .since(self.resolved_mark)
            .iter()
            .filter_map(|event| match event {
                CombatEvent::EnemyDied(death) => Some(death.clone()),
                _ => None,
            })
            .collect();

        if !deaths.is_empty() {
            let mut ctx = CombatContext {
                now,
                dt_secs,
                player: PlayerSnapshot {
                    position: self.player.position(),
                    velocity: self.player.velocity(),
                    alive: self.player.is_alive(),
                },
                bounds: self.bounds,
                rng,
                events: &mut self.events,
                projectiles: &mut self.projectiles,
                inventory: &mut self.inventory,
            };
            for death in &deaths {
                self.spawner.handle_enemy_death(death, &mut self.player, &mut ctx);
            }
        }

        self.resolved_mark = self.events.mark();
    }

    /// Input игрока. Атаки разрешаются в ближайшем `tick`.
    pub fn apply_command(&mut self, command: &PlayerCommand, now: Millis) {
        match command {
            PlayerCommand::Move { direction } => self.player.move_in(*direction),
            PlayerCommand::Stop => self.player.stop(),
            PlayerCommand::Attack => {
                self.player.attack(now, &mut self.events);
            }
            PlayerCommand::StartBlocking => {
                self.player.start_blocking();
            }
            PlayerCommand::StopBlocking => self.player.stop_blocking(),
            PlayerCommand::UseItem { slot } => {
                self.use_inventory_slot(*slot, now);
            }
        }
    }

    /// Использовать слот и применить эффект к игроку
    pub fn use_inventory_slot(&mut self, slot: usize, now: Millis) -> UseItemResult {
        if !self.player.is_alive() {
            return UseItemResult::Failed {
                reason: FailureReason::ActorDead,
            };
        }

        let result = self.inventory.use_slot(slot, &self.catalog);
        match &result {
            UseItemResult::Consumed { item, effect } => {
                self.player.apply_item_effect(*effect, now, &mut self.events);
                crate::logger::log_info(&format!("🧪 Used {}", item));
            }
            UseItemResult::Equipped { item, modifiers } => {
                for modifier in modifiers {
                    self.player.apply_modifier(*modifier, &mut self.events);
                }
                crate::logger::log_info(&format!("🛡️ Equipped {}", item));
            }
            UseItemResult::Failed { reason } => {
                crate::logger::log(&format!("Use slot {} failed: {:?}", slot, reason));
            }
        }
        result
    }

    /// Снять экипировку и откатить её модификаторы
    pub fn unequip(&mut self, equipped_index: usize) -> Result<(), FailureReason> {
        let modifiers = self.inventory.unequip(equipped_index, &self.catalog)?;
        for modifier in modifiers {
            self.player.revert_modifier(modifier, &mut self.events);
        }
        Ok(())
    }

    /// Рестарт уровня: новый игрок, сброс спавнера, снаряды удалены
    pub fn restart_level(&mut self) {
        self.spawner.reset(&mut self.events);
        self.projectiles.clear();
        self.player = Self::spawn_player(&self.config);
        self.inventory = SlotInventory::default();
        crate::logger::log_info("🔄 Level restarted");
    }
}
