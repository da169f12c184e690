//! BRAWLER Simulation Core
//!
//! Combat/actor симуляция 2D side-scroller'а (belt-scroller с полосами по Y).
//!
//! Два слоя:
//! - **Core**: обычные детерминированные структуры (`Player`, `Enemy`,
//!   `EnemySpawner`, `CombatWorld`), тикаются с host-supplied clock в ms.
//!   Core без ECS Query: `SimulationPlugin` держит `CombatWorld` как Resource, core тестируется без App.
//! - **Bevy layer**: `SimulationPlugin`: ресурсы + FixedUpdate цепочка
//!   `PlayerCommand` → `CombatWorld::tick` → `CombatEvent`.
//!
//! Presentation (спрайты, анимации, HUD) живёт снаружи и только читает
//! `CombatEvent` / `PresentationCue`.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod combat;
pub mod components;
pub mod config;
pub mod enemy;
pub mod events;
pub mod inventory;
pub mod logger;
pub mod player;
pub mod projectile;
pub mod spawner;
pub mod timers;
pub mod world;

// Re-export основных типов для удобства
pub use combat::{AttackIntent, AttackKind, CombatContext, CombatResolver, DamageOutcome, PlayerSnapshot};
pub use components::*;
pub use config::SimulationConfig;
pub use enemy::{Behavior, Enemy, EnemyKind};
pub use events::{CombatEvent, EnemyDeath, EventQueue, PresentationCue};
pub use inventory::{
    InventoryAddResult, InventoryPort, ItemCatalog, ItemEffect, ItemId, SlotInventory, StatModifier, UseItemResult,
};
pub use player::{LevelUpBonuses, Player};
pub use projectile::{Projectile, ProjectileId, ProjectilePool};
pub use spawner::{EnemySpawner, SpawnPoint};
pub use timers::{Millis, TimerQueue};
pub use world::{CombatWorld, PlayerCommand, WorldBounds};

// Re-export logger (вызывается как crate::log / brawler_simulation::log_info)
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, set_logger_if_needed, LogLevel,
    LogPrinter,
};

/// Главный plugin симуляции
pub struct SimulationPlugin {
    pub config: SimulationConfig,
    pub seed: u64,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self {
            config: SimulationConfig::default(),
            seed: 42,
        }
    }
}

impl SimulationPlugin {
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        Self { config, seed }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let step_ms = self.config.world.step_ms.max(1);

        app
            // Fixed timestep = шаг sim clock (16ms ≈ 60Hz)
            .insert_resource(Time::<Fixed>::from_duration(Duration::from_millis(step_ms)))
            // Детерминистичный RNG (block/drop/spawn rolls)
            .insert_resource(DeterministicRng::new(self.seed))
            .insert_resource(SimClock::new(step_ms))
            .insert_resource(CombatWorld::new(&self.config))
            .insert_resource(self.config.clone())
            .add_event::<PlayerCommand>()
            .add_event::<CombatEvent>()
            .add_systems(
                FixedUpdate,
                (
                    advance_sim_clock,
                    apply_player_commands,
                    tick_combat_world,
                    publish_combat_events,
                )
                    .chain(),
            );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Монотонные часы симуляции (ms), двигаются на step_ms за FixedUpdate
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimClock {
    pub now_ms: Millis,
    pub step_ms: Millis,
}

impl SimClock {
    pub fn new(step_ms: Millis) -> Self {
        Self { now_ms: 0, step_ms }
    }
}

fn advance_sim_clock(mut clock: ResMut<SimClock>) {
    clock.now_ms += clock.step_ms;
}

fn apply_player_commands(
    mut commands: EventReader<PlayerCommand>,
    clock: Res<SimClock>,
    mut world: ResMut<CombatWorld>,
) {
    for command in commands.read() {
        world.apply_command(command, clock.now_ms);
    }
}

fn tick_combat_world(clock: Res<SimClock>, mut world: ResMut<CombatWorld>, mut rng: ResMut<DeterministicRng>) {
    world.tick(clock.now_ms, &mut rng.rng);
}

fn publish_combat_events(mut world: ResMut<CombatWorld>, mut writer: EventWriter<CombatEvent>) {
    for event in world.drain_events() {
        writer.write(event);
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    create_headless_app_with_config(SimulationConfig::default(), seed)
}

pub fn create_headless_app_with_config(config: SimulationConfig, seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin::new(config, seed));

    app
}

/// Прогоняет `ticks` FixedUpdate шагов напрямую (без real-time accumulator)
pub fn step_simulation(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

/// Snapshot мира для сравнения детерминизма (Debug формат, порядок вставки)
pub fn combat_snapshot(world: &CombatWorld) -> String {
    let mut snapshot = format!(
        "player {:?} {:?} hp={}/{} lvl={} xp={}\n",
        world.player.position(),
        world.player.state(),
        world.player.actor.health.current,
        world.player.actor.health.max,
        world.player.level,
        world.player.total_experience,
    );

    for enemy in world.spawner.enemies() {
        snapshot.push_str(&format!(
            "enemy {:?} {:?} {:?} {:?} hp={}\n",
            enemy.id(),
            enemy.kind(),
            enemy.position(),
            enemy.state(),
            enemy.actor.health.current,
        ));
    }
    for projectile in world.projectiles.iter() {
        snapshot.push_str(&format!("projectile {:?} {:?}\n", projectile.id, projectile.position));
    }

    snapshot
}
