//! EnemySpawner: spawn points, live enemy list, награды за убийства
//!
//! # Spawn points
//!
//! Точки раскладываются детерминированно вдоль оси X
//! (first_spawn_x, шаг spawn_interval, до level_length), чередуя верхнюю
//! и нижнюю полосы. Точка срабатывает один раз (latch) до `reset()`.
//!
//! # Population
//!
//! Новые враги появляются только пока live count < max_enemies.
//! Мёртвые враги остаются в списке (не считаются live) до своего
//! Remove таймера, потом выбрасываются через `retain`.

use bevy::prelude::*;
use rand::Rng;

pub mod drops;

pub use drops::{DropTable, DropTier};

use crate::combat::CombatContext;
use crate::components::ActorId;
use crate::config::SimulationConfig;
use crate::enemy::{Enemy, EnemyKind};
use crate::events::{CombatEvent, EnemyDeath, EventQueue, PresentationCue};
use crate::player::Player;

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec2,
    pub trigger_distance: f32,
    /// Монотонный latch
    pub triggered: bool,
}

impl SpawnPoint {
    pub fn in_trigger_range(&self, player: Vec2) -> bool {
        self.position.distance(player) <= self.trigger_distance
    }
}

#[derive(Debug, Clone)]
pub struct EnemySpawner {
    spawn_points: Vec<SpawnPoint>,
    enemies: Vec<Enemy>,
    drop_table: DropTable,
    config: SimulationConfig,
    /// 0 зарезервирован за игроком
    next_enemy_id: u32,
}

impl EnemySpawner {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            spawn_points: Self::layout_spawn_points(config),
            enemies: Vec::new(),
            drop_table: DropTable::default(),
            config: config.clone(),
            next_enemy_id: 1,
        }
    }

    pub fn with_drop_table(mut self, drop_table: DropTable) -> Self {
        self.drop_table = drop_table;
        self
    }

    fn layout_spawn_points(config: &SimulationConfig) -> Vec<SpawnPoint> {
        let spawner = &config.spawner;
        let mut points = Vec::new();
        if spawner.spawn_interval <= 0.0 {
            return points;
        }

        let mut x = spawner.first_spawn_x;
        while x < spawner.level_length {
            let y = if points.len() % 2 == 0 {
                spawner.lane_top_y
            } else {
                spawner.lane_bottom_y
            };
            points.push(SpawnPoint {
                position: Vec2::new(x, y),
                trigger_distance: spawner.trigger_distance,
                triggered: false,
            });
            x += spawner.spawn_interval;
        }
        points
    }

    pub fn spawn_points(&self) -> &[SpawnPoint] {
        &self.spawn_points
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub fn enemy(&self, id: ActorId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id() == id)
    }

    /// Живые враги (мёртвые, ждущие удаления, не считаются)
    pub fn live_count(&self) -> usize {
        self.enemies.iter().filter(|enemy| enemy.is_alive()).count()
    }

    /// Тик: враги в порядке вставки → compaction → триггеры
    pub fn update(&mut self, ctx: &mut CombatContext<'_>, player_level: u32) {
        for enemy in self.enemies.iter_mut() {
            enemy.update(ctx);
        }

        let before = self.enemies.len();
        self.enemies.retain(|enemy| !enemy.is_removed());
        let removed = before - self.enemies.len();
        if removed > 0 {
            crate::logger::log(&format!("Spawner: removed {} dead enemies", removed));
        }

        self.trigger_spawn_points(ctx, player_level);
    }

    fn trigger_spawn_points(&mut self, ctx: &mut CombatContext<'_>, player_level: u32) {
        if !ctx.player.alive {
            return;
        }

        for index in 0..self.spawn_points.len() {
            if self.live_count() >= self.config.spawner.max_enemies {
                break;
            }

            let point = &self.spawn_points[index];
            if point.triggered || !point.in_trigger_range(ctx.player.position) {
                continue;
            }
            let position = point.position;
            self.spawn_points[index].triggered = true;

            let kind = if ctx.rng.gen::<f32>() < self.config.spawner.ranged_spawn_chance {
                EnemyKind::Ranged
            } else {
                EnemyKind::Melee
            };
            let level = if ctx.rng.gen::<f32>() < self.config.spawner.level_up_chance {
                player_level + 1
            } else {
                player_level
            };
            self.spawn_enemy(kind, level, position, ctx.events);
        }
    }

    /// Создать врага (также используется тестами и хостом напрямую)
    pub fn spawn_enemy(
        &mut self,
        kind: EnemyKind,
        level: u32,
        position: Vec2,
        events: &mut EventQueue,
    ) -> ActorId {
        let id = ActorId(self.next_enemy_id);
        self.next_enemy_id += 1;

        let enemy = Enemy::new(id, kind, level, position, &self.config);
        events.push(CombatEvent::EnemySpawned {
            enemy: id,
            kind,
            level: enemy.level,
            position,
        });
        crate::logger::log_info(&format!(
            "👹 Spawned {:?} enemy {:?} lvl {} at ({:.0}, {:.0})",
            kind, id, enemy.level, position.x, position.y
        ));
        self.enemies.push(enemy);
        id
    }

    /// Награда за убийство: опыт игроку + roll дропа в `ctx.inventory`
    pub fn handle_enemy_death(&mut self, death: &EnemyDeath, player: &mut Player, ctx: &mut CombatContext<'_>) {
        if player.is_alive() {
            player.gain_experience(death.experience_reward, ctx.events);
        }

        let Some(item) = self
            .drop_table
            .roll(death.level, death.item_drop_chance, ctx.rng)
        else {
            return;
        };

        if ctx.inventory.is_full() {
            crate::logger::log(&format!("Drop {} discarded: inventory full", item));
            return;
        }

        let result = ctx.inventory.add(item.clone());
        if let (true, Some(slot_index)) = (result.success, result.slot_index) {
            crate::logger::log_info(&format!("🎁 {} dropped into slot {}", item, slot_index));
            ctx.events.push(CombatEvent::ItemDropped { item, slot_index });
        }
    }

    /// Рестарт уровня: все latch'и сброшены, все враги уничтожены
    pub fn reset(&mut self, events: &mut EventQueue) {
        for enemy in self.enemies.drain(..) {
            events.cue(PresentationCue::ActorRemoved { actor: enemy.id() });
        }
        for point in self.spawn_points.iter_mut() {
            point.triggered = false;
        }
        crate::logger::log_info("Spawner reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::PlayerSnapshot;
    use crate::inventory::{InventoryAddResult, InventoryPort, ItemId, SlotInventory};
    use crate::projectile::ProjectilePool;
    use crate::timers::Millis;
    use crate::world::WorldBounds;
    use rand::rngs::mock::StepRng;

    struct Harness<I: InventoryPort> {
        events: EventQueue,
        projectiles: ProjectilePool,
        inventory: I,
        rng: StepRng,
    }

    impl Harness<SlotInventory> {
        /// ≈1.0: melee, без level-up, без блоков и дропов
        fn new() -> Self {
            Self::with(SlotInventory::default(), StepRng::new(u64::MAX, 0))
        }
    }

    impl<I: InventoryPort> Harness<I> {
        fn with(inventory: I, rng: StepRng) -> Self {
            Self {
                events: EventQueue::new(),
                projectiles: ProjectilePool::new(),
                inventory,
                rng,
            }
        }

        fn context(&mut self, now: Millis, player: Vec2) -> CombatContext<'_> {
            CombatContext {
                now,
                dt_secs: 0.016,
                player: PlayerSnapshot {
                    position: player,
                    velocity: Vec2::ZERO,
                    alive: true,
                },
                bounds: WorldBounds::new(Vec2::ZERO, Vec2::new(6400.0, 720.0)),
                rng: &mut self.rng,
                events: &mut self.events,
                projectiles: &mut self.projectiles,
                inventory: &mut self.inventory,
            }
        }

        fn tick(&mut self, spawner: &mut EnemySpawner, now: Millis, player: Vec2) {
            let mut ctx = self.context(now, player);
            spawner.update(&mut ctx, 1);
        }
    }

    /// Инвентарь, который всегда полон
    struct FullInventory;

    impl InventoryPort for FullInventory {
        fn is_full(&self) -> bool {
            true
        }

        fn add(&mut self, _item: ItemId) -> InventoryAddResult {
            panic!("add must not be called on a full inventory")
        }
    }

    #[test]
    fn test_layout_alternates_lanes() {
        let spawner = EnemySpawner::new(&SimulationConfig::default());
        let points = spawner.spawn_points();

        assert_eq!(points.len(), 12);
        assert_eq!(points[0].position, Vec2::new(600.0, 430.0));
        assert_eq!(points[1].position, Vec2::new(1050.0, 530.0));
        assert_eq!(points[11].position.x, 5550.0);
    }

    #[test]
    fn test_spawn_point_latch() {
        let mut harness = Harness::new();
        let mut spawner = EnemySpawner::new(&SimulationConfig::default());

        harness.tick(&mut spawner, 0, Vec2::new(100.0, 480.0));
        assert_eq!(spawner.enemies().len(), 0);

        harness.tick(&mut spawner, 16, Vec2::new(200.0, 430.0));
        assert_eq!(spawner.enemies().len(), 1);
        assert!(spawner.spawn_points()[0].triggered);

        // Убиваем и даём Remove таймеру отработать
        let id = spawner.enemies()[0].id();
        spawner.enemies_mut()[0].die(32, &mut harness.events);
        harness.tick(&mut spawner, 1100, Vec2::new(150.0, 430.0));
        assert!(spawner.enemy(id).is_none());

        // Возврат к точке не спавнит второго
        harness.tick(&mut spawner, 1116, Vec2::new(200.0, 430.0));
        assert_eq!(spawner.enemies().len(), 0);

        spawner.reset(&mut harness.events);
        assert!(spawner.spawn_points().iter().all(|point| !point.triggered));
        harness.tick(&mut spawner, 1132, Vec2::new(200.0, 430.0));
        assert_eq!(spawner.enemies().len(), 1);
    }

    #[test]
    fn test_population_cap() {
        let mut config = SimulationConfig::default();
        config.spawner.spawn_interval = 10.0;
        config.spawner.max_enemies = 4;
        let mut harness = Harness::new();
        let mut spawner = EnemySpawner::new(&config);

        harness.tick(&mut spawner, 0, Vec2::new(600.0, 480.0));
        assert_eq!(spawner.live_count(), 4);

        // Смерть освобождает слот в том же тике
        spawner.enemies_mut()[0].die(10, &mut harness.events);
        harness.tick(&mut spawner, 16, Vec2::new(600.0, 480.0));
        assert_eq!(spawner.live_count(), 4);
        assert_eq!(spawner.enemies().len(), 5);
    }

    #[test]
    fn test_death_reward_and_drop() {
        let config = SimulationConfig::default();
        let mut spawner = EnemySpawner::new(&config);
        let mut player = Player::new(&config, Vec2::new(100.0, 480.0));
        let mut harness = Harness::with(SlotInventory::default(), StepRng::new(0, 0));

        let death = EnemyDeath {
            enemy: ActorId(9),
            kind: EnemyKind::Melee,
            level: 3,
            experience_reward: 48,
            item_drop_chance: 0.35,
            position: Vec2::new(700.0, 480.0),
        };
        spawner.handle_enemy_death(&death, &mut player, &mut harness.context(0, Vec2::ZERO));

        assert_eq!(player.experience, 48);
        assert_eq!(harness.inventory.get(0), Some(&ItemId::from("health_potion")));
        assert!(harness
            .events
            .iter()
            .any(|event| matches!(event, CombatEvent::ItemDropped { slot_index: 0, .. })));
    }

    #[test]
    fn test_drop_skipped_when_inventory_full() {
        let config = SimulationConfig::default();
        let mut spawner = EnemySpawner::new(&config);
        let mut player = Player::new(&config, Vec2::new(100.0, 480.0));
        let mut harness = Harness::with(FullInventory, StepRng::new(0, 0));

        let death = EnemyDeath {
            enemy: ActorId(9),
            kind: EnemyKind::Ranged,
            level: 1,
            experience_reward: 36,
            item_drop_chance: 1.0,
            position: Vec2::new(700.0, 480.0),
        };
        spawner.handle_enemy_death(&death, &mut player, &mut harness.context(0, Vec2::ZERO));

        assert_eq!(player.experience, 36);
        assert!(!harness
            .events
            .iter()
            .any(|event| matches!(event, CombatEvent::ItemDropped { .. })));
    }
}
