//! Tests for Enemy state machine, windup and block rolls.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use rand::rngs::mock::StepRng;

    use crate::combat::{AttackKind, CombatContext, DamageOutcome, PlayerSnapshot};
    use crate::components::{ActorId, ActorState};
    use crate::config::SimulationConfig;
    use crate::enemy::{Enemy, EnemyKind};
    use crate::events::{CombatEvent, EventQueue, PresentationCue};
    use crate::inventory::SlotInventory;
    use crate::projectile::ProjectilePool;
    use crate::timers::Millis;
    use crate::world::WorldBounds;

    struct Harness {
        events: EventQueue,
        projectiles: ProjectilePool,
        inventory: SlotInventory,
        rng: StepRng,
    }

    impl Harness {
        /// Все roll'ы ≈ 1.0 → блок никогда не срабатывает
        fn block_fails() -> Self {
            Self {
                events: EventQueue::new(),
                projectiles: ProjectilePool::new(),
                inventory: SlotInventory::default(),
                rng: StepRng::new(u64::MAX, 0),
            }
        }

        /// Все roll'ы = 0.0 → блок всегда срабатывает
        fn block_succeeds() -> Self {
            Self {
                events: EventQueue::new(),
                projectiles: ProjectilePool::new(),
                inventory: SlotInventory::default(),
                rng: StepRng::new(0, 0),
            }
        }

        fn tick(&mut self, enemy: &mut Enemy, now: Millis, player: Vec2) {
            let mut ctx = CombatContext {
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
            };
            enemy.update(&mut ctx);
        }

        fn hit(&mut self, enemy: &mut Enemy, amount: u32, now: Millis) -> DamageOutcome {
            enemy.take_damage(amount, now, &mut self.rng, &mut self.events)
        }

        fn attack_intents(&self) -> usize {
            self.events
                .iter()
                .filter(|event| matches!(event, CombatEvent::Attack(_)))
                .count()
        }
    }

    fn melee_at(x: f32, y: f32) -> Enemy {
        Enemy::new(ActorId(1), EnemyKind::Melee, 1, Vec2::new(x, y), &SimulationConfig::default())
    }

    #[test]
    fn test_hurt_then_idle_after_400ms() {
        let mut harness = Harness::block_fails();
        let mut enemy = melee_at(2000.0, 480.0);
        assert_eq!(enemy.actor.health.max, 80);

        assert_eq!(harness.hit(&mut enemy, 40, 0), DamageOutcome::Hurt { applied: 40 });
        assert_eq!(enemy.actor.health.current, 40);
        assert_eq!(enemy.state(), ActorState::Hurt);

        let far_player = Vec2::new(100.0, 480.0);
        harness.tick(&mut enemy, 399, far_player);
        assert_eq!(enemy.state(), ActorState::Hurt);
        harness.tick(&mut enemy, 400, far_player);
        assert_eq!(enemy.state(), ActorState::Idle);
    }

    #[test]
    fn test_invulnerable_after_hit() {
        let mut harness = Harness::block_fails();
        let mut enemy = melee_at(2000.0, 480.0);

        harness.hit(&mut enemy, 20, 0);
        assert_eq!(harness.hit(&mut enemy, 20, 100), DamageOutcome::Ignored);
        assert_eq!(enemy.actor.health.current, 60);

        harness.tick(&mut enemy, 500, Vec2::new(100.0, 480.0));
        assert!(!enemy.actor.invulnerable);
    }

    #[test]
    fn test_successful_block_reduces_damage_and_blocks() {
        let mut harness = Harness::block_succeeds();
        let mut enemy = melee_at(2000.0, 480.0);

        // floor(40 * 0.3) = 12
        assert_eq!(harness.hit(&mut enemy, 40, 0), DamageOutcome::Blocked { applied: 12 });
        assert_eq!(enemy.actor.health.current, 68);
        assert_eq!(enemy.state(), ActorState::Blocking);
        assert!(!enemy.actor.invulnerable);
        assert!(harness
            .events
            .iter()
            .any(|event| *event == CombatEvent::Cue(PresentationCue::BlockPulse { actor: ActorId(1) })));

        harness.tick(&mut enemy, 300, Vec2::new(100.0, 480.0));
        assert_eq!(enemy.state(), ActorState::Idle);
    }

    #[test]
    fn test_windup_then_attack() {
        let mut harness = Harness::block_fails();
        let mut enemy = melee_at(550.0, 480.0);
        let player = Vec2::new(500.0, 480.0);

        harness.tick(&mut enemy, 0, player);
        assert!(enemy.is_winding_up);
        assert!(enemy.is_busy());
        assert_eq!(harness.attack_intents(), 0);

        harness.tick(&mut enemy, 799, player);
        assert_eq!(harness.attack_intents(), 0);

        harness.tick(&mut enemy, 800, player);
        assert!(!enemy.is_winding_up);
        assert_eq!(enemy.state(), ActorState::Attacking);

        let intent = harness.events.iter().find_map(|event| match event {
            CombatEvent::Attack(intent) => Some(intent.clone()),
            _ => None,
        });
        let intent = intent.expect("attack intent emitted");
        assert_eq!(intent.kind, AttackKind::EnemyMelee);
        assert_eq!(intent.damage, 10);
        assert_eq!(intent.range, 60.0);

        harness.tick(&mut enemy, 1200, player);
        assert_eq!(enemy.state(), ActorState::Idle);
    }

    #[test]
    fn test_windup_cancelled_when_alignment_lost() {
        let mut harness = Harness::block_fails();
        let mut enemy = melee_at(550.0, 480.0);

        harness.tick(&mut enemy, 0, Vec2::new(500.0, 480.0));
        assert!(enemy.is_winding_up);

        // Игрок ушёл на другую полосу
        harness.tick(&mut enemy, 800, Vec2::new(500.0, 540.0));
        assert_eq!(harness.attack_intents(), 0);
        assert_eq!(enemy.state(), ActorState::Walking);
        assert!(harness
            .events
            .iter()
            .any(|event| *event == CombatEvent::Cue(PresentationCue::WindupCancelled { actor: ActorId(1) })));
    }

    #[test]
    fn test_hurt_cancels_windup() {
        let mut harness = Harness::block_fails();
        let mut enemy = melee_at(550.0, 480.0);
        let player = Vec2::new(500.0, 480.0);

        harness.tick(&mut enemy, 0, player);
        assert!(enemy.is_winding_up);

        harness.hit(&mut enemy, 10, 100);
        assert!(!enemy.is_winding_up);

        harness.tick(&mut enemy, 800, player);
        assert_eq!(harness.attack_intents(), 0);
    }

    #[test]
    fn test_decisions_throttled() {
        let mut harness = Harness::block_fails();
        let mut enemy = melee_at(700.0, 480.0);

        harness.tick(&mut enemy, 0, Vec2::new(500.0, 480.0));
        assert_eq!(enemy.state(), ActorState::Walking);
        assert_eq!(enemy.actor.velocity, Vec2::new(-80.0, 0.0));

        // Игрок перепрыгнул за спину, решение ещё не пересчитано
        harness.tick(&mut enemy, 100, Vec2::new(900.0, 480.0));
        assert_eq!(enemy.actor.velocity, Vec2::new(-80.0, 0.0));

        harness.tick(&mut enemy, 1500, Vec2::new(900.0, 480.0));
        assert_eq!(enemy.actor.velocity, Vec2::new(80.0, 0.0));
    }

    #[test]
    fn test_death_emits_once_and_removes() {
        let mut harness = Harness::block_fails();
        let mut enemy = melee_at(2000.0, 480.0);

        assert_eq!(harness.hit(&mut enemy, 500, 0), DamageOutcome::Killed { applied: 80 });
        assert_eq!(harness.hit(&mut enemy, 500, 10), DamageOutcome::Ignored);

        let deaths: Vec<u32> = harness
            .events
            .iter()
            .filter_map(|event| match event {
                CombatEvent::EnemyDied(death) => Some(death.experience_reward),
                _ => None,
            })
            .collect();
        assert_eq!(deaths, vec![30]);

        harness.tick(&mut enemy, 999, Vec2::new(100.0, 480.0));
        assert!(!enemy.is_removed());
        harness.tick(&mut enemy, 1000, Vec2::new(100.0, 480.0));
        assert!(enemy.is_removed());
        assert_eq!(enemy.state(), ActorState::Dead);
    }

    #[test]
    fn test_end_hurt_after_death_keeps_dead() {
        let mut harness = Harness::block_fails();
        let mut enemy = melee_at(2000.0, 480.0);
        let far_player = Vec2::new(100.0, 480.0);

        assert_eq!(harness.hit(&mut enemy, 40, 0), DamageOutcome::Hurt { applied: 40 });
        enemy.die(100, &mut harness.events);

        // EndHurt (400) приходит уже мёртвому
        harness.tick(&mut enemy, 400, far_player);
        assert_eq!(enemy.state(), ActorState::Dead);
        harness.tick(&mut enemy, 500, far_player);
        assert_eq!(enemy.state(), ActorState::Dead);
        assert_eq!(enemy.actor.velocity, Vec2::ZERO);

        harness.tick(&mut enemy, 1_099, far_player);
        assert!(!enemy.is_removed());
        harness.tick(&mut enemy, 1_100, far_player);
        assert!(enemy.is_removed());

        let died = harness
            .events
            .iter()
            .filter(|event| matches!(event, CombatEvent::EnemyDied(_)))
            .count();
        assert_eq!(died, 1);
    }

    #[test]
    fn test_ranged_stats() {
        let enemy = Enemy::new(
            ActorId(2),
            EnemyKind::Ranged,
            1,
            Vec2::new(800.0, 480.0),
            &SimulationConfig::default(),
        );

        assert_eq!(enemy.actor.health.max, 56);
        assert_eq!(enemy.experience_reward, 36);
        assert_eq!(enemy.behavior.attack_range(), 400.0);
        assert_eq!(enemy.behavior.detection_range(), 480.0);
        assert_eq!(enemy.display_scale, 1.5);
    }

    #[test]
    fn test_ranged_fires_at_stationary_player() {
        let mut harness = Harness::block_fails();
        let mut enemy = Enemy::new(
            ActorId(2),
            EnemyKind::Ranged,
            1,
            Vec2::new(800.0, 480.0),
            &SimulationConfig::default(),
        );
        let player = Vec2::new(500.0, 480.0);

        harness.tick(&mut enemy, 0, player);
        assert!(enemy.is_winding_up);
        harness.tick(&mut enemy, 800, player);

        assert_eq!(harness.projectiles.len(), 1);
        let fired = harness.events.iter().find_map(|event| match event {
            CombatEvent::ProjectileFired { origin, velocity, owner, .. } => Some((*origin, *velocity, *owner)),
            _ => None,
        });
        let (origin, velocity, owner) = fired.expect("projectile fired");
        assert_eq!(owner, ActorId(2));
        assert_eq!(origin, Vec2::new(776.0, 480.0));
        assert_eq!(velocity, Vec2::new(-300.0, 0.0));
    }

    #[test]
    fn test_level_scaling() {
        let enemy = Enemy::new(
            ActorId(3),
            EnemyKind::Melee,
            3,
            Vec2::new(800.0, 480.0),
            &SimulationConfig::default(),
        );

        assert_eq!(enemy.level, 3);
        assert_eq!(enemy.actor.health.max, 104);
        assert_eq!(enemy.experience_reward, 48);
    }
}
