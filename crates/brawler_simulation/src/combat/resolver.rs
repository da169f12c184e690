//! CombatResolver: distance-based hit testing
//!
//! Resolver только читает позиции и вызывает `take_damage`; повторные
//! попадания в одном окне гасит invulnerability latch цели.

use rand::RngCore;

use super::{AttackIntent, AttackKind, DamageOutcome};
use crate::components::ActorId;
use crate::enemy::Enemy;
use crate::events::EventQueue;
use crate::player::Player;
use crate::projectile::ProjectilePool;
use crate::timers::Millis;

/// Итог попадания по одной цели
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    pub target: ActorId,
    pub outcome: DamageOutcome,
}

pub struct CombatResolver;

impl CombatResolver {
    /// Разрешить один attack intent против актуальных позиций
    pub fn resolve_attack(
        intent: &AttackIntent,
        now: Millis,
        player: &mut Player,
        enemies: &mut [Enemy],
        rng: &mut dyn RngCore,
        events: &mut EventQueue,
    ) -> Vec<HitReport> {
        match intent.kind {
            AttackKind::PlayerMelee => enemies
                .iter_mut()
                .filter(|enemy| enemy.is_alive() && intent.reaches(enemy.position()))
                .map(|enemy| HitReport {
                    target: enemy.id(),
                    outcome: enemy.take_damage(intent.damage, now, rng, events),
                })
                .collect(),
            AttackKind::EnemyMelee => {
                if !player.is_alive() || !intent.reaches(player.position()) {
                    return Vec::new();
                }
                vec![HitReport {
                    target: player.actor.id,
                    outcome: player.take_damage(intent.damage, now, events),
                }]
            }
        }
    }

    /// Снаряды против игрока: попадание если дистанция ≤ hit_radius
    pub fn resolve_projectiles(
        projectiles: &mut ProjectilePool,
        player: &mut Player,
        hit_radius: f32,
        now: Millis,
        events: &mut EventQueue,
    ) -> Vec<HitReport> {
        let mut reports = Vec::new();
        if !player.is_alive() {
            return reports;
        }

        for projectile in projectiles.iter_mut() {
            if projectile.is_destroyed() || projectile.position.distance(player.position()) > hit_radius {
                continue;
            }
            if let Some(damage) = projectile.hit_target(player.actor.id, events) {
                reports.push(HitReport {
                    target: player.actor.id,
                    outcome: player.take_damage(damage, now, events),
                });
            }
        }
        projectiles.compact();
        reports
    }
}
