//! Combat: attack intents, правила урона, разрешение атак
//!
//! Ответственность:
//! - AttackIntent: что актор хочет ударить (origin, range, damage)
//! - damage: формулы блока
//! - resolver: distance-based hit testing, вызов take_damage у целей
//!
//! Поток:
//! ```text
//! Player::attack / Enemy windup → CombatEvent::Attack(intent)
//!   ↓
//! CombatResolver (в CombatWorld::tick) → targets в range
//!   ↓
//! take_damage → Damage / EnemyDied / Cue события
//! ```

use bevy::prelude::*;

pub mod context;
pub mod damage;
pub mod resolver;


pub use context::{CombatContext, PlayerSnapshot};
pub use damage::{blocked_damage, DamageOutcome};
pub use resolver::CombatResolver;

use crate::components::{ActorId, Facing};

/// Кто атакует (определяет набор целей)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum AttackKind {
    /// Игрок бьёт врагов
    PlayerMelee,
    /// Враг бьёт игрока
    EnemyMelee,
}

/// Attack intent: эмитится атакующим, разрешается resolver'ом
#[derive(Debug, Clone, PartialEq)]
pub struct AttackIntent {
    pub attacker: ActorId,
    pub origin: Vec2,
    pub facing: Facing,
    pub damage: u32,
    pub range: f32,
    /// Some: удар по полосе (|dx| ≤ range, |dy| ≤ tolerance), тот же бокс
    /// что у AI врага. None: круговая зона радиуса range.
    pub vertical_tolerance: Option<f32>,
    pub kind: AttackKind,
}

impl AttackIntent {
    /// Distance-only hit test (без hitbox'ов)
    pub fn reaches(&self, target: Vec2) -> bool {
        match self.vertical_tolerance {
            Some(tolerance) => {
                let offset = target - self.origin;
                offset.x.abs() <= self.range && offset.y.abs() <= tolerance
            }
            None => self.origin.distance(target) <= self.range,
        }
    }
}
