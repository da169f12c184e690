//! Исходящие события симуляции
//!
//! Акторы ничего не вызывают напрямую у соседей и у presentation layer:
//! они пишут `CombatEvent` в `EventQueue`, которую координатор (CombatWorld)
//! дренит раз в тик. Порядок внутри тика = порядок эмиссии.
//!
//! Bevy layer пробрасывает дренированные события в `Events<CombatEvent>`.

use bevy::prelude::*;

use crate::combat::AttackIntent;
use crate::components::ActorId;
use crate::enemy::EnemyKind;
use crate::inventory::ItemId;
use crate::player::LevelUpBonuses;
use crate::projectile::ProjectileId;

/// Данные смерти врага для начисления опыта и дропа
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyDeath {
    pub enemy: ActorId,
    pub kind: EnemyKind,
    pub level: u32,
    pub experience_reward: u32,
    pub item_drop_chance: f32,
    pub position: Vec2,
}

/// Чисто визуальные сигналы (tint, alpha pulse, скрытие HUD)
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationCue {
    /// Короткий alpha pulse при заблокированном ударе
    BlockPulse { actor: ActorId },
    /// Красный tint на время invulnerability window
    HurtTint { actor: ActorId },
    /// Death tint врага
    DeathTint { actor: ActorId },
    HealthBarHidden { actor: ActorId },
    WindupStarted { actor: ActorId },
    WindupCancelled { actor: ActorId },
    /// Затухающий pulse в точке попадания снаряда
    ProjectileImpact { position: Vec2 },
    /// Объект актора можно удалять со сцены
    ActorRemoved { actor: ActorId },
}

#[derive(Event, Debug, Clone, PartialEq)]
pub enum CombatEvent {
    /// Attack intent, ещё не разрешённая атака
    Attack(AttackIntent),

    /// Push-only feed для health bar
    Damage {
        actor: ActorId,
        current: u32,
        max: u32,
    },

    /// Терминальная смерть игрока (после fade) → game over flow
    PlayerDied,

    LevelUp {
        new_level: u32,
        experience_to_next: u32,
        bonuses: LevelUpBonuses,
    },

    ExperienceGain {
        gained: u32,
        current: u32,
        needed: u32,
        level: u32,
        total: u64,
    },

    ProjectileFired {
        projectile: ProjectileId,
        owner: ActorId,
        origin: Vec2,
        velocity: Vec2,
    },

    /// Однократное попадание снаряда
    ProjectileHit {
        projectile: ProjectileId,
        target: ActorId,
        damage: u32,
        owner: ActorId,
    },

    EnemyDied(EnemyDeath),

    EnemySpawned {
        enemy: ActorId,
        kind: EnemyKind,
        level: u32,
        position: Vec2,
    },

    /// Дроп положен в инвентарь
    ItemDropped {
        item: ItemId,
        slot_index: usize,
    },

    Cue(PresentationCue),
}

/// Очередь событий одного тика
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<CombatEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn cue(&mut self, cue: PresentationCue) {
        self.events.push(CombatEvent::Cue(cue));
    }

    /// Текущая длина, метка для `since`
    pub fn mark(&self) -> usize {
        self.events.len()
    }

    /// События, добавленные после метки
    pub fn since(&self, mark: usize) -> &[CombatEvent] {
        self.events.get(mark..).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter()
    }

    /// Выбросить `count` самых старых событий, вернуть сколько реально удалено
    pub fn trim_front(&mut self, count: usize) -> usize {
        let count = count.min(self.events.len());
        self.events.drain(..count);
        count
    }

    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_since_mark() {
        let mut queue = EventQueue::new();
        queue.push(CombatEvent::PlayerDied);
        let mark = queue.mark();
        queue.cue(PresentationCue::BlockPulse { actor: ActorId::PLAYER });

        assert_eq!(queue.since(mark).len(), 1);
        assert_eq!(queue.since(99).len(), 0);
        assert_eq!(queue.drain().len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_trim_front_drops_oldest() {
        let mut queue = EventQueue::new();
        queue.push(CombatEvent::PlayerDied);
        queue.cue(PresentationCue::BlockPulse { actor: ActorId::PLAYER });
        queue.cue(PresentationCue::HealthBarHidden { actor: ActorId::PLAYER });

        assert_eq!(queue.trim_front(2), 2);
        assert_eq!(queue.len(), 1);
        assert!(matches!(
            queue.iter().next(),
            Some(CombatEvent::Cue(PresentationCue::HealthBarHidden { .. }))
        ));
        assert_eq!(queue.trim_front(5), 1);
        assert!(queue.is_empty());
    }
}
