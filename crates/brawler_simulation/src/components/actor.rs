//! Базовая запись актора: Health, ActorState, статы, позиция
//!
//! Player и Enemy не наследуются от общего базового класса, оба
//! содержат `Actor` и добавляют своё поведение поверх.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::timers::Millis;

/// Stable ID актора (attribution урона, снарядов, событий)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct ActorId(pub u32);

impl ActorId {
    /// Игрок всегда один и всегда 0
    pub const PLAYER: ActorId = ActorId(0);

    pub fn is_player(&self) -> bool {
        *self == Self::PLAYER
    }
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max, current == 0 ⇔ DEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Возвращает реально снятое количество (floor at 0)
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.current);
        self.current -= applied;
        applied
    }

    /// Clamp к max, мёртвых не воскрешает
    pub fn heal(&mut self, amount: u32) {
        if !self.is_alive() {
            return;
        }
        self.current = self.current.saturating_add(amount).min(self.max);
    }

    /// Меняет max; положительная дельта лечит на ту же величину,
    /// отрицательная только клампит current (никогда не убивает)
    pub fn adjust_max(&mut self, delta: i64) {
        let new_max = (self.max as i64 + delta).max(1) as u32;
        self.max = new_max;

        if delta > 0 {
            self.heal(delta as u32);
        } else if self.current > self.max {
            self.current = self.max;
        }
    }

    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            0.0
        } else {
            self.current as f32 / self.max as f32
        }
    }
}

/// Состояние state machine (общий контракт Player/Enemy)
///
/// STUNNED: только у Player; Enemy использует HURT для аналогичной отдачи.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum ActorState {
    #[default]
    Idle,
    Walking,
    Attacking,
    Hurt,
    Stunned,
    Blocking,
    /// Терминальное состояние
    Dead,
}

impl ActorState {
    /// Busy-состояния блокируют AI решения и player input
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            ActorState::Attacking | ActorState::Hurt | ActorState::Stunned | ActorState::Blocking
        )
    }
}

/// Направление взгляда (side-scroller: только лево/право)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(&self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Направление к цели по горизонтальному offset; при dx == 0 не меняем
    pub fn towards(dx: f32, current: Facing) -> Facing {
        if dx > 0.0 {
            Facing::Right
        } else if dx < 0.0 {
            Facing::Left
        } else {
            current
        }
    }
}

/// Стат, который можно менять через level-up, предметы, зелья
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum StatKind {
    AttackDamage,
    MaxHealth,
    Speed,
}

/// Общая часть Player и Enemy
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    pub health: Health,
    pub attack_damage: f32,
    pub speed: f32,
    pub state: ActorState,
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
    /// Сбрасывается таймером EndInvulnerability
    pub invulnerable: bool,
    pub last_attack_time: Option<Millis>,
    pub attack_cooldown_ms: Millis,
}

impl Actor {
    pub fn new(
        id: ActorId,
        max_health: u32,
        attack_damage: f32,
        speed: f32,
        attack_cooldown_ms: Millis,
        position: Vec2,
    ) -> Self {
        Self {
            id,
            health: Health::new(max_health),
            attack_damage,
            speed,
            state: ActorState::Idle,
            position,
            velocity: Vec2::ZERO,
            facing: Facing::Right,
            invulnerable: false,
            last_attack_time: None,
            attack_cooldown_ms,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive() && self.state != ActorState::Dead
    }

    /// Переход состояния.
    ///
    /// No-op если new == current (таймеры не перезапускаются) и из DEAD.
    /// Возвращает true если переход реально произошёл.
    pub fn set_state(&mut self, new_state: ActorState) -> bool {
        if self.state == new_state || self.state == ActorState::Dead {
            return false;
        }
        self.state = new_state;
        true
    }

    /// Прошёл ли attack cooldown с последней атаки
    pub fn cooldown_elapsed(&self, now: Millis) -> bool {
        match self.last_attack_time {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.attack_cooldown_ms,
        }
    }

    pub fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// Перевод в DEAD: velocity обнуляется, флаги снимаются
    pub fn enter_dead(&mut self) {
        self.health.current = 0;
        self.state = ActorState::Dead;
        self.velocity = Vec2::ZERO;
        self.invulnerable = false;
    }

    /// Урон как целое число для attack intent
    pub fn damage_roll(&self) -> u32 {
        self.attack_damage.max(0.0).floor() as u32
    }

    /// Скорость с учётом clamp (сырое `speed` может уйти ниже 0 от дебаффов)
    pub fn effective_speed(&self) -> f32 {
        self.speed.max(0.0)
    }

    /// Stat mutation hook (level-up, item modifiers, timed buffs)
    ///
    /// AttackDamage и Speed хранятся сырой суммой модификаторов, clamp
    /// только при чтении (`damage_roll`, `effective_speed`): откат
    /// модификатора всегда возвращает исходное значение.
    pub fn adjust_stat(&mut self, stat: StatKind, delta: f32) {
        match stat {
            StatKind::AttackDamage => {
                self.attack_damage += delta;
            }
            StatKind::Speed => {
                self.speed += delta;
            }
            StatKind::MaxHealth => {
                if self.is_alive() {
                    self.health.adjust_max(delta.round() as i64);
                }
            }
        }
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }
}
