//! Player: state machine, блок, опыт и уровни, stat hooks для предметов
//!
//! Player не знает про клавиатуру. Хост переводит input в вызовы
//! `move_in` / `attack` / `start_blocking` / `stop_blocking`,
//! а Bevy layer делает то же самое из `PlayerCommand` событий.
//!
//! # State machine
//!
//! ```text
//! IDLE ⇄ WALKING
//!   │ attack()            → ATTACKING ──(attack_duration)──→ IDLE
//!   │ start_blocking()    → BLOCKING  ──(stop_blocking)───→ IDLE
//!   │ take_damage (hit)   → STUNNED   ──(stun_duration)───→ IDLE
//!   └ health == 0         → DEAD ──(death_fade)──→ PlayerDied
//! ```

use bevy::prelude::*;

pub mod leveling;


pub use leveling::{LevelCurve, LevelUpBonuses};

use crate::combat::{blocked_damage, AttackIntent, AttackKind, DamageOutcome};
use crate::components::{Actor, ActorId, ActorState, Facing, StatKind};
use crate::config::{LevelingConfig, PlayerConfig, SimulationConfig};
use crate::events::{CombatEvent, EventQueue, PresentationCue};
use crate::inventory::{ItemEffect, StatModifier};
use crate::timers::{Millis, TimerQueue};

/// Отложенные переходы игрока
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerTimer {
    EndAttack,
    EndStun,
    EndInvulnerability,
    /// Fade-out закончился → терминальное PlayerDied
    DeathFade,
    /// Timed buff истёк → откатить модификатор
    RevertBuff(StatModifier),
}

#[derive(Debug, Clone)]
pub struct Player {
    pub actor: Actor,
    pub level: u32,
    pub experience: u32,
    pub experience_to_next_level: u32,
    pub total_experience: u64,
    pub is_blocking: bool,
    pub attack_range: f32,
    config: PlayerConfig,
    leveling: LevelingConfig,
    curve: LevelCurve,
    timers: TimerQueue<PlayerTimer>,
    death_notified: bool,
}

impl Player {
    pub fn new(config: &SimulationConfig, position: Vec2) -> Self {
        let player_config = config.player.clone();
        let curve = LevelCurve::from_config(&config.leveling);

        Self {
            actor: Actor::new(
                ActorId::PLAYER,
                player_config.max_health,
                player_config.attack_damage,
                player_config.speed,
                player_config.attack_cooldown_ms,
                position,
            ),
            level: 1,
            experience: 0,
            experience_to_next_level: curve.threshold_for(1),
            total_experience: 0,
            is_blocking: false,
            attack_range: player_config.attack_range,
            config: player_config,
            leveling: config.leveling.clone(),
            curve,
            timers: TimerQueue::new(),
            death_notified: false,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.actor.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.actor.velocity
    }

    pub fn state(&self) -> ActorState {
        self.actor.state
    }

    pub fn is_alive(&self) -> bool {
        self.actor.is_alive()
    }

    pub fn is_currently_blocking(&self) -> bool {
        self.is_blocking
    }

    pub fn is_invulnerable(&self) -> bool {
        self.actor.invulnerable
    }

    /// Тик игрока: отрабатываем созревшие таймеры
    pub fn update(&mut self, now: Millis, events: &mut EventQueue) {
        while let Some(timer) = self.timers.pop_due(now) {
            self.on_timer(timer, events);
        }
    }

    fn on_timer(&mut self, timer: PlayerTimer, events: &mut EventQueue) {
        match timer {
            PlayerTimer::EndAttack => {
                if self.actor.state == ActorState::Attacking {
                    self.actor.set_state(ActorState::Idle);
                }
            }
            PlayerTimer::EndStun => {
                // Мог умереть пока таймер ждал
                if self.actor.is_alive() && self.actor.state == ActorState::Stunned {
                    self.actor.set_state(ActorState::Idle);
                }
            }
            PlayerTimer::EndInvulnerability => {
                self.actor.invulnerable = false;
            }
            PlayerTimer::DeathFade => {
                if !self.death_notified {
                    self.death_notified = true;
                    events.push(CombatEvent::PlayerDied);
                    crate::logger::log_info("💀 Player death fade complete → game over");
                }
            }
            PlayerTimer::RevertBuff(modifier) => {
                // apply_modifier сам игнорирует мёртвого игрока
                self.revert_modifier(modifier, events);
            }
        }
    }

    // ------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------

    /// Движение по направлению (нормализуется). Игнорируется в busy/DEAD.
    pub fn move_in(&mut self, direction: Vec2) {
        if !self.actor.is_alive() || self.actor.state.is_busy() {
            return;
        }

        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            self.stop();
            return;
        }

        self.actor.velocity = direction * self.actor.effective_speed();
        self.actor.facing = Facing::towards(direction.x, self.actor.facing);
        self.actor.set_state(ActorState::Walking);
    }

    pub fn stop(&mut self) {
        if !self.actor.is_alive() {
            return;
        }
        self.actor.halt();
        if self.actor.state == ActorState::Walking {
            self.actor.set_state(ActorState::Idle);
        }
    }

    // ------------------------------------------------------------------
    // Attack
    // ------------------------------------------------------------------

    pub fn can_attack(&self, now: Millis) -> bool {
        self.actor.is_alive()
            && self.actor.state != ActorState::Attacking
            && self.actor.state != ActorState::Stunned
            && !self.is_blocking
            && self.actor.cooldown_elapsed(now)
    }

    /// Атака; молча no-op если `can_attack` не выполняется.
    /// Возвращает true если attack intent эмитнут.
    pub fn attack(&mut self, now: Millis, events: &mut EventQueue) -> bool {
        if !self.can_attack(now) {
            return false;
        }

        self.actor.last_attack_time = Some(now);
        self.actor.halt();
        self.actor.set_state(ActorState::Attacking);
        self.timers
            .schedule(now, self.config.attack_duration_ms, PlayerTimer::EndAttack);

        events.push(CombatEvent::Attack(AttackIntent {
            attacker: self.actor.id,
            origin: self.actor.position,
            facing: self.actor.facing,
            damage: self.actor.damage_roll(),
            range: self.attack_range,
            vertical_tolerance: None,
            kind: AttackKind::PlayerMelee,
        }));
        true
    }

    // ------------------------------------------------------------------
    // Blocking
    // ------------------------------------------------------------------

    /// Только из IDLE/WALKING, без таймаута
    pub fn start_blocking(&mut self) -> bool {
        if !matches!(self.actor.state, ActorState::Idle | ActorState::Walking) {
            return false;
        }
        self.is_blocking = true;
        self.actor.halt();
        self.actor.set_state(ActorState::Blocking);
        true
    }

    pub fn stop_blocking(&mut self) {
        if !self.is_blocking {
            return;
        }
        self.is_blocking = false;
        if self.actor.state == ActorState::Blocking {
            self.actor.set_state(ActorState::Idle);
        }
    }

    // ------------------------------------------------------------------
    // Damage / heal / death
    // ------------------------------------------------------------------

    pub fn take_damage(&mut self, amount: u32, now: Millis, events: &mut EventQueue) -> DamageOutcome {
        if !self.actor.is_alive() || self.actor.invulnerable {
            return DamageOutcome::Ignored;
        }

        if self.is_blocking {
            let reduced = blocked_damage(amount, self.config.block_damage_factor);
            events.cue(PresentationCue::BlockPulse { actor: self.actor.id });

            let applied = self.actor.health.take_damage(reduced);
            if applied > 0 {
                self.emit_health(events);
            }
            if !self.actor.health.is_alive() {
                self.die(now, events);
                return DamageOutcome::Killed { applied };
            }
            return DamageOutcome::Blocked { applied };
        }

        let applied = self.actor.health.take_damage(amount);
        if applied == 0 {
            return DamageOutcome::Ignored;
        }
        self.emit_health(events);

        if !self.actor.health.is_alive() {
            self.die(now, events);
            return DamageOutcome::Killed { applied };
        }

        self.actor.halt();
        self.actor.set_state(ActorState::Stunned);
        self.actor.invulnerable = true;
        self.timers
            .schedule(now, self.config.stun_duration_ms, PlayerTimer::EndStun);
        self.timers.schedule(
            now,
            self.config.invulnerability_ms,
            PlayerTimer::EndInvulnerability,
        );
        events.cue(PresentationCue::HurtTint { actor: self.actor.id });

        DamageOutcome::Hurt { applied }
    }

    pub fn heal(&mut self, amount: u32, events: &mut EventQueue) {
        if !self.actor.is_alive() {
            return;
        }
        self.actor.health.heal(amount);
        self.emit_health(events);
    }

    /// Форсированный DEAD; PlayerDied эмитится после fade
    pub fn die(&mut self, now: Millis, events: &mut EventQueue) {
        if self.actor.state == ActorState::Dead {
            return;
        }
        self.actor.enter_dead();
        self.is_blocking = false;
        events.cue(PresentationCue::HealthBarHidden { actor: self.actor.id });
        self.timers
            .schedule(now, self.config.death_fade_ms, PlayerTimer::DeathFade);

        crate::logger::log_info(&format!(
            "Player died at level {} ({} total XP)",
            self.level, self.total_experience
        ));
    }

    fn emit_health(&self, events: &mut EventQueue) {
        events.push(CombatEvent::Damage {
            actor: self.actor.id,
            current: self.actor.health.current,
            max: self.actor.health.max,
        });
    }

    // ------------------------------------------------------------------
    // Experience
    // ------------------------------------------------------------------

    /// Начисляет опыт; level-up в цикле пока experience >= threshold
    pub fn gain_experience(&mut self, amount: u32, events: &mut EventQueue) {
        self.experience = self.experience.saturating_add(amount);
        self.total_experience = self.total_experience.saturating_add(amount as u64);

        while self.experience >= self.experience_to_next_level {
            self.experience -= self.experience_to_next_level;
            self.level += 1;
            self.experience_to_next_level = self.curve.threshold_for(self.level);

            let bonuses = self.apply_level_bonuses();
            events.push(CombatEvent::LevelUp {
                new_level: self.level,
                experience_to_next: self.experience_to_next_level,
                bonuses,
            });
            crate::logger::log_info(&format!(
                "⬆️ Player reached level {} (next at {} XP)",
                self.level, self.experience_to_next_level
            ));
        }

        events.push(CombatEvent::ExperienceGain {
            gained: amount,
            current: self.experience,
            needed: self.experience_to_next_level,
            level: self.level,
            total: self.total_experience,
        });
    }

    fn apply_level_bonuses(&mut self) -> LevelUpBonuses {
        let health_bonus = self.leveling.health_per_level;
        // Через Health напрямую: max растёт даже у мёртвого, heal только у живого
        self.actor.health.adjust_max(health_bonus as i64);

        let damage_bonus = self.leveling.damage_per_level;
        self.actor.adjust_stat(StatKind::AttackDamage, damage_bonus);

        let speed_bonus = if self.actor.speed < self.leveling.speed_cap {
            let target = (self.actor.speed + self.leveling.speed_per_level).min(self.leveling.speed_cap);
            let delta = target - self.actor.speed;
            self.actor.adjust_stat(StatKind::Speed, delta);
            self.refresh_velocity();
            delta
        } else {
            0.0
        };

        LevelUpBonuses {
            max_health: health_bonus,
            attack_damage: damage_bonus,
            speed: speed_bonus,
        }
    }

    // ------------------------------------------------------------------
    // Item hooks
    // ------------------------------------------------------------------

    /// Зелье: heal или timed buff (откат через таймер)
    pub fn apply_item_effect(&mut self, effect: ItemEffect, now: Millis, events: &mut EventQueue) -> bool {
        if !self.actor.is_alive() {
            return false;
        }

        match effect {
            ItemEffect::Heal { amount } => self.heal(amount, events),
            ItemEffect::TimedBuff { modifier, duration_ms } => {
                self.apply_modifier(modifier, events);
                self.timers
                    .schedule(now, duration_ms, PlayerTimer::RevertBuff(modifier));
            }
        }
        true
    }

    /// Постоянный модификатор (экипировка)
    pub fn apply_modifier(&mut self, modifier: StatModifier, events: &mut EventQueue) {
        if !self.actor.is_alive() {
            return;
        }
        self.actor.adjust_stat(modifier.stat, modifier.amount);
        match modifier.stat {
            StatKind::MaxHealth => self.emit_health(events),
            StatKind::Speed => self.refresh_velocity(),
            StatKind::AttackDamage => {}
        }
    }

    /// Пересчитать velocity под текущую скорость, направление сохраняется
    fn refresh_velocity(&mut self) {
        if self.actor.state != ActorState::Walking {
            return;
        }
        let direction = self.actor.velocity.normalize_or_zero();
        self.actor.velocity = direction * self.actor.effective_speed();
    }

    pub fn revert_modifier(&mut self, modifier: StatModifier, events: &mut EventQueue) {
        self.apply_modifier(modifier.inverse(), events);
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}
