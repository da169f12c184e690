//! Enemy: AI-управляемый актор (melee или ranged)
//!
//! # Архитектура
//!
//! Нет наследования Enemy → RangedEnemy. Один `Enemy` = `Actor` + `Behavior`:
//! - `Behavior::Melee`: сближение по одной оси, windup, удар
//! - `Behavior::Ranged`: stand-off дистанция, windup, выстрел с упреждением
//!
//! # Тик
//!
//! ```text
//! update(ctx)
//!   ├─ созревшие таймеры (guarded: проверяют health/state перед действием)
//!   ├─ busy? (ATTACKING/HURT/BLOCKING/windup) → без решений
//!   ├─ throttle: решение не чаще раза в action_cooldown_ms
//!   └─ интеграция позиции (clamp в world bounds)
//! ```
//!
//! Защита: двухступенчатый roll (block_chance → block_success_probability).
//! Успешный блок режет урон до floor(d × 0.3) и ставит BLOCKING на 300ms.

use bevy::prelude::*;
use rand::{Rng, RngCore};

pub mod ai;
pub mod ranged;
pub mod reward;

#[cfg(test)]
mod enemy_tests;

pub use ai::{decide_melee, is_vertically_aligned, AiDecision, EngageParams};
pub use ranged::{decide_ranged, predict_aim_point, StandOffParams};

use crate::combat::{blocked_damage, AttackIntent, AttackKind, CombatContext, DamageOutcome};
use crate::components::{Actor, ActorId, ActorState, Facing};
use crate::config::{EnemyConfig, SimulationConfig};
use crate::events::{CombatEvent, EnemyDeath, EventQueue, PresentationCue};
use crate::timers::{Millis, TimerQueue};
use crate::world::WorldBounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum EnemyKind {
    Melee,
    Ranged,
}

/// Параметры выстрела ranged врага
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotParams {
    pub projectile_speed: f32,
    pub projectile_range: f32,
    pub lead_factor: f32,
    /// Смещение точки спавна снаряда вперёд от врага
    pub muzzle_offset: f32,
}

/// Полиморфное поведение поверх общей state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    Melee(EngageParams),
    Ranged {
        stand_off: StandOffParams,
        shot: ShotParams,
    },
}

impl Behavior {
    pub fn kind(&self) -> EnemyKind {
        match self {
            Behavior::Melee(_) => EnemyKind::Melee,
            Behavior::Ranged { .. } => EnemyKind::Ranged,
        }
    }

    pub fn attack_range(&self) -> f32 {
        match self {
            Behavior::Melee(params) => params.attack_range,
            Behavior::Ranged { stand_off, .. } => stand_off.attack_range,
        }
    }

    pub fn detection_range(&self) -> f32 {
        match self {
            Behavior::Melee(params) => params.detection_range,
            Behavior::Ranged { stand_off, .. } => stand_off.detection_range,
        }
    }

    pub fn vertical_tolerance(&self) -> f32 {
        match self {
            Behavior::Melee(params) => params.vertical_tolerance,
            Behavior::Ranged { stand_off, .. } => stand_off.vertical_tolerance,
        }
    }

    fn decide(&self, enemy: Vec2, player: Vec2) -> AiDecision {
        match self {
            Behavior::Melee(params) => decide_melee(enemy, player, params),
            Behavior::Ranged { stand_off, .. } => decide_ranged(enemy, player, stand_off),
        }
    }
}

/// Отложенные переходы врага (не отменяемые, каждый guarded)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyTimer {
    /// Конец telegraph → реальная атака
    ExecuteWindup,
    EndAttack,
    EndHurt,
    EndBlock,
    EndInvulnerability,
    /// Death tint отыгран → убрать из списка спавнера
    Remove,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub actor: Actor,
    pub level: u32,
    pub behavior: Behavior,
    pub block_chance: f32,
    pub is_winding_up: bool,
    pub item_drop_chance: f32,
    pub experience_reward: u32,
    pub last_action_time: Option<Millis>,
    /// Масштаб спрайта под высоту игрока (presentation hint)
    pub display_scale: f32,
    config: EnemyConfig,
    timers: TimerQueue<EnemyTimer>,
    removed: bool,
}

impl Enemy {
    pub fn new(id: ActorId, kind: EnemyKind, level: u32, position: Vec2, config: &SimulationConfig) -> Self {
        match kind {
            EnemyKind::Melee => Self::melee(id, level, position, config),
            EnemyKind::Ranged => Self::ranged(id, level, position, config),
        }
    }

    pub fn melee(id: ActorId, level: u32, position: Vec2, config: &SimulationConfig) -> Self {
        let enemy = &config.enemy;
        let behavior = Behavior::Melee(EngageParams {
            detection_range: enemy.detection_range,
            attack_range: enemy.attack_range,
            vertical_tolerance: enemy.vertical_tolerance,
        });
        let experience = reward::experience_reward(enemy.base_experience, level.max(1), 1.0);
        Self::build(id, level, position, config, behavior, 1.0, experience)
    }

    pub fn ranged(id: ActorId, level: u32, position: Vec2, config: &SimulationConfig) -> Self {
        let enemy = &config.enemy;
        let ranged = &config.ranged;
        let behavior = Behavior::Ranged {
            stand_off: StandOffParams {
                detection_range: enemy.detection_range * ranged.extended_detection_multiplier,
                attack_range: ranged.attack_range,
                min_attack_distance: ranged.min_attack_distance,
                vertical_tolerance: ranged.vertical_tolerance,
            },
            shot: ShotParams {
                projectile_speed: ranged.projectile_speed,
                projectile_range: ranged.projectile_range,
                lead_factor: ranged.lead_factor,
                muzzle_offset: ranged.muzzle_offset,
            },
        };
        let experience = reward::experience_reward(
            enemy.base_experience,
            level.max(1),
            ranged.experience_multiplier,
        );
        Self::build(id, level, position, config, behavior, ranged.health_multiplier, experience)
    }

    fn build(
        id: ActorId,
        level: u32,
        position: Vec2,
        config: &SimulationConfig,
        behavior: Behavior,
        health_multiplier: f32,
        experience_reward: u32,
    ) -> Self {
        let enemy = config.enemy.clone();
        let level = level.max(1);
        let max_health = reward::scaled_health(
            enemy.max_health,
            enemy.health_growth_per_level,
            level,
            health_multiplier,
        );
        let attack_damage = reward::scaled_stat(enemy.attack_damage, enemy.damage_growth_per_level, level, 1.0);

        let mut actor = Actor::new(
            id,
            max_health,
            attack_damage,
            enemy.speed,
            enemy.attack_cooldown_ms,
            position,
        );
        // Враги появляются справа и смотрят на игрока
        actor.facing = Facing::Left;

        let display_scale = if config.spawner.enemy_frame_height > 0.0 {
            config.spawner.player_display_height / config.spawner.enemy_frame_height
        } else {
            1.0
        };

        Self {
            actor,
            level,
            behavior,
            block_chance: enemy.block_chance,
            is_winding_up: false,
            item_drop_chance: enemy.item_drop_chance,
            experience_reward,
            last_action_time: None,
            display_scale,
            config: enemy,
            timers: TimerQueue::new(),
            removed: false,
        }
    }

    pub fn id(&self) -> ActorId {
        self.actor.id
    }

    pub fn kind(&self) -> EnemyKind {
        self.behavior.kind()
    }

    pub fn position(&self) -> Vec2 {
        self.actor.position
    }

    pub fn state(&self) -> ActorState {
        self.actor.state
    }

    pub fn is_alive(&self) -> bool {
        self.actor.is_alive()
    }

    /// Remove таймер отработал, спавнер выбросит при compaction
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Busy: ни AI решений, ни новых действий
    pub fn is_busy(&self) -> bool {
        self.actor.state.is_busy() || self.is_winding_up
    }

    pub fn can_attack(&self, now: Millis) -> bool {
        self.actor.is_alive() && !self.is_busy() && self.actor.cooldown_elapsed(now)
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    pub fn update(&mut self, ctx: &mut CombatContext<'_>) {
        while let Some(timer) = self.timers.pop_due(ctx.now) {
            self.on_timer(timer, ctx);
        }

        if !self.actor.is_alive() {
            return;
        }

        if !ctx.player.alive {
            // Игрок мёртв: стоим
            if self.actor.state == ActorState::Walking {
                self.actor.halt();
                self.actor.set_state(ActorState::Idle);
            }
            return;
        }

        if !self.is_busy() {
            if self.decision_due(ctx.now) {
                self.last_action_time = Some(ctx.now);
                let decision = self.behavior.decide(self.actor.position, ctx.player.position);
                self.apply_decision(decision, ctx);
            } else {
                self.settle_if_arrived(ctx.player.position);
            }
        }

        self.integrate(ctx.dt_secs, &ctx.bounds);
    }

    fn decision_due(&self, now: Millis) -> bool {
        match self.last_action_time {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.config.action_cooldown_ms,
        }
    }

    fn apply_decision(&mut self, decision: AiDecision, ctx: &mut CombatContext<'_>) {
        let dx = ctx.player.position.x - self.actor.position.x;
        self.actor.facing = Facing::towards(dx, self.actor.facing);

        match decision {
            AiDecision::Idle => {
                self.actor.halt();
                self.actor.set_state(ActorState::Idle);
            }
            AiDecision::Move { direction } => {
                self.actor.velocity = direction * self.actor.effective_speed();
                self.actor.set_state(ActorState::Walking);
            }
            AiDecision::Attack => {
                self.actor.halt();
                if self.can_attack(ctx.now) {
                    self.start_attack_windup(ctx.now, ctx.events);
                } else {
                    self.actor.set_state(ActorState::Idle);
                }
            }
        }
    }

    /// Между решениями: остановиться, если уже дошли до позиции удара
    fn settle_if_arrived(&mut self, player: Vec2) {
        if self.actor.state != ActorState::Walking {
            return;
        }
        if let Behavior::Melee(params) = &self.behavior {
            if decide_melee(self.actor.position, player, params) == AiDecision::Attack {
                self.actor.halt();
                self.actor.set_state(ActorState::Idle);
            }
        }
    }

    fn integrate(&mut self, dt_secs: f32, bounds: &WorldBounds) {
        if self.actor.velocity == Vec2::ZERO {
            return;
        }
        self.actor.position = bounds.clamp(self.actor.position + self.actor.velocity * dt_secs);
    }

    // ------------------------------------------------------------------
    // Windup / attack
    // ------------------------------------------------------------------

    /// Telegraph: замираем, через windup_ms → `execute_windup`
    pub fn start_attack_windup(&mut self, now: Millis, events: &mut EventQueue) -> bool {
        if !self.can_attack(now) {
            return false;
        }
        self.is_winding_up = true;
        self.actor.halt();
        self.actor.set_state(ActorState::Idle);
        self.timers
            .schedule(now, self.config.windup_ms, EnemyTimer::ExecuteWindup);
        events.cue(PresentationCue::WindupStarted { actor: self.actor.id });
        true
    }

    fn execute_windup(&mut self, ctx: &mut CombatContext<'_>) {
        // Latch снят → windup отменён (HURT/смерть)
        if !self.is_winding_up {
            return;
        }
        self.is_winding_up = false;

        if !self.actor.is_alive() {
            return;
        }

        let aligned = ctx.player.alive
            && is_vertically_aligned(
                self.actor.position,
                ctx.player.position,
                self.behavior.vertical_tolerance(),
            );
        if !aligned {
            self.actor.set_state(ActorState::Walking);
            ctx.events
                .cue(PresentationCue::WindupCancelled { actor: self.actor.id });
            crate::logger::log(&format!(
                "Enemy {:?}: windup cancelled, lost vertical alignment",
                self.actor.id
            ));
            return;
        }

        self.attack(ctx);
    }

    fn attack(&mut self, ctx: &mut CombatContext<'_>) {
        let now = ctx.now;
        self.actor.last_attack_time = Some(now);
        self.actor.halt();
        self.actor.set_state(ActorState::Attacking);
        self.timers
            .schedule(now, self.config.attack_duration_ms, EnemyTimer::EndAttack);

        let dx = ctx.player.position.x - self.actor.position.x;
        self.actor.facing = Facing::towards(dx, self.actor.facing);

        match self.behavior {
            Behavior::Melee(params) => {
                ctx.events.push(CombatEvent::Attack(AttackIntent {
                    attacker: self.actor.id,
                    origin: self.actor.position,
                    facing: self.actor.facing,
                    damage: self.actor.damage_roll(),
                    range: params.attack_range,
                    vertical_tolerance: Some(params.vertical_tolerance),
                    kind: AttackKind::EnemyMelee,
                }));
            }
            Behavior::Ranged { shot, .. } => self.fire(shot, ctx),
        }
    }

    fn fire(&mut self, shot: ShotParams, ctx: &mut CombatContext<'_>) {
        let aim = predict_aim_point(
            self.actor.position,
            ctx.player.position,
            ctx.player.velocity,
            shot.projectile_speed,
            shot.lead_factor,
        );
        let mut direction = (aim - self.actor.position).normalize_or_zero();
        if direction == Vec2::ZERO {
            direction = Vec2::new(self.actor.facing.sign(), 0.0);
        }

        let origin = self.actor.position + direction * shot.muzzle_offset;
        let id = ctx.projectiles.spawn(
            self.actor.id,
            origin,
            direction * shot.projectile_speed,
            self.actor.damage_roll(),
            shot.projectile_range,
            ctx.events,
        );
        crate::logger::log(&format!(
            "🏹 Enemy {:?} fired {:?} at {:?} (aim {:?})",
            self.actor.id, id, ctx.player.position, aim
        ));
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    fn on_timer(&mut self, timer: EnemyTimer, ctx: &mut CombatContext<'_>) {
        match timer {
            EnemyTimer::ExecuteWindup => self.execute_windup(ctx),
            EnemyTimer::EndAttack => {
                if self.actor.state == ActorState::Attacking {
                    self.actor.set_state(ActorState::Idle);
                }
            }
            EnemyTimer::EndHurt => {
                // Мог умереть пока таймер ждал
                if self.actor.is_alive() && self.actor.state == ActorState::Hurt {
                    self.actor.set_state(ActorState::Idle);
                }
            }
            EnemyTimer::EndBlock => {
                if self.actor.is_alive() && self.actor.state == ActorState::Blocking {
                    self.actor.set_state(ActorState::Idle);
                }
            }
            EnemyTimer::EndInvulnerability => {
                self.actor.invulnerable = false;
            }
            EnemyTimer::Remove => {
                if !self.removed {
                    self.removed = true;
                    ctx.events
                        .cue(PresentationCue::ActorRemoved { actor: self.actor.id });
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Damage / death
    // ------------------------------------------------------------------

    /// Двухступенчатый roll: хочет ли блокировать, удался ли блок
    fn roll_block(&self, rng: &mut dyn RngCore) -> bool {
        rng.gen::<f32>() < self.block_chance
            && rng.gen::<f32>() < self.config.block_success_probability
    }

    pub fn take_damage(
        &mut self,
        amount: u32,
        now: Millis,
        rng: &mut dyn RngCore,
        events: &mut EventQueue,
    ) -> DamageOutcome {
        if !self.actor.is_alive() || self.actor.invulnerable || amount == 0 {
            return DamageOutcome::Ignored;
        }

        if self.roll_block(rng) {
            let reduced = blocked_damage(amount, self.config.block_damage_factor);
            let applied = self.actor.health.take_damage(reduced);
            events.cue(PresentationCue::BlockPulse { actor: self.actor.id });
            if applied > 0 {
                self.emit_health(events);
            }
            if !self.actor.health.is_alive() {
                self.die(now, events);
                return DamageOutcome::Killed { applied };
            }

            if !self.is_busy() {
                self.actor.halt();
                self.actor.set_state(ActorState::Blocking);
                self.timers
                    .schedule(now, self.config.block_duration_ms, EnemyTimer::EndBlock);
            }
            return DamageOutcome::Blocked { applied };
        }

        let applied = self.actor.health.take_damage(amount);
        self.emit_health(events);

        if !self.actor.health.is_alive() {
            self.die(now, events);
            return DamageOutcome::Killed { applied };
        }

        self.cancel_windup(events);
        self.actor.halt();
        self.actor.set_state(ActorState::Hurt);
        self.actor.invulnerable = true;
        self.timers
            .schedule(now, self.config.hurt_duration_ms, EnemyTimer::EndHurt);
        self.timers.schedule(
            now,
            self.config.invulnerability_ms,
            EnemyTimer::EndInvulnerability,
        );
        events.cue(PresentationCue::HurtTint { actor: self.actor.id });

        DamageOutcome::Hurt { applied }
    }

    fn cancel_windup(&mut self, events: &mut EventQueue) {
        if self.is_winding_up {
            self.is_winding_up = false;
            events.cue(PresentationCue::WindupCancelled { actor: self.actor.id });
        }
    }

    pub fn die(&mut self, now: Millis, events: &mut EventQueue) {
        if self.actor.state == ActorState::Dead {
            return;
        }
        self.is_winding_up = false;
        self.actor.enter_dead();

        events.cue(PresentationCue::DeathTint { actor: self.actor.id });
        events.cue(PresentationCue::HealthBarHidden { actor: self.actor.id });
        events.push(CombatEvent::EnemyDied(EnemyDeath {
            enemy: self.actor.id,
            kind: self.kind(),
            level: self.level,
            experience_reward: self.experience_reward,
            item_drop_chance: self.item_drop_chance,
            position: self.actor.position,
        }));
        self.timers
            .schedule(now, self.config.removal_delay_ms, EnemyTimer::Remove);

        crate::logger::log_info(&format!(
            "💀 Enemy {:?} ({:?} lvl {}) died → {} XP",
            self.actor.id,
            self.kind(),
            self.level,
            self.experience_reward
        ));
    }

    fn emit_health(&self, events: &mut EventQueue) {
        events.push(CombatEvent::Damage {
            actor: self.actor.id,
            current: self.actor.health.current,
            max: self.actor.health.max,
        });
    }
}
