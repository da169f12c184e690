//! Projectile: снаряд ranged врага
//!
//! Снаряд принадлежит `ProjectilePool` мира, а не стрелку: смерть или
//! удаление врага не уничтожает летящие снаряды. `owner` нужен только
//! для attribution в событиях.
//!
//! Жизненный цикл:
//! ```text
//! spawn → advance (каждый тик) → [hit_target → destroyed]
//!                               → [за range или за bounds → destroyed]
//! ```

use bevy::prelude::*;

use crate::components::ActorId;
use crate::events::{CombatEvent, EventQueue, PresentationCue};
use crate::world::WorldBounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct ProjectileId(pub u32);

/// Почему снаряд перестал лететь
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileStatus {
    Flying,
    OutOfRange,
    OutOfBounds,
    Destroyed,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: ProjectileId,
    pub owner: ActorId,
    pub origin: Vec2,
    pub position: Vec2,
    /// px/s
    pub velocity: Vec2,
    pub damage: u32,
    pub max_range: f32,
    /// Latch: снаряд попадает максимум один раз
    pub has_hit_target: bool,
    destroyed: bool,
}

impl Projectile {
    pub fn new(
        id: ProjectileId,
        owner: ActorId,
        origin: Vec2,
        velocity: Vec2,
        damage: u32,
        max_range: f32,
    ) -> Self {
        Self {
            id,
            owner,
            origin,
            position: origin,
            velocity,
            damage,
            max_range,
            has_hit_target: false,
            destroyed: false,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn distance_traveled(&self) -> f32 {
        self.origin.distance(self.position)
    }

    /// Интеграция позиции + проверка range/bounds
    pub fn advance(&mut self, dt_secs: f32, bounds: &WorldBounds) -> ProjectileStatus {
        if self.destroyed {
            return ProjectileStatus::Destroyed;
        }

        self.position += self.velocity * dt_secs;

        if self.distance_traveled() > self.max_range {
            self.destroyed = true;
            return ProjectileStatus::OutOfRange;
        }
        if !bounds.contains(self.position) {
            self.destroyed = true;
            return ProjectileStatus::OutOfBounds;
        }
        ProjectileStatus::Flying
    }

    /// Попадание в цель. Возвращает урон только для первого попадания.
    pub fn hit_target(&mut self, target: ActorId, events: &mut EventQueue) -> Option<u32> {
        if self.has_hit_target || self.destroyed {
            return None;
        }
        self.has_hit_target = true;
        self.destroyed = true;

        events.push(CombatEvent::ProjectileHit {
            projectile: self.id,
            target,
            damage: self.damage,
            owner: self.owner,
        });
        events.cue(PresentationCue::ProjectileImpact {
            position: self.position,
        });
        Some(self.damage)
    }
}

/// Все летящие снаряды мира
#[derive(Debug, Clone, Default)]
pub struct ProjectilePool {
    projectiles: Vec<Projectile>,
    next_id: u32,
}

impl ProjectilePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Создаёт снаряд и эмитит ProjectileFired
    pub fn spawn(
        &mut self,
        owner: ActorId,
        origin: Vec2,
        velocity: Vec2,
        damage: u32,
        max_range: f32,
        events: &mut EventQueue,
    ) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id += 1;

        self.projectiles
            .push(Projectile::new(id, owner, origin, velocity, damage, max_range));
        events.push(CombatEvent::ProjectileFired {
            projectile: id,
            owner,
            origin,
            velocity,
        });
        id
    }

    /// Двигает все снаряды и выбрасывает уничтоженные
    pub fn advance(&mut self, dt_secs: f32, bounds: &WorldBounds) {
        for projectile in self.projectiles.iter_mut() {
            let status = projectile.advance(dt_secs, bounds);
            if matches!(status, ProjectileStatus::OutOfRange | ProjectileStatus::OutOfBounds) {
                crate::logger::log(&format!(
                    "Projectile {:?} expired ({:?}) after {:.0}px",
                    projectile.id,
                    status,
                    projectile.distance_traveled()
                ));
            }
        }
        self.compact();
    }

    pub fn compact(&mut self) {
        self.projectiles.retain(|projectile| !projectile.is_destroyed());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.projectiles.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
    }
}
