//! Общие данные акторов
//!
//! - actor: ActorId, Health, ActorState, Facing, StatKind, Actor record

pub mod actor;

pub use actor::*;
