//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (entity insertion order)
//! - No rendering, timers or platform dependencies

pub mod bonus;
pub mod collision;
pub mod entity;
pub mod environment;
pub mod factory;
pub mod pause;
pub mod player;
pub mod state;
pub mod tick;
pub mod util;

pub use bonus::{ActiveBonus, BONUS_CATALOG, BonusKind, BonusOption, Letter};
pub use collision::{CollisionResult, PLATFORM_TOLERANCE, resolve_collisions};
pub use entity::{Behavior, Entity, EntityKind, LaserState};
pub use environment::Environment;
pub use factory::{SpawnTable, create_entity, spawn_clearance, spawn_table};
pub use pause::{ChoiceArea, PauseEffect, PauseState, Transition};
pub use player::Player;
pub use state::GameState;
pub use tick::{TickOutcome, tick};
pub use util::Rect;
