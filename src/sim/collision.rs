//! Player vs. entity collision resolution
//!
//! Platforms are solid only from the side or below; landing on them is the
//! player's own physics. Everything else that overlaps the hitbox is fatal.

use super::entity::{Entity, EntityKind};
use super::player::Player;

/// How far the hitbox may sit below a platform top and still count as on top of it
pub const PLATFORM_TOLERANCE: f32 = 5.0;

/// Result of a collision pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionResult {
    Clear,
    /// The run ends; carries what was hit
    Fatal { kind: EntityKind, index: usize },
}

impl CollisionResult {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CollisionResult::Fatal { .. })
    }
}

/// Find the first fatal contact in entity order
pub fn resolve_collisions(player: &Player, entities: &[Entity]) -> CollisionResult {
    if player.is_invincible {
        return CollisionResult::Clear;
    }
    let hitbox = player.hitbox();

    for (index, entity) in entities.iter().enumerate() {
        if entity.kind == EntityKind::RainCloud {
            continue;
        }
        let platform = entity.kind.is_platform();
        if platform && hitbox.bottom() <= entity.pos.y + PLATFORM_TOLERANCE && player.velocity_y >= 0.0 {
            // About to land
            continue;
        }
        if !entity.hits(&hitbox) {
            continue;
        }
        if !platform || hitbox.bottom() > entity.pos.y + PLATFORM_TOLERANCE {
            return CollisionResult::Fatal { kind: entity.kind, index };
        }
    }
    CollisionResult::Clear
}
