//! Procedural entity spawning
//!
//! Decides what (if anything) enters at the right edge this tick. Never
//! mutates existing entities; every abort path returns `None`, which the tick
//! treats as a throttle signal rather than an error.

use rand::Rng;

use super::entity::{Entity, EntityKind};
use super::util::random_int;
use crate::consts::*;
use crate::theme::{Theme, ThemeKind};

/// Chance a ground break becomes a plain gap
pub const GAP_PROBABILITY: f64 = 0.20;
/// Chance a ground break becomes lava (lava-capable theme only)
pub const LAVA_PIT_PROBABILITY: f64 = 0.15;
/// Ground must run at least this far before a break is considered
pub const MIN_GROUND_SEQUENCE_LENGTH: f32 = 120.0;
pub const MAX_GAP_WIDTH: f32 = PLAYER_SIZE * 4.0;
/// Default clearance for kinds without an override
pub const DEFAULT_CLEARANCE: f32 = 80.0;

const BASE_GROUND: [EntityKind; 3] = [EntityKind::Spike, EntityKind::Block, EntityKind::Gear];
const BASE_AIR: [EntityKind; 2] = [EntityKind::Bat, EntityKind::Platform];
const MEDIUM_GROUND: [EntityKind; 3] = [EntityKind::TripleSpike, EntityKind::BlockStack, EntityKind::SawBlade];
const MEDIUM_AIR: [EntityKind; 2] = [EntityKind::FloatingGear, EntityKind::MovingPlatform];
const HARD_GROUND: [EntityKind; 1] = [EntityKind::Crusher];
const HARD_AIR: [EntityKind; 1] = [EntityKind::LaserBeam];

/// Weighted candidate pool; selection is uniform over total weight
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnTable {
    entries: Vec<(EntityKind, u32)>,
}

impl SpawnTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add weight to a kind (entries keep first-insertion order)
    pub fn add(&mut self, kind: EntityKind, weight: u32) {
        if weight == 0 {
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, w)) => *w += weight,
            None => self.entries.push((kind, weight)),
        }
    }

    fn add_all(&mut self, kinds: &[EntityKind], weight: u32) {
        for &kind in kinds {
            self.add(kind, weight);
        }
    }

    pub fn weight(&self, kind: EntityKind) -> u32 {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, w)| *w)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Probability of drawing `kind`
    pub fn probability(&self, kind: EntityKind) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.weight(kind) as f64 / total as f64
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<EntityKind> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let mut roll = rng.random_range(0..total);
        for &(kind, weight) in &self.entries {
            if roll < weight {
                return Some(kind);
            }
            roll -= weight;
        }
        None
    }
}

/// Difficulty tiers plus theme extras (everything except the shooter entry)
pub fn spawn_table(theme: &Theme, difficulty: u32) -> SpawnTable {
    let mut table = SpawnTable::new();
    table.add_all(&BASE_GROUND, 1);
    table.add_all(&BASE_AIR, 1);

    if difficulty >= 1 {
        table.add_all(&MEDIUM_GROUND, 2);
        table.add_all(&MEDIUM_AIR, 1);
    }
    if difficulty >= 2 {
        table.add_all(&HARD_GROUND, 2);
        table.add_all(&HARD_AIR, 1);
        table.add_all(&MEDIUM_GROUND, 1);
    }
    if difficulty >= 3 {
        table.add_all(&HARD_GROUND, 1);
        table.add_all(&MEDIUM_AIR, 1);
    }

    match theme.kind {
        ThemeKind::LushGreen => {
            table.add(EntityKind::Cow, 2);
            table.add(EntityKind::BlockStack, 1);
            table.add(EntityKind::MovingPlatform, 1);
        }
        ThemeKind::BlueOrange => {
            table.add_all(
                &[EntityKind::TripleSpike, EntityKind::SawBlade, EntityKind::RainCloud, EntityKind::FloatingGear],
                1,
            );
            if difficulty >= 1 {
                table.add(EntityKind::LaserBeam, 1);
            }
        }
        ThemeKind::FieryRed => {
            table.add_all(
                &[EntityKind::Gear, EntityKind::BlockStack, EntityKind::Crusher, EntityKind::SawBlade, EntityKind::Bat],
                1,
            );
            if difficulty >= 2 {
                table.add(EntityKind::LaserBeam, 1);
            }
        }
        ThemeKind::NeonPurple | ThemeKind::RedCyan => {}
    }

    table
}

/// Minimum free run between the last entity's trailing edge and the right edge
pub fn spawn_clearance(kind: EntityKind) -> f32 {
    match kind {
        EntityKind::Gear | EntityKind::Block | EntityKind::Cow | EntityKind::BlockStack | EntityKind::SawBlade => 50.0,
        EntityKind::Platform | EntityKind::MovingPlatform => 120.0,
        EntityKind::Bat | EntityKind::RainCloud | EntityKind::FloatingGear => 150.0,
        EntityKind::TripleSpike => 60.0,
        EntityKind::Crusher => CRUSHER_WIDTH + 60.0,
        EntityKind::LaserBeam => 0.0,
        EntityKind::Spike | EntityKind::Shooter | EntityKind::LavaPit => DEFAULT_CLEARANCE,
    }
}

/// Outcome of the ground-break roll
#[derive(Debug, Clone, PartialEq)]
pub enum GroundBreak {
    /// Keep building ground
    Continue,
    /// Leave a void this tick
    Gap,
    Lava(Entity),
}

/// Roll for a gap or lava pit once the current ground run is long enough
pub fn roll_ground_break<R: Rng + ?Sized>(last_ground_end_x: f32, theme: &Theme, rng: &mut R) -> GroundBreak {
    let since_ground = GAME_WIDTH - last_ground_end_x;
    if since_ground <= MIN_GROUND_SEQUENCE_LENGTH || since_ground >= MAX_GAP_WIDTH * 1.5 {
        return GroundBreak::Continue;
    }
    if theme.lava_capable() && rng.random_bool(LAVA_PIT_PROBABILITY) {
        let width = random_int(rng, LAVA_PIT_MIN_WIDTH, LAVA_PIT_MAX_WIDTH) as f32;
        return GroundBreak::Lava(Entity::lava_pit(width));
    }
    if rng.random_bool(GAP_PROBABILITY) {
        return GroundBreak::Gap;
    }
    GroundBreak::Continue
}

/// Most recent platform that still leaves room for a shooter
fn shooter_perch(entities: &[Entity]) -> Option<&Entity> {
    entities
        .iter()
        .rev()
        .find(|e| e.kind.is_platform())
        .filter(|p| p.right() > SHOOTER_SIZE + 20.0)
}

/// Decide what to spawn this tick, or `None` for no spawn
pub fn create_entity<R: Rng + ?Sized>(
    entities: &[Entity],
    last_ground_end_x: f32,
    theme: &Theme,
    difficulty: u32,
    rng: &mut R,
) -> Option<Entity> {
    match roll_ground_break(last_ground_end_x, theme, rng) {
        GroundBreak::Lava(pit) => return Some(pit),
        GroundBreak::Gap => return None,
        GroundBreak::Continue => {}
    }

    let mut table = spawn_table(theme, difficulty);

    // Shooters get likelier with difficulty
    if shooter_perch(entities).is_some()
        && difficulty >= 1
        && rng.random::<f32>() < 0.3 + difficulty as f32 * 0.1
    {
        table.add(EntityKind::Shooter, 1);
    }

    let Some(kind) = table.pick(rng) else {
        log::warn!("Spawn table empty at difficulty {} in {}", difficulty, theme.name);
        return None;
    };

    place(kind, entities, rng)
}

/// Apply exclusivity and spacing for an already-selected kind, then build it
pub fn place<R: Rng + ?Sized>(kind: EntityKind, entities: &[Entity], rng: &mut R) -> Option<Entity> {
    if kind == EntityKind::LaserBeam {
        // One beam at a time; beams ignore spacing
        if entities.iter().any(|e| e.kind == EntityKind::LaserBeam) {
            return None;
        }
    } else if let Some(last) = entities.last() {
        if GAME_WIDTH - last.right() < spawn_clearance(kind) {
            return None;
        }
    }

    Some(instantiate(kind, entities, rng))
}

fn instantiate<R: Rng + ?Sized>(kind: EntityKind, entities: &[Entity], rng: &mut R) -> Entity {
    match kind {
        EntityKind::Spike => Entity::spike(),
        EntityKind::Block => Entity::block(rng),
        EntityKind::Gear => Entity::gear(rng),
        EntityKind::Platform => Entity::platform(rng),
        EntityKind::TripleSpike => Entity::triple_spike(),
        EntityKind::BlockStack => Entity::block_stack(rng),
        EntityKind::FloatingGear => Entity::floating_gear(rng),
        EntityKind::MovingPlatform => Entity::moving_platform(rng),
        EntityKind::SawBlade => Entity::saw_blade(),
        EntityKind::Crusher => Entity::crusher(),
        EntityKind::LaserBeam => Entity::laser_beam(rng),
        EntityKind::Bat => Entity::bat(rng),
        EntityKind::Cow => Entity::cow(),
        EntityKind::RainCloud => Entity::rain_cloud(rng),
        EntityKind::LavaPit => {
            let width = random_int(rng, LAVA_PIT_MIN_WIDTH, LAVA_PIT_MAX_WIDTH) as f32;
            Entity::lava_pit(width)
        }
        EntityKind::Shooter => {
            let perch = shooter_perch(entities);
            let surface_y = match perch {
                Some(p) if rng.random::<f32>() > 0.3 => p.pos.y,
                _ => GROUND_Y,
            };
            let mut shooter = Entity::shooter(surface_y);
            if let Some(p) = perch.filter(|_| surface_y != GROUND_Y) {
                // Keep the shooter over the platform, not hanging off either end
                shooter.pos.x = (p.right() - shooter.size.x - 10.0).min(GAME_WIDTH);
                shooter.pos.x = shooter.pos.x.max(p.pos.x + 10.0);
            }
            shooter
        }
    }
}
