//! Obstacles, enemies and environmental hazards
//!
//! `EntityKind` is the load-bearing tag: spacing, collision and gap rules
//! all match on it. Per-variant animation state lives in `Behavior`.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::player::Player;
use super::util::{Rect, random_int};
use crate::consts::*;

/// Entity type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityKind {
    Spike,
    Block,
    Gear,
    Platform,
    TripleSpike,
    BlockStack,
    FloatingGear,
    MovingPlatform,
    SawBlade,
    Crusher,
    LaserBeam,
    Bat,
    Shooter,
    Cow,
    RainCloud,
    LavaPit,
}

impl EntityKind {
    pub const ALL: [EntityKind; 16] = [
        EntityKind::Spike,
        EntityKind::Block,
        EntityKind::Gear,
        EntityKind::Platform,
        EntityKind::TripleSpike,
        EntityKind::BlockStack,
        EntityKind::FloatingGear,
        EntityKind::MovingPlatform,
        EntityKind::SawBlade,
        EntityKind::Crusher,
        EntityKind::LaserBeam,
        EntityKind::Bat,
        EntityKind::Shooter,
        EntityKind::Cow,
        EntityKind::RainCloud,
        EntityKind::LavaPit,
    ];

    /// Placement is referenced to the ground line (drives gap tracking)
    pub fn is_ground_anchored(self) -> bool {
        matches!(
            self,
            EntityKind::Spike
                | EntityKind::Block
                | EntityKind::Gear
                | EntityKind::Shooter
                | EntityKind::Cow
                | EntityKind::LavaPit
                | EntityKind::TripleSpike
                | EntityKind::BlockStack
                | EntityKind::SawBlade
                | EntityKind::Crusher
        )
    }

    /// Can be stood on
    pub fn is_platform(self) -> bool {
        matches!(self, EntityKind::Platform | EntityKind::MovingPlatform)
    }
}

/// Laser beam cycle; only `Active` is hazardous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LaserState {
    Warning,
    Active,
    Off,
}

/// Crusher slam cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrusherPhase {
    Raised,
    Slamming,
    Down,
    Rising,
}

/// A shooter bullet (owned by its shooter)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projectile {
    pub rect: Rect,
    pub vel: Vec2,
}

/// Per-variant animation state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Behavior {
    Static,
    Spin { rotation: f32, rate: f32 },
    /// Vertical sine bob around `base_y` (floating gear, moving platform)
    Bob { base_y: f32, amplitude: f32, phase: f32 },
    Flap { base_y: f32, phase: f32 },
    Crusher { phase: CrusherPhase, raised_y: f32, timer: u32 },
    Laser { state: LaserState, timer: u32 },
    Shooter { cooldown: u32, mounted: bool, projectiles: Vec<Projectile> },
    Graze { head_phase: f32 },
}

/// What an entity may look at while updating
pub struct UpdateContext<'a> {
    pub speed: f32,
    pub frame: u64,
    pub player: &'a Player,
    pub difficulty: u32,
}

const CRUSHER_RAISE: f32 = 120.0;
const CRUSHER_TRIGGER_DISTANCE: f32 = 220.0;
const CRUSHER_SLAM_SPEED: f32 = 8.0;
const CRUSHER_RISE_SPEED: f32 = 2.0;
const CRUSHER_DOWN_FRAMES: u32 = 40;
const LASER_LENGTH: f32 = 160.0;
const BOB_RATE: f32 = 0.02;
const FLAP_RATE: f32 = 0.08;
const FLAP_AMPLITUDE: f32 = 15.0;
const SHOOTER_SEAT_TOLERANCE: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub to_be_removed: bool,
    pub behavior: Behavior,
}

impl Entity {
    fn at_right_edge(kind: EntityKind, y: f32, size: Vec2, behavior: Behavior) -> Self {
        Self {
            kind,
            pos: Vec2::new(GAME_WIDTH, y),
            size,
            to_be_removed: false,
            behavior,
        }
    }

    fn on_ground(kind: EntityKind, size: Vec2, behavior: Behavior) -> Self {
        Self::at_right_edge(kind, GROUND_Y - size.y, size, behavior)
    }

    pub fn spike() -> Self {
        Self::on_ground(EntityKind::Spike, Vec2::new(SPIKE_BASE_WIDTH, SPIKE_HEIGHT), Behavior::Static)
    }

    pub fn triple_spike() -> Self {
        Self::on_ground(
            EntityKind::TripleSpike,
            Vec2::new(SPIKE_BASE_WIDTH * 3.0, SPIKE_HEIGHT),
            Behavior::Static,
        )
    }

    pub fn block<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let side = random_int(rng, BLOCK_SIZE_MIN, BLOCK_SIZE_MAX) as f32;
        Self::on_ground(EntityKind::Block, Vec2::splat(side), Behavior::Static)
    }

    pub fn block_stack<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let levels = random_int(rng, 2, 3) as f32;
        Self::on_ground(
            EntityKind::BlockStack,
            Vec2::new(BLOCK_STACK_UNIT, BLOCK_STACK_UNIT * levels),
            Behavior::Static,
        )
    }

    /// Gear sits on the ground or hovers a little above it
    pub fn gear<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let size = Vec2::splat(GEAR_RADIUS * 2.0);
        let lift = if rng.random_bool(0.5) { 0.0 } else { random_int(rng, 10, 40) as f32 };
        Self::at_right_edge(
            EntityKind::Gear,
            GROUND_Y - size.y - lift,
            size,
            Behavior::Spin { rotation: 0.0, rate: GEAR_ROTATION_SPEED },
        )
    }

    pub fn floating_gear<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let size = Vec2::splat(GEAR_RADIUS * 2.0);
        let base_y = GROUND_Y - size.y - random_int(rng, 50, 90) as f32;
        Self::at_right_edge(
            EntityKind::FloatingGear,
            base_y,
            size,
            Behavior::Bob { base_y, amplitude: 20.0, phase: 0.0 },
        )
    }

    /// Half-buried spinning blade; only the exposed half is solid
    pub fn saw_blade() -> Self {
        Self::on_ground(
            EntityKind::SawBlade,
            Vec2::new(SAW_BLADE_RADIUS * 2.0, SAW_BLADE_RADIUS),
            Behavior::Spin { rotation: 0.0, rate: GEAR_ROTATION_SPEED * 2.0 },
        )
    }

    pub fn platform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let width = random_int(rng, PLATFORM_MIN_WIDTH, PLATFORM_MAX_WIDTH) as f32;
        let offset = random_int(rng, PLATFORM_MIN_Y_OFFSET, PLATFORM_MAX_Y_OFFSET) as f32;
        Self::at_right_edge(
            EntityKind::Platform,
            GROUND_Y - offset - PLATFORM_HEIGHT,
            Vec2::new(width, PLATFORM_HEIGHT),
            Behavior::Static,
        )
    }

    pub fn moving_platform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let width = random_int(rng, PLATFORM_MIN_WIDTH, PLATFORM_MAX_WIDTH) as f32;
        let offset = random_int(rng, PLATFORM_MIN_Y_OFFSET + 20, PLATFORM_MAX_Y_OFFSET + 20) as f32;
        let base_y = GROUND_Y - offset - PLATFORM_HEIGHT;
        Self::at_right_edge(
            EntityKind::MovingPlatform,
            base_y,
            Vec2::new(width, PLATFORM_HEIGHT),
            Behavior::Bob { base_y, amplitude: MOVING_PLATFORM_AMPLITUDE, phase: 0.0 },
        )
    }

    pub fn crusher() -> Self {
        let raised_y = GROUND_Y - CRUSHER_HEIGHT - CRUSHER_RAISE;
        Self::at_right_edge(
            EntityKind::Crusher,
            raised_y,
            Vec2::new(CRUSHER_WIDTH, CRUSHER_HEIGHT),
            Behavior::Crusher { phase: CrusherPhase::Raised, raised_y, timer: 0 },
        )
    }

    /// Horizontal beam at jump height; starts in its warning phase
    pub fn laser_beam<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let y = GROUND_Y - random_int(rng, 60, 120) as f32;
        Self::at_right_edge(
            EntityKind::LaserBeam,
            y,
            Vec2::new(LASER_LENGTH, LASER_WIDTH),
            Behavior::Laser { state: LaserState::Warning, timer: LASER_WARNING_FRAMES },
        )
    }

    pub fn bat<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let base_y = GROUND_Y - BAT_SIZE - random_int(rng, 60, 140) as f32;
        Self::at_right_edge(
            EntityKind::Bat,
            base_y,
            Vec2::splat(BAT_SIZE),
            Behavior::Flap { base_y, phase: 0.0 },
        )
    }

    /// Shooter standing on `surface_y` (ground line or a platform top)
    pub fn shooter(surface_y: f32) -> Self {
        let size = Vec2::splat(SHOOTER_SIZE);
        Self::at_right_edge(
            EntityKind::Shooter,
            surface_y - size.y,
            size,
            Behavior::Shooter {
                cooldown: SHOOTER_BASE_COOLDOWN / 2,
                mounted: surface_y < GROUND_Y,
                projectiles: Vec::new(),
            },
        )
    }

    pub fn cow() -> Self {
        Self::on_ground(
            EntityKind::Cow,
            Vec2::new(COW_WIDTH, COW_HEIGHT),
            Behavior::Graze { head_phase: 0.0 },
        )
    }

    pub fn rain_cloud<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let y = random_int(rng, 30, 80) as f32;
        Self::at_right_edge(
            EntityKind::RainCloud,
            y,
            Vec2::new(RAIN_CLOUD_WIDTH, RAIN_CLOUD_HEIGHT),
            Behavior::Static,
        )
    }

    /// Lava surface sits just above the ground line and fills the ground band
    pub fn lava_pit(width: f32) -> Self {
        Self::at_right_edge(
            EntityKind::LavaPit,
            GROUND_Y - LAVA_SURFACE_INSET,
            Vec2::new(width, GROUND_HEIGHT + LAVA_SURFACE_INSET),
            Behavior::Static,
        )
    }

    pub fn rect(&self) -> Rect {
        Rect { pos: self.pos, size: self.size }
    }

    /// Trailing (right) edge
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn is_off_screen(&self) -> bool {
        self.right() < 0.0
    }

    pub fn laser_state(&self) -> Option<LaserState> {
        match self.behavior {
            Behavior::Laser { state, .. } => Some(state),
            _ => None,
        }
    }

    /// Advance one tick: scroll left by `speed`, then animate
    pub fn update(&mut self, ctx: &UpdateContext) {
        self.pos.x -= ctx.speed;

        match &mut self.behavior {
            Behavior::Static => {}
            Behavior::Spin { rotation, rate } => {
                *rotation = (*rotation + *rate) % std::f32::consts::TAU;
            }
            Behavior::Bob { base_y, amplitude, phase } => {
                *phase += BOB_RATE;
                self.pos.y = *base_y - phase.sin() * *amplitude;
            }
            Behavior::Flap { base_y, phase } => {
                *phase += FLAP_RATE;
                self.pos.y = *base_y + phase.sin() * FLAP_AMPLITUDE;
            }
            Behavior::Crusher { phase, raised_y, timer } => {
                let floor_y = GROUND_Y - self.size.y;
                match *phase {
                    CrusherPhase::Raised => {
                        let gap = self.pos.x - (ctx.player.pos.x + ctx.player.size.x);
                        if gap < CRUSHER_TRIGGER_DISTANCE {
                            *phase = CrusherPhase::Slamming;
                        }
                    }
                    CrusherPhase::Slamming => {
                        self.pos.y = (self.pos.y + CRUSHER_SLAM_SPEED).min(floor_y);
                        if self.pos.y >= floor_y {
                            *phase = CrusherPhase::Down;
                            *timer = CRUSHER_DOWN_FRAMES;
                        }
                    }
                    CrusherPhase::Down => {
                        *timer = timer.saturating_sub(1);
                        if *timer == 0 {
                            *phase = CrusherPhase::Rising;
                        }
                    }
                    CrusherPhase::Rising => {
                        self.pos.y = (self.pos.y - CRUSHER_RISE_SPEED).max(*raised_y);
                        if self.pos.y <= *raised_y {
                            *phase = CrusherPhase::Raised;
                        }
                    }
                }
            }
            Behavior::Laser { state, timer } => {
                *timer = timer.saturating_sub(1);
                if *timer == 0 {
                    let (next, frames) = match *state {
                        LaserState::Warning => (LaserState::Active, LASER_ACTIVE_FRAMES),
                        LaserState::Active => (LaserState::Off, LASER_OFF_FRAMES),
                        LaserState::Off => (LaserState::Warning, LASER_WARNING_FRAMES),
                    };
                    *state = next;
                    *timer = frames;
                }
            }
            Behavior::Shooter { cooldown, projectiles, .. } => {
                for projectile in projectiles.iter_mut() {
                    projectile.rect.pos += projectile.vel;
                    projectile.rect.pos.x -= ctx.speed;
                }
                projectiles.retain(|p| p.rect.right() >= 0.0 && p.rect.pos.y <= GROUND_Y && p.rect.bottom() >= 0.0);

                *cooldown = cooldown.saturating_sub(1);
                let player_center = ctx.player.pos + ctx.player.size / 2.0;
                let muzzle = Vec2::new(self.pos.x, self.pos.y + self.size.y * 0.4);
                if *cooldown == 0 && muzzle.x > player_center.x && self.pos.x < GAME_WIDTH {
                    let half = Vec2::splat(PROJECTILE_SIZE / 2.0);
                    projectiles.push(Projectile {
                        rect: Rect { pos: muzzle - half, size: half * 2.0 },
                        vel: (player_center - muzzle).normalize_or_zero() * PROJECTILE_SPEED,
                    });
                    let faster = ctx.difficulty.saturating_mul(15);
                    *cooldown = SHOOTER_BASE_COOLDOWN.saturating_sub(faster).max(SHOOTER_MIN_COOLDOWN);
                }
            }
            Behavior::Graze { head_phase } => {
                *head_phase += 0.05 + (ctx.frame % 7) as f32 * 0.001;
            }
        }

        if self.is_off_screen() {
            self.to_be_removed = true;
        }
    }

    /// Keep a mounted shooter standing on the platform under it
    ///
    /// `platforms` must already hold this tick's positions.
    pub fn ride(&mut self, platforms: &[Rect]) {
        let Behavior::Shooter { mounted: true, .. } = self.behavior else {
            return;
        };
        let feet = self.pos.y + self.size.y;
        let center_x = self.pos.x + self.size.x / 2.0;
        let surface = platforms.iter().find(|rect| {
            center_x >= rect.pos.x && center_x <= rect.right() && (rect.pos.y - feet).abs() <= SHOOTER_SEAT_TOLERANCE
        });
        if let Some(rect) = surface {
            self.pos.y = rect.pos.y - self.size.y;
        }
    }

    /// Raw hazard test against a hitbox (platform landing rules live in the tick)
    pub fn hits(&self, hitbox: &Rect) -> bool {
        match &self.behavior {
            _ if self.kind == EntityKind::RainCloud => false,
            Behavior::Laser { state, .. } => *state == LaserState::Active && self.rect().overlaps(hitbox),
            Behavior::Shooter { projectiles, .. } => {
                self.rect().overlaps(hitbox) || projectiles.iter().any(|p| p.rect.overlaps(hitbox))
            }
            _ => self.rect().overlaps(hitbox),
        }
    }
}
