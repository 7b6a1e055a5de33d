//! Neon Runner - A side-scrolling endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, player, collisions, pause protocol)
//! - `game`: Lifecycle orchestration on top of a `Scheduler`
//! - `scheduler`: Tick/countdown timer capability (browser or simulated clock)
//! - `tuning`: Data-driven game balance
//! - `settings`: Presentation preferences
//! - `theme`: Theme palette cycle
//! - `hud`: Text the render target displays

pub mod error;
pub mod game;
pub mod hud;
pub mod scheduler;
pub mod settings;
pub mod sim;
pub mod theme;
pub mod tuning;

pub use error::Error;
pub use game::Game;
pub use hud::HudView;
pub use scheduler::{ManualScheduler, Scheduler};
pub use settings::{QualityPreset, Settings};
pub use theme::{THEMES, Theme, ThemeKind};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Logical viewport (all simulation coordinates use these units)
    pub const GAME_WIDTH: f32 = 800.0;
    pub const GAME_HEIGHT: f32 = 400.0;
    pub const GROUND_HEIGHT: f32 = 50.0;
    /// Top of the scrolling ground line
    pub const GROUND_Y: f32 = GAME_HEIGHT - GROUND_HEIGHT;

    /// Nominal tick rate the balance numbers assume
    pub const FRAMES_PER_SECOND: f32 = 60.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 30.0;
    pub const PLAYER_INITIAL_X: f32 = 80.0;
    pub const GRAVITY: f32 = 0.6;
    pub const JUMP_VELOCITY: f32 = 11.0;
    pub const MAX_JUMPS: u32 = 2;
    pub const PLAYER_ROTATION_SPEED: f32 = 0.12;
    pub const PLAYER_TINY_SCALE: f32 = 0.6;
    /// Hitbox inset as a fraction of the current player width
    pub const HITBOX_PADDING_RATIO: f32 = 0.1;

    /// Ground obstacles
    pub const SPIKE_BASE_WIDTH: f32 = 24.0;
    pub const SPIKE_HEIGHT: f32 = 30.0;
    pub const BLOCK_SIZE_MIN: i32 = 25;
    pub const BLOCK_SIZE_MAX: i32 = 45;
    pub const BLOCK_STACK_UNIT: f32 = 25.0;
    pub const GEAR_RADIUS: f32 = 18.0;
    pub const GEAR_ROTATION_SPEED: f32 = 0.1;
    pub const SAW_BLADE_RADIUS: f32 = 22.0;
    pub const CRUSHER_WIDTH: f32 = 50.0;
    pub const CRUSHER_HEIGHT: f32 = 60.0;
    pub const COW_WIDTH: f32 = 50.0;
    pub const COW_HEIGHT: f32 = 32.0;
    pub const LAVA_PIT_MIN_WIDTH: i32 = 60;
    pub const LAVA_PIT_MAX_WIDTH: i32 = 100;
    /// Lava surface sits slightly above the ground line so a grounded player touches it
    pub const LAVA_SURFACE_INSET: f32 = 6.0;

    /// Platforms
    pub const PLATFORM_MIN_WIDTH: i32 = 80;
    pub const PLATFORM_MAX_WIDTH: i32 = 160;
    pub const PLATFORM_HEIGHT: f32 = 15.0;
    pub const PLATFORM_MIN_Y_OFFSET: i32 = 60;
    pub const PLATFORM_MAX_Y_OFFSET: i32 = 110;
    pub const MOVING_PLATFORM_AMPLITUDE: f32 = 30.0;

    /// Air hazards
    pub const BAT_SIZE: f32 = 28.0;
    pub const LASER_WIDTH: f32 = 8.0;
    pub const LASER_WARNING_FRAMES: u32 = 60;
    pub const LASER_ACTIVE_FRAMES: u32 = 45;
    pub const LASER_OFF_FRAMES: u32 = 60;
    pub const RAIN_CLOUD_WIDTH: f32 = 90.0;
    pub const RAIN_CLOUD_HEIGHT: f32 = 35.0;

    /// Shooter enemy
    pub const SHOOTER_SIZE: f32 = 30.0;
    pub const SHOOTER_BASE_COOLDOWN: u32 = 120;
    pub const SHOOTER_MIN_COOLDOWN: u32 = 45;
    pub const PROJECTILE_SIZE: f32 = 8.0;
    pub const PROJECTILE_SPEED: f32 = 4.0;

    /// Rain
    pub const RAIN_RATE: f32 = 0.3;
    pub const RAIN_SPEED: f32 = 7.0;

    /// Letter pause layout
    pub const BONUS_CHOICE_BOX_WIDTH: f32 = 180.0;
    pub const BONUS_CHOICE_BOX_HEIGHT: f32 = 120.0;
    pub const BONUS_CHOICE_PADDING: f32 = 20.0;
    pub const BONUS_CHOICE_COUNT: usize = 3;

    /// Background grid cell size
    pub const GRID_SIZE: f32 = 50.0;
}

/// Snap an angle to the nearest quarter turn
#[inline]
pub fn snap_quarter_turn(angle: f32) -> f32 {
    use std::f32::consts::FRAC_PI_2;
    (angle / FRAC_PI_2).round() * FRAC_PI_2
}
