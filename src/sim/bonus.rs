//! Timed bonuses offered during a letter pause
//!
//! A bonus is pure data here. `GameState::apply_bonus` and
//! `GameState::remove_bonus` own the effects since they touch speed, spawn
//! rate and the player together.

use rand::Rng;
use serde::Serialize;

use super::util::shuffle;
use crate::consts::BONUS_CHOICE_COUNT;

/// Speed multiplier while `SpeedDecrease` is active
pub const SPEED_DECREASE_FACTOR: f32 = 0.8;
/// Spawn interval multiplier while `FewerObstacles` is active
pub const FEWER_OBSTACLES_FACTOR: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BonusKind {
    SpeedDecrease,
    TinyPlayer,
    FewerObstacles,
    Invincibility,
    ExtraJump,
}

impl BonusKind {
    /// Stable identifier used in logs and JSON summaries
    pub fn id(self) -> &'static str {
        match self {
            BonusKind::SpeedDecrease => "speed_decrease",
            BonusKind::TinyPlayer => "tiny_player",
            BonusKind::FewerObstacles => "fewer_obstacles",
            BonusKind::Invincibility => "invincibility",
            BonusKind::ExtraJump => "extra_jump",
        }
    }
}

/// A catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BonusOption {
    pub kind: BonusKind,
    pub name: &'static str,
    pub description: &'static str,
    /// Duration in frames
    pub duration: u32,
}

pub const BONUS_CATALOG: [BonusOption; 5] = [
    BonusOption {
        kind: BonusKind::SpeedDecrease,
        name: "Slow Motion",
        description: "The world scrolls 20% slower.",
        duration: 600,
    },
    BonusOption {
        kind: BonusKind::TinyPlayer,
        name: "Tiny Runner",
        description: "Shrink down and slip past obstacles.",
        duration: 600,
    },
    BonusOption {
        kind: BonusKind::FewerObstacles,
        name: "Clear Road",
        description: "Obstacles show up less often.",
        duration: 720,
    },
    BonusOption {
        kind: BonusKind::Invincibility,
        name: "Invincible",
        description: "Nothing can hurt you for a while.",
        duration: 300,
    },
    BonusOption {
        kind: BonusKind::ExtraJump,
        name: "Triple Jump",
        description: "One more jump before landing.",
        duration: 900,
    },
];

/// The bonus currently in effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActiveBonus {
    pub option: BonusOption,
    /// Frames left before it wears off
    pub remaining: u32,
}

impl ActiveBonus {
    pub fn new(option: BonusOption) -> Self {
        Self { option, remaining: option.duration }
    }

    pub fn kind(&self) -> BonusKind {
        self.option.kind
    }

    /// Seconds left at 60 fps, for the HUD
    pub fn seconds_left(&self) -> f32 {
        self.remaining as f32 / crate::consts::FRAMES_PER_SECOND
    }
}

/// Draw a menu of distinct bonuses
pub fn draw_menu<R: Rng + ?Sized>(rng: &mut R) -> Vec<BonusOption> {
    let mut options = BONUS_CATALOG.to_vec();
    shuffle(rng, &mut options);
    options.truncate(BONUS_CHOICE_COUNT);
    options
}

/// A letter from a fan, shown after a bonus is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Letter {
    pub sender: &'static str,
    pub text: &'static str,
}

pub const LETTERS: [Letter; 5] = [
    Letter {
        sender: "Grandma",
        text: "I watched you jump over all those spikes. Remember to eat something between runs!",
    },
    Letter {
        sender: "The Cow",
        text: "Thanks for not running into me. The grass is greener where you have already been.",
    },
    Letter {
        sender: "Your Rival",
        text: "Lucky streak. Let's see how long it lasts once the lasers come out.",
    },
    Letter {
        sender: "Mission Control",
        text: "Telemetry looks good. Take this upgrade and keep moving.",
    },
    Letter {
        sender: "A Secret Admirer",
        text: "Every time you double jump my heart skips a beat. Don't stop now.",
    },
];

pub fn draw_letter<R: Rng + ?Sized>(rng: &mut R) -> Letter {
    LETTERS[rng.random_range(0..LETTERS.len())]
}

/// Shown in order, one per message interval crossed
pub const REWARD_MESSAGES: [&str; 8] = [
    "Nice start!",
    "Keep it up!",
    "You're on fire!",
    "Unstoppable!",
    "Legendary run!",
    "Are you even human?",
    "Neon master!",
    "Beyond the grid!",
];
