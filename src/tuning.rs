//! Data-driven game balance
//!
//! Every progression knob lives here so a run can be re-balanced from JSON
//! without touching the simulation. Missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speed ===
    /// Scroll speed at difficulty 0 (pixels per tick)
    pub initial_speed: f32,
    /// Hard cap on scroll speed
    pub max_speed: f32,
    /// Passive per-tick creep of the natural speed baseline
    pub speed_increase: f32,
    /// Base speed multiplier applied per difficulty level
    pub milestone_speed_multiplier: f32,

    // === Spawning ===
    /// Ticks between spawn attempts at difficulty 0
    pub initial_spawn_rate: f32,
    /// Floor on ticks between spawn attempts
    pub min_spawn_rate: f32,
    /// Passive erosion of the spawn-rate baseline, in ticks per second
    pub spawn_rate_decrease: f32,
    /// Base spawn-rate multiplier applied per difficulty level
    pub milestone_spawn_rate_multiplier: f32,
    /// Retry timer shrink factor after a spawn attempt yields nothing
    pub spawn_retry_factor: f32,
    /// Minimum retry timer in ticks
    pub spawn_retry_floor: f32,

    // === Scoring & milestones ===
    pub score_multiplier: f32,
    pub difficulty_milestone: f32,
    pub theme_switch_interval: f32,
    pub letter_pause_interval: f32,
    pub message_interval: f32,
    /// Reward message lifetime in ticks
    pub message_duration: u32,

    // === Letter pause ===
    pub countdown_seconds: u32,
    /// Delay after picking a bonus before the countdown starts on its own
    pub letter_advance_delay_ms: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_speed: 5.0,
            max_speed: 12.0,
            speed_increase: 0.001,
            milestone_speed_multiplier: 1.1,

            initial_spawn_rate: 100.0,
            min_spawn_rate: 40.0,
            spawn_rate_decrease: 0.5,
            milestone_spawn_rate_multiplier: 0.9,
            spawn_retry_factor: 0.7,
            spawn_retry_floor: 5.0,

            score_multiplier: 0.1,
            difficulty_milestone: 1000.0,
            theme_switch_interval: 1500.0,
            letter_pause_interval: 2000.0,
            message_interval: 500.0,
            message_duration: 180,

            countdown_seconds: 3,
            letter_advance_delay_ms: 1500,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall or invert progression
    pub fn validate(&self) -> Result<(), Error> {
        let positive = [
            ("initial_speed", self.initial_speed),
            ("max_speed", self.max_speed),
            ("milestone_speed_multiplier", self.milestone_speed_multiplier),
            ("initial_spawn_rate", self.initial_spawn_rate),
            ("min_spawn_rate", self.min_spawn_rate),
            ("milestone_spawn_rate_multiplier", self.milestone_spawn_rate_multiplier),
            ("spawn_retry_factor", self.spawn_retry_factor),
            ("spawn_retry_floor", self.spawn_retry_floor),
            ("score_multiplier", self.score_multiplier),
            ("difficulty_milestone", self.difficulty_milestone),
            ("theme_switch_interval", self.theme_switch_interval),
            ("letter_pause_interval", self.letter_pause_interval),
            ("message_interval", self.message_interval),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidTuning {
                    field,
                    reason: "must be a positive finite number",
                });
            }
        }
        if self.speed_increase < 0.0 || self.spawn_rate_decrease < 0.0 {
            return Err(Error::InvalidTuning {
                field: "speed_increase/spawn_rate_decrease",
                reason: "must not be negative",
            });
        }
        if self.initial_speed > self.max_speed {
            return Err(Error::InvalidTuning {
                field: "initial_speed",
                reason: "exceeds max_speed",
            });
        }
        if self.initial_spawn_rate < self.min_spawn_rate {
            return Err(Error::InvalidTuning {
                field: "initial_spawn_rate",
                reason: "below min_spawn_rate",
            });
        }
        if self.spawn_retry_factor >= 1.0 {
            return Err(Error::InvalidTuning {
                field: "spawn_retry_factor",
                reason: "must shrink the timer (< 1.0)",
            });
        }
        if self.countdown_seconds == 0 {
            return Err(Error::InvalidTuning {
                field: "countdown_seconds",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Base speed for a difficulty level, capped at `max_speed`
    pub fn milestone_speed(&self, level: u32) -> f32 {
        (self.initial_speed * self.milestone_speed_multiplier.powi(level as i32)).min(self.max_speed)
    }

    /// Base spawn rate for a difficulty level, floored at `min_spawn_rate`
    pub fn milestone_spawn_rate(&self, level: u32) -> f32 {
        (self.initial_spawn_rate * self.milestone_spawn_rate_multiplier.powi(level as i32))
            .max(self.min_spawn_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_speed": 15.0 }"#).unwrap();
        assert_eq!(tuning.max_speed, 15.0);
        assert_eq!(tuning.initial_speed, Tuning::default().initial_speed);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "min_spawn_rate": 0.0 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidTuning { field: "min_spawn_rate", .. }));

        let err = Tuning::from_json(r#"{ "spawn_retry_factor": 1.5 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidTuning { field: "spawn_retry_factor", .. }));

        assert!(matches!(Tuning::from_json("{ nope"), Err(Error::Json(_))));
    }

    #[test]
    fn test_milestone_curves_are_clamped() {
        let tuning = Tuning::default();
        assert_eq!(tuning.milestone_speed(0), tuning.initial_speed);
        assert!((tuning.milestone_speed(2) - 5.0 * 1.1 * 1.1).abs() < 1e-5);
        assert_eq!(tuning.milestone_speed(50), tuning.max_speed);

        assert_eq!(tuning.milestone_spawn_rate(0), tuning.initial_spawn_rate);
        assert_eq!(tuning.milestone_spawn_rate(50), tuning.min_spawn_rate);
    }
}
