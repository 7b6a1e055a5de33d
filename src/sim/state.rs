//! Run state
//!
//! `GameState` is the single owner of everything a run mutates. The factory
//! and entity updates only ever see borrowed slices of it.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::bonus::{
    ActiveBonus, BonusKind, BonusOption, FEWER_OBSTACLES_FACTOR, Letter, REWARD_MESSAGES, SPEED_DECREASE_FACTOR,
    draw_letter, draw_menu,
};
use super::entity::{Entity, EntityKind};
use super::environment::Environment;
use super::pause::{ChoiceArea, PauseEffect, PauseState, Transition, layout_choices};
use super::player::Player;
use crate::error::Error;
use crate::settings::Settings;
use crate::theme::{THEMES, Theme};
use crate::tuning::Tuning;

/// Complete run state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub settings: Settings,
    /// Gameplay RNG (spawns, letters, bonus menus)
    pub rng: Pcg32,

    // === Progression ===
    /// Never floored internally
    pub score: f32,
    pub frame: u64,
    /// Current scroll speed (after any bonus)
    pub speed: f32,
    /// Speed baseline without bonus effects
    pub base_speed: f32,
    /// Ticks between spawn attempts (after any bonus)
    pub spawn_rate: f32,
    /// Spawn-rate baseline without bonus effects
    pub base_spawn_rate: f32,
    /// Ticks until the next spawn attempt
    pub spawn_timer: f32,
    pub difficulty: u32,
    pub last_difficulty_score: f32,
    pub theme_index: usize,
    pub theme: Theme,
    pub last_theme_score: f32,
    /// Trailing edge of the most recent ground-anchored spawn (scrolls with the world)
    pub last_ground_end_x: f32,

    // === World ===
    pub player: Player,
    /// Insertion order is update order
    pub entities: Vec<Entity>,
    pub environment: Environment,
    /// Background grid scroll
    pub grid_offset: f32,
    /// Background wave phase
    pub wave_offset: f32,

    // === Letter pause & bonus ===
    pub pause: PauseState,
    pub letter: Option<Letter>,
    pub bonus_options: Vec<BonusOption>,
    /// Populated only while choices are on screen
    pub choice_areas: Vec<ChoiceArea>,
    pub last_letter_score: f32,
    pub active_bonus: Option<ActiveBonus>,

    // === Reward messages ===
    pub message: Option<&'static str>,
    pub message_timer: u32,
    pub last_message_score: f32,

    pub is_game_over: bool,
    /// Set when a run was ended by a runtime fault
    pub diagnostic: Option<String>,
}

impl GameState {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),

            score: 0.0,
            frame: 0,
            speed: tuning.initial_speed,
            base_speed: tuning.initial_speed,
            spawn_rate: tuning.initial_spawn_rate,
            base_spawn_rate: tuning.initial_spawn_rate,
            spawn_timer: tuning.initial_spawn_rate,
            difficulty: 0,
            last_difficulty_score: 0.0,
            theme_index: 0,
            theme: THEMES[0],
            last_theme_score: 0.0,
            last_ground_end_x: f32::NEG_INFINITY,

            player: Player::new(),
            entities: Vec::new(),
            environment: Environment::new(seed),
            grid_offset: 0.0,
            wave_offset: 0.0,

            pause: PauseState::None,
            letter: None,
            bonus_options: Vec::new(),
            choice_areas: Vec::new(),
            last_letter_score: 0.0,
            active_bonus: None,

            message: None,
            message_timer: 0,
            last_message_score: 0.0,

            is_game_over: false,
            diagnostic: None,

            tuning,
            settings,
        }
    }

    /// Reset every run field, keeping tuning and settings
    pub fn reset(&mut self, seed: u64) {
        let tuning = std::mem::take(&mut self.tuning);
        let settings = std::mem::take(&mut self.settings);
        *self = Self::new(seed, tuning, settings);
    }

    pub fn is_running(&self) -> bool {
        !self.is_game_over && !self.pause.is_paused()
    }

    pub fn bonus_kind(&self) -> Option<BonusKind> {
        self.active_bonus.map(|b| b.kind())
    }

    /// Re-derive the theme from the index, resetting an out-of-range index
    pub fn apply_theme(&mut self) {
        if self.theme_index >= THEMES.len() {
            log::warn!("Theme index {} out of range, resetting", self.theme_index);
            self.theme_index = 0;
        }
        self.theme = THEMES[self.theme_index];
    }

    // --- Bonuses ---

    /// Apply a bonus, reverting whichever one was active first
    pub fn apply_bonus(&mut self, option: BonusOption) {
        self.remove_bonus();
        log::info!("Applying bonus: {}", option.name);

        match option.kind {
            BonusKind::SpeedDecrease => {
                self.base_speed = self.speed;
                self.speed *= SPEED_DECREASE_FACTOR;
            }
            BonusKind::TinyPlayer => self.player.set_tiny(true),
            BonusKind::FewerObstacles => {
                self.base_spawn_rate = self.spawn_rate;
                self.spawn_rate *= FEWER_OBSTACLES_FACTOR;
                self.spawn_timer = self.spawn_timer.max(self.spawn_rate * 0.5);
            }
            BonusKind::Invincibility => self.player.set_invincible(true),
            BonusKind::ExtraJump => {
                let jumps = self.player.base_max_jumps() + 1;
                self.player.set_max_jumps(jumps);
            }
        }
        self.active_bonus = Some(ActiveBonus::new(option));
    }

    /// Revert the active bonus; no-op when none is active
    pub fn remove_bonus(&mut self) {
        let Some(active) = self.active_bonus.take() else {
            return;
        };
        log::info!("Removing bonus: {}", active.option.name);

        match active.kind() {
            BonusKind::SpeedDecrease => {
                self.base_speed = self.base_speed.min(self.tuning.max_speed);
                self.speed = self.base_speed;
            }
            BonusKind::TinyPlayer => self.player.set_tiny(false),
            BonusKind::FewerObstacles => {
                self.base_spawn_rate = self.base_spawn_rate.max(self.tuning.min_spawn_rate);
                self.spawn_rate = self.base_spawn_rate;
            }
            BonusKind::Invincibility => self.player.set_invincible(false),
            BonusKind::ExtraJump => self.player.reset_max_jumps(),
        }
    }

    /// Count down the active bonus by one tick, reverting it at zero
    pub fn tick_bonus(&mut self) {
        let Some(active) = self.active_bonus.as_mut() else {
            return;
        };
        active.remaining = active.remaining.saturating_sub(1);
        if active.remaining == 0 {
            self.remove_bonus();
        }
    }

    // --- Letter pause ---

    /// Freeze play and draw a letter plus a bonus menu
    pub fn enter_letter_pause(&mut self) -> Option<Transition> {
        let transition = super::pause::enter_letter(self.pause)?;
        self.letter = Some(draw_letter(&mut self.rng));
        self.bonus_options = draw_menu(&mut self.rng);
        self.choice_areas.clear();
        self.pause = transition.next;
        log::info!("Paused for a letter at score {}", self.score.floor());
        Some(transition)
    }

    /// Commit a pause transition's state side; timer effects are left to the caller
    pub fn apply_transition(&mut self, transition: &Transition) {
        self.pause = transition.next;
        if self.pause == PauseState::ShowingChoices {
            self.choice_areas = layout_choices(&self.bonus_options);
        }
        for effect in &transition.effects {
            match effect {
                PauseEffect::ApplyBonus(option) => {
                    self.apply_bonus(*option);
                    self.choice_areas.clear();
                }
                PauseEffect::Resume => self.resume_from_letter(),
                PauseEffect::StopTicking
                | PauseEffect::CancelCountdown
                | PauseEffect::StartCountdown
                | PauseEffect::ScheduleLetterAdvance => {}
            }
        }
    }

    pub fn resume_from_letter(&mut self) {
        self.pause = PauseState::None;
        self.letter = None;
        self.bonus_options.clear();
        self.choice_areas.clear();
        // Keeps the interval check from refiring immediately
        self.last_letter_score = self.score;
        log::info!("Resuming from letter pause");
    }

    // --- Run end ---

    pub fn game_over(&mut self, diagnostic: Option<String>) {
        if self.is_game_over {
            return;
        }
        self.is_game_over = true;
        self.remove_bonus();
        if let Some(message) = &diagnostic {
            log::error!("Run aborted: {}", message);
        }
        self.diagnostic = diagnostic;
        log::info!("Game Over! Final Score: {}", self.score.floor());
    }

    // --- Messages ---

    pub fn update_messages(&mut self) {
        if self.pause.is_paused() {
            self.message = None;
            return;
        }
        let interval = self.tuning.message_interval;
        let crossed = (self.score / interval).floor();
        if crossed > (self.last_message_score / interval).floor() {
            let index = crossed as usize - 1;
            if let Some(&message) = REWARD_MESSAGES.get(index) {
                self.message = Some(message);
                self.message_timer = self.tuning.message_duration;
                self.last_message_score = self.score;
            }
        }
        if self.message_timer > 0 {
            self.message_timer -= 1;
        } else {
            self.message = None;
        }
    }

    // --- Invariants ---

    pub fn laser_count(&self) -> usize {
        self.entities.iter().filter(|e| e.kind == EntityKind::LaserBeam).count()
    }

    /// Fails when the run can no longer be trusted
    pub fn check_invariants(&self) -> Result<(), Error> {
        let numbers = [
            ("score", self.score),
            ("speed", self.speed),
            ("spawn_rate", self.spawn_rate),
            ("spawn_timer", self.spawn_timer),
            ("player.y", self.player.pos.y),
            ("player.velocity_y", self.player.velocity_y),
        ];
        for (field, value) in numbers {
            if !value.is_finite() {
                return Err(Error::NonFinite { field });
            }
        }
        if let Some(entity) = self.entities.iter().find(|e| !e.pos.is_finite()) {
            log::debug!("Non-finite {:?} at {:?}", entity.kind, entity.pos);
            return Err(Error::NonFinite { field: "entity.pos" });
        }
        let lasers = self.laser_count();
        if lasers > 1 {
            return Err(Error::LaserOverlap { count: lasers });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bonus::BONUS_CATALOG;

    fn state() -> GameState {
        GameState::new(42, Tuning::default(), Settings::default())
    }

    fn option(kind: BonusKind) -> BonusOption {
        *BONUS_CATALOG.iter().find(|b| b.kind == kind).unwrap()
    }

    #[test]
    fn test_new_run_defaults() {
        let state = state();
        assert_eq!(state.score, 0.0);
        assert_eq!(state.difficulty, 0);
        assert_eq!(state.theme_index, 0);
        assert!(state.entities.is_empty());
        assert_eq!(state.pause, PauseState::None);
        assert_eq!(state.last_ground_end_x, f32::NEG_INFINITY);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_reset_matches_fresh_state() {
        let mut run = state();
        run.score = 1234.0;
        run.difficulty = 2;
        run.apply_bonus(option(BonusKind::TinyPlayer));
        run.entities.push(Entity::spike());
        run.reset(42);
        assert_eq!(run, state());
    }

    #[test]
    fn test_bonus_round_trip_restores_baseline() {
        for option in BONUS_CATALOG {
            let mut run = state();
            run.speed = 6.5;
            run.base_speed = 6.5;
            run.spawn_rate = 80.0;
            run.base_spawn_rate = 80.0;
            let before = (run.speed, run.spawn_rate, run.player.size, run.player.max_jumps);

            run.apply_bonus(option);
            run.remove_bonus();
            run.apply_bonus(option);
            run.remove_bonus();

            let after = (run.speed, run.spawn_rate, run.player.size, run.player.max_jumps);
            assert_eq!(before, after, "{}", option.kind.id());
            assert!(!run.player.is_invincible);
        }
    }

    #[test]
    fn test_remove_without_bonus_is_noop() {
        let mut run = state();
        let before = run.clone();
        run.remove_bonus();
        assert_eq!(run, before);
    }

    #[test]
    fn test_new_bonus_replaces_old() {
        let mut run = state();
        run.apply_bonus(option(BonusKind::Invincibility));
        assert!(run.player.is_invincible);
        run.apply_bonus(option(BonusKind::ExtraJump));
        assert!(!run.player.is_invincible);
        assert_eq!(run.player.max_jumps, run.player.base_max_jumps() + 1);
        assert_eq!(run.bonus_kind(), Some(BonusKind::ExtraJump));
    }

    #[test]
    fn test_fewer_obstacles_delays_spawn() {
        let mut run = state();
        run.spawn_timer = 3.0;
        run.apply_bonus(option(BonusKind::FewerObstacles));
        assert_eq!(run.spawn_rate, run.tuning.initial_spawn_rate * FEWER_OBSTACLES_FACTOR);
        assert_eq!(run.spawn_timer, run.spawn_rate * 0.5);
    }

    #[test]
    fn test_bonus_expires() {
        let mut run = state();
        let mut extra = option(BonusKind::ExtraJump);
        extra.duration = 2;
        run.apply_bonus(extra);
        run.tick_bonus();
        assert!(run.active_bonus.is_some());
        run.tick_bonus();
        assert!(run.active_bonus.is_none());
        assert_eq!(run.player.max_jumps, run.player.base_max_jumps());
    }

    #[test]
    fn test_theme_self_heals() {
        let mut run = state();
        run.theme_index = 17;
        run.apply_theme();
        assert_eq!(run.theme_index, 0);
        assert_eq!(run.theme, THEMES[0]);
    }

    #[test]
    fn test_letter_pause_draws_menu() {
        let mut run = state();
        let transition = run.enter_letter_pause().unwrap();
        assert_eq!(transition.next, PauseState::ShowingIcon);
        assert_eq!(run.pause, PauseState::ShowingIcon);
        assert!(run.letter.is_some());
        assert_eq!(run.bonus_options.len(), 3);
        assert!(run.choice_areas.is_empty());
        // Already paused
        assert!(run.enter_letter_pause().is_none());
    }

    #[test]
    fn test_resume_records_threshold() {
        let mut run = state();
        run.score = 2001.0;
        run.enter_letter_pause();
        run.resume_from_letter();
        assert_eq!(run.last_letter_score, 2001.0);
        assert!(run.letter.is_none());
        assert!(run.bonus_options.is_empty());
    }

    #[test]
    fn test_reward_message_cycle() {
        let mut run = state();
        run.score = 510.0;
        run.update_messages();
        assert_eq!(run.message, Some(REWARD_MESSAGES[0]));
        for _ in 0..run.tuning.message_duration {
            run.update_messages();
        }
        assert_eq!(run.message, None);
    }

    #[test]
    fn test_invariants_catch_faults() {
        let mut run = state();
        run.speed = f32::NAN;
        assert!(matches!(run.check_invariants(), Err(Error::NonFinite { field: "speed" })));

        let mut run = state();
        let mut rng = Pcg32::seed_from_u64(1);
        run.entities.push(Entity::laser_beam(&mut rng));
        run.entities.push(Entity::laser_beam(&mut rng));
        assert!(matches!(run.check_invariants(), Err(Error::LaserOverlap { count: 2 })));
    }

    #[test]
    fn test_game_over_reverts_bonus() {
        let mut run = state();
        run.apply_bonus(option(BonusKind::Invincibility));
        run.game_over(None);
        assert!(run.is_game_over);
        assert!(run.active_bonus.is_none());
        assert!(!run.player.is_invincible);
    }
}
