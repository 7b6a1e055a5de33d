//! Lifecycle orchestration
//!
//! `Game` wires the deterministic simulation to a `Scheduler`. It is the only
//! entry point input handlers and timer callbacks call into.

use glam::Vec2;

use crate::error::Error;
use crate::hud::HudView;
use crate::scheduler::Scheduler;
use crate::settings::Settings;
use crate::sim::pause::{self, PauseEffect, PauseState, Transition};
use crate::sim::{GameState, TickOutcome, tick};
use crate::tuning::Tuning;

/// Derive the seed for the run after `seed`
pub fn next_seed(seed: u64) -> u64 {
    // splitmix64 step
    let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

pub struct Game<S: Scheduler> {
    state: GameState,
    scheduler: S,
    /// A frame callback is armed
    ticking: bool,
}

impl<S: Scheduler> Game<S> {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings, scheduler: S) -> Result<Self, Error> {
        tuning.validate()?;
        Ok(Self {
            state: GameState::new(seed, tuning, settings),
            scheduler,
            ticking: false,
        })
    }

    /// Wrap an existing run state (its tuning is assumed valid)
    pub fn from_state(state: GameState, scheduler: S) -> Self {
        Self {
            state,
            scheduler,
            ticking: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn hud(&self) -> HudView {
        HudView::from_state(&self.state)
    }

    /// Arm the frame driver
    ///
    /// Does nothing while the driver is armed or a letter pause owns the
    /// timers; the pause protocol resumes ticking on its own.
    pub fn start(&mut self) {
        if self.ticking {
            log::warn!("Game loop already running.");
            return;
        }
        if self.state.pause.is_paused() {
            log::warn!("Game is paused ({}), not starting.", self.state.pause.name());
            return;
        }
        log::info!("Starting game loop (seed {})", self.state.seed);
        self.scheduler.cancel_countdown();
        self.ticking = true;
        self.scheduler.schedule_tick();
    }

    /// Cancel every timer, reset the run and start again
    pub fn restart(&mut self, seed: u64) {
        self.halt();
        self.state.reset(seed);
        log::info!("Restarting with seed {}", seed);
        self.start();
    }

    /// Tear down: no callbacks fire after this
    pub fn destroy(&mut self) {
        self.halt();
        log::info!("Game destroyed");
    }

    fn halt(&mut self) {
        self.scheduler.cancel_tick();
        self.scheduler.cancel_countdown();
        self.scheduler.cancel_letter_advance();
        self.ticking = false;
    }

    /// Frame callback
    pub fn on_frame(&mut self) {
        // The request that brought us here is spent
        self.ticking = false;

        match tick(&mut self.state) {
            Ok(TickOutcome::Continue) => {
                self.ticking = true;
                self.scheduler.schedule_tick();
            }
            Ok(TickOutcome::EnteredPause(transition)) => self.run_effects(&transition),
            Ok(TickOutcome::Idle) => {}
            Ok(TickOutcome::GameOver) => self.halt(),
            Err(err) => {
                self.state.game_over(Some(format!("RUNTIME ERROR: {}", err)));
                self.halt();
            }
        }
    }

    /// Countdown interval callback
    pub fn on_countdown_step(&mut self) {
        if let Some(transition) = pause::countdown_step(self.state.pause) {
            self.apply(transition);
        }
    }

    /// Letter auto-advance callback
    pub fn on_letter_advance(&mut self) {
        if let Some(transition) = pause::auto_advance(self.state.pause, self.state.tuning.countdown_seconds) {
            log::info!("Starting resume countdown");
            self.apply(transition);
        }
    }

    /// The single primary-action entry point, in logical game coordinates
    pub fn interact(&mut self, x: f32, y: f32) {
        if self.state.is_game_over {
            self.restart(next_seed(self.state.seed));
            return;
        }

        let transition = match self.state.pause {
            PauseState::None => {
                self.state.player.jump();
                return;
            }
            PauseState::ShowingIcon => pause::open_letter(self.state.pause),
            PauseState::ShowingChoices => {
                pause::choose_bonus(self.state.pause, &self.state.choice_areas, Vec2::new(x, y))
            }
            PauseState::ShowingLetter => {
                log::info!("Starting resume countdown");
                pause::begin_countdown(self.state.pause, self.state.tuning.countdown_seconds)
            }
            // Taps during the countdown are ignored
            PauseState::Countdown { .. } => None,
        };
        if let Some(transition) = transition {
            self.apply(transition);
        }
    }

    fn apply(&mut self, transition: Transition) {
        self.state.apply_transition(&transition);
        self.run_effects(&transition);
    }

    /// Carry out the timer side of a transition (state side is already applied)
    fn run_effects(&mut self, transition: &Transition) {
        for effect in &transition.effects {
            match effect {
                PauseEffect::StopTicking => {
                    self.scheduler.cancel_tick();
                    self.ticking = false;
                }
                PauseEffect::CancelCountdown => self.scheduler.cancel_countdown(),
                PauseEffect::StartCountdown => self.scheduler.start_countdown(),
                PauseEffect::ScheduleLetterAdvance => {
                    self.scheduler.schedule_letter_advance(self.state.tuning.letter_advance_delay_ms);
                }
                PauseEffect::Resume => {
                    if !self.ticking {
                        self.ticking = true;
                        self.scheduler.schedule_tick();
                    }
                }
                PauseEffect::ApplyBonus(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{ManualScheduler, TimerEvent};
    use crate::sim::BonusKind;

    fn game(seed: u64) -> Game<ManualScheduler> {
        Game::new(seed, Tuning::default(), Settings::default(), ManualScheduler::new()).unwrap()
    }

    /// Drive frames until the run pauses (player kept alive)
    fn run_until_paused(g: &mut Game<ManualScheduler>) {
        g.state.player.set_invincible(true);
        for _ in 0..100_000 {
            if !g.scheduler_mut().take_frame() {
                break;
            }
            g.on_frame();
        }
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut g = game(1);
        g.start();
        g.start();
        assert!(g.is_ticking());
        assert!(g.scheduler().frame_pending());
    }

    #[test]
    fn test_rejects_invalid_tuning() {
        let tuning = Tuning { countdown_seconds: 0, ..Tuning::default() };
        assert!(Game::new(1, tuning, Settings::default(), ManualScheduler::new()).is_err());
    }

    #[test]
    fn test_jump_when_playing() {
        let mut g = game(2);
        g.start();
        g.interact(0.0, 0.0);
        assert!(g.state().player.velocity_y < 0.0);
    }

    #[test]
    fn test_letter_protocol_end_to_end() {
        let mut g = game(3);
        g.start();
        run_until_paused(&mut g);
        assert_eq!(g.state().pause, PauseState::ShowingIcon);
        assert!(!g.scheduler().frame_pending());
        let frozen = g.state().score;

        // Any tap opens the envelope
        g.interact(1.0, 1.0);
        assert_eq!(g.state().pause, PauseState::ShowingChoices);
        assert_eq!(g.state().choice_areas.len(), 3);

        // A miss does nothing
        g.interact(1.0, 1.0);
        assert_eq!(g.state().pause, PauseState::ShowingChoices);

        let area = g.state().choice_areas[0];
        let target = area.rect.pos + area.rect.size / 2.0;
        g.interact(target.x, target.y);
        assert_eq!(g.state().pause, PauseState::ShowingLetter);
        assert_eq!(g.state().active_bonus.map(|b| b.option), Some(area.bonus));
        assert!(g.state().choice_areas.is_empty());

        // Auto-advance after the delay
        let events = g.scheduler_mut().advance(1500);
        assert_eq!(events, vec![TimerEvent::LetterAdvance]);
        g.on_letter_advance();
        assert_eq!(g.state().pause, PauseState::Countdown { remaining: 3 });

        for _ in 0..3 {
            for event in g.scheduler_mut().advance(1000) {
                assert_eq!(event, TimerEvent::CountdownStep);
                g.on_countdown_step();
            }
        }
        assert_eq!(g.state().pause, PauseState::None);
        assert!(!g.scheduler().countdown_active());
        assert!(g.scheduler().frame_pending());
        assert_eq!(g.state().score, frozen);
        assert_eq!(g.state().last_letter_score, frozen);
        assert!(g.state().letter.is_none());
    }

    #[test]
    fn test_manual_advance_beats_timer() {
        let mut g = game(4);
        g.start();
        run_until_paused(&mut g);
        g.interact(0.0, 0.0);
        let area = g.state().choice_areas[2];
        g.interact(area.rect.pos.x + 1.0, area.rect.pos.y + 1.0);
        // Tap through the letter before the auto-advance fires
        g.interact(0.0, 0.0);
        assert_eq!(g.state().pause, PauseState::Countdown { remaining: 3 });
        assert_eq!(g.scheduler().countdowns_started, 1);

        // The stale auto-advance must not restart the countdown
        g.scheduler_mut().advance(500);
        g.on_letter_advance();
        assert_eq!(g.scheduler().countdowns_started, 1);

        // Taps during the countdown are ignored
        g.interact(0.0, 0.0);
        assert_eq!(g.state().pause, PauseState::Countdown { remaining: 3 });
    }

    #[test]
    fn test_start_during_countdown_keeps_pause_alive() {
        let mut g = game(10);
        g.start();
        run_until_paused(&mut g);
        g.interact(0.0, 0.0);
        let area = g.state().choice_areas[0];
        g.interact(area.rect.pos.x + 1.0, area.rect.pos.y + 1.0);
        g.interact(0.0, 0.0);
        assert_eq!(g.state().pause, PauseState::Countdown { remaining: 3 });

        g.start();
        assert!(g.scheduler().countdown_active());
        assert!(!g.scheduler().frame_pending());

        for _ in 0..10 {
            for event in g.scheduler_mut().advance(1000) {
                match event {
                    TimerEvent::CountdownStep => g.on_countdown_step(),
                    TimerEvent::LetterAdvance => g.on_letter_advance(),
                }
            }
        }
        assert_eq!(g.state().pause, PauseState::None);
        assert!(g.is_ticking());
        assert!(g.scheduler().frame_pending());
    }

    #[test]
    fn test_game_over_then_restart() {
        let mut g = game(5);
        g.start();
        for _ in 0..100_000 {
            if !g.scheduler_mut().take_frame() {
                break;
            }
            g.on_frame();
            if g.state().pause.is_paused() {
                g.state.resume_from_letter();
                g.scheduler_mut().schedule_tick();
            }
        }
        assert!(g.state().is_game_over);
        assert!(!g.scheduler().frame_pending());
        assert!(!g.scheduler().countdown_active());

        let seed = g.state().seed;
        g.interact(0.0, 0.0);
        assert!(!g.state().is_game_over);
        assert_eq!(g.state().seed, next_seed(seed));
        assert_eq!(g.state().score, 0.0);
        assert!(g.scheduler().frame_pending());
    }

    #[test]
    fn test_restart_clears_timers_and_bonus() {
        let mut g = game(6);
        g.start();
        run_until_paused(&mut g);
        g.interact(0.0, 0.0);
        let area = g.state().choice_areas[0];
        g.interact(area.rect.pos.x + 1.0, area.rect.pos.y + 1.0);
        g.interact(0.0, 0.0);
        assert!(g.scheduler().countdown_active());

        g.restart(77);
        assert!(!g.scheduler().countdown_active());
        assert!(!g.scheduler().letter_advance_pending());
        assert_eq!(g.state().pause, PauseState::None);
        assert!(g.state().active_bonus.is_none());
        assert_eq!(
            *g.state(),
            GameState::new(77, Tuning::default(), Settings::default())
        );
    }

    #[test]
    fn test_runtime_fault_forces_game_over() {
        let mut g = game(7);
        g.start();
        g.state.speed = f32::NAN;
        g.scheduler_mut().take_frame();
        g.on_frame();
        assert!(g.state().is_game_over);
        let diagnostic = g.state().diagnostic.clone().unwrap();
        assert!(diagnostic.starts_with("RUNTIME ERROR:"));
        assert!(!g.scheduler().frame_pending());
    }

    #[test]
    fn test_destroy_cancels_everything() {
        let mut g = game(8);
        g.start();
        g.destroy();
        assert!(!g.scheduler().frame_pending());
        assert!(!g.is_ticking());
    }

    #[test]
    fn test_bonus_kind_visible_after_choice() {
        let mut g = game(9);
        g.start();
        run_until_paused(&mut g);
        g.interact(0.0, 0.0);
        let area = g.state().choice_areas[1];
        g.interact(area.rect.pos.x + 1.0, area.rect.pos.y + 1.0);
        let kind: Option<BonusKind> = g.state().bonus_kind();
        assert_eq!(kind, Some(area.bonus.kind));
    }
}
