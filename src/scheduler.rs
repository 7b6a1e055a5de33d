//! Timer capability the lifecycle layer drives
//!
//! The browser implements this with `requestAnimationFrame`, `setInterval`
//! and `setTimeout`; tests and the native runner use `ManualScheduler`, a
//! simulated clock that only moves when told to.

/// Frame and countdown timers
pub trait Scheduler {
    /// Request one more frame callback
    fn schedule_tick(&mut self);
    fn cancel_tick(&mut self);
    /// Start the 1 Hz countdown callback
    fn start_countdown(&mut self);
    fn cancel_countdown(&mut self);
    /// Fire the letter auto-advance once after `delay_ms`
    fn schedule_letter_advance(&mut self, delay_ms: u32);
    fn cancel_letter_advance(&mut self);
}

/// A timer that came due on the simulated clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    CountdownStep,
    LetterAdvance,
}

const COUNTDOWN_PERIOD_MS: u64 = 1000;

/// Simulated clock for tests and headless runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualScheduler {
    now_ms: u64,
    frame_pending: bool,
    next_countdown_ms: Option<u64>,
    letter_advance_ms: Option<u64>,
    /// How many countdown intervals were ever started
    pub countdowns_started: u32,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    pub fn countdown_active(&self) -> bool {
        self.next_countdown_ms.is_some()
    }

    pub fn letter_advance_pending(&self) -> bool {
        self.letter_advance_ms.is_some()
    }

    /// Consume the pending frame request, if any
    pub fn take_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_pending)
    }

    /// Move the clock forward and report timers that fired, in due order
    pub fn advance(&mut self, ms: u64) -> Vec<TimerEvent> {
        let target = self.now_ms + ms;
        let mut fired = Vec::new();
        loop {
            let countdown = self.next_countdown_ms.filter(|&due| due <= target);
            let letter = self.letter_advance_ms.filter(|&due| due <= target);
            match (countdown, letter) {
                (Some(c), Some(l)) if l <= c => {
                    self.now_ms = l;
                    self.letter_advance_ms = None;
                    fired.push(TimerEvent::LetterAdvance);
                }
                (Some(c), _) => {
                    self.now_ms = c;
                    self.next_countdown_ms = Some(c + COUNTDOWN_PERIOD_MS);
                    fired.push(TimerEvent::CountdownStep);
                }
                (None, Some(l)) => {
                    self.now_ms = l;
                    self.letter_advance_ms = None;
                    fired.push(TimerEvent::LetterAdvance);
                }
                (None, None) => break,
            }
        }
        self.now_ms = target;
        fired
    }

    /// Time until the next timer fires, if one is armed
    pub fn next_due_in(&self) -> Option<u64> {
        [self.next_countdown_ms, self.letter_advance_ms]
            .into_iter()
            .flatten()
            .min()
            .map(|due| due.saturating_sub(self.now_ms))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_tick(&mut self) {
        self.frame_pending = true;
    }

    fn cancel_tick(&mut self) {
        self.frame_pending = false;
    }

    fn start_countdown(&mut self) {
        self.next_countdown_ms = Some(self.now_ms + COUNTDOWN_PERIOD_MS);
        self.countdowns_started += 1;
    }

    fn cancel_countdown(&mut self) {
        self.next_countdown_ms = None;
    }

    fn schedule_letter_advance(&mut self, delay_ms: u32) {
        self.letter_advance_ms = Some(self.now_ms + delay_ms as u64);
    }

    fn cancel_letter_advance(&mut self) {
        self.letter_advance_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_request_is_one_shot() {
        let mut sched = ManualScheduler::new();
        sched.schedule_tick();
        assert!(sched.take_frame());
        assert!(!sched.take_frame());
    }

    #[test]
    fn test_countdown_fires_every_second() {
        let mut sched = ManualScheduler::new();
        sched.start_countdown();
        assert!(sched.advance(999).is_empty());
        assert_eq!(sched.advance(1), vec![TimerEvent::CountdownStep]);
        assert_eq!(sched.advance(2000), vec![TimerEvent::CountdownStep, TimerEvent::CountdownStep]);
        sched.cancel_countdown();
        assert!(sched.advance(5000).is_empty());
    }

    #[test]
    fn test_timers_fire_in_due_order() {
        let mut sched = ManualScheduler::new();
        sched.schedule_letter_advance(1500);
        sched.start_countdown();
        assert_eq!(sched.next_due_in(), Some(1000));
        let fired = sched.advance(2000);
        assert_eq!(
            fired,
            vec![TimerEvent::CountdownStep, TimerEvent::LetterAdvance, TimerEvent::CountdownStep]
        );
        assert_eq!(sched.now_ms(), 2000);
    }
}
