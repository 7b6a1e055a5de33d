//! Letter pause protocol
//!
//! ```text
//! None -> ShowingIcon -> ShowingChoices -> ShowingLetter -> Countdown -> None
//! ```
//!
//! Each transition is a free function that returns the next state plus the
//! side effects the caller must carry out (stop ticking, arm timers, apply a
//! bonus). Nothing here touches a clock, so the protocol is testable with
//! plain values.

use glam::Vec2;
use serde::Serialize;

use super::bonus::BonusOption;
use super::util::Rect;
use crate::consts::*;

/// Exactly one is active at a time; `None` means normal ticking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PauseState {
    #[default]
    None,
    /// Envelope icon, waiting for any interaction
    ShowingIcon,
    /// Bonus menu, waiting for a hit inside a choice box
    ShowingChoices,
    /// Letter text after a bonus was picked
    ShowingLetter,
    /// Whole seconds left before play resumes
    Countdown { remaining: u32 },
}

impl PauseState {
    pub fn is_paused(&self) -> bool {
        *self != PauseState::None
    }

    pub fn name(&self) -> &'static str {
        match self {
            PauseState::None => "none",
            PauseState::ShowingIcon => "showing_icon",
            PauseState::ShowingChoices => "showing_choices",
            PauseState::ShowingLetter => "showing_letter",
            PauseState::Countdown { .. } => "countdown",
        }
    }
}

/// Work the owner of the timers and the run state must do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PauseEffect {
    /// Stop the per-frame driver
    StopTicking,
    CancelCountdown,
    /// Arm the 1 Hz countdown timer
    StartCountdown,
    /// Arm the one-shot letter auto-advance
    ScheduleLetterAdvance,
    ApplyBonus(BonusOption),
    /// Clear letter data and rearm the per-frame driver
    Resume,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: PauseState,
    pub effects: Vec<PauseEffect>,
}

/// Clickable region for one bonus option
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChoiceArea {
    pub rect: Rect,
    pub bonus: BonusOption,
}

/// Lay the options out as a centered row of boxes
pub fn layout_choices(options: &[BonusOption]) -> Vec<ChoiceArea> {
    if options.is_empty() {
        return Vec::new();
    }
    let count = options.len() as f32;
    let total_width = count * BONUS_CHOICE_BOX_WIDTH + (count - 1.0) * BONUS_CHOICE_PADDING;
    let start_x = GAME_WIDTH / 2.0 - total_width / 2.0;
    let y = GAME_HEIGHT / 2.0 - BONUS_CHOICE_BOX_HEIGHT / 2.0 + 30.0;

    options
        .iter()
        .enumerate()
        .map(|(i, &bonus)| ChoiceArea {
            rect: Rect::new(
                start_x + i as f32 * (BONUS_CHOICE_BOX_WIDTH + BONUS_CHOICE_PADDING),
                y,
                BONUS_CHOICE_BOX_WIDTH,
                BONUS_CHOICE_BOX_HEIGHT,
            ),
            bonus,
        })
        .collect()
}

/// Letter threshold crossed while playing
pub fn enter_letter(current: PauseState) -> Option<Transition> {
    match current {
        PauseState::None => Some(Transition {
            next: PauseState::ShowingIcon,
            effects: vec![PauseEffect::StopTicking, PauseEffect::CancelCountdown],
        }),
        _ => None,
    }
}

/// Any interaction opens the envelope
pub fn open_letter(current: PauseState) -> Option<Transition> {
    match current {
        PauseState::ShowingIcon => Some(Transition {
            next: PauseState::ShowingChoices,
            effects: Vec::new(),
        }),
        _ => None,
    }
}

/// A hit inside a choice box picks that bonus; misses are ignored
pub fn choose_bonus(current: PauseState, areas: &[ChoiceArea], point: Vec2) -> Option<Transition> {
    if current != PauseState::ShowingChoices {
        return None;
    }
    let area = areas.iter().find(|a| a.rect.contains(point))?;
    Some(Transition {
        next: PauseState::ShowingLetter,
        effects: vec![PauseEffect::ApplyBonus(area.bonus), PauseEffect::ScheduleLetterAdvance],
    })
}

/// Dismiss the letter and count down to resume
pub fn begin_countdown(current: PauseState, seconds: u32) -> Option<Transition> {
    match current {
        PauseState::ShowingLetter => Some(Transition {
            next: PauseState::Countdown { remaining: seconds },
            // Never two countdown intervals at once
            effects: vec![PauseEffect::CancelCountdown, PauseEffect::StartCountdown],
        }),
        _ => None,
    }
}

/// The delayed auto-advance; a no-op once the player moved on
pub fn auto_advance(current: PauseState, seconds: u32) -> Option<Transition> {
    begin_countdown(current, seconds)
}

/// One second elapsed during the countdown
pub fn countdown_step(current: PauseState) -> Option<Transition> {
    let PauseState::Countdown { remaining } = current else {
        return None;
    };
    let remaining = remaining.saturating_sub(1);
    if remaining == 0 {
        Some(Transition {
            next: PauseState::None,
            effects: vec![PauseEffect::CancelCountdown, PauseEffect::Resume],
        })
    } else {
        Some(Transition {
            next: PauseState::Countdown { remaining },
            effects: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bonus::BONUS_CATALOG;

    fn areas() -> Vec<ChoiceArea> {
        layout_choices(&BONUS_CATALOG[..BONUS_CHOICE_COUNT])
    }

    fn center(rect: &Rect) -> Vec2 {
        rect.pos + rect.size / 2.0
    }

    #[test]
    fn test_full_protocol() {
        let t = enter_letter(PauseState::None).unwrap();
        assert_eq!(t.next, PauseState::ShowingIcon);
        assert!(t.effects.contains(&PauseEffect::StopTicking));

        let t = open_letter(t.next).unwrap();
        assert_eq!(t.next, PauseState::ShowingChoices);

        let areas = areas();
        let t = choose_bonus(t.next, &areas, center(&areas[1].rect)).unwrap();
        assert_eq!(t.next, PauseState::ShowingLetter);
        assert_eq!(t.effects[0], PauseEffect::ApplyBonus(BONUS_CATALOG[1]));

        let t = begin_countdown(t.next, 3).unwrap();
        assert_eq!(t.next, PauseState::Countdown { remaining: 3 });
        assert_eq!(t.effects, vec![PauseEffect::CancelCountdown, PauseEffect::StartCountdown]);

        let t = countdown_step(t.next).unwrap();
        assert_eq!(t.next, PauseState::Countdown { remaining: 2 });
        let t = countdown_step(t.next).unwrap();
        let t = countdown_step(t.next).unwrap();
        assert_eq!(t.next, PauseState::None);
        assert!(t.effects.contains(&PauseEffect::Resume));
    }

    #[test]
    fn test_missed_choice_is_ignored() {
        assert_eq!(choose_bonus(PauseState::ShowingChoices, &areas(), Vec2::new(5.0, 5.0)), None);
        assert_eq!(choose_bonus(PauseState::ShowingChoices, &[], Vec2::new(400.0, 200.0)), None);
    }

    #[test]
    fn test_auto_advance_only_from_letter() {
        assert!(auto_advance(PauseState::ShowingLetter, 3).is_some());
        assert_eq!(auto_advance(PauseState::Countdown { remaining: 2 }, 3), None);
        assert_eq!(auto_advance(PauseState::None, 3), None);
    }

    #[test]
    fn test_transitions_reject_wrong_state() {
        assert_eq!(enter_letter(PauseState::ShowingIcon), None);
        assert_eq!(open_letter(PauseState::None), None);
        assert_eq!(countdown_step(PauseState::ShowingLetter), None);
    }

    #[test]
    fn test_choice_boxes_are_centered_and_disjoint() {
        let areas = areas();
        assert_eq!(areas.len(), 3);
        let left = areas[0].rect.pos.x;
        let right = areas[2].rect.right();
        assert!((left - (GAME_WIDTH - right)).abs() < 1e-3);
        assert!(!areas[0].rect.overlaps(&areas[1].rect));
        assert!(!areas[1].rect.overlaps(&areas[2].rect));
    }
}
