//! HUD text handed to the render target
//!
//! Plain strings only; colors come from the active theme.

use serde::Serialize;

use crate::sim::GameState;
use crate::sim::pause::PauseState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudView {
    /// `Score: N`, floored
    pub score: String,
    /// Active bonus with time left, or the current reward message
    pub message: Option<String>,
    /// Pause overlay lines for the current sub-state
    pub overlay: Vec<String>,
    pub countdown: Option<u32>,
    pub game_over: Option<String>,
    pub theme_name: &'static str,
    pub score_color: &'static str,
    pub message_color: &'static str,
    pub background: &'static str,
}

impl HudView {
    pub fn from_state(state: &GameState) -> Self {
        let message = match (&state.active_bonus, state.message) {
            (Some(bonus), _) => Some(format!("{} ({:.1}s)", bonus.option.name, bonus.seconds_left())),
            (None, Some(text)) if state.settings.show_messages && state.message_timer > 0 => Some(text.to_string()),
            _ => None,
        };

        let overlay = match state.pause {
            PauseState::None => Vec::new(),
            PauseState::ShowingIcon => vec!["You've got mail!".to_string(), "[Tap to open]".to_string()],
            PauseState::ShowingChoices => {
                let mut lines = Vec::new();
                if let Some(letter) = state.letter {
                    lines.push(format!("Mail from: {}", letter.sender));
                }
                lines.push("Choose a bonus!".to_string());
                lines.extend(
                    state
                        .bonus_options
                        .iter()
                        .map(|b| format!("{}: {}", b.name, b.description)),
                );
                lines
            }
            PauseState::ShowingLetter => match state.letter {
                Some(letter) => vec![
                    format!("From: {}", letter.sender),
                    letter.text.to_string(),
                    "[Continue...]".to_string(),
                ],
                None => vec!["[Continue...]".to_string()],
            },
            PauseState::Countdown { .. } => Vec::new(),
        };

        let countdown = match state.pause {
            PauseState::Countdown { remaining } => Some(remaining),
            _ => None,
        };

        let game_over = state.is_game_over.then(|| {
            let mut text = format!("Game Over! Final Score: {}", state.score.floor());
            if let Some(diagnostic) = &state.diagnostic {
                text.push('\n');
                text.push_str(diagnostic);
            }
            text
        });

        Self {
            score: format!("Score: {}", state.score.floor()),
            message,
            overlay,
            countdown,
            game_over,
            theme_name: state.theme.name,
            score_color: state.theme.score_text,
            message_color: state.theme.message_text,
            background: state.theme.background,
        }
    }
}
