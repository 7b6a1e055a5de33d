//! Theme palette cycle
//!
//! Themes change what spawns (lava, cows, rain) as well as colors, so the
//! simulation keys off `ThemeKind` rather than names.

use serde::Serialize;

/// Which theme is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ThemeKind {
    NeonPurple,
    BlueOrange,
    LushGreen,
    FieryRed,
    RedCyan,
}

/// Theme-derived presentation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub kind: ThemeKind,
    pub name: &'static str,
    pub background: &'static str,
    pub score_text: &'static str,
    pub message_text: &'static str,
}

impl Theme {
    /// Lava pits replace plain gaps in this theme
    pub fn lava_capable(&self) -> bool {
        self.kind == ThemeKind::FieryRed
    }

    /// Waterfall and rain particles run in this theme
    pub fn is_wet(&self) -> bool {
        self.kind == ThemeKind::BlueOrange
    }
}

/// Cycle order; index 0 is the starting theme
pub const THEMES: [Theme; 5] = [
    Theme {
        kind: ThemeKind::NeonPurple,
        name: "Neon Purple",
        background: "#1a0b2e",
        score_text: "#e0aaff",
        message_text: "#c77dff",
    },
    Theme {
        kind: ThemeKind::BlueOrange,
        name: "Blue/Orange",
        background: "#0b1d3a",
        score_text: "#ffb347",
        message_text: "#7fd1ff",
    },
    Theme {
        kind: ThemeKind::LushGreen,
        name: "Lush Green",
        background: "#0f2a14",
        score_text: "#c8f7c5",
        message_text: "#7bd389",
    },
    Theme {
        kind: ThemeKind::FieryRed,
        name: "Fiery Red",
        background: "#2b0a05",
        score_text: "#ffd166",
        message_text: "#ff6b35",
    },
    Theme {
        kind: ThemeKind::RedCyan,
        name: "Red/Cyan",
        background: "#140a12",
        score_text: "#4df3ff",
        message_text: "#ff3864",
    },
];

/// Look up a theme, falling back to the first one for out-of-range indices
pub fn theme_at(index: usize) -> Theme {
    THEMES.get(index).copied().unwrap_or(THEMES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_fiery_red_has_lava() {
        let lava: Vec<_> = THEMES.iter().filter(|t| t.lava_capable()).collect();
        assert_eq!(lava.len(), 1);
        assert_eq!(lava[0].name, "Fiery Red");
    }

    #[test]
    fn test_out_of_range_falls_back() {
        assert_eq!(theme_at(99), THEMES[0]);
        assert_eq!(theme_at(2).kind, ThemeKind::LushGreen);
    }
}
