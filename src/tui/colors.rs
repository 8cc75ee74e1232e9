//! Color palettes for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Priority;

pub const PURPLE: Color = Color::Rgb(147, 51, 234);
pub const PINK: Color = Color::Rgb(219, 39, 119);
pub const EMERALD: Color = Color::Rgb(16, 185, 129);
pub const ORANGE: Color = Color::Rgb(234, 88, 12);
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);

/// Colors for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub overdue: Color,
    pub due_today: Color,
    pub done: Color,
}

impl Palette {
    pub fn light() -> Self {
        Palette {
            bg: Color::Rgb(250, 245, 255),
            fg: Color::Rgb(31, 41, 55),
            muted: Color::Rgb(107, 114, 128),
            accent: PURPLE,
            highlight_bg: Color::Rgb(233, 213, 255),
            highlight_fg: Color::Rgb(31, 41, 55),
            overdue: Color::Rgb(220, 38, 38),
            due_today: ORANGE,
            done: EMERALD,
        }
    }

    pub fn dark() -> Self {
        Palette {
            bg: Color::Rgb(17, 24, 39),
            fg: Color::Rgb(229, 231, 235),
            muted: Color::Rgb(156, 163, 175),
            accent: PINK,
            highlight_bg: Color::Rgb(88, 28, 135),
            highlight_fg: Color::White,
            overdue: Color::Rgb(248, 113, 113),
            due_today: Color::Rgb(251, 191, 36),
            done: EMERALD,
        }
    }

    pub fn for_mode(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn priority(&self, p: Priority) -> Color {
        match p {
            Priority::High => self.overdue,
            Priority::Medium => self.due_today,
            Priority::Low => self.done,
        }
    }
}
