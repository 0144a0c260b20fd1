//! Color theme and styling for the damage dialog.

use ratatui::style::{Color, Modifier, Style};

/// Dialog color theme.
#[derive(Debug, Clone)]
pub struct DialogTheme {
    pub border: Color,
    pub border_focused: Color,
    pub label: Color,
    pub value: Color,
    pub hp_healthy: Color,
    pub hp_wounded: Color,
    pub hp_critical: Color,
    pub chat: Color,
    pub warning: Color,
    pub hint: Color,
}

impl Default for DialogTheme {
    fn default() -> Self {
        Self {
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            label: Color::Gray,
            value: Color::White,
            hp_healthy: Color::Green,
            hp_wounded: Color::Yellow,
            hp_critical: Color::Red,
            chat: Color::White,
            warning: Color::LightRed,
            hint: Color::DarkGray,
        }
    }
}

impl DialogTheme {
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(self.border_focused)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn label_style(&self) -> Style {
        Style::default().fg(self.label)
    }

    pub fn value_style(&self) -> Style {
        Style::default().fg(self.value)
    }

    pub fn warning_style(&self) -> Style {
        Style::default()
            .fg(self.warning)
            .add_modifier(Modifier::BOLD)
    }

    pub fn hint_style(&self) -> Style {
        Style::default().fg(self.hint)
    }

    pub fn chat_style(&self) -> Style {
        Style::default().fg(self.chat)
    }

    /// HP color by remaining fraction: green, wounded below half,
    /// critical below a quarter.
    pub fn hp_style(&self, current: i32, maximum: i32) -> Style {
        let color = if maximum <= 0 || current * 4 <= maximum {
            self.hp_critical
        } else if current * 2 <= maximum {
            self.hp_wounded
        } else {
            self.hp_healthy
        };
        Style::default().fg(color)
    }
}
