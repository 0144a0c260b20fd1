//! Event handling for the damage dialog.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Field};

/// Result of handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
    /// The form was submitted; run it on the async side of the loop.
    Submit,
}

/// Handle a terminal event.
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcuts.
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    match key.code {
        KeyCode::Esc => EventResult::Quit,

        KeyCode::Enter => EventResult::Submit,

        KeyCode::Tab => {
            app.focus = app.focus.next();
            EventResult::NeedsRedraw
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            EventResult::NeedsRedraw
        }

        _ => handle_field_key(app, key),
    }
}

/// Keys routed to the focused field.
fn handle_field_key(app: &mut App, key: KeyEvent) -> EventResult {
    match app.focus {
        Field::Roll | Field::SaveDc => match key.code {
            KeyCode::Char(c) => {
                app.type_char(c);
                EventResult::NeedsRedraw
            }
            KeyCode::Backspace => {
                app.backspace();
                EventResult::NeedsRedraw
            }
            _ => EventResult::Continue,
        },

        Field::DamageType => match key.code {
            KeyCode::Left | KeyCode::Up => {
                app.cycle_damage_type(-1);
                EventResult::NeedsRedraw
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => {
                app.cycle_damage_type(1);
                EventResult::NeedsRedraw
            }
            _ => EventResult::Continue,
        },

        Field::SaveAbility => match key.code {
            KeyCode::Left | KeyCode::Up => {
                app.cycle_ability(-1);
                EventResult::NeedsRedraw
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => {
                app.cycle_ability(1);
                EventResult::NeedsRedraw
            }
            _ => EventResult::Continue,
        },

        Field::Tokens => match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                app.move_token_cursor(-1);
                EventResult::NeedsRedraw
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.move_token_cursor(1);
                EventResult::NeedsRedraw
            }
            KeyCode::Char(' ') => {
                app.toggle_current_token();
                EventResult::NeedsRedraw
            }
            KeyCode::Char('a') => {
                app.select_all_tokens();
                EventResult::NeedsRedraw
            }
            _ => EventResult::Continue,
        },
    }
}
