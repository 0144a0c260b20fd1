//! Render orchestration for the damage dialog.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, Field};
use crate::ui::theme::DialogTheme;

/// Main render function.
pub fn render(frame: &mut Frame, app: &App, theme: &DialogTheme) {
    let area = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // title
            Constraint::Length(3),  // roll + damage type
            Constraint::Length(3),  // save DC + ability
            Constraint::Min(4),     // token list
            Constraint::Length(6),  // chat pane
            Constraint::Length(1),  // status line
        ])
        .split(area);

    render_title(frame, app, theme, rows[0]);
    render_field_row(
        frame,
        theme,
        rows[1],
        FieldBox {
            title: "Damage Roll (eg: 1d6+2)",
            value: app.form.roll_text.clone(),
            focused: app.focus == Field::Roll,
        },
        FieldBox {
            title: "Damage Type",
            value: app
                .form
                .damage_type
                .map(|d| d.label())
                .unwrap_or_default(),
            focused: app.focus == Field::DamageType,
        },
    );
    render_field_row(
        frame,
        theme,
        rows[2],
        FieldBox {
            title: "Saving Throw DC (optional)",
            value: app.form.save_dc_text.clone(),
            focused: app.focus == Field::SaveDc,
        },
        FieldBox {
            title: "Ability (optional)",
            value: app
                .form
                .save_ability
                .map(|a| a.label().to_string())
                .unwrap_or_default(),
            focused: app.focus == Field::SaveAbility,
        },
    );
    render_token_list(frame, app, theme, rows[3]);
    render_chat(frame, app, theme, rows[4]);
    render_status(frame, app, theme, rows[5]);
}

fn render_title(frame: &mut Frame, app: &App, theme: &DialogTheme, area: Rect) {
    let title = Line::from(vec![
        Span::styled("Damage Tool", theme.value_style()),
        Span::styled(format!("  scene: {}", app.scene.name), theme.label_style()),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

struct FieldBox {
    title: &'static str,
    value: String,
    focused: bool,
}

fn render_field_row(
    frame: &mut Frame,
    theme: &DialogTheme,
    area: Rect,
    left: FieldBox,
    right: FieldBox,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (field, column) in [(left, columns[0]), (right, columns[1])] {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(field.title, theme.label_style()))
            .border_style(theme.border_style(field.focused));
        let value = if field.focused {
            format!("{}_", field.value)
        } else {
            field.value
        };
        frame.render_widget(
            Paragraph::new(Span::styled(value, theme.value_style())).block(block),
            column,
        );
    }
}

fn render_token_list(frame: &mut Frame, app: &App, theme: &DialogTheme, area: Rect) {
    let focused = app.focus == Field::Tokens;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            "Tokens (space: toggle, a: all)",
            theme.label_style(),
        ))
        .border_style(theme.border_style(focused));

    let items: Vec<ListItem> = app
        .form
        .choices()
        .iter()
        .map(|choice| {
            let checkbox = if choice.selected { "[x]" } else { "[ ]" };
            let line = Line::from(vec![
                Span::styled(format!("{checkbox} "), theme.value_style()),
                Span::styled(format!("{:<24}", choice.name), theme.value_style()),
                Span::styled(
                    format!("({}/{} HP)  ", choice.hp_current, choice.hp_maximum),
                    theme.hp_style(choice.hp_current, choice.hp_maximum),
                ),
                Span::styled(choice.portrait.clone(), theme.hint_style()),
            ]);
            ListItem::new(line)
        })
        .collect();

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.token_cursor));
    }

    let list = List::new(items)
        .block(block)
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_chat(frame: &mut Frame, app: &App, theme: &DialogTheme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled("Chat", theme.label_style()))
        .border_style(theme.border_style(false));

    // Show the newest lines that fit.
    let inner_height = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .chat_lines()
        .iter()
        .rev()
        .take(inner_height)
        .rev()
        .map(|line| Line::from(Span::styled(line.clone(), theme.chat_style())))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status(frame: &mut Frame, app: &App, theme: &DialogTheme, area: Rect) {
    let line = match app.status() {
        Some(message) => Line::from(Span::styled(message.to_string(), theme.warning_style())),
        None => Line::from(Span::styled(
            "Tab: next field   Enter: apply damage   Esc: quit",
            theme.hint_style(),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}
