//! Shared UI Components
//!
//! The bottom bar (status + context-aware shortcuts) and the delete
//! confirmation dialog, plus the centered-rect helper the dialogs sit in.

use crate::app::{App, InputMode};
use crate::ui::colors::Mocha;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph},
};

/// Renders the bottom bar: transient status on the left, the key hints for
/// the current input mode on the right.
pub fn render_bottom_bar(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(area);

    let left_content = Paragraph::new(status_line(app))
        .alignment(Alignment::Left)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Mocha::SURFACE1)),
        );

    let right_content = Paragraph::new(context_shortcuts(app))
        .alignment(Alignment::Right)
        .style(Style::default().fg(Mocha::OVERLAY))
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Mocha::SURFACE1)),
        );

    frame.render_widget(left_content, chunks[0]);
    frame.render_widget(right_content, chunks[1]);
}

fn status_line(app: &App) -> Line<'static> {
    if let Some(message) = &app.error_message {
        return Line::from(Span::styled(
            format!(" {} ", message),
            Style::default().fg(Mocha::RED),
        ));
    }
    if let Some(message) = &app.success_message {
        return Line::from(Span::styled(
            format!(" {} ", message),
            Style::default().fg(Mocha::GREEN),
        ));
    }

    let mut spans = vec![Span::styled(
        " jot ",
        Style::default().fg(Mocha::BASE).bg(Mocha::MAUVE),
    )];
    let count = app.repository.list().len();
    spans.push(Span::styled(
        format!(" {} note{} ", count, if count == 1 { "" } else { "s" }),
        Style::default().fg(Mocha::SUBTEXT),
    ));
    if app.dirty {
        spans.push(Span::styled(
            " unsaved ",
            Style::default().fg(Mocha::PEACH),
        ));
    }
    Line::from(spans)
}

fn context_shortcuts(app: &App) -> String {
    match app.input_mode {
        InputMode::Search => " [⏎/Esc] Done │ type to filter ".to_string(),
        InputMode::EditTitle | InputMode::EditTags => " [⏎/Esc] Done ".to_string(),
        InputMode::EditContent => " [Ctrl+s] Save │ [Esc] Done ".to_string(),
        InputMode::ConfirmDelete => " [y] Delete │ [n] Keep ".to_string(),
        InputMode::Normal => {
            let record = if app.transcription_available() {
                if app.listening { " │ [r] Stop" } else { " │ [r] Record" }
            } else {
                ""
            };
            format!(
                " [↑↓] Navigate │ [n] New │ [e] Edit │ [t] Title │ [#] Tags │ [s] Save │ [d] Delete │ [/] Search │ [g] AI Title{} │ [q] Quit ",
                record
            )
        }
    }
}

/// Centered modal asking whether to delete the selected note.
pub fn render_confirm_dialog(frame: &mut Frame, app: &App) {
    let area = centered_rect(44, 7, frame.area());
    frame.render_widget(Clear, area);

    let title = app
        .selected_note()
        .map(|n| n.display_title().to_string())
        .unwrap_or_default();

    let body = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Delete \"{}\"?", title),
            Style::default().fg(Mocha::TEXT),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[y] Delete    [n] Keep",
            Style::default().fg(Mocha::SUBTEXT),
        )),
    ];

    let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
        Block::bordered()
            .border_type(BorderType::Rounded)
            .title(" Confirm ")
            .style(Style::default().fg(Mocha::RED).bg(Mocha::MANTLE)),
    );

    frame.render_widget(dialog, area);
}

/// A fixed-size rectangle centered inside `area`, clamped to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
