//! Main Screen
//!
//! Sidebar (search bar + filtered note list), the three-field editor, and
//! the rendered Markdown preview of whatever the editor holds.

use crate::app::{App, InputMode};
use crate::ui::colors::Mocha;
use crate::ui::components;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, List, ListItem, ListState, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthChar;

const PREVIEW_CHARS: usize = 30;

pub fn render(frame: &mut Frame, app: &App) {
    let rows = Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).split(frame.area());
    let panes = Layout::horizontal([
        Constraint::Percentage(28),
        Constraint::Percentage(40),
        Constraint::Percentage(32),
    ])
    .split(rows[0]);

    render_sidebar(frame, panes[0], app);
    render_editor(frame, panes[1], app);
    render_preview(frame, panes[2], app);
    components::render_bottom_bar(frame, rows[1], app);
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).split(area);

    let searching = app.input_mode == InputMode::Search;
    let mut query = app.search_query.clone();
    if searching {
        query.push('█');
    }
    let search = Paragraph::new(query)
        .style(Style::default().fg(Mocha::TEXT))
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .title(" Search ")
                .style(Style::default().fg(if searching {
                    Mocha::MAUVE
                } else {
                    Mocha::SURFACE1
                })),
        );
    frame.render_widget(search, chunks[0]);

    let visible = app.visible_notes();
    let items: Vec<ListItem> = if visible.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No notes found.",
            Style::default().fg(Mocha::OVERLAY),
        )))]
    } else {
        visible
            .iter()
            .map(|note| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        note.display_title().to_string(),
                        Style::default()
                            .fg(Mocha::TEXT)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        content_preview(&note.content),
                        Style::default().fg(Mocha::SUBTEXT),
                    )),
                ])
            })
            .collect()
    };

    let mut state = ListState::default();
    state.select(
        app.selection
            .selected()
            .and_then(|id| visible.iter().position(|n| n.id == id)),
    );

    let list = List::new(items)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .title(" Notes ")
                .style(Style::default().fg(Mocha::SURFACE1)),
        )
        .highlight_style(Style::default().bg(Mocha::SURFACE0));

    frame.render_stateful_widget(list, chunks[1], &mut state);
}

fn render_editor(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .split(area);

    let title_label = if app.ai_busy {
        " Title · thinking… "
    } else {
        " Title "
    };
    render_field(
        frame,
        chunks[0],
        app,
        InputMode::EditTitle,
        title_label,
        &app.draft_title,
    );

    let content_label = if app.listening {
        " Content · ● REC "
    } else {
        " Content "
    };
    let mut content = app.draft_content.clone();
    if app.input_mode == InputMode::EditContent {
        content.push('█');
    }
    let editing = app.input_mode == InputMode::EditContent;
    let content_pane = Paragraph::new(content)
        .style(Style::default().fg(Mocha::TEXT))
        .wrap(Wrap { trim: false })
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .title(content_label)
                .style(Style::default().fg(if app.listening {
                    Mocha::RED
                } else if editing {
                    Mocha::MAUVE
                } else {
                    Mocha::SURFACE1
                })),
        );
    frame.render_widget(content_pane, chunks[1]);

    render_field(
        frame,
        chunks[2],
        app,
        InputMode::EditTags,
        " Tags (comma separated) ",
        &app.draft_tags,
    );
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    mode: InputMode,
    label: &str,
    value: &str,
) {
    let active = app.input_mode == mode;
    let mut text = value.to_string();
    if active {
        text.push('█');
    }

    let field = Paragraph::new(text)
        .style(Style::default().fg(Mocha::TEXT))
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .title(label.to_string())
                .style(Style::default().fg(if active {
                    Mocha::MAUVE
                } else {
                    Mocha::SURFACE1
                })),
        );
    frame.render_widget(field, area);
}

fn render_preview(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .title(" Preview ")
        .style(Style::default().fg(Mocha::SURFACE1));

    if app.selected_note().is_none() {
        let placeholder = Paragraph::new("Select a note or create a new one.")
            .style(Style::default().fg(Mocha::OVERLAY))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let title = if app.draft_title.is_empty() {
        "Untitled"
    } else {
        app.draft_title.as_str()
    };

    let mut lines = vec![Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Mocha::LAVENDER)
            .add_modifier(Modifier::BOLD),
    ))];

    let tags: Vec<&str> = app
        .draft_tags
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if !tags.is_empty() {
        let mut spans = Vec::new();
        for tag in tags {
            spans.push(Span::styled(
                format!("#{} ", tag),
                Style::default().fg(Mocha::TEAL),
            ));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    lines.extend(markdown_lines(&app.draft_content));

    let preview = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(preview, area);
}

/// Flattens Markdown into styled terminal lines: headings stand out, list
/// items get bullets, inline and fenced code are tinted. Enough for a
/// glanceable preview; not a full renderer.
fn markdown_lines(content: &str) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut bold = 0usize;
    let mut italic = 0usize;
    let mut heading = false;
    let mut code_block = false;

    for event in Parser::new(content) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                if !spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut spans)));
                }
                heading = true;
            }
            Event::End(TagEnd::Heading(_)) => {
                lines.push(Line::from(std::mem::take(&mut spans)));
                lines.push(Line::from(""));
                heading = false;
            }
            Event::End(TagEnd::Paragraph) => {
                lines.push(Line::from(std::mem::take(&mut spans)));
                lines.push(Line::from(""));
            }
            Event::Start(Tag::Item) => {
                spans.push(Span::styled("• ", Style::default().fg(Mocha::TEAL)));
            }
            Event::End(TagEnd::Item) => {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
            Event::End(TagEnd::List(_)) => {
                lines.push(Line::from(""));
            }
            Event::Start(Tag::CodeBlock(_)) => {
                if !spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut spans)));
                }
                code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                code_block = false;
                lines.push(Line::from(""));
            }
            Event::Start(Tag::Strong) => bold += 1,
            Event::End(TagEnd::Strong) => bold = bold.saturating_sub(1),
            Event::Start(Tag::Emphasis) => italic += 1,
            Event::End(TagEnd::Emphasis) => italic = italic.saturating_sub(1),
            Event::Code(text) => {
                spans.push(Span::styled(
                    text.to_string(),
                    Style::default().fg(Mocha::YELLOW),
                ));
            }
            Event::Text(text) => {
                if code_block {
                    for raw in text.lines() {
                        lines.push(Line::from(Span::styled(
                            raw.to_string(),
                            Style::default().fg(Mocha::GREEN),
                        )));
                    }
                } else {
                    let mut style = Style::default().fg(if heading {
                        Mocha::PEACH
                    } else {
                        Mocha::TEXT
                    });
                    if heading || bold > 0 {
                        style = style.add_modifier(Modifier::BOLD);
                    }
                    if italic > 0 {
                        style = style.add_modifier(Modifier::ITALIC);
                    }
                    spans.push(Span::styled(text.to_string(), style));
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
            Event::Rule => {
                lines.push(Line::from(Span::styled(
                    "─".repeat(8),
                    Style::default().fg(Mocha::SURFACE1),
                )));
            }
            _ => {}
        }
    }

    if !spans.is_empty() {
        lines.push(Line::from(spans));
    }
    lines
}

/// First line of the content, cut to a fixed display width the way the
/// note list shows it.
fn content_preview(content: &str) -> String {
    let flat = content.replace('\n', " ");
    let mut width = 0;
    let mut out = String::new();

    for ch in flat.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + w > PREVIEW_CHARS {
            out.push_str("...");
            return out;
        }
        width += w;
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn content_preview_cuts_at_display_width() {
        assert_eq!(content_preview("short"), "short");

        let long = "a".repeat(40);
        let preview = content_preview(&long);
        assert_eq!(preview, format!("{}...", "a".repeat(30)));
    }

    #[test]
    fn content_preview_flattens_newlines() {
        assert_eq!(content_preview("one\ntwo"), "one two");
    }

    #[test]
    fn markdown_headings_and_bullets_become_lines() {
        let lines = markdown_lines("# Hello\n\n* first\n* second");
        let rendered: Vec<String> = lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect();

        assert!(rendered.contains(&String::from("Hello")));
        assert!(rendered.contains(&String::from("• first")));
        assert!(rendered.contains(&String::from("• second")));
    }

    #[test]
    fn inline_code_is_kept_verbatim() {
        let lines = markdown_lines("run `cargo build` now");
        let text: String = lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.contains("cargo build"));
    }
}
