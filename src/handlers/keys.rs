//! Keyboard Input Handling Module
//!
//! Translates terminal key events into application state changes. The
//! dispatcher routes by input mode first (search bar, editor fields,
//! confirmation dialog) and falls through to the normal-mode bindings.

use crate::app::{App, InputMode};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Main keyboard event handler and dispatcher. Returns true when the
/// application should quit.
pub fn handle_key_events(key: KeyEvent, app: &mut App) -> bool {
    if app.input_mode != InputMode::Normal {
        return handle_input_mode_keys(key, app);
    }

    match key.code {
        KeyCode::Char('q') => true,

        KeyCode::Down | KeyCode::Char('j') => {
            app.clear_messages();
            app.select_next();
            false
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.clear_messages();
            app.select_previous();
            false
        }

        KeyCode::Char('n') => {
            app.clear_messages();
            app.create_note();
            false
        }

        KeyCode::Char('d') => {
            if app.selection.selected().is_some() {
                app.clear_messages();
                app.input_mode = InputMode::ConfirmDelete;
                app.needs_redraw = true;
            }
            false
        }

        KeyCode::Char('/') => {
            app.clear_messages();
            app.input_mode = InputMode::Search;
            app.needs_redraw = true;
            false
        }

        KeyCode::Char('t') => {
            if app.selection.selected().is_some() {
                app.input_mode = InputMode::EditTitle;
                app.needs_redraw = true;
            }
            false
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if app.selection.selected().is_some() {
                app.input_mode = InputMode::EditContent;
                app.needs_redraw = true;
            }
            false
        }
        KeyCode::Char('#') => {
            if app.selection.selected().is_some() {
                app.input_mode = InputMode::EditTags;
                app.needs_redraw = true;
            }
            false
        }

        KeyCode::Char('s') => {
            app.save_note();
            false
        }

        KeyCode::Char('g') => {
            app.clear_messages();
            app.generate_title();
            false
        }

        KeyCode::Char('r') => {
            if app.transcription_available() {
                app.clear_messages();
                app.toggle_listening();
            }
            false
        }

        _ => false,
    }
}

/// Keystrokes while the search bar, an editor field, or the delete
/// confirmation owns the input.
fn handle_input_mode_keys(key: KeyEvent, app: &mut App) -> bool {
    match app.input_mode {
        InputMode::Search => match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                // The query survives leaving the search bar.
                app.input_mode = InputMode::Normal;
                app.needs_redraw = true;
                false
            }
            KeyCode::Backspace => {
                app.search_query.pop();
                app.needs_redraw = true;
                false
            }
            KeyCode::Char(c) => {
                app.search_query.push(c);
                app.needs_redraw = true;
                false
            }
            _ => false,
        },

        InputMode::EditTitle => {
            let mut field = std::mem::take(&mut app.draft_title);
            let handled = edit_single_line(key, app, &mut field);
            app.draft_title = field;
            handled
        }
        InputMode::EditTags => {
            let mut field = std::mem::take(&mut app.draft_tags);
            let handled = edit_single_line(key, app, &mut field);
            app.draft_tags = field;
            handled
        }

        InputMode::EditContent => match key.code {
            KeyCode::Esc => {
                app.input_mode = InputMode::Normal;
                app.needs_redraw = true;
                false
            }
            KeyCode::Enter => {
                app.draft_content.push('\n');
                app.dirty = true;
                app.needs_redraw = true;
                false
            }
            KeyCode::Backspace => {
                app.draft_content.pop();
                app.dirty = true;
                app.needs_redraw = true;
                false
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.save_note();
                false
            }
            KeyCode::Char(c) => {
                app.draft_content.push(c);
                app.dirty = true;
                app.needs_redraw = true;
                false
            }
            _ => false,
        },

        InputMode::ConfirmDelete => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                app.input_mode = InputMode::Normal;
                app.delete_selected();
                false
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                app.input_mode = InputMode::Normal;
                app.needs_redraw = true;
                false
            }
            _ => false,
        },

        InputMode::Normal => false,
    }
}

fn edit_single_line(key: KeyEvent, app: &mut App, field: &mut String) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.needs_redraw = true;
        }
        KeyCode::Backspace => {
            field.pop();
            app.dirty = true;
            app.needs_redraw = true;
        }
        KeyCode::Char(c) => {
            field.push(c);
            app.dirty = true;
            app.needs_redraw = true;
        }
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppConfig, Note, PersistentStore};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app(dir: &std::path::Path) -> App {
        let store = PersistentStore::with_dir(dir);
        store.save(
            "notes",
            &vec![
                Note {
                    id: 1,
                    title: String::from("Welcome!"),
                    content: String::from("hello there"),
                    tags: vec![],
                },
                Note {
                    id: 2,
                    title: String::from("Shopping"),
                    content: String::from("Buy milk and eggs"),
                    tags: vec![String::from("errands")],
                },
            ],
        );
        App::new(store, AppConfig::default(), None)
    }

    #[test]
    fn q_quits_from_normal_mode() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        assert!(handle_key_events(press(KeyCode::Char('q')), &mut app));
    }

    #[test]
    fn n_creates_and_selects_a_note() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());

        handle_key_events(press(KeyCode::Char('n')), &mut app);

        assert_eq!(app.repository.list().len(), 3);
        assert_eq!(app.selection.selected(), app.repository.first_id());
    }

    #[test]
    fn delete_flow_requires_confirmation() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());

        handle_key_events(press(KeyCode::Char('d')), &mut app);
        assert_eq!(app.input_mode, InputMode::ConfirmDelete);
        assert_eq!(app.repository.list().len(), 2);

        handle_key_events(press(KeyCode::Char('y')), &mut app);
        assert_eq!(app.repository.list().len(), 1);
        assert_eq!(app.selection.selected(), Some(2));
    }

    #[test]
    fn delete_can_be_cancelled() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());

        handle_key_events(press(KeyCode::Char('d')), &mut app);
        handle_key_events(press(KeyCode::Esc), &mut app);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.repository.list().len(), 2);
    }

    #[test]
    fn search_mode_types_into_the_query() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());

        handle_key_events(press(KeyCode::Char('/')), &mut app);
        for c in "milk".chars() {
            handle_key_events(press(KeyCode::Char(c)), &mut app);
        }

        assert_eq!(app.search_query, "milk");
        assert_eq!(app.visible_notes().len(), 1);

        handle_key_events(press(KeyCode::Esc), &mut app);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.search_query, "milk", "query survives leaving the bar");
    }

    #[test]
    fn title_editing_updates_the_draft() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());

        handle_key_events(press(KeyCode::Char('t')), &mut app);
        handle_key_events(press(KeyCode::Backspace), &mut app);
        handle_key_events(press(KeyCode::Char('?')), &mut app);
        handle_key_events(press(KeyCode::Enter), &mut app);

        assert_eq!(app.draft_title, "Welcome?");
        assert!(app.dirty);
        // Not committed until save.
        assert_eq!(app.repository.get(1).unwrap().title, "Welcome!");
    }

    #[test]
    fn content_editing_supports_newlines_and_ctrl_s() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());

        handle_key_events(press(KeyCode::Char('e')), &mut app);
        handle_key_events(press(KeyCode::Enter), &mut app);
        handle_key_events(press(KeyCode::Char('x')), &mut app);
        handle_key_events(
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL),
            &mut app,
        );

        assert_eq!(app.repository.get(1).unwrap().content, "hello there\nx");
        assert!(!app.dirty);
    }

    #[test]
    fn navigation_keys_move_the_selection() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());

        handle_key_events(press(KeyCode::Char('j')), &mut app);
        assert_eq!(app.selection.selected(), Some(2));

        handle_key_events(press(KeyCode::Char('k')), &mut app);
        assert_eq!(app.selection.selected(), Some(1));
    }

    #[test]
    fn record_key_is_inert_without_an_engine() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());

        handle_key_events(press(KeyCode::Char('r')), &mut app);
        assert!(!app.listening);
    }
}
