use crate::handlers::speech::{TranscriptEvent, TranscriptionEngine, TranscriptionSession};
use crate::handlers::title::{ERROR_TITLE, FALLBACK_TITLE, TitleMessage, TitleSuggester};
use crate::models::{AppConfig, Note, NoteRepository, PersistentStore};
use crate::search::filter_notes;
use crate::selection::SelectionController;
use crate::ui;
use flume::Receiver;
use ratatui::Frame;
use tracing::debug;

/// Input Mode Enumeration
/// Determines where keystrokes go: list navigation, the search bar, one of
/// the three editor fields, or the delete confirmation dialog. The mode is
/// checked first by the key dispatcher and drives the bottom-bar hints.
#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Search,
    EditTitle,
    EditContent,
    EditTags,
    ConfirmDelete,
}

/// A title request in flight: the id handed to the worker and the note the
/// editor was on when the request started. Replies that match neither are
/// discarded instead of being applied to the wrong note.
#[derive(Debug, Clone, Copy)]
pub struct PendingTitle {
    pub request_id: u64,
    pub note_id: i64,
}

/// Main Application State Container
/// Holds everything the UI needs: the note repository (the only owner of
/// the collection), the selection controller, the transient search query,
/// the editor drafts, and the plumbing for the two asynchronous
/// collaborators. All mutations run synchronously inside the event loop;
/// the collaborators only ever talk back through channels drained by
/// [`App::tick`].
pub struct App {
    pub repository: NoteRepository,
    pub selection: SelectionController,
    pub config: AppConfig,

    pub search_query: String,
    pub input_mode: InputMode,

    // Editor drafts for the selected note. Committed by save_note.
    pub draft_title: String,
    pub draft_content: String,
    pub draft_tags: String,
    pub dirty: bool,

    pub error_message: Option<String>,
    pub success_message: Option<String>,
    pub needs_redraw: bool,

    pub suggester: TitleSuggester,
    pub pending_title: Option<PendingTitle>,
    pub ai_busy: bool,

    pub engine: Option<Box<dyn TranscriptionEngine>>,
    pub session: Option<Box<dyn TranscriptionSession>>,
    pub transcript_rx: Option<Receiver<TranscriptEvent>>,
    pub listening: bool,
}

impl App {
    /// Builds the application state from an opened store. The selection
    /// starts on the first note, or empty when the store is empty.
    pub fn new(
        store: PersistentStore,
        config: AppConfig,
        engine: Option<Box<dyn TranscriptionEngine>>,
    ) -> Self {
        let repository = NoteRepository::load(store, "notes");
        let selection = SelectionController::new(repository.first_id());

        let mut app = Self {
            repository,
            selection,
            config,
            search_query: String::new(),
            input_mode: InputMode::Normal,
            draft_title: String::new(),
            draft_content: String::new(),
            draft_tags: String::new(),
            dirty: false,
            error_message: None,
            success_message: None,
            needs_redraw: true,
            suggester: TitleSuggester::new(),
            pending_title: None,
            ai_busy: false,
            engine,
            session: None,
            transcript_rx: None,
            listening: false,
        };

        app.load_drafts();
        app
    }

    /// The notes matching the current search query, in canonical order.
    pub fn visible_notes(&self) -> Vec<&Note> {
        filter_notes(self.repository.list(), &self.search_query)
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.selection.selected().and_then(|id| self.repository.get(id))
    }

    /// Reloads the editor drafts from the selected note (or clears them).
    pub fn load_drafts(&mut self) {
        match self.selected_note() {
            Some(note) => {
                let (title, content, tags) =
                    (note.title.clone(), note.content.clone(), note.tags_line());
                self.draft_title = title;
                self.draft_content = content;
                self.draft_tags = tags;
            }
            None => {
                self.draft_title.clear();
                self.draft_content.clear();
                self.draft_tags.clear();
            }
        }
        self.dirty = false;
    }

    /// Switches the editor to another note. Any running transcription is
    /// stopped first so speech never leaks into the newly selected note.
    pub fn select_note(&mut self, id: i64) {
        self.stop_listening();
        self.selection.select(id);
        self.load_drafts();
        self.needs_redraw = true;
    }

    pub fn select_next(&mut self) {
        self.select_neighbor(1);
    }

    pub fn select_previous(&mut self) {
        self.select_neighbor(-1);
    }

    fn select_neighbor(&mut self, step: isize) {
        let visible: Vec<i64> = self.visible_notes().iter().map(|n| n.id).collect();
        if visible.is_empty() {
            return;
        }

        let target = match self
            .selection
            .selected()
            .and_then(|id| visible.iter().position(|&v| v == id))
        {
            Some(index) => {
                let len = visible.len() as isize;
                visible[((index as isize + step + len) % len) as usize]
            }
            // Selection is filtered out (or empty): start at the top.
            None => visible[0],
        };

        self.select_note(target);
    }

    /// Creates a new note, which becomes the selected one.
    pub fn create_note(&mut self) {
        self.stop_listening();
        let note = self.repository.create();
        self.selection.note_created(note.id);
        self.load_drafts();
        self.set_success_message("Note created".to_string());
        self.needs_redraw = true;
    }

    /// Deletes the selected note after confirmation and applies the
    /// selection reassignment rule.
    pub fn delete_selected(&mut self) {
        let Some(id) = self.selection.selected() else {
            return;
        };
        self.stop_listening();
        self.repository.delete(id);
        self.selection.note_deleted(id, self.repository.first_id());
        self.load_drafts();
        self.set_success_message("Note deleted".to_string());
        self.needs_redraw = true;
    }

    /// Commits the editor drafts to the repository.
    pub fn save_note(&mut self) {
        let Some(id) = self.selection.selected() else {
            self.set_error_message("No note selected".to_string());
            return;
        };

        let note = Note {
            id,
            title: self.draft_title.clone(),
            content: self.draft_content.clone(),
            tags: Note::parse_tags(&self.draft_tags),
        };

        match self.repository.update(note) {
            Ok(()) => {
                self.dirty = false;
                self.set_success_message("Note saved".to_string());
            }
            Err(e) => self.set_error_message(e.to_string()),
        }
        self.needs_redraw = true;
    }

    /// Asks the title endpoint for a suggestion based on the draft content.
    /// Short content resolves locally; a missing key resolves to the error
    /// title, matching the endpoint's own failure behavior.
    pub fn generate_title(&mut self) {
        let Some(note_id) = self.selection.selected() else {
            self.set_error_message("No note selected".to_string());
            return;
        };

        if self.draft_content.is_empty() {
            self.set_error_message("Write some content before generating a title".to_string());
            return;
        }

        if TitleSuggester::content_too_short(&self.draft_content) {
            self.draft_title = FALLBACK_TITLE.to_string();
            self.dirty = true;
            self.needs_redraw = true;
            return;
        }

        let Some(api_key) = self.config.api_key.clone() else {
            self.draft_title = ERROR_TITLE.to_string();
            self.dirty = true;
            self.set_error_message("No API key configured (set GEMINI_API_KEY)".to_string());
            return;
        };

        let request_id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;

        self.pending_title = Some(PendingTitle {
            request_id,
            note_id,
        });
        self.ai_busy = true;
        self.suggester.request(
            request_id,
            self.draft_content.clone(),
            api_key,
            self.config.model.clone(),
        );
    }

    /// Whether speech capture can be offered at all.
    pub fn transcription_available(&self) -> bool {
        self.engine.is_some()
    }

    /// Starts or stops speech capture into the draft content.
    pub fn toggle_listening(&mut self) {
        if self.listening {
            self.stop_listening();
            return;
        }

        if self.engine.is_some() && self.selection.selected().is_none() {
            self.set_error_message("No note selected".to_string());
            return;
        }
        let Some(engine) = &self.engine else {
            return;
        };

        let (tx, rx) = flume::unbounded();
        match engine.start(tx) {
            Ok(session) => {
                self.session = Some(session);
                self.transcript_rx = Some(rx);
                self.listening = true;
            }
            Err(e) => self.set_error_message(format!("Failed to start transcriber: {}", e)),
        }
        self.needs_redraw = true;
    }

    /// Explicit stop, issued on toggle-off and on every editing-context
    /// change (note switch, create, delete, quit).
    pub fn stop_listening(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        if self.listening {
            self.needs_redraw = true;
        }
        self.listening = false;
        self.transcript_rx = None;
    }

    /// Drains both collaborator channels. Called once per event-loop
    /// iteration; everything else in the app is synchronous.
    pub fn tick(&mut self) {
        self.process_title_messages();
        self.process_transcript_events();
    }

    fn process_title_messages(&mut self) {
        while let Some(message) = self.suggester.try_recv() {
            let Some(pending) = self.pending_title else {
                debug!("dropping title reply with no pending request");
                continue;
            };

            let reply_id = match &message {
                TitleMessage::Suggested { id, .. } | TitleMessage::Failed { id, .. } => *id,
            };
            if reply_id != pending.request_id {
                debug!(reply_id, "dropping stale title reply");
                continue;
            }

            self.pending_title = None;
            self.ai_busy = false;
            self.needs_redraw = true;

            // The editing context moved on while the request was in
            // flight; the suggestion no longer has a home.
            if self.selection.selected() != Some(pending.note_id) {
                debug!(note_id = pending.note_id, "discarding suggestion for a deselected note");
                continue;
            }

            match message {
                TitleMessage::Suggested { title, .. } => {
                    self.draft_title = title;
                    self.dirty = true;
                }
                TitleMessage::Failed { error, .. } => {
                    self.draft_title = ERROR_TITLE.to_string();
                    self.dirty = true;
                    self.set_error_message(error);
                }
            }
        }
    }

    fn process_transcript_events(&mut self) {
        let events: Vec<TranscriptEvent> = match &self.transcript_rx {
            Some(rx) => rx.try_iter().collect(),
            None => return,
        };
        if events.is_empty() {
            return;
        }

        for event in events {
            match event {
                TranscriptEvent::Fragment(text) => {
                    self.draft_content.push(' ');
                    self.draft_content.push_str(&text);
                    self.dirty = true;
                }
                TranscriptEvent::Ended => {
                    self.session = None;
                    self.transcript_rx = None;
                    self.listening = false;
                }
            }
        }
        self.needs_redraw = true;
    }

    pub fn set_error_message(&mut self, message: String) {
        self.error_message = Some(message);
        self.success_message = None;
        self.needs_redraw = true;
    }

    pub fn set_success_message(&mut self, message: String) {
        self.success_message = Some(message);
        self.error_message = None;
        self.needs_redraw = true;
    }

    pub fn clear_messages(&mut self) {
        if self.error_message.is_some() || self.success_message.is_some() {
            self.needs_redraw = true;
        }
        self.error_message = None;
        self.success_message = None;
    }

    /// Renders the whole screen, plus the delete confirmation overlay when
    /// one is pending.
    pub fn render(&mut self, frame: &mut Frame) {
        ui::notes::render(frame, self);
        if self.input_mode == InputMode::ConfirmDelete {
            ui::components::render_confirm_dialog(frame, self);
        }
    }
}
