use serde::{Deserialize, Serialize};

/// A single user-authored note.
///
/// Notes are the only persisted entity. The `id` is assigned once at
/// creation from a wall-clock-derived counter and never reassigned; it is
/// the sole stable handle for selection, update and delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Note {
    /// Creates an empty note carrying the placeholder title.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            title: String::from("New Note"),
            content: String::new(),
            tags: Vec::new(),
        }
    }

    /// Title for display purposes. An empty title renders as "Untitled".
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    /// Tags joined back into the single comma-separated line the editor shows.
    pub fn tags_line(&self) -> String {
        self.tags.join(", ")
    }

    /// Splits a comma-separated tag line into trimmed, non-empty tags.
    /// Duplicates are kept and order is preserved as entered.
    pub fn parse_tags(line: &str) -> Vec<String> {
        line.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }
}

/// The seed collection used when the storage slot is absent or corrupt.
pub fn welcome_notes(id: i64) -> Vec<Note> {
    vec![Note {
        id,
        title: String::from("Welcome!"),
        content: String::from(
            "# Hello!\n\nThis is your first note. It supports **Markdown**!\n\n\
             * Press `g` to generate a title from the content.\n\
             * Press `r` to dictate into the note.",
        ),
        tags: vec![String::from("welcome"), String::from("guide")],
    }]
}
