use crate::models::Note;

/// Filters the collection down to the notes matching a free-text query.
///
/// A note matches when the query is a case-insensitive substring of its
/// title, its content, or any single tag. The result is an order-preserving
/// subsequence of `notes`, and an empty query matches everything. The
/// function mutates nothing and depends only on its inputs.
pub fn filter_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let needle = query.to_lowercase();

    notes
        .iter()
        .filter(|note| {
            note.title.to_lowercase().contains(&needle)
                || note.content.to_lowercase().contains(&needle)
                || note.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
        })
        .collect()
}
