/// Tracks which single note is active in the editor.
///
/// Two states: selected (holding a note id) and unselected. The controller
/// never touches the collection itself; it only reacts to what the
/// repository reports. `select` does not validate the id — callers pass
/// ids taken from the currently visible list.
#[derive(Debug, Default)]
pub struct SelectionController {
    selected: Option<i64>,
}

impl SelectionController {
    pub fn new(initial: Option<i64>) -> Self {
        Self { selected: initial }
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    /// Explicit user selection. Unconditional.
    pub fn select(&mut self, id: i64) {
        self.selected = Some(id);
    }

    /// A freshly created note always becomes the active one.
    pub fn note_created(&mut self, id: i64) {
        self.selected = Some(id);
    }

    /// Reassignment rule for deletions: losing the active note moves the
    /// selection to the first remaining note, or clears it when the
    /// collection is empty. Deleting any other note changes nothing.
    pub fn note_deleted(&mut self, deleted: i64, first_remaining: Option<i64>) {
        if self.selected == Some(deleted) {
            self.selected = first_remaining;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_unselected_for_an_empty_store() {
        let selection = SelectionController::new(None);
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn starts_on_the_first_note_at_startup() {
        let selection = SelectionController::new(Some(7));
        assert_eq!(selection.selected(), Some(7));
    }

    #[test]
    fn select_is_unconditional() {
        let mut selection = SelectionController::new(None);
        selection.select(3);
        assert_eq!(selection.selected(), Some(3));
        selection.select(9);
        assert_eq!(selection.selected(), Some(9));
    }

    #[test]
    fn creation_selects_the_new_note() {
        let mut selection = SelectionController::new(Some(1));
        selection.note_created(2);
        assert_eq!(selection.selected(), Some(2));
    }

    #[test]
    fn deleting_the_selected_note_moves_to_first_remaining() {
        // Scenario: notes [1 "Welcome!", 2 "Shopping"], delete selected 1.
        let mut selection = SelectionController::new(Some(1));
        selection.note_deleted(1, Some(2));
        assert_eq!(selection.selected(), Some(2));
    }

    #[test]
    fn deleting_the_last_note_clears_the_selection() {
        let mut selection = SelectionController::new(Some(1));
        selection.note_deleted(1, None);
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn deleting_an_unselected_note_changes_nothing() {
        let mut selection = SelectionController::new(Some(1));
        selection.note_deleted(2, Some(1));
        assert_eq!(selection.selected(), Some(1));
    }
}
