use crate::model::TaskId;
use std::collections::BTreeSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<TaskId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: TaskId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn select_all<I>(&mut self, all_active_ids: I)
    where
        I: IntoIterator<Item = TaskId>,
    {
        self.ids = all_active_ids.into_iter().collect();
    }

    pub fn deselect_all(&mut self) {
        self.ids.clear();
    }

    /// An empty active list is never "all selected".
    pub fn is_all_selected(&self, active_count: usize) -> bool {
        active_count > 0 && self.ids.len() == active_count
    }

    pub fn remove(&mut self, id: TaskId) -> bool {
        self.ids.remove(&id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &BTreeSet<TaskId> {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::Selection;

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = Selection::new();

        assert!(selection.toggle(3));
        assert!(selection.contains(3));
        assert!(!selection.toggle(3));
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_replaces_previous_selection() {
        let mut selection = Selection::new();
        selection.toggle(99);

        selection.select_all([1, 2]);

        assert_eq!(selection.ids().iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert!(selection.is_all_selected(2));
    }

    #[test]
    fn partial_selection_is_not_all_selected() {
        let mut selection = Selection::new();
        selection.toggle(1);

        assert!(!selection.is_all_selected(2));
    }

    #[test]
    fn empty_list_is_never_all_selected() {
        let mut selection = Selection::new();
        selection.select_all(std::iter::empty());

        assert!(!selection.is_all_selected(0));

        selection.deselect_all();
        assert!(!selection.is_all_selected(0));
    }

    #[test]
    fn deselect_all_clears() {
        let mut selection = Selection::new();
        selection.select_all([1, 2, 3]);
        selection.deselect_all();

        assert!(selection.is_empty());
        assert!(!selection.is_all_selected(3));
    }
}
