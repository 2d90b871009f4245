use crate::error::AppError;
use crate::model::{Task, TaskId};
use crate::selection::Selection;
use crate::storage::KeyValueStore;
use crate::task_store::TaskStore;
use log::debug;
use std::collections::BTreeSet;

pub const SELECT_ALL_LABEL: &str = "Select All";
pub const DESELECT_ALL_LABEL: &str = "Deselect All";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddTask(String),
    ToggleSelection(TaskId),
    SelectAllToggle,
    DeleteSelected,
    DeleteOne(TaskId),
    RestoreOne(TaskId),
    ClearTrash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(Task),
    SelectionChanged { selected: usize },
    Deleted(Vec<Task>),
    Restored(Task),
    TrashCleared { purged: usize },
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View<'a> {
    /// Newest first.
    pub active: Vec<&'a Task>,
    /// Most recently deleted first.
    pub trash: Vec<&'a Task>,
    pub selected: &'a BTreeSet<TaskId>,
    pub selected_count: usize,
    pub all_selected: bool,
    pub has_trash: bool,
}

impl View<'_> {
    pub fn is_selected(&self, id: TaskId) -> bool {
        self.selected.contains(&id)
    }

    pub fn select_all_label(&self) -> &'static str {
        if self.all_selected {
            DESELECT_ALL_LABEL
        } else {
            SELECT_ALL_LABEL
        }
    }

    pub fn can_delete_selected(&self) -> bool {
        self.selected_count > 0
    }
}

pub trait Renderer {
    fn render(&mut self, view: &View<'_>) -> Result<(), AppError>;
}

#[derive(Debug)]
pub struct TodoApp<S> {
    tasks: TaskStore<S>,
    selection: Selection,
}

impl<S: KeyValueStore> TodoApp<S> {
    pub fn open(store: S) -> Self {
        Self {
            tasks: TaskStore::open(store),
            selection: Selection::new(),
        }
    }

    pub fn dispose(self) -> S {
        self.tasks.into_store()
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, AppError> {
        debug!("dispatch {command:?}");
        match command {
            Command::AddTask(text) => self.add_task(&text).map(Outcome::Added),
            Command::ToggleSelection(id) => Ok(self.toggle_selection(id)),
            Command::SelectAllToggle => Ok(self.select_all_toggle()),
            Command::DeleteSelected => self.delete_selected(),
            Command::DeleteOne(id) => Ok(match self.delete_one(id)? {
                Some(task) => Outcome::Deleted(vec![task]),
                None => Outcome::Ignored,
            }),
            Command::RestoreOne(id) => Ok(match self.restore(id)? {
                Some(task) => Outcome::Restored(task),
                None => Outcome::Ignored,
            }),
            Command::ClearTrash => self
                .clear_trash()
                .map(|purged| Outcome::TrashCleared { purged }),
        }
    }

    pub fn add_task(&mut self, raw_text: &str) -> Result<Task, AppError> {
        self.tasks.create(raw_text)
    }

    pub fn toggle_selection(&mut self, id: TaskId) -> Outcome {
        if !self.tasks.is_active(id) {
            debug!("toggle ignored, task {id} is not active");
            return Outcome::Ignored;
        }
        self.selection.toggle(id);
        self.selection_changed()
    }

    pub fn select_all_toggle(&mut self) -> Outcome {
        if self.is_all_selected() {
            self.selection.deselect_all();
        } else {
            self.selection.select_all(self.tasks.active_ids());
        }
        self.selection_changed()
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(self.tasks.active_ids());
    }

    pub fn deselect_all(&mut self) {
        self.selection.deselect_all();
    }

    pub fn is_all_selected(&self) -> bool {
        self.selection.is_all_selected(self.tasks.active().len())
    }

    pub fn delete_one(&mut self, id: TaskId) -> Result<Option<Task>, AppError> {
        let deleted = self.tasks.delete_one(id)?;
        if deleted.is_some() {
            self.selection.remove(id);
        }
        Ok(deleted)
    }

    pub fn delete_many(&mut self, ids: &BTreeSet<TaskId>) -> Result<Vec<Task>, AppError> {
        let deleted = self.tasks.delete_many(ids);
        self.selection.deselect_all();
        deleted
    }

    fn delete_selected(&mut self) -> Result<Outcome, AppError> {
        if self.selection.is_empty() {
            return Ok(Outcome::Ignored);
        }
        let ids = self.selection.ids().clone();
        self.delete_many(&ids).map(Outcome::Deleted)
    }

    pub fn restore(&mut self, id: TaskId) -> Result<Option<Task>, AppError> {
        self.tasks.restore(id)
    }

    pub fn clear_trash(&mut self) -> Result<usize, AppError> {
        self.tasks.purge_trash()
    }

    pub fn tasks(&self) -> &TaskStore<S> {
        &self.tasks
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn view(&self) -> View<'_> {
        View {
            active: self.tasks.active_recent_first().collect(),
            trash: self.tasks.trash_recent_first().collect(),
            selected: self.selection.ids(),
            selected_count: self.selection.len(),
            all_selected: self.is_all_selected(),
            has_trash: !self.tasks.trash().is_empty(),
        }
    }

    pub fn render_with<R: Renderer + ?Sized>(&self, renderer: &mut R) -> Result<(), AppError> {
        renderer.render(&self.view())
    }

    fn selection_changed(&self) -> Outcome {
        Outcome::SelectionChanged {
            selected: self.selection.len(),
        }
    }
}
