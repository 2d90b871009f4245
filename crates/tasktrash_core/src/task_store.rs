use crate::error::AppError;
use crate::model::{Task, TaskId};
use crate::storage::{self, KeyValueStore, TODOS_KEY, TRASH_KEY};
use log::{debug, info, warn};
use std::collections::{BTreeSet, HashSet};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Default)]
struct IdGenerator {
    last: TaskId,
}

impl IdGenerator {
    fn seeded<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let last = tasks.into_iter().map(|task| task.id).max().unwrap_or(0);
        Self { last }
    }

    /// `None` once `TaskId::MAX` has been issued.
    fn next(&mut self, now: OffsetDateTime) -> Option<TaskId> {
        let after_last = self.last.checked_add(1)?;
        let millis = u64::try_from(now.unix_timestamp_nanos() / 1_000_000).unwrap_or(0);
        let id = millis.max(after_last);
        self.last = id;
        Some(id)
    }
}

#[derive(Debug)]
pub struct TaskStore<S> {
    store: S,
    active: Vec<Task>,
    trash: Vec<Task>,
    ids: IdGenerator,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn open(store: S) -> Self {
        let mut active = storage::load_tasks(&store, TODOS_KEY);
        let mut trash = storage::load_tasks(&store, TRASH_KEY);
        normalize(&mut active, &mut trash, OffsetDateTime::now_utc());
        let ids = IdGenerator::seeded(active.iter().chain(trash.iter()));

        debug!(
            "opened task store: {} active, {} trashed",
            active.len(),
            trash.len()
        );
        Self {
            store,
            active,
            trash,
            ids,
        }
    }

    pub fn create(&mut self, raw_text: &str) -> Result<Task, AppError> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(AppError::invalid_input("task text is required"));
        }

        let now = OffsetDateTime::now_utc();
        let id = match self.ids.next(now) {
            Some(id) => id,
            None => self.smallest_unused_id()?,
        };
        let task = Task::new(id, text, now);
        self.active.push(task.clone());
        self.persist_active()?;

        debug!("created task {}", task.id);
        Ok(task)
    }

    pub fn delete_one(&mut self, id: TaskId) -> Result<Option<Task>, AppError> {
        let Some(index) = self.active.iter().position(|task| task.id == id) else {
            debug!("delete ignored, task {id} is not active");
            return Ok(None);
        };

        let mut task = self.active.remove(index);
        task.mark_deleted(OffsetDateTime::now_utc());
        self.trash.push(task.clone());
        self.persist_both()?;

        Ok(Some(task))
    }

    pub fn delete_many(&mut self, ids: &BTreeSet<TaskId>) -> Result<Vec<Task>, AppError> {
        let now = OffsetDateTime::now_utc();
        let (moved, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|task| ids.contains(&task.id));
        self.active = kept;

        if moved.is_empty() {
            debug!("batch delete matched no active task");
            return Ok(moved);
        }

        let moved: Vec<Task> = moved
            .into_iter()
            .map(|mut task| {
                task.mark_deleted(now);
                task
            })
            .collect();
        self.trash.extend(moved.iter().cloned());
        self.persist_both()?;

        debug!("moved {} task(s) to trash", moved.len());
        Ok(moved)
    }

    pub fn restore(&mut self, id: TaskId) -> Result<Option<Task>, AppError> {
        let Some(index) = self.trash.iter().position(|task| task.id == id) else {
            debug!("restore ignored, task {id} is not in trash");
            return Ok(None);
        };

        let mut task = self.trash.remove(index);
        task.clear_deleted();
        self.active.push(task.clone());
        self.persist_both()?;

        Ok(Some(task))
    }

    pub fn purge_trash(&mut self) -> Result<usize, AppError> {
        let purged = self.trash.len();
        self.trash.clear();
        self.persist_trash()?;

        info!("purged {purged} task(s) from trash");
        Ok(purged)
    }

    pub fn active(&self) -> &[Task] {
        &self.active
    }

    pub fn trash(&self) -> &[Task] {
        &self.trash
    }

    pub fn active_recent_first(&self) -> impl Iterator<Item = &Task> {
        self.active.iter().rev()
    }

    pub fn trash_recent_first(&self) -> impl Iterator<Item = &Task> {
        self.trash.iter().rev()
    }

    pub fn active_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.active.iter().map(|task| task.id)
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.active.iter().any(|task| task.id == id)
    }

    pub fn is_trashed(&self, id: TaskId) -> bool {
        self.trash.iter().any(|task| task.id == id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn smallest_unused_id(&self) -> Result<TaskId, AppError> {
        let used: HashSet<TaskId> = self
            .active
            .iter()
            .chain(self.trash.iter())
            .map(|task| task.id)
            .collect();
        let id = (1..=TaskId::MAX)
            .find(|id| !used.contains(id))
            .ok_or_else(|| AppError::invalid_data("no task ids left"))?;
        warn!("task ids exhausted, reusing free id {id}");
        Ok(id)
    }

    fn persist_active(&mut self) -> Result<(), AppError> {
        storage::save_tasks(&mut self.store, TODOS_KEY, &self.active)
    }

    fn persist_trash(&mut self) -> Result<(), AppError> {
        storage::save_tasks(&mut self.store, TRASH_KEY, &self.trash)
    }

    fn persist_both(&mut self) -> Result<(), AppError> {
        self.persist_active()?;
        self.persist_trash()
    }
}

/// Repairs records that break the list invariants, favouring the active list.
fn normalize(active: &mut Vec<Task>, trash: &mut Vec<Task>, now: OffsetDateTime) {
    let mut seen = HashSet::new();

    active.retain(|task| {
        let first = seen.insert(task.id);
        if !first {
            warn!("dropping duplicate active task {}", task.id);
        }
        first
    });
    for task in active.iter_mut().filter(|task| task.is_trashed()) {
        warn!("active task {} carried deletedAt, clearing it", task.id);
        task.clear_deleted();
    }

    trash.retain(|task| {
        let first = seen.insert(task.id);
        if !first {
            warn!("dropping trashed task {} already present elsewhere", task.id);
        }
        first
    });
    for task in trash.iter_mut().filter(|task| !task.is_trashed()) {
        warn!("trashed task {} had no deletedAt, stamping it", task.id);
        task.mark_deleted(now);
    }
}
