mod file_store;
mod memory;

pub use file_store::{FileStore, store_path, store_path_override};
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::model::Task;
use log::{debug, warn};

pub const TODOS_KEY: &str = "todos";
pub const TRASH_KEY: &str = "trash";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError>;

    fn remove(&mut self, key: &str) -> Result<(), AppError>;
}

pub fn load_tasks<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Vec<Task> {
    match try_load_tasks(store, key) {
        Ok(tasks) => tasks,
        Err(err) => {
            warn!("record `{key}` unreadable, starting empty: {err}");
            Vec::new()
        }
    }
}

fn try_load_tasks<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Vec<Task>, AppError> {
    let Some(raw) = store.get(key)? else {
        debug!("record `{key}` absent");
        return Ok(Vec::new());
    };
    let tasks: Vec<Task> = serde_json::from_str(&raw)?;
    debug!("loaded {} task(s) from `{key}`", tasks.len());
    Ok(tasks)
}

pub fn save_tasks<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    tasks: &[Task],
) -> Result<(), AppError> {
    let raw = serde_json::to_string(tasks)?;
    store.set(key, &raw)?;
    debug!("saved {} task(s) to `{key}`", tasks.len());
    Ok(())
}
