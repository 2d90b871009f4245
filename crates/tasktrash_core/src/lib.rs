//! Task list with a recoverable trash, persisted to a per-origin key-value store.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod selection;
pub mod storage;
pub mod task_store;

pub use app::{Command, Outcome, Renderer, TodoApp, View};
pub use error::AppError;
pub use model::{Task, TaskId};
