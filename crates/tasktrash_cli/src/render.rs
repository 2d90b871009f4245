use std::io::Write;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasktrash_core::error::AppError;
use tasktrash_core::{Renderer, Task, TaskId, View};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const EMPTY_LIST_MESSAGE: &str = "No tasks yet. Add one to get started!";

#[derive(Tabled)]
struct ActiveRow {
    #[tabled(rename = "sel")]
    marker: &'static str,
    id: TaskId,
    text: String,
    created: String,
}

#[derive(Tabled)]
struct TrashRow {
    id: TaskId,
    text: String,
    deleted: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sections {
    All,
    TrashOnly,
}

pub struct TerminalRenderer<W> {
    out: W,
    sections: Sections,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, sections: Sections) -> Self {
        Self { out, sections }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_active(&mut self, view: &View<'_>) -> Result<(), AppError> {
        if view.active.is_empty() {
            writeln!(self.out, "{EMPTY_LIST_MESSAGE}")?;
            return Ok(());
        }

        writeln!(
            self.out,
            "Tasks: {}  Selected: {}  [{}]",
            view.active.len(),
            view.selected_count,
            view.select_all_label()
        )?;

        let rows = view.active.iter().map(|task| ActiveRow {
            marker: if view.is_selected(task.id) { "[x]" } else { "[ ]" },
            id: task.id,
            text: task.text.clone(),
            created: timestamp(task.created_at),
        });
        let mut table = Table::new(rows);
        table.with(Style::psql());
        writeln!(self.out, "{table}")?;
        Ok(())
    }

    fn render_trash(&mut self, view: &View<'_>) -> Result<(), AppError> {
        if !view.has_trash {
            if self.sections == Sections::TrashOnly {
                writeln!(self.out, "Trash is empty.")?;
            }
            return Ok(());
        }

        writeln!(self.out, "Trash ({})", view.trash.len())?;

        let rows = view.trash.iter().map(|task| TrashRow {
            id: task.id,
            text: task.text.clone(),
            deleted: task.deleted_at.map(timestamp).unwrap_or_default(),
        });
        let mut table = Table::new(rows);
        table.with(Style::psql());
        writeln!(self.out, "{table}")?;
        Ok(())
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, view: &View<'_>) -> Result<(), AppError> {
        if self.sections == Sections::All {
            self.render_active(view)?;
        }
        self.render_trash(view)?;
        self.out.flush()?;
        Ok(())
    }
}

fn timestamp(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}

pub fn task_json(task: &Task) -> serde_json::Value {
    serde_json::to_value(task).unwrap_or(serde_json::Value::Null)
}

pub fn tasks_json<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> serde_json::Value {
    serde_json::Value::Array(tasks.into_iter().map(task_json).collect())
}

pub fn view_json(view: &View<'_>, sections: Sections) -> serde_json::Value {
    let mut payload = serde_json::json!({
        "trash": tasks_json(view.trash.iter().copied()),
        "hasTrash": view.has_trash,
    });
    if sections == Sections::All {
        payload["todos"] = tasks_json(view.active.iter().copied());
        payload["selected"] = serde_json::json!(view.selected);
        payload["selectedCount"] = serde_json::json!(view.selected_count);
        payload["allSelected"] = serde_json::json!(view.all_selected);
    }
    payload
}
