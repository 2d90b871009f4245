use proptest::prelude::*;
use std::collections::HashSet;
use tasktrash_core::storage::MemoryStore;
use tasktrash_core::{AppError, Command, TodoApp};

#[derive(Debug, Clone)]
enum Step {
    Add(String),
    Toggle(usize),
    SelectAllToggle,
    DeleteSelected,
    DeleteOne(usize),
    Restore(usize),
    ClearTrash,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => "[ a-z]{0,6}".prop_map(Step::Add),
        2 => (0usize..8).prop_map(Step::Toggle),
        1 => Just(Step::SelectAllToggle),
        1 => Just(Step::DeleteSelected),
        2 => (0usize..8).prop_map(Step::DeleteOne),
        2 => (0usize..8).prop_map(Step::Restore),
        1 => Just(Step::ClearTrash),
    ]
}

/// Picks an id from everything ever created, so stale ids get exercised too.
fn pick(known: &[u64], index: usize) -> u64 {
    if known.is_empty() {
        0
    } else {
        known[index % known.len()]
    }
}

fn assert_invariants(app: &TodoApp<MemoryStore>) {
    let active: HashSet<_> = app.tasks().active().iter().map(|t| t.id).collect();
    let trash: HashSet<_> = app.tasks().trash().iter().map(|t| t.id).collect();

    assert_eq!(active.len(), app.tasks().active().len());
    assert_eq!(trash.len(), app.tasks().trash().len());
    assert!(active.is_disjoint(&trash));
    assert!(app.selection().ids().iter().all(|id| active.contains(id)));
    assert!(app.tasks().active().iter().all(|t| t.deleted_at.is_none()));
    assert!(app.tasks().trash().iter().all(|t| t.deleted_at.is_some()));
}

proptest! {
    #[test]
    fn lists_and_selection_stay_consistent(steps in prop::collection::vec(step(), 0..40)) {
        let mut app = TodoApp::open(MemoryStore::new());
        let mut known = Vec::new();

        for step in steps {
            let active_before = app.tasks().active().len();
            let trash_before = app.tasks().trash().len();
            let command = match step {
                Step::Add(text) => Command::AddTask(text),
                Step::Toggle(i) => Command::ToggleSelection(pick(&known, i)),
                Step::SelectAllToggle => Command::SelectAllToggle,
                Step::DeleteSelected => Command::DeleteSelected,
                Step::DeleteOne(i) => Command::DeleteOne(pick(&known, i)),
                Step::Restore(i) => Command::RestoreOne(pick(&known, i)),
                Step::ClearTrash => Command::ClearTrash,
            };
            let is_add = matches!(command, Command::AddTask(_));

            match app.dispatch(command) {
                Ok(tasktrash_core::Outcome::Added(task)) => {
                    known.push(task.id);
                    prop_assert_eq!(app.tasks().active().len(), active_before + 1);
                    prop_assert_eq!(app.tasks().trash().len(), trash_before);
                }
                Ok(_) => {}
                Err(AppError::InvalidInput(_)) => {
                    prop_assert!(is_add);
                    prop_assert_eq!(app.tasks().active().len(), active_before);
                    prop_assert_eq!(app.tasks().trash().len(), trash_before);
                }
                Err(err) => prop_assert!(false, "unexpected error: {}", err),
            }

            assert_invariants(&app);
        }
    }

    #[test]
    fn select_all_reports_all_selected_iff_nonempty(count in 0usize..6) {
        let mut app = TodoApp::open(MemoryStore::new());
        for n in 0..count {
            app.add_task(&format!("task {n}")).unwrap();
        }

        app.select_all();
        prop_assert_eq!(app.is_all_selected(), count > 0);

        app.deselect_all();
        prop_assert!(!app.is_all_selected());
    }
}
