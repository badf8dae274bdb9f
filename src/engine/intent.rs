//! The single entry point through which the application changes state.

use chrono::{DateTime, Utc};

use super::ordering;
use crate::store::AppState;

/// Every user intent the core understands. Task-scoped intents always carry
/// the tab they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddTab,
    RemoveTab {
        tab_id: String,
    },
    RenameTab {
        tab_id: String,
        title: String,
    },
    SelectTab {
        tab_id: String,
    },
    AddTask {
        tab_id: String,
        text: String,
    },
    ToggleTask {
        tab_id: String,
        task_id: String,
    },
    RemoveTask {
        tab_id: String,
        task_id: String,
    },
    EditTask {
        tab_id: String,
        task_id: String,
        text: String,
    },
    UncompleteAll {
        tab_id: String,
    },
    AddSeparator,
    RemoveSeparator {
        separator_id: String,
    },
    RenameSeparator {
        separator_id: String,
        title: String,
    },
    ReorderSidebar {
        moved_id: String,
        target_id: String,
    },
    ReorderTasks {
        tab_id: String,
        moved_id: String,
        target_id: String,
    },
    /// Wholesale replacement, used by import.
    ReplaceState(AppState),
}

/// Compute the next state for `intent`. The result always has at least one
/// tab and a selection pointing at an existing tab.
pub fn apply(state: &AppState, intent: Intent, now: DateTime<Utc>) -> AppState {
    tracing::debug!(?intent, "applying intent");

    let next = match intent {
        Intent::AddTab => super::add_tab(state, now),
        Intent::RemoveTab { tab_id } => super::remove_tab(state, &tab_id),
        Intent::RenameTab { tab_id, title } => super::rename_tab(state, &tab_id, &title, now),
        Intent::SelectTab { tab_id } => super::select_tab(state, &tab_id),
        Intent::AddTask { tab_id, text } => super::add_task(state, &tab_id, &text, now),
        Intent::ToggleTask { tab_id, task_id } => {
            super::toggle_task(state, &tab_id, &task_id, now)
        }
        Intent::RemoveTask { tab_id, task_id } => super::remove_task(state, &tab_id, &task_id),
        Intent::EditTask {
            tab_id,
            task_id,
            text,
        } => super::edit_task(state, &tab_id, &task_id, &text, now),
        Intent::UncompleteAll { tab_id } => super::uncomplete_all(state, &tab_id, now),
        Intent::AddSeparator => super::add_separator(state),
        Intent::RemoveSeparator { separator_id } => super::remove_separator(state, &separator_id),
        Intent::RenameSeparator {
            separator_id,
            title,
        } => super::rename_separator(state, &separator_id, &title),
        Intent::ReorderSidebar {
            moved_id,
            target_id,
        } => ordering::reorder_sidebar(state, &moved_id, &target_id, now),
        Intent::ReorderTasks {
            tab_id,
            moved_id,
            target_id,
        } => ordering::reorder_tasks(state, &tab_id, &moved_id, &target_id, now),
        Intent::ReplaceState(replacement) => replacement,
    };

    super::ensure_default_tab(&next, now)
}
