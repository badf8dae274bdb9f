//! Pure state transitions over [`AppState`].
//!
//! Every function takes the current state by reference and returns the next
//! one; the input is never touched. Ids that refer to nothing make the
//! operation a no-op, and so does blank text where a title or task text is
//! required.

pub mod intent;
pub mod ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::store::{AppState, Separator, SeparatorKind, SidebarItem, Tab, Task};

pub use intent::{Intent, apply};
pub use ordering::{reorder_sidebar, reorder_tasks, sidebar_items};

pub const DEFAULT_TAB_TITLE: &str = "New List";
pub const DEFAULT_SEPARATOR_TITLE: &str = "Separator";

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn new_tab(order: i64, now: DateTime<Utc>) -> Tab {
    Tab {
        id: new_id(),
        title: DEFAULT_TAB_TITLE.to_string(),
        created_at: now,
        updated_at: now,
        order,
        is_active: true,
    }
}

/// The state a fresh install starts from: one empty, active tab.
pub fn default_state(now: DateTime<Utc>) -> AppState {
    let tab = new_tab(0, now);
    let mut state = AppState {
        active_tab: Some(tab.id.clone()),
        ..AppState::default()
    };
    state.tasks.insert(tab.id.clone(), Vec::new());
    state.tabs.push(tab);
    state
}

// ── Tabs ──

pub fn add_tab(state: &AppState, now: DateTime<Utc>) -> AppState {
    let tab = new_tab(state.tabs.len() as i64, now);
    let mut next = state.clone();
    next.active_tab = Some(tab.id.clone());
    next.tasks.insert(tab.id.clone(), Vec::new());
    next.tabs.push(tab);
    next
}

/// Removes the tab and its task list together. A removed active tab hands
/// the selection to the first remaining tab.
pub fn remove_tab(state: &AppState, tab_id: &str) -> AppState {
    if state.tab(tab_id).is_none() {
        return state.clone();
    }

    let mut next = state.clone();
    next.tabs.retain(|t| t.id != tab_id);
    next.tasks.remove(tab_id);
    if next.active_tab.as_deref() == Some(tab_id) {
        next.active_tab = next.tabs.first().map(|t| t.id.clone());
    }
    next
}

pub fn rename_tab(state: &AppState, tab_id: &str, title: &str, now: DateTime<Utc>) -> AppState {
    let title = title.trim();
    let mut next = state.clone();
    if title.is_empty() {
        return next;
    }
    if let Some(tab) = next.tabs.iter_mut().find(|t| t.id == tab_id) {
        tab.title = title.to_string();
        tab.updated_at = now;
    }
    next
}

pub fn select_tab(state: &AppState, tab_id: &str) -> AppState {
    let mut next = state.clone();
    if state.tab(tab_id).is_some() {
        next.active_tab = Some(tab_id.to_string());
    }
    next
}

// ── Tasks ──

pub fn add_task(state: &AppState, tab_id: &str, text: &str, now: DateTime<Utc>) -> AppState {
    let text = text.trim();
    let mut next = state.clone();
    if text.is_empty() || state.tab(tab_id).is_none() {
        return next;
    }

    let tasks = next.tasks.entry(tab_id.to_string()).or_default();
    tasks.push(Task {
        id: new_id(),
        text: text.to_string(),
        completed: false,
        created_at: now,
        updated_at: now,
        order: tasks.len() as i64,
    });
    next
}

/// Run `f` on one task of one tab in a copy of `state`.
fn update_task(
    state: &AppState,
    tab_id: &str,
    task_id: &str,
    f: impl FnOnce(&mut Task),
) -> AppState {
    let mut next = state.clone();
    if let Some(task) = next
        .tasks
        .get_mut(tab_id)
        .and_then(|tasks| tasks.iter_mut().find(|t| t.id == task_id))
    {
        f(task);
    }
    next
}

pub fn toggle_task(state: &AppState, tab_id: &str, task_id: &str, now: DateTime<Utc>) -> AppState {
    update_task(state, tab_id, task_id, |task| {
        task.completed = !task.completed;
        task.updated_at = now;
    })
}

pub fn edit_task(
    state: &AppState,
    tab_id: &str,
    task_id: &str,
    text: &str,
    now: DateTime<Utc>,
) -> AppState {
    let text = text.trim();
    if text.is_empty() {
        return state.clone();
    }
    update_task(state, tab_id, task_id, |task| {
        task.text = text.to_string();
        task.updated_at = now;
    })
}

pub fn remove_task(state: &AppState, tab_id: &str, task_id: &str) -> AppState {
    let mut next = state.clone();
    if let Some(tasks) = next.tasks.get_mut(tab_id) {
        tasks.retain(|t| t.id != task_id);
    }
    next
}

/// Clears `completed` on every completed task of the tab. Tasks that were
/// already open keep their `updated_at`.
pub fn uncomplete_all(state: &AppState, tab_id: &str, now: DateTime<Utc>) -> AppState {
    let mut next = state.clone();
    if let Some(tasks) = next.tasks.get_mut(tab_id) {
        for task in tasks.iter_mut().filter(|t| t.completed) {
            task.completed = false;
            task.updated_at = now;
        }
    }
    next
}

// ── Separators ──

/// Appends a separator at the end of the sidebar.
pub fn add_separator(state: &AppState) -> AppState {
    let order = sidebar_items(state)
        .last()
        .map_or(0, |item| item.order() + 1)
        .max((state.tabs.len() + state.separators.len()) as i64);
    let mut next = state.clone();
    next.separators.push(Separator {
        id: new_id(),
        title: DEFAULT_SEPARATOR_TITLE.to_string(),
        order,
        kind: SeparatorKind::Separator,
    });
    next
}

pub fn remove_separator(state: &AppState, separator_id: &str) -> AppState {
    let mut next = state.clone();
    next.separators.retain(|s| s.id != separator_id);
    next
}

pub fn rename_separator(state: &AppState, separator_id: &str, title: &str) -> AppState {
    let title = title.trim();
    let mut next = state.clone();
    if title.is_empty() {
        return next;
    }
    if let Some(sep) = next.separators.iter_mut().find(|s| s.id == separator_id) {
        sep.title = title.to_string();
    }
    next
}

// ── Repair ──

/// Never leave the application without a tab, and keep the selection on an
/// existing tab (the first one in sidebar order when it has to move).
pub fn ensure_default_tab(state: &AppState, now: DateTime<Utc>) -> AppState {
    if state.tabs.is_empty() {
        tracing::info!("no tabs left, creating a default tab");
        let mut next = default_state(now);
        next.separators.clone_from(&state.separators);
        return next;
    }

    if state.active().is_some() {
        return state.clone();
    }

    let mut next = state.clone();
    next.active_tab = sidebar_items(state).into_iter().find_map(|item| match item {
        SidebarItem::Tab(t) => Some(t.id.clone()),
        SidebarItem::Separator(_) => None,
    });
    next
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Duration, Utc};

    pub fn at(secs: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::seconds(secs)
    }
}
