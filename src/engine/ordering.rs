//! Sidebar merging and the reorder protocol.
//!
//! Tabs and separators share one `order` space. The merged sequence is
//! derived here and split back into the two collections after a move.
//! Renumbering is 0-based and only the moved item gets a fresh `updated_at`.

use chrono::{DateTime, Utc};

use crate::store::{AppState, Separator, SidebarItem, Tab, Task};

/// Tabs then separators in array order, stable-sorted by `order`, so equal
/// orders keep their stored sequence.
pub fn sidebar_items(state: &AppState) -> Vec<SidebarItem<'_>> {
    let mut items: Vec<SidebarItem<'_>> = state
        .tabs
        .iter()
        .map(SidebarItem::Tab)
        .chain(state.separators.iter().map(SidebarItem::Separator))
        .collect();
    items.sort_by_key(SidebarItem::order);
    items
}

pub fn sorted_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by_key(|t| t.order);
    sorted
}

/// Split an order-sorted task view into (open, completed).
pub fn split_by_completion(tasks: &[Task]) -> (Vec<&Task>, Vec<&Task>) {
    sorted_tasks(tasks).into_iter().partition(|t| !t.completed)
}

/// Remove the element at `from` and reinsert it at `to`, the usual
/// drag-and-drop list move.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

enum Entry {
    Tab(Tab),
    Separator(Separator),
}

impl Entry {
    fn id(&self) -> &str {
        match self {
            Entry::Tab(t) => &t.id,
            Entry::Separator(s) => &s.id,
        }
    }
}

/// Move `moved_id` onto `target_id`'s position in the merged sidebar and
/// renumber every tab and separator.
pub fn reorder_sidebar(
    state: &AppState,
    moved_id: &str,
    target_id: &str,
    now: DateTime<Utc>,
) -> AppState {
    if moved_id == target_id {
        return state.clone();
    }

    let mut entries: Vec<Entry> = sidebar_items(state)
        .into_iter()
        .map(|item| match item {
            SidebarItem::Tab(t) => Entry::Tab(t.clone()),
            SidebarItem::Separator(s) => Entry::Separator(s.clone()),
        })
        .collect();

    let (Some(from), Some(to)) = (
        entries.iter().position(|e| e.id() == moved_id),
        entries.iter().position(|e| e.id() == target_id),
    ) else {
        return state.clone();
    };
    move_item(&mut entries, from, to);

    let mut next = state.clone();
    next.tabs.clear();
    next.separators.clear();
    for (index, entry) in entries.into_iter().enumerate() {
        match entry {
            Entry::Tab(mut tab) => {
                tab.order = index as i64;
                if tab.id == moved_id {
                    tab.updated_at = now;
                }
                next.tabs.push(tab);
            }
            Entry::Separator(mut sep) => {
                sep.order = index as i64;
                next.separators.push(sep);
            }
        }
    }
    next
}

/// Per-tab analogue of [`reorder_sidebar`]. Other tabs are left alone.
pub fn reorder_tasks(
    state: &AppState,
    tab_id: &str,
    moved_id: &str,
    target_id: &str,
    now: DateTime<Utc>,
) -> AppState {
    if moved_id == target_id {
        return state.clone();
    }

    let mut tasks: Vec<Task> = sorted_tasks(state.tasks_for(tab_id))
        .into_iter()
        .cloned()
        .collect();

    let (Some(from), Some(to)) = (
        tasks.iter().position(|t| t.id == moved_id),
        tasks.iter().position(|t| t.id == target_id),
    ) else {
        return state.clone();
    };
    move_item(&mut tasks, from, to);

    for (index, task) in tasks.iter_mut().enumerate() {
        task.order = index as i64;
        if task.id == moved_id {
            task.updated_at = now;
        }
    }

    let mut next = state.clone();
    next.tasks.insert(tab_id.to_string(), tasks);
    next
}

/// Id of the item `delta` steps away from `id` in `ids`, if any.
pub fn neighbor<'a>(ids: &[&'a str], id: &str, delta: isize) -> Option<&'a str> {
    let pos = ids.iter().position(|i| *i == id)?;
    let target = pos.checked_add_signed(delta)?;
    ids.get(target).copied()
}
