//! Structural validation and repair of persisted or imported state.
//!
//! Anything that cannot be trusted structurally (wrong JSON shape, wrong
//! field types, duplicate ids) is rejected outright. Referential drift that
//! has an unambiguous fix (orphan task lists, a dangling `activeTab`, an
//! empty tab set) is repaired so the result always satisfies the model
//! invariants.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::models::AppState;
use crate::engine;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("state is not a JSON object")]
    NotAnObject,

    #[error("required field '{0}' is missing or null")]
    MissingField(&'static str),

    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("malformed state: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate id '{0}'")]
    DuplicateId(String),

    #[error("task list '{0}' has no matching tab")]
    OrphanTaskList(String),

    #[error("tab '{0}' has no task list")]
    MissingTaskList(String),

    #[error("active tab '{0}' does not exist")]
    DanglingActiveTab(String),

    #[error("state has no tabs")]
    NoTabs,
}

/// Check the top-level shape the way the stored blob has always been checked:
/// `tabs` and `separators` arrays plus a `tasks` object.
pub fn check_structure(value: &Value) -> Result<(), ValidationError> {
    let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;

    for field in ["tabs", "separators"] {
        match obj.get(field) {
            None | Some(Value::Null) => return Err(ValidationError::MissingField(field)),
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(ValidationError::WrongType {
                    field,
                    expected: "an array",
                });
            }
        }
    }

    match obj.get("tasks") {
        None | Some(Value::Null) => Err(ValidationError::MissingField("tasks")),
        Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(ValidationError::WrongType {
            field: "tasks",
            expected: "an object",
        }),
    }
}

/// Tab and separator ids share one namespace (they are reordered together);
/// task ids must be unique within their tab.
pub fn check_unique_ids(state: &AppState) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    let sidebar_ids = state
        .tabs
        .iter()
        .map(|t| t.id.as_str())
        .chain(state.separators.iter().map(|s| s.id.as_str()));
    for id in sidebar_ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId(id.to_string()));
        }
    }

    for tasks in state.tasks.values() {
        let mut seen = HashSet::new();
        for task in tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(ValidationError::DuplicateId(task.id.clone()));
            }
        }
    }
    Ok(())
}

/// Shape check, typed decode and id uniqueness. No repair.
pub fn decode(value: Value) -> Result<AppState, ValidationError> {
    check_structure(&value)?;
    let state: AppState = serde_json::from_value(value)?;
    check_unique_ids(&state)?;
    Ok(state)
}

/// Fix referential drift: drop task lists without a tab, give every tab a
/// list, then make sure a tab exists and the selection points at one.
pub fn repair(mut state: AppState, now: DateTime<Utc>) -> AppState {
    let tab_ids: HashSet<String> = state.tabs.iter().map(|t| t.id.clone()).collect();

    let before = state.tasks.len();
    state.tasks.retain(|id, _| tab_ids.contains(id));
    let dropped = before - state.tasks.len();
    if dropped > 0 {
        tracing::warn!("dropped {dropped} task list(s) with no matching tab");
    }

    for id in tab_ids {
        state.tasks.entry(id).or_default();
    }

    engine::ensure_default_tab(&state, now)
}

/// Decode `text` and repair it into a state satisfying every invariant.
pub fn parse_and_repair(text: &str, now: DateTime<Utc>) -> Result<AppState, ValidationError> {
    let value: Value = serde_json::from_str(text)?;
    let state = decode(value)?;
    Ok(repair(state, now))
}

/// Report the first broken invariant, if any.
pub fn check_invariants(state: &AppState) -> Result<(), ValidationError> {
    check_unique_ids(state)?;

    if state.tabs.is_empty() {
        return Err(ValidationError::NoTabs);
    }

    for key in state.tasks.keys() {
        if state.tab(key).is_none() {
            return Err(ValidationError::OrphanTaskList(key.clone()));
        }
    }
    for tab in &state.tabs {
        if !state.tasks.contains_key(&tab.id) {
            return Err(ValidationError::MissingTaskList(tab.id.clone()));
        }
    }

    if let Some(active) = &state.active_tab
        && state.tab(active).is_none()
    {
        return Err(ValidationError::DanglingActiveTab(active.clone()));
    }
    Ok(())
}
