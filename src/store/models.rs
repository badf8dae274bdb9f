use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named task list shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub order: i64,
    /// Legacy per-tab flag. `AppState::active_tab` is the source of truth.
    #[serde(default)]
    pub is_active: bool,
}

/// Discriminant written as `"type": "separator"` so separators stay
/// distinguishable from tabs once both are merged into one sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorKind {
    #[default]
    Separator,
}

/// A non-selectable grouping label interleaved with tabs in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Separator {
    pub id: String,
    pub title: String,
    pub order: i64,
    #[serde(rename = "type", default)]
    pub kind: SeparatorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Position within the owning tab only.
    pub order: i64,
}

impl Task {
    pub fn symbol(&self) -> &'static str {
        if self.completed { "✓" } else { "☐" }
    }
}

/// The complete persisted snapshot: tabs, separators, selection and tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub tabs: Vec<Tab>,
    pub separators: Vec<Separator>,
    pub active_tab: Option<String>,
    pub tasks: BTreeMap<String, Vec<Task>>,
}

impl AppState {
    pub fn tab(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    /// Tasks of a tab, empty for unknown ids.
    pub fn tasks_for(&self, tab_id: &str) -> &[Task] {
        self.tasks.get(tab_id).map_or(&[], Vec::as_slice)
    }

    pub fn active(&self) -> Option<&Tab> {
        self.active_tab.as_deref().and_then(|id| self.tab(id))
    }
}

/// One entry of the merged tab/separator sequence. Derived on demand,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarItem<'a> {
    Tab(&'a Tab),
    Separator(&'a Separator),
}

impl<'a> SidebarItem<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            SidebarItem::Tab(t) => &t.id,
            SidebarItem::Separator(s) => &s.id,
        }
    }

    pub fn title(&self) -> &'a str {
        match self {
            SidebarItem::Tab(t) => &t.title,
            SidebarItem::Separator(s) => &s.title,
        }
    }

    pub fn order(&self) -> i64 {
        match self {
            SidebarItem::Tab(t) => t.order,
            SidebarItem::Separator(s) => s.order,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, SidebarItem::Separator(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn state_serializes_with_camel_case_fields() {
        let mut state = AppState {
            tabs: vec![Tab {
                id: "t1".into(),
                title: "Groceries".into(),
                created_at: ts(),
                updated_at: ts(),
                order: 0,
                is_active: true,
            }],
            separators: vec![Separator {
                id: "s1".into(),
                title: "Home".into(),
                order: 1,
                kind: SeparatorKind::Separator,
            }],
            active_tab: Some("t1".into()),
            tasks: BTreeMap::new(),
        };
        state.tasks.insert("t1".into(), vec![]);

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["activeTab"], "t1");
        assert_eq!(json["tabs"][0]["createdAt"], "2024-05-01T10:00:00Z");
        assert_eq!(json["tabs"][0]["isActive"], true);
        assert_eq!(json["separators"][0]["type"], "separator");
        assert!(json["tasks"]["t1"].as_array().unwrap().is_empty());
    }

    #[test]
    fn null_active_tab_deserializes_to_none() {
        let json = r#"{"tabs":[],"separators":[],"activeTab":null,"tasks":{}}"#;
        let state: AppState = serde_json::from_str(json).unwrap();
        assert!(state.active_tab.is_none());
    }

    #[test]
    fn separator_without_type_tag_still_parses() {
        let json = r#"{"id":"s1","title":"Work","order":3}"#;
        let sep: Separator = serde_json::from_str(json).unwrap();
        assert_eq!(sep.kind, SeparatorKind::Separator);
        assert_eq!(sep.order, 3);
    }

    #[test]
    fn tasks_for_unknown_tab_is_empty() {
        let state = AppState::default();
        assert!(state.tasks_for("missing").is_empty());
        assert!(state.active().is_none());
    }

    #[test]
    fn task_symbols() {
        let mut task = Task {
            id: "a".into(),
            text: "milk".into(),
            completed: false,
            created_at: ts(),
            updated_at: ts(),
            order: 0,
        };
        assert_eq!(task.symbol(), "\u{2610}");
        task.completed = true;
        assert_eq!(task.symbol(), "\u{2713}");
    }
}
