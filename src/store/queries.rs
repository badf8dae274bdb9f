use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use super::Store;
use super::models::AppState;
use super::validate;
use crate::config::ThemeMode;

/// Fixed key under which the whole application state is stored.
pub const STATE_KEY: &str = "task-management-app";

/// Key for the light/dark preference, kept apart from the task data.
pub const THEME_KEY: &str = "checktabs-ui-theme";

impl Store {
    // ── Raw key-value access ──

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Application state ──

    /// Read the stored state. Returns `None` when nothing is stored or when
    /// the stored blob is unusable, in which case it is cleared so the next
    /// start doesn't trip over it again.
    pub fn load_state(&self) -> Option<AppState> {
        let text = match self.get(STATE_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("failed to read stored state: {e:#}");
                return None;
            }
        };

        match validate::parse_and_repair(&text, Utc::now()) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!("stored state is invalid, clearing it: {e}");
                if let Err(e) = self.remove(STATE_KEY) {
                    tracing::warn!("failed to clear invalid state: {e:#}");
                }
                None
            }
        }
    }

    /// Validate and write the state. A failed write clears the key rather
    /// than leaving a stale or half-written blob behind.
    pub fn save_state(&self, state: &AppState) -> Result<()> {
        let result = validate::check_invariants(state)
            .context("refusing to save an invalid state")
            .and_then(|()| serde_json::to_string(state).context("failed to serialize state"))
            .and_then(|json| self.set(STATE_KEY, &json));

        if result.is_err()
            && let Err(e) = self.remove(STATE_KEY)
        {
            tracing::warn!("failed to clear state after a failed save: {e:#}");
        }
        result
    }

    pub fn load_theme(&self) -> Option<ThemeMode> {
        self.get(THEME_KEY)
            .ok()
            .flatten()
            .and_then(|s| ThemeMode::parse(&s))
    }

    pub fn save_theme(&self, mode: ThemeMode) -> Result<()> {
        self.set(THEME_KEY, mode.as_str())
    }
}
