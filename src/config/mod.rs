use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::tui::theme::ThemeConfig;

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    /// Directory the TUI writes exports to. Default: current directory
    #[serde(default)]
    pub export_dir: Option<String>,
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Config {
    /// Where exports go when no explicit directory is given.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .as_deref()
            .map_or_else(|| PathBuf::from("."), expand_home)
    }
}

/// Light or dark palette. Cosmetic only, never part of the task state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Some(ThemeMode::Dark),
            "light" => Some(ThemeMode::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Returns the base config directory: `$CHECKTABS_HOME` or ~/.checktabs/
pub fn base_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("CHECKTABS_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".checktabs"))
}

/// Returns the path to the `SQLite` database
pub fn db_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("checktabs.db"))
}

/// Returns the path to the log file
pub fn log_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("checktabs.log"))
}

/// Ensure all required directories exist
pub fn ensure_dirs() -> Result<()> {
    let base = base_dir()?;
    fs::create_dir_all(&base)
        .with_context(|| format!("failed to create {}", base.display()))?;
    Ok(())
}

/// Load config from config.toml in the base directory (or return defaults if
/// it doesn't exist)
pub fn load() -> Result<Config> {
    let path = base_dir()?.join("config.toml");
    if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        parse(&content).with_context(|| format!("failed to parse {}", path.display()))
    } else {
        Ok(Config::default())
    }
}

fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = parse("").unwrap();
        assert!(cfg.export_dir.is_none());
        assert!(cfg.theme.mode.is_none());
        assert_eq!(cfg.export_dir(), PathBuf::from("."));
    }

    #[test]
    fn parses_export_dir_and_theme() {
        let cfg = parse(
            r#"
            export_dir = "/tmp/exports"

            [theme]
            mode = "light"
            accent = "rgb(10,20,30)"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.export_dir(), PathBuf::from("/tmp/exports"));
        assert_eq!(cfg.theme.mode.as_deref(), Some("light"));
        assert_eq!(cfg.theme.accent.as_deref(), Some("rgb(10,20,30)"));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(parse("export_dir = [").is_err());
    }

    #[test]
    fn theme_mode_parse_and_toggle() {
        assert_eq!(ThemeMode::parse("Dark"), Some(ThemeMode::Dark));
        assert_eq!(ThemeMode::parse(" light "), Some(ThemeMode::Light));
        assert_eq!(ThemeMode::parse("solarized"), None);
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
        assert_eq!(ThemeMode::Light.toggled().as_str(), "dark");
    }
}
