use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

use super::app::ToastStyle;
use crate::config::ThemeMode;

/// Semantic colour theme for the entire TUI.
///
/// Two built-in palettes (dark and light); any colour can be overridden via
/// `[theme]` in `config.toml`.
#[derive(Debug, Clone)]
pub struct Theme {
    pub mode: ThemeMode,

    // ── Surface ───────────────────────────────────────────────
    pub background: Color,

    // ── Borders ───────────────────────────────────────────────
    pub border_focused: Color,
    pub border_unfocused: Color,

    // ── Text ──────────────────────────────────────────────────
    pub text_primary: Color,
    pub text_secondary: Color,
    pub accent: Color,

    // ── Sidebar ───────────────────────────────────────────────
    pub tab_active: Color,
    pub separator: Color,

    // ── Tasks ─────────────────────────────────────────────────
    pub task_open: Color,
    pub task_done: Color,

    // ── Toast ─────────────────────────────────────────────────
    pub toast_info: Color,
    pub toast_success: Color,
    pub toast_error: Color,

    // ── Misc ──────────────────────────────────────────────────
    pub selection_indicator: Color,
    pub moving: Color,
    pub form_highlight: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,
            background: Color::Reset,

            border_focused: Color::Cyan,
            border_unfocused: Color::DarkGray,

            text_primary: Color::White,
            text_secondary: Color::DarkGray,
            accent: Color::Cyan,

            tab_active: Color::Cyan,
            separator: Color::Yellow,

            task_open: Color::White,
            task_done: Color::DarkGray,

            toast_info: Color::Cyan,
            toast_success: Color::Green,
            toast_error: Color::Red,

            selection_indicator: Color::Cyan,
            moving: Color::Magenta,
            form_highlight: Color::Yellow,
        }
    }

    pub fn light() -> Self {
        Self {
            mode: ThemeMode::Light,
            background: Color::White,

            border_focused: Color::Blue,
            border_unfocused: Color::Gray,

            text_primary: Color::Black,
            text_secondary: Color::Gray,
            accent: Color::Blue,

            tab_active: Color::Blue,
            separator: Color::Rgb(160, 100, 0),

            task_open: Color::Black,
            task_done: Color::Gray,

            toast_info: Color::Blue,
            toast_success: Color::Green,
            toast_error: Color::Red,

            selection_indicator: Color::Blue,
            moving: Color::Magenta,
            form_highlight: Color::Rgb(160, 100, 0),
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    /// Base style painted under every panel.
    pub fn base(&self) -> Style {
        Style::default().bg(self.background).fg(self.text_primary)
    }

    /// Style for a focused panel border.
    pub fn focused_border(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    /// Style for an unfocused panel border.
    pub fn unfocused_border(&self) -> Style {
        Style::default().fg(self.border_unfocused)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            self.focused_border()
        } else {
            self.unfocused_border()
        }
    }

    /// Style for the tab the task panel is showing.
    pub fn tab_active_style(&self) -> Style {
        Style::default()
            .fg(self.tab_active)
            .add_modifier(Modifier::BOLD)
    }

    pub fn separator_style(&self) -> Style {
        Style::default()
            .fg(self.separator)
            .add_modifier(Modifier::BOLD)
    }

    pub fn task_style(&self, completed: bool) -> Style {
        if completed {
            Style::default()
                .fg(self.task_done)
                .add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default().fg(self.task_open)
        }
    }

    /// Style for the item picked up in move mode.
    pub fn moving_style(&self) -> Style {
        Style::default()
            .fg(self.moving)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    }

    /// Style for a toast notification.
    pub fn toast_style(&self, style: ToastStyle) -> Style {
        let color = match style {
            ToastStyle::Info => self.toast_info,
            ToastStyle::Success => self.toast_success,
            ToastStyle::Error => self.toast_error,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}

// ── Config deserialization ────────────────────────────────────────────

/// All-optional `[theme]` section of `config.toml`.
///
/// `mode` picks the starting palette; every other `Some` field overrides a
/// colour of whichever palette is active.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ThemeConfig {
    pub mode: Option<String>,

    pub border_focused: Option<String>,
    pub border_unfocused: Option<String>,

    pub text_primary: Option<String>,
    pub text_secondary: Option<String>,
    pub accent: Option<String>,

    pub tab_active: Option<String>,
    pub separator: Option<String>,

    pub task_open: Option<String>,
    pub task_done: Option<String>,

    pub toast_info: Option<String>,
    pub toast_success: Option<String>,
    pub toast_error: Option<String>,

    pub selection_indicator: Option<String>,
    pub moving: Option<String>,
    pub form_highlight: Option<String>,
}

/// Parse a colour string into a ratatui `Color`.
///
/// Supports named colours (`"cyan"`, `"red"`, `"dark_gray"`, etc.) and
/// `"rgb(R,G,B)"` syntax.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(inner) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        let mut channels = inner.split(',').map(|p| p.trim().parse::<u8>());
        let (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) = (
            channels.next(),
            channels.next(),
            channels.next(),
            channels.next(),
        ) else {
            return None;
        };
        return Some(Color::Rgb(r, g, b));
    }

    let lower = s.to_lowercase().replace('-', "_");
    match lower.as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "light_red" | "lightred" => Some(Color::LightRed),
        "light_green" | "lightgreen" => Some(Color::LightGreen),
        "light_yellow" | "lightyellow" => Some(Color::LightYellow),
        "light_blue" | "lightblue" => Some(Color::LightBlue),
        "light_magenta" | "lightmagenta" => Some(Color::LightMagenta),
        "light_cyan" | "lightcyan" => Some(Color::LightCyan),
        "white" => Some(Color::White),
        _ => None,
    }
}

fn apply(target: &mut Color, source: Option<&String>) {
    if let Some(s) = source
        && let Some(color) = parse_color(s)
    {
        *target = color;
    }
}

impl ThemeConfig {
    /// Mode requested in the config file, if it names a known one.
    pub fn mode(&self) -> Option<ThemeMode> {
        self.mode.as_deref().and_then(ThemeMode::parse)
    }

    /// Build the palette for `mode`, then apply any overrides.
    pub fn build(&self, mode: ThemeMode) -> Theme {
        let mut t = Theme::for_mode(mode);

        apply(&mut t.border_focused, self.border_focused.as_ref());
        apply(&mut t.border_unfocused, self.border_unfocused.as_ref());
        apply(&mut t.text_primary, self.text_primary.as_ref());
        apply(&mut t.text_secondary, self.text_secondary.as_ref());
        apply(&mut t.accent, self.accent.as_ref());
        apply(&mut t.tab_active, self.tab_active.as_ref());
        apply(&mut t.separator, self.separator.as_ref());
        apply(&mut t.task_open, self.task_open.as_ref());
        apply(&mut t.task_done, self.task_done.as_ref());
        apply(&mut t.toast_info, self.toast_info.as_ref());
        apply(&mut t.toast_success, self.toast_success.as_ref());
        apply(&mut t.toast_error, self.toast_error.as_ref());
        apply(
            &mut t.selection_indicator,
            self.selection_indicator.as_ref(),
        );
        apply(&mut t.moving, self.moving.as_ref());
        apply(&mut t.form_highlight, self.form_highlight.as_ref());

        t
    }
}
