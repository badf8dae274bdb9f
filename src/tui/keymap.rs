use crossterm::event::{KeyCode, KeyModifiers};

// ── Actions ──────────────────────────────────────────────────────────

/// Every discrete action the TUI can perform in response to a key press.
///
/// Actions are context-free identifiers; the *execution* code in `App`
/// decides what actually happens based on the current focus / state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Global
    Quit,
    ShowHelp,
    ToggleTheme,

    // Navigation
    FocusSidebar,
    FocusTasks,
    ToggleFocus,
    MoveUp,
    MoveDown,

    // Sidebar
    Select,
    AddTab,
    AddSeparator,
    Rename,
    DeleteItem,

    // Tasks
    NewTask,
    EditTask,
    ToggleTask,
    UncompleteAll,

    // Ordering
    PickUp,
    ShiftDown,
    ShiftUp,

    // Data
    Export,
    Import,
}

// ── Help categories ──────────────────────────────────────────────────

/// Logical groupings shown in the help overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelpCategory {
    Navigation,
    Sidebar,
    Tasks,
    Ordering,
    Data,
}

impl HelpCategory {
    fn label(self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::Sidebar => "Lists & separators",
            Self::Tasks => "Tasks",
            Self::Ordering => "Reordering",
            Self::Data => "Data",
        }
    }

    /// Fixed display order for the help overlay.
    const ORDERED: &[Self] = &[
        Self::Navigation,
        Self::Sidebar,
        Self::Tasks,
        Self::Ordering,
        Self::Data,
    ];
}

// ── Keybinding ───────────────────────────────────────────────────────

/// A single key → action mapping with metadata for the help overlay.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: Action,
    /// Key label shown in help (e.g. `"J/K"`). Empty for aliases.
    pub label: &'static str,
    pub description: &'static str,
    pub category: HelpCategory,
}

/// A single row in the help overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub label: &'static str,
    pub description: &'static str,
}

// ── KeyMap ────────────────────────────────────────────────────────────

/// Declarative registry of the normal-mode key bindings.
///
/// Prompt and move-mode keys (Enter, Esc, text editing) are handled by
/// the mode itself and never reach this table.
pub struct KeyMap {
    pub normal: Vec<KeyBinding>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            normal: default_normal_bindings(),
        }
    }
}

impl KeyMap {
    pub fn lookup(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        // Terminals report shifted letters with or without SHIFT; ignore it
        // for characters so `J` matches either way.
        let modifiers = match code {
            KeyCode::Char(_) => modifiers - KeyModifiers::SHIFT,
            _ => modifiers,
        };
        self.normal
            .iter()
            .find(|kb| kb.code == code && kb.modifiers == modifiers)
            .map(|kb| kb.action)
    }

    /// Label of the first binding for `action`, for inline hints.
    pub fn label_for(&self, action: Action) -> Option<&'static str> {
        self.normal
            .iter()
            .find(|kb| kb.action == action && !kb.label.is_empty())
            .map(|kb| kb.label.trim())
    }

    /// Grouped help entries in display order.
    pub fn help_entries(&self) -> Vec<(&'static str, Vec<HelpEntry>)> {
        let mut out = Vec::new();

        for &cat in HelpCategory::ORDERED {
            let mut entries: Vec<HelpEntry> = Vec::new();
            for kb in &self.normal {
                if kb.category == cat
                    && !kb.description.is_empty()
                    && !entries.iter().any(|e| e.label == kb.label)
                {
                    entries.push(HelpEntry {
                        label: kb.label,
                        description: kb.description,
                    });
                }
            }

            // Move-mode keys live inside the mode, not the table.
            if cat == HelpCategory::Ordering {
                entries.extend([
                    HelpEntry {
                        label: "  Enter",
                        description: "Drop moved item onto selection",
                    },
                    HelpEntry {
                        label: "  Esc",
                        description: "Cancel move",
                    },
                ]);
            }

            if !entries.is_empty() {
                out.push((cat.label(), entries));
            }
        }

        out
    }
}

// ── Default bindings ─────────────────────────────────────────────────

fn bind(
    code: KeyCode,
    action: Action,
    label: &'static str,
    description: &'static str,
    category: HelpCategory,
) -> KeyBinding {
    KeyBinding {
        code,
        modifiers: KeyModifiers::NONE,
        action,
        label,
        description,
        category,
    }
}

/// Alias binding: same action, hidden from help.
fn alias(code: KeyCode, modifiers: KeyModifiers, action: Action) -> KeyBinding {
    KeyBinding {
        code,
        modifiers,
        action,
        label: "",
        description: "",
        category: HelpCategory::Navigation,
    }
}

#[allow(clippy::enum_glob_use)]
fn default_normal_bindings() -> Vec<KeyBinding> {
    use Action::*;
    use HelpCategory::*;
    use KeyCode::Char;

    vec![
        // ── Navigation ───────────────────────────────────────────
        bind(Char('j'), MoveDown, "  j/k", "Navigate up/down", Navigation),
        bind(Char('k'), MoveUp, "", "", Navigation),
        alias(KeyCode::Down, KeyModifiers::NONE, MoveDown),
        alias(KeyCode::Up, KeyModifiers::NONE, MoveUp),
        bind(Char('h'), FocusSidebar, "  h/l", "Focus lists / tasks", Navigation),
        bind(Char('l'), FocusTasks, "", "", Navigation),
        alias(KeyCode::Left, KeyModifiers::NONE, FocusSidebar),
        alias(KeyCode::Right, KeyModifiers::NONE, FocusTasks),
        bind(KeyCode::Tab, ToggleFocus, "  Tab", "Switch panel", Navigation),
        bind(Char('?'), ShowHelp, "  ?", "This help screen", Navigation),
        bind(Char('q'), Quit, "  q", "Quit", Navigation),
        alias(Char('c'), KeyModifiers::CONTROL, Quit),
        // ── Sidebar ──────────────────────────────────────────────
        bind(KeyCode::Enter, Select, "  Enter", "Open list / toggle task", Sidebar),
        bind(Char('a'), AddTab, "  a", "Add list", Sidebar),
        bind(Char('s'), AddSeparator, "  s", "Add separator", Sidebar),
        bind(Char('r'), Rename, "  r", "Rename list or separator", Sidebar),
        bind(Char('d'), DeleteItem, "  d", "Delete selected item", Sidebar),
        // ── Tasks ────────────────────────────────────────────────
        bind(Char('n'), NewTask, "  n", "New task", Tasks),
        bind(Char('e'), EditTask, "  e", "Edit task", Tasks),
        bind(Char(' '), ToggleTask, "  Space", "Toggle done", Tasks),
        bind(Char('u'), UncompleteAll, "  u", "Uncheck all tasks", Tasks),
        // ── Ordering ─────────────────────────────────────────────
        bind(Char('m'), PickUp, "  m", "Pick up item to move", Ordering),
        bind(Char('J'), ShiftDown, "  J/K", "Shift item down/up", Ordering),
        bind(Char('K'), ShiftUp, "", "", Ordering),
        // ── Data ─────────────────────────────────────────────────
        bind(Char('x'), Export, "  x", "Export to JSON", Data),
        bind(Char('i'), Import, "  i", "Import from JSON", Data),
        bind(Char('t'), ToggleTheme, "  t", "Toggle light/dark", Data),
    ]
}

// ── Tests ────────────────────────────────────────────────────────────
