use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Local, Utc};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::DefaultTerminal;

use crate::config::{self, Config};
use crate::engine::{self, Intent, ordering};
use crate::store::{AppState, SidebarItem, Store, Task};
use crate::transfer;

use super::event::{self, AppEvent};
use super::form::TextInput;
use super::keymap::{Action, KeyMap};
use super::theme::Theme;
use super::ui;

const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Tasks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    NewTask,
    EditTask,
    RenameTab,
    RenameSeparator,
    Import,
    ConfirmDelete,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStyle {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub style: ToastStyle,
    shown_at: Instant,
}

/// Item picked up with `m`, dropped onto the selection with Enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moving {
    pub id: String,
    pub focus: Focus,
}

pub struct App {
    pub store: Store,
    pub config: Config,
    pub keymap: KeyMap,
    pub theme: Theme,
    pub state: AppState,
    pub should_quit: bool,
    pub focus: Focus,
    pub input_mode: InputMode,

    // Selection indices into the sidebar and the visible task list
    pub sidebar_index: usize,
    pub task_index: usize,

    pub input: TextInput,
    /// Tab, separator or task the open prompt or confirmation acts on.
    pub target_id: Option<String>,
    pub moving: Option<Moving>,
    pub toast: Option<Toast>,
}

impl App {
    pub fn new(store: Store, config: Config) -> Self {
        let state = store
            .load_state()
            .unwrap_or_else(|| engine::default_state(Utc::now()));
        let mode = store
            .load_theme()
            .or_else(|| config.theme.mode())
            .unwrap_or_default();
        let theme = config.theme.build(mode);

        let mut app = App {
            store,
            config,
            keymap: KeyMap::default(),
            theme,
            state,
            should_quit: false,
            focus: Focus::Sidebar,
            input_mode: InputMode::Normal,
            sidebar_index: 0,
            task_index: 0,
            input: TextInput::new(),
            target_id: None,
            moving: None,
            toast: None,
        };
        app.sidebar_index = app.active_sidebar_index();
        app.save();
        app
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let tick_rate = Duration::from_millis(250);

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            match event::poll(tick_rate)? {
                AppEvent::Key(key) => self.handle_key(key.code, key.modifiers),
                AppEvent::Resize => {}
                AppEvent::Tick => self.expire_toast(),
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    // ── Derived views ──

    pub fn sidebar(&self) -> Vec<SidebarItem<'_>> {
        engine::sidebar_items(&self.state)
    }

    pub fn selected_sidebar_item(&self) -> Option<SidebarItem<'_>> {
        self.sidebar().into_iter().nth(self.sidebar_index)
    }

    pub fn active_tab_id(&self) -> Option<String> {
        self.state.active().map(|t| t.id.clone())
    }

    /// Tasks of the active tab: open ones first, then completed, each in
    /// `order`.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        let Some(tab) = self.state.active() else {
            return Vec::new();
        };
        let (mut open, completed) = ordering::split_by_completion(self.state.tasks_for(&tab.id));
        open.extend(completed);
        open
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.task_index).copied()
    }

    fn active_sidebar_index(&self) -> usize {
        let active = self.state.active_tab.as_deref();
        self.sidebar()
            .iter()
            .position(|item| Some(item.id()) == active)
            .unwrap_or(0)
    }

    fn select_sidebar_id(&mut self, id: &str) {
        if let Some(pos) = self.sidebar().iter().position(|item| item.id() == id) {
            self.sidebar_index = pos;
        }
    }

    fn select_task_id(&mut self, id: &str) {
        if let Some(pos) = self.visible_tasks().iter().position(|t| t.id == id) {
            self.task_index = pos;
        }
    }

    fn clamp_indices(&mut self) {
        let sidebar_len = self.sidebar().len();
        self.sidebar_index = self.sidebar_index.min(sidebar_len.saturating_sub(1));
        let task_len = self.visible_tasks().len();
        self.task_index = self.task_index.min(task_len.saturating_sub(1));
    }

    // ── State changes ──

    /// Run `intent` through the engine and persist the result.
    pub fn dispatch(&mut self, intent: Intent) {
        let next = engine::apply(&self.state, intent, Utc::now());
        if next == self.state {
            return;
        }
        self.state = next;
        self.save();
        self.clamp_indices();
    }

    fn save(&mut self) {
        if let Err(e) = self.store.save_state(&self.state) {
            tracing::warn!("failed to save state: {e:#}");
            self.show_toast("Could not save changes", ToastStyle::Error);
        }
    }

    pub fn show_toast(&mut self, message: impl Into<String>, style: ToastStyle) {
        self.toast = Some(Toast {
            message: message.into(),
            style,
            shown_at: Instant::now(),
        });
    }

    fn expire_toast(&mut self) {
        if self
            .toast
            .as_ref()
            .is_some_and(|t| t.shown_at.elapsed() >= TOAST_TTL)
        {
            self.toast = None;
        }
    }

    // ── Key handling ──

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(code, modifiers),
            InputMode::ConfirmDelete => self.handle_confirm_delete_key(code),
            InputMode::Help => self.input_mode = InputMode::Normal,
            InputMode::NewTask
            | InputMode::EditTask
            | InputMode::RenameTab
            | InputMode::RenameSeparator
            | InputMode::Import => self.handle_prompt_key(code, modifiers),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if self.moving.is_some() {
            match code {
                KeyCode::Enter => {
                    self.drop_moving();
                    return;
                }
                KeyCode::Esc => {
                    self.moving = None;
                    return;
                }
                _ => {}
            }
        }

        let Some(action) = self.keymap.lookup(code, modifiers) else {
            return;
        };

        if self.moving.is_some() && !matches!(action, Action::MoveUp | Action::MoveDown | Action::Quit) {
            return;
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::ShowHelp => self.input_mode = InputMode::Help,
            Action::ToggleTheme => self.toggle_theme(),

            Action::FocusSidebar => self.focus = Focus::Sidebar,
            Action::FocusTasks => self.focus = Focus::Tasks,
            Action::ToggleFocus => {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Tasks,
                    Focus::Tasks => Focus::Sidebar,
                };
            }
            Action::MoveUp => self.move_selection(-1),
            Action::MoveDown => self.move_selection(1),

            Action::Select => match self.focus {
                Focus::Sidebar => self.open_selected(),
                Focus::Tasks => self.toggle_selected_task(),
            },
            Action::AddTab => self.add_tab(),
            Action::AddSeparator => self.add_separator(),
            Action::Rename => match self.focus {
                Focus::Sidebar => self.start_rename(),
                Focus::Tasks => self.start_edit_task(),
            },
            Action::DeleteItem => match self.focus {
                Focus::Sidebar => self.delete_sidebar_item(),
                Focus::Tasks => self.delete_selected_task(),
            },

            Action::NewTask => {
                self.focus = Focus::Tasks;
                self.open_prompt(InputMode::NewTask, None, "");
            }
            Action::EditTask => self.start_edit_task(),
            Action::ToggleTask => {
                if self.focus == Focus::Tasks {
                    self.toggle_selected_task();
                }
            }
            Action::UncompleteAll => self.uncomplete_all(),

            Action::PickUp => self.pick_up(),
            Action::ShiftDown => self.shift_selected(1),
            Action::ShiftUp => self.shift_selected(-1),

            Action::Export => self.export(),
            Action::Import => self.open_prompt(InputMode::Import, None, ""),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        match self.focus {
            Focus::Sidebar => {
                let len = self.sidebar().len();
                self.sidebar_index = step(self.sidebar_index, delta, len);
                // Cursor on a tab opens it, unless an item is being carried.
                if self.moving.is_none()
                    && let Some(SidebarItem::Tab(tab)) = self.selected_sidebar_item()
                {
                    let tab_id = tab.id.clone();
                    self.dispatch(Intent::SelectTab { tab_id });
                    self.task_index = 0;
                }
            }
            Focus::Tasks => {
                let len = self.visible_tasks().len();
                self.task_index = step(self.task_index, delta, len);
            }
        }
    }

    fn open_selected(&mut self) {
        if let Some(SidebarItem::Tab(tab)) = self.selected_sidebar_item() {
            let tab_id = tab.id.clone();
            self.dispatch(Intent::SelectTab { tab_id });
            self.task_index = 0;
            self.focus = Focus::Tasks;
        }
    }

    // ── Sidebar ──

    fn add_tab(&mut self) {
        self.dispatch(Intent::AddTab);
        self.focus = Focus::Sidebar;
        self.sidebar_index = self.active_sidebar_index();
        self.task_index = 0;
        if let Some(tab) = self.state.active() {
            let (id, title) = (tab.id.clone(), tab.title.clone());
            self.open_prompt(InputMode::RenameTab, Some(id), &title);
        }
    }

    fn add_separator(&mut self) {
        self.dispatch(Intent::AddSeparator);
        self.focus = Focus::Sidebar;
        if let Some(id) = self.state.separators.last().map(|s| s.id.clone()) {
            self.select_sidebar_id(&id);
        }
    }

    fn start_rename(&mut self) {
        let Some(item) = self.selected_sidebar_item() else {
            return;
        };
        let mode = if item.is_separator() {
            InputMode::RenameSeparator
        } else {
            InputMode::RenameTab
        };
        let (id, title) = (item.id().to_string(), item.title().to_string());
        self.open_prompt(mode, Some(id), &title);
    }

    fn delete_sidebar_item(&mut self) {
        match self.selected_sidebar_item() {
            Some(SidebarItem::Tab(tab)) => {
                self.target_id = Some(tab.id.clone());
                self.input_mode = InputMode::ConfirmDelete;
            }
            Some(SidebarItem::Separator(sep)) => {
                let separator_id = sep.id.clone();
                self.dispatch(Intent::RemoveSeparator { separator_id });
            }
            None => {}
        }
    }

    fn handle_confirm_delete_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
                if let Some(tab_id) = self.target_id.take() {
                    let title = self
                        .state
                        .tab(&tab_id)
                        .map(|t| t.title.clone())
                        .unwrap_or_default();
                    self.dispatch(Intent::RemoveTab { tab_id });
                    self.sidebar_index = self.active_sidebar_index();
                    self.task_index = 0;
                    self.show_toast(format!("Deleted \"{title}\""), ToastStyle::Info);
                }
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                self.target_id = None;
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    // ── Tasks ──

    fn toggle_selected_task(&mut self) {
        let (Some(tab_id), Some(task_id)) =
            (self.active_tab_id(), self.selected_task().map(|t| t.id.clone()))
        else {
            return;
        };
        self.dispatch(Intent::ToggleTask { tab_id, task_id });
    }

    fn start_edit_task(&mut self) {
        if let Some(task) = self.selected_task() {
            let (id, text) = (task.id.clone(), task.text.clone());
            self.focus = Focus::Tasks;
            self.open_prompt(InputMode::EditTask, Some(id), &text);
        }
    }

    fn delete_selected_task(&mut self) {
        let (Some(tab_id), Some(task_id)) =
            (self.active_tab_id(), self.selected_task().map(|t| t.id.clone()))
        else {
            return;
        };
        self.dispatch(Intent::RemoveTask { tab_id, task_id });
    }

    fn uncomplete_all(&mut self) {
        let Some(tab_id) = self.active_tab_id() else {
            return;
        };
        let done = self.state.tasks_for(&tab_id).iter().filter(|t| t.completed).count();
        if done == 0 {
            return;
        }
        self.dispatch(Intent::UncompleteAll { tab_id });
        self.show_toast(format!("Unchecked {done} tasks"), ToastStyle::Info);
    }

    // ── Ordering ──

    fn pick_up(&mut self) {
        let id = match self.focus {
            Focus::Sidebar => self.selected_sidebar_item().map(|i| i.id().to_string()),
            Focus::Tasks => self.selected_task().map(|t| t.id.clone()),
        };
        self.moving = id.map(|id| Moving {
            id,
            focus: self.focus,
        });
    }

    fn drop_moving(&mut self) {
        let Some(moving) = self.moving.take() else {
            return;
        };
        match moving.focus {
            Focus::Sidebar => {
                let Some(target_id) = self.selected_sidebar_item().map(|i| i.id().to_string())
                else {
                    return;
                };
                self.dispatch(Intent::ReorderSidebar {
                    moved_id: moving.id.clone(),
                    target_id,
                });
                self.select_sidebar_id(&moving.id);
            }
            Focus::Tasks => {
                let (Some(tab_id), Some(target)) = (self.active_tab_id(), self.selected_task())
                else {
                    return;
                };
                let target_id = target.id.clone();
                let same_section = self
                    .visible_tasks()
                    .iter()
                    .find(|t| t.id == moving.id)
                    .is_some_and(|t| t.completed == target.completed);
                if !same_section {
                    self.show_toast(
                        "Tasks can only move within their own section",
                        ToastStyle::Info,
                    );
                    return;
                }
                self.dispatch(Intent::ReorderTasks {
                    tab_id,
                    moved_id: moving.id.clone(),
                    target_id,
                });
                self.select_task_id(&moving.id);
            }
        }
    }

    /// Swap the selected item with its neighbour in the displayed order.
    fn shift_selected(&mut self, delta: isize) {
        match self.focus {
            Focus::Sidebar => {
                let pair = {
                    let items = self.sidebar();
                    let ids: Vec<&str> = items.iter().map(SidebarItem::id).collect();
                    ids.get(self.sidebar_index).and_then(|&id| {
                        ordering::neighbor(&ids, id, delta).map(|t| (id.to_string(), t.to_string()))
                    })
                };
                if let Some((moved_id, target_id)) = pair {
                    self.dispatch(Intent::ReorderSidebar {
                        moved_id: moved_id.clone(),
                        target_id,
                    });
                    self.select_sidebar_id(&moved_id);
                }
            }
            Focus::Tasks => {
                let Some(tab_id) = self.active_tab_id() else {
                    return;
                };
                // Neighbours come from the selected task's own section; a
                // shift never crosses the open/completed boundary.
                let pair = self.selected_task().and_then(|selected| {
                    let tasks = self.visible_tasks();
                    let ids: Vec<&str> = tasks
                        .iter()
                        .filter(|t| t.completed == selected.completed)
                        .map(|t| t.id.as_str())
                        .collect();
                    ordering::neighbor(&ids, &selected.id, delta)
                        .map(|t| (selected.id.clone(), t.to_string()))
                });
                if let Some((moved_id, target_id)) = pair {
                    self.dispatch(Intent::ReorderTasks {
                        tab_id,
                        moved_id: moved_id.clone(),
                        target_id,
                    });
                    self.select_task_id(&moved_id);
                }
            }
        }
    }

    // ── Prompts ──

    fn open_prompt(&mut self, mode: InputMode, target: Option<String>, text: &str) {
        self.input = TextInput::with_text(text);
        self.target_id = target;
        self.input_mode = mode;
    }

    fn close_prompt(&mut self) {
        self.input.clear();
        self.target_id = None;
        self.input_mode = InputMode::Normal;
    }

    fn handle_prompt_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match code {
            KeyCode::Esc => self.close_prompt(),
            KeyCode::Enter => self.submit_prompt(),
            _ => {
                self.input.handle_key(code, modifiers);
            }
        }
    }

    fn submit_prompt(&mut self) {
        let text = self.input.take();
        let target = self.target_id.take();
        let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);

        match (mode, target) {
            (InputMode::NewTask, _) => {
                let Some(tab_id) = self.active_tab_id() else {
                    return;
                };
                if text.trim().is_empty() {
                    return;
                }
                self.dispatch(Intent::AddTask {
                    tab_id: tab_id.clone(),
                    text,
                });
                if let Some(id) = self.state.tasks_for(&tab_id).last().map(|t| t.id.clone()) {
                    self.select_task_id(&id);
                }
                // Stay in the prompt for the next task.
                self.input_mode = InputMode::NewTask;
            }
            (InputMode::EditTask, Some(task_id)) => {
                if let Some(tab_id) = self.active_tab_id() {
                    self.dispatch(Intent::EditTask {
                        tab_id,
                        task_id,
                        text,
                    });
                }
            }
            (InputMode::RenameTab, Some(tab_id)) => {
                self.dispatch(Intent::RenameTab {
                    tab_id,
                    title: text,
                });
            }
            (InputMode::RenameSeparator, Some(separator_id)) => {
                self.dispatch(Intent::RenameSeparator {
                    separator_id,
                    title: text,
                });
            }
            (InputMode::Import, _) => self.import(text.trim()),
            _ => {}
        }
    }

    // ── Data ──

    fn toggle_theme(&mut self) {
        let mode = self.theme.mode.toggled();
        self.theme = self.config.theme.build(mode);
        if let Err(e) = self.store.save_theme(mode) {
            tracing::warn!("failed to save theme preference: {e:#}");
        }
    }

    fn export(&mut self) {
        let dir = self.config.export_dir();
        match transfer::export_to_dir(&self.state, &dir, Local::now().date_naive()) {
            Ok(path) => {
                self.show_toast(format!("Exported to {}", path.display()), ToastStyle::Success);
            }
            Err(e) => {
                tracing::warn!("export failed: {e:#}");
                self.show_toast(format!("Export failed: {e}"), ToastStyle::Error);
            }
        }
    }

    fn import(&mut self, path: &str) {
        if path.is_empty() {
            return;
        }
        match transfer::import_file(&config::expand_home(path), Utc::now()) {
            Ok(state) => {
                let lists = state.tabs.len();
                self.dispatch(Intent::ReplaceState(state));
                self.sidebar_index = self.active_sidebar_index();
                self.task_index = 0;
                self.show_toast(format!("Imported {lists} lists"), ToastStyle::Success);
            }
            Err(e) => {
                tracing::warn!("import of {path} failed: {e}");
                self.show_toast(format!("Import failed: {e}"), ToastStyle::Error);
            }
        }
    }
}

/// Move `index` by `delta` within `0..len`, clamping at both ends.
fn step(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    index.saturating_add_signed(delta).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeMode;

    fn app() -> App {
        App::new(Store::open_in_memory().unwrap(), Config::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(code, KeyModifiers::NONE);
    }

    fn key(app: &mut App, c: char) {
        press(app, KeyCode::Char(c));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            key(app, c);
        }
    }

    fn add_tasks(app: &mut App, texts: &[&str]) {
        key(app, 'n');
        for text in texts {
            type_text(app, text);
            press(app, KeyCode::Enter);
        }
        press(app, KeyCode::Esc);
    }

    fn visible_texts(app: &App) -> Vec<String> {
        app.visible_tasks().iter().map(|t| t.text.clone()).collect()
    }

    fn sidebar_titles(app: &App) -> Vec<String> {
        app.sidebar().iter().map(|i| i.title().to_string()).collect()
    }

    #[test]
    fn starts_with_default_tab_and_persists_it() {
        let app = app();
        assert_eq!(app.state.tabs.len(), 1);
        assert_eq!(app.state.tabs[0].title, engine::DEFAULT_TAB_TITLE);
        assert_eq!(app.store.load_state(), Some(app.state.clone()));
        assert_eq!(app.theme.mode, ThemeMode::Dark);
    }

    #[test]
    fn new_task_prompt_adds_and_stays_open() {
        let mut app = app();
        add_tasks(&mut app, &["milk", "eggs"]);

        assert_eq!(visible_texts(&app), ["milk", "eggs"]);
        assert_eq!(app.focus, Focus::Tasks);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.task_index, 1);
        assert_eq!(app.store.load_state(), Some(app.state.clone()));
    }

    #[test]
    fn blank_task_closes_prompt_without_adding() {
        let mut app = app();
        key(&mut app, 'n');
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.visible_tasks().is_empty());
    }

    #[test]
    fn toggled_task_moves_to_completed_section() {
        let mut app = app();
        add_tasks(&mut app, &["milk", "eggs"]);
        key(&mut app, 'k');
        assert_eq!(app.selected_task().unwrap().text, "milk");

        key(&mut app, ' ');
        assert_eq!(visible_texts(&app), ["eggs", "milk"]);
        assert!(app.visible_tasks()[1].completed);

        key(&mut app, 'u');
        assert!(app.visible_tasks().iter().all(|t| !t.completed));
        assert_eq!(visible_texts(&app), ["milk", "eggs"]);
    }

    #[test]
    fn edit_and_delete_task() {
        let mut app = app();
        add_tasks(&mut app, &["mlik"]);
        key(&mut app, 'e');
        assert_eq!(app.input_mode, InputMode::EditTask);
        app.handle_key(KeyCode::Char('u'), KeyModifiers::CONTROL);
        type_text(&mut app, "milk");
        press(&mut app, KeyCode::Enter);
        assert_eq!(visible_texts(&app), ["milk"]);

        key(&mut app, 'd');
        assert!(app.visible_tasks().is_empty());
    }

    #[test]
    fn escape_cancels_prompt() {
        let mut app = app();
        add_tasks(&mut app, &["milk"]);
        key(&mut app, 'e');
        type_text(&mut app, " and bread");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(visible_texts(&app), ["milk"]);
    }

    #[test]
    fn add_tab_opens_rename_prompt() {
        let mut app = app();
        key(&mut app, 'a');
        assert_eq!(app.input_mode, InputMode::RenameTab);
        assert_eq!(app.input.value(), engine::DEFAULT_TAB_TITLE);

        app.handle_key(KeyCode::Char('u'), KeyModifiers::CONTROL);
        type_text(&mut app, "Groceries");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state.tabs.len(), 2);
        assert_eq!(app.state.active().unwrap().title, "Groceries");
        assert_eq!(app.sidebar_index, 1);
    }

    #[test]
    fn moving_cursor_in_sidebar_opens_tab() {
        let mut app = app();
        let first = app.active_tab_id().unwrap();
        key(&mut app, 'a');
        press(&mut app, KeyCode::Esc);
        assert_ne!(app.active_tab_id().unwrap(), first);

        key(&mut app, 'k');
        assert_eq!(app.active_tab_id().unwrap(), first);
        assert_eq!(app.sidebar_index, 0);
    }

    #[test]
    fn deleting_tab_requires_confirmation() {
        let mut app = app();
        key(&mut app, 'a');
        press(&mut app, KeyCode::Esc);

        key(&mut app, 'd');
        assert_eq!(app.input_mode, InputMode::ConfirmDelete);
        key(&mut app, 'n');
        assert_eq!(app.state.tabs.len(), 2);

        key(&mut app, 'd');
        key(&mut app, 'y');
        assert_eq!(app.state.tabs.len(), 1);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.toast.is_some());
    }

    #[test]
    fn deleting_last_tab_leaves_a_fresh_one() {
        let mut app = app();
        let original = app.active_tab_id().unwrap();
        key(&mut app, 'd');
        key(&mut app, 'y');

        assert_eq!(app.state.tabs.len(), 1);
        assert_ne!(app.active_tab_id().unwrap(), original);
        assert_eq!(app.store.load_state(), Some(app.state.clone()));
    }

    #[test]
    fn separator_can_be_renamed_shifted_and_removed() {
        let mut app = app();
        key(&mut app, 's');
        assert_eq!(sidebar_titles(&app), ["New List", "Separator"]);
        assert_eq!(app.sidebar_index, 1);

        key(&mut app, 'r');
        assert_eq!(app.input_mode, InputMode::RenameSeparator);
        app.handle_key(KeyCode::Char('u'), KeyModifiers::CONTROL);
        type_text(&mut app, "Work");
        press(&mut app, KeyCode::Enter);

        key(&mut app, 'K');
        assert_eq!(sidebar_titles(&app), ["Work", "New List"]);
        assert_eq!(app.sidebar_index, 0);
        let orders: Vec<i64> = app.sidebar().iter().map(SidebarItem::order).collect();
        assert_eq!(orders, [0, 1]);

        key(&mut app, 'd');
        assert_eq!(sidebar_titles(&app), ["New List"]);
    }

    #[test]
    fn move_mode_drops_task_onto_target() {
        let mut app = app();
        add_tasks(&mut app, &["one", "two", "three"]);
        key(&mut app, 'k');
        key(&mut app, 'k');
        key(&mut app, 'm');
        assert!(app.moving.is_some());

        // other actions are ignored while carrying an item
        key(&mut app, 'n');
        assert_eq!(app.input_mode, InputMode::Normal);

        key(&mut app, 'j');
        key(&mut app, 'j');
        press(&mut app, KeyCode::Enter);

        assert!(app.moving.is_none());
        assert_eq!(visible_texts(&app), ["two", "three", "one"]);
        assert_eq!(app.selected_task().unwrap().text, "one");
    }

    #[test]
    fn move_mode_escape_cancels() {
        let mut app = app();
        add_tasks(&mut app, &["one", "two"]);
        key(&mut app, 'm');
        key(&mut app, 'k');
        press(&mut app, KeyCode::Esc);
        assert!(app.moving.is_none());
        assert_eq!(visible_texts(&app), ["one", "two"]);
    }

    #[test]
    fn shift_task_down() {
        let mut app = app();
        add_tasks(&mut app, &["one", "two"]);
        key(&mut app, 'k');
        app.handle_key(KeyCode::Char('J'), KeyModifiers::SHIFT);
        assert_eq!(visible_texts(&app), ["two", "one"]);
        assert_eq!(app.task_index, 1);
    }

    fn complete(app: &mut App, text: &str) {
        let id = app
            .visible_tasks()
            .iter()
            .find(|t| t.text == text)
            .map(|t| t.id.clone())
            .unwrap();
        let tab_id = app.active_tab_id().unwrap();
        app.dispatch(Intent::ToggleTask { tab_id, task_id: id });
    }

    #[test]
    fn move_mode_rejects_drop_across_sections() {
        let mut app = app();
        add_tasks(&mut app, &["A", "B", "C", "D"]);
        complete(&mut app, "C");
        complete(&mut app, "D");
        assert_eq!(visible_texts(&app), ["A", "B", "C", "D"]);
        let before = app.state.clone();

        app.task_index = 0;
        key(&mut app, 'm');
        app.task_index = 3;
        press(&mut app, KeyCode::Enter);

        assert!(app.moving.is_none());
        assert_eq!(app.state, before);
        assert_eq!(visible_texts(&app), ["A", "B", "C", "D"]);
        assert_eq!(app.toast.as_ref().unwrap().style, ToastStyle::Info);
    }

    #[test]
    fn move_mode_within_completed_section() {
        let mut app = app();
        add_tasks(&mut app, &["A", "B", "C", "D"]);
        complete(&mut app, "C");
        complete(&mut app, "D");

        app.task_index = 3;
        key(&mut app, 'm');
        app.task_index = 2;
        press(&mut app, KeyCode::Enter);

        assert_eq!(visible_texts(&app), ["A", "B", "D", "C"]);
        assert_eq!(app.selected_task().unwrap().text, "D");
    }

    #[test]
    fn shift_stops_at_section_boundary() {
        let mut app = app();
        add_tasks(&mut app, &["A", "B", "C"]);
        complete(&mut app, "C");
        let before = app.state.clone();

        app.task_index = 1;
        app.handle_key(KeyCode::Char('J'), KeyModifiers::SHIFT);
        assert_eq!(app.state, before);
        assert_eq!(app.task_index, 1);

        app.task_index = 2;
        app.handle_key(KeyCode::Char('K'), KeyModifiers::SHIFT);
        assert_eq!(app.state, before);
        assert_eq!(visible_texts(&app), ["A", "B", "C"]);
    }

    #[test]
    fn theme_toggle_is_persisted() {
        let mut app = app();
        key(&mut app, 't');
        assert_eq!(app.theme.mode, ThemeMode::Light);
        assert_eq!(app.store.load_theme(), Some(ThemeMode::Light));
    }

    #[test]
    fn export_then_import_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            export_dir: Some(dir.path().to_string_lossy().into_owned()),
            ..Config::default()
        };
        let mut app = App::new(Store::open_in_memory().unwrap(), config);
        add_tasks(&mut app, &["milk"]);

        key(&mut app, 'x');
        assert_eq!(app.toast.as_ref().unwrap().style, ToastStyle::Success);
        let exported = app.state.clone();
        let path = std::fs::read_dir(dir.path())
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();

        add_tasks(&mut app, &["eggs"]);
        assert_ne!(app.state, exported);

        key(&mut app, 'i');
        assert_eq!(app.input_mode, InputMode::Import);
        type_text(&mut app, &path.to_string_lossy());
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state, exported);
        assert_eq!(app.toast.as_ref().unwrap().style, ToastStyle::Success);
    }

    #[test]
    fn import_of_missing_file_shows_error() {
        let mut app = app();
        let before = app.state.clone();
        key(&mut app, 'i');
        type_text(&mut app, "/definitely/not/here.json");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, before);
        assert_eq!(app.toast.as_ref().unwrap().style, ToastStyle::Error);
    }

    #[test]
    fn import_without_tasks_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{"tabs": [], "activeTab": "x"}"#).unwrap();

        let mut app = app();
        add_tasks(&mut app, &["milk"]);
        let before = app.state.clone();

        key(&mut app, 'i');
        type_text(&mut app, &path.to_string_lossy());
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state, before);
        assert_eq!(app.store.load_state(), Some(before));
        assert_eq!(app.toast.as_ref().unwrap().style, ToastStyle::Error);
    }

    #[test]
    fn help_closes_on_any_key() {
        let mut app = app();
        key(&mut app, '?');
        assert_eq!(app.input_mode, InputMode::Help);
        key(&mut app, 'z');
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.should_quit);
        key(&mut app, 'q');
        assert!(app.should_quit);
    }

    #[test]
    fn step_clamps() {
        assert_eq!(step(0, -1, 3), 0);
        assert_eq!(step(2, 1, 3), 2);
        assert_eq!(step(1, 1, 3), 2);
        assert_eq!(step(5, 0, 0), 0);
    }
}
