use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::store::SidebarItem;

use super::app::{App, Focus, InputMode};
use super::form;
use super::keymap::Action;

pub fn draw(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    frame.render_widget(Block::default().style(theme.base()), frame.area());

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_title(frame, app, outer[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(outer[1]);

    draw_sidebar(frame, app, main[0]);
    draw_tasks(frame, app, main[1]);
    draw_status(frame, app, outer[2]);

    match app.input_mode {
        InputMode::Help => draw_help(frame, app),
        InputMode::ConfirmDelete => draw_confirm_delete(frame, app),
        InputMode::Import => draw_import(frame, app),
        _ => {}
    }
}

fn draw_title(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(
        " checktabs ",
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    )];
    if app.moving.is_some() {
        spans.push(Span::styled(
            " MOVE: j/k to target, Enter to drop, Esc to cancel ",
            theme.moving_style(),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn selection_prefix(app: &App, selected: bool) -> Span<'static> {
    if selected {
        Span::styled("▸ ", Style::default().fg(app.theme.selection_indicator))
    } else {
        Span::raw("  ")
    }
}

fn draw_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let focused = app.focus == Focus::Sidebar;
    let block = Block::default()
        .title(" Lists ")
        .borders(Borders::ALL)
        .border_style(theme.border(focused));

    let active = app.state.active_tab.as_deref();
    let moving = app.moving.as_ref().map(|m| m.id.as_str());

    let items: Vec<ListItem> = app
        .sidebar()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let selected = focused && i == app.sidebar_index;
            let mut spans = vec![selection_prefix(app, selected)];

            match item {
                SidebarItem::Tab(tab) => {
                    let style = if Some(tab.id.as_str()) == moving {
                        theme.moving_style()
                    } else if Some(tab.id.as_str()) == active {
                        theme.tab_active_style()
                    } else {
                        Style::default().fg(theme.text_primary)
                    };
                    let open = app
                        .state
                        .tasks_for(&tab.id)
                        .iter()
                        .filter(|t| !t.completed)
                        .count();
                    spans.push(Span::styled(tab.title.clone(), style));
                    if open > 0 {
                        spans.push(Span::styled(
                            format!(" [{open}]"),
                            Style::default().fg(theme.text_secondary),
                        ));
                    }
                }
                SidebarItem::Separator(sep) => {
                    let style = if Some(sep.id.as_str()) == moving {
                        theme.moving_style()
                    } else {
                        theme.separator_style()
                    };
                    spans.push(Span::styled(format!("── {} ──", sep.title), style));
                }
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(app.sidebar_index));
    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn draw_tasks(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let focused = app.focus == Focus::Tasks;

    let tasks = app.visible_tasks();
    let done = tasks.iter().filter(|t| t.completed).count();
    let title = app.state.active().map_or_else(String::new, |tab| {
        format!(" {} ({done}/{}) ", tab.title, tasks.len())
    });
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(theme.border(focused));

    if tasks.is_empty() {
        let hint = app.keymap.label_for(Action::NewTask).unwrap_or("n");
        let msg = Paragraph::new(format!("  No tasks yet.\n  Press {hint} to add one."))
            .style(Style::default().fg(theme.text_secondary))
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let moving = app.moving.as_ref().map(|m| m.id.as_str());
    let mut items: Vec<ListItem> = Vec::with_capacity(tasks.len() + 2);
    let mut selected_row = 0;

    for (i, task) in tasks.iter().enumerate() {
        if task.completed && (i == 0 || !tasks[i - 1].completed) {
            if i > 0 {
                items.push(ListItem::new(""));
            }
            items.push(ListItem::new(Line::from(Span::styled(
                format!("  Completed ({done})"),
                Style::default()
                    .fg(theme.text_secondary)
                    .add_modifier(Modifier::BOLD),
            ))));
        }

        let selected = focused && i == app.task_index;
        if i == app.task_index {
            selected_row = items.len();
        }
        let style = if Some(task.id.as_str()) == moving {
            theme.moving_style()
        } else {
            theme.task_style(task.completed)
        };
        items.push(ListItem::new(Line::from(vec![
            selection_prefix(app, selected),
            Span::styled(format!("{} ", task.symbol()), style),
            Span::styled(task.text.clone(), style),
        ])));
    }

    let mut state = ListState::default().with_selected(Some(selected_row));
    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let prompt = match app.input_mode {
        InputMode::NewTask => Some("New task"),
        InputMode::EditTask => Some("Edit task"),
        InputMode::RenameTab => Some("List name"),
        InputMode::RenameSeparator => Some("Separator name"),
        _ => None,
    };

    let line = if let Some(label) = prompt {
        Line::from(vec![
            Span::styled(
                format!(" {label}: "),
                Style::default().fg(theme.form_highlight),
            ),
            Span::raw(app.input.display()),
            Span::styled(
                "  (Enter to save, Esc to cancel)",
                Style::default().fg(theme.text_secondary),
            ),
        ])
    } else if let Some(toast) = &app.toast {
        Line::from(Span::styled(
            format!(" {}", toast.message),
            theme.toast_style(toast.style),
        ))
    } else {
        let hints: &[(&str, &str)] = match app.focus {
            Focus::Sidebar => &[
                (" a", "list"),
                ("s", "separator"),
                ("r", "rename"),
                ("d", "delete"),
                ("J/K", "shift"),
                ("?", "help"),
            ],
            Focus::Tasks => &[
                (" n", "new"),
                ("Space", "toggle"),
                ("e", "edit"),
                ("d", "delete"),
                ("u", "uncheck all"),
                ("m", "move"),
                ("?", "help"),
            ],
        };
        form::hint_line(
            hints,
            Style::default().fg(theme.accent),
            Style::default().fg(theme.text_secondary),
        )
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_help(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let sections = app.keymap.help_entries();
    let rows: usize = sections.iter().map(|(_, e)| e.len() + 2).sum();
    let inner = form::render_modal(
        frame,
        " Keys (any key to close) ",
        theme.focused_border(),
        56,
        rows as u16 + 1,
    );

    let mut lines = Vec::new();
    for (label, entries) in sections {
        lines.push(Line::from(Span::styled(
            label,
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )));
        for entry in entries {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<10}", entry.label),
                    Style::default().fg(theme.form_highlight),
                ),
                Span::styled(entry.description, Style::default().fg(theme.text_primary)),
            ]));
        }
        lines.push(Line::default());
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_confirm_delete(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let title = app
        .target_id
        .as_deref()
        .and_then(|id| app.state.tab(id))
        .map_or("", |t| t.title.as_str());
    let count = app
        .target_id
        .as_deref()
        .map_or(0, |id| app.state.tasks_for(id).len());

    let inner = form::render_modal(
        frame,
        " Delete list ",
        Style::default().fg(theme.toast_error),
        50,
        7,
    );
    let lines = vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(
                format!("\"{title}\""),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" and its {count} tasks?")),
        ]),
        Line::default(),
        form::hint_line(
            &[("y", "delete"), ("n", "keep")],
            Style::default().fg(theme.accent),
            Style::default().fg(theme.text_secondary),
        ),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_import(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let inner = form::render_modal(frame, " Import ", theme.focused_border(), 64, 7);
    let lines = vec![
        Line::from(Span::styled(
            "Path to an exported JSON file. This replaces all lists.",
            Style::default().fg(theme.text_secondary),
        )),
        Line::default(),
        Line::from(Span::styled(
            app.input.display(),
            Style::default().fg(theme.form_highlight),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    form::render_hints(
        frame,
        Rect::new(inner.x, inner.y + inner.height.saturating_sub(1), inner.width, 1),
        &[("Enter", "import"), ("Esc", "cancel")],
        Style::default().fg(theme.accent),
        Style::default().fg(theme.text_secondary),
    );
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::config::Config;
    use crate::store::Store;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    fn app() -> App {
        App::new(Store::open_in_memory().unwrap(), Config::default())
    }

    fn type_line(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
    }

    #[test]
    fn empty_tab_shows_hint() {
        let screen = render(&app());
        assert!(screen.contains("New List"));
        assert!(screen.contains("No tasks yet."));
    }

    #[test]
    fn completed_tasks_render_in_own_section() {
        let mut app = app();
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        type_line(&mut app, "milk");
        type_line(&mut app, "eggs");
        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char(' '), KeyModifiers::NONE);

        let screen = render(&app);
        assert!(screen.contains("☐ milk"));
        assert!(screen.contains("✓ eggs"));
        assert!(screen.contains("Completed (1)"));
        assert!(screen.contains("(1/2)"));
    }

    #[test]
    fn separators_render_in_sidebar() {
        let mut app = app();
        app.handle_key(KeyCode::Char('s'), KeyModifiers::NONE);
        assert!(render(&app).contains("── Separator ──"));
    }

    #[test]
    fn help_overlay_lists_categories() {
        let mut app = app();
        app.handle_key(KeyCode::Char('?'), KeyModifiers::NONE);
        let screen = render(&app);
        assert!(screen.contains("Reordering"));
        assert!(screen.contains("any key to close"));
    }

    #[test]
    fn prompt_shows_in_status_bar() {
        let mut app = app();
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('x'), KeyModifiers::NONE);
        assert!(render(&app).contains("New task: x"));
    }
}
