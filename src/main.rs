use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};

use checktabs::config;
use checktabs::engine::{self, Intent, ordering};
use checktabs::store::{AppState, SidebarItem, Store, Tab};
use checktabs::{logging, transfer, tui};

#[derive(Parser)]
#[command(name = "checktabs", about = "Checklists organised in tabs, in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the TUI (default)
    Tui,
    /// Create the data directory and an initial list
    Init,
    /// List tabs and separators in sidebar order
    ListTabs,
    /// List the tasks of a tab (default: the active tab)
    ListTasks {
        /// Tab title
        tab: Option<String>,
    },
    /// Add a tab and make it active
    AddTab {
        /// Title for the new tab (default: "New List")
        title: Option<String>,
    },
    /// Add a task to a tab
    AddTask {
        /// Tab title
        tab: String,
        /// Task text
        text: String,
    },
    /// Export everything to checktabs-YYYY-MM-DD.json
    Export {
        /// Output directory (default: `export_dir` from config.toml, else .)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Replace everything with the contents of an exported file
    Import {
        /// Path to the exported JSON file
        file: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    config::ensure_dirs()?;
    if let Err(e) = logging::init_logging() {
        eprintln!("warning: logging disabled: {e:#}");
    }
    let store = open_store()?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let config = config::load()?;
            tui::run(store, config)
        }
        Commands::Init => {
            let state = load(&store);
            store.save_state(&state)?;
            println!(
                "checktabs initialized at {}",
                config::base_dir()?.display()
            );
            Ok(())
        }
        Commands::ListTabs => {
            let state = load(&store);
            for item in engine::sidebar_items(&state) {
                match item {
                    SidebarItem::Tab(tab) => {
                        let tasks = state.tasks_for(&tab.id);
                        let done = tasks.iter().filter(|t| t.completed).count();
                        let marker = if state.active_tab.as_deref() == Some(tab.id.as_str()) {
                            "*"
                        } else {
                            " "
                        };
                        println!("{marker} {} ({done}/{})", tab.title, tasks.len());
                    }
                    SidebarItem::Separator(sep) => println!("  ── {} ──", sep.title),
                }
            }
            Ok(())
        }
        Commands::ListTasks { tab } => {
            let state = load(&store);
            let tab = match tab {
                Some(title) => find_tab_by_title(&state, &title)?,
                None => state.active().context("no active tab")?,
            };
            let (open, completed) = ordering::split_by_completion(state.tasks_for(&tab.id));
            if open.is_empty() && completed.is_empty() {
                println!("No tasks in '{}'.", tab.title);
            }
            for t in open.iter().chain(&completed) {
                println!("  {} {}", t.symbol(), t.text);
            }
            Ok(())
        }
        Commands::AddTab { title } => {
            let state = load(&store);
            let mut state = commit(&store, &state, Intent::AddTab)?;
            let tab_id = state.active_tab.clone().context("new tab was not selected")?;
            if let Some(title) = title {
                state = commit(
                    &store,
                    &state,
                    Intent::RenameTab {
                        tab_id: tab_id.clone(),
                        title,
                    },
                )?;
            }
            let tab = state.tab(&tab_id).context("new tab disappeared")?;
            println!("Added list '{}'", tab.title);
            Ok(())
        }
        Commands::AddTask { tab, text } => {
            if text.trim().is_empty() {
                bail!("task text must not be empty");
            }
            let state = load(&store);
            let target = find_tab_by_title(&state, &tab)?;
            let (tab_id, title) = (target.id.clone(), target.title.clone());
            commit(&store, &state, Intent::AddTask { tab_id, text })?;
            println!("Added task to '{title}'");
            Ok(())
        }
        Commands::Export { output } => {
            let state = load(&store);
            let dir = match output {
                Some(dir) => config::expand_home(&dir),
                None => config::load()?.export_dir(),
            };
            let path = transfer::export_to_dir(&state, &dir, Local::now().date_naive())?;
            println!("Exported {} lists to {}", state.tabs.len(), path.display());
            Ok(())
        }
        Commands::Import { file } => {
            let path = PathBuf::from(&file);
            let imported = transfer::import_file(&path, Utc::now())
                .with_context(|| format!("failed to import {file}"))?;
            let state = load(&store);
            let state = commit(&store, &state, Intent::ReplaceState(imported))?;
            let tasks: usize = state.tasks.values().map(Vec::len).sum();
            println!(
                "Imported {} lists and {tasks} tasks from {file}",
                state.tabs.len()
            );
            Ok(())
        }
    }
}

fn open_store() -> Result<Store> {
    let store = Store::open()?;
    store.migrate()?;
    Ok(store)
}

fn load(store: &Store) -> AppState {
    store
        .load_state()
        .unwrap_or_else(|| engine::default_state(Utc::now()))
}

/// Apply `intent` and persist the result.
fn commit(store: &Store, state: &AppState, intent: Intent) -> Result<AppState> {
    let next = engine::apply(state, intent, Utc::now());
    store.save_state(&next)?;
    Ok(next)
}

/// Exact title match first, then case-insensitive.
fn find_tab_by_title<'a>(state: &'a AppState, title: &str) -> Result<&'a Tab> {
    state
        .tabs
        .iter()
        .find(|t| t.title == title)
        .or_else(|| state.tabs.iter().find(|t| t.title.eq_ignore_ascii_case(title)))
        .with_context(|| format!("list '{title}' not found"))
}
