pub mod app;
mod event;
pub mod form;
pub mod keymap;
pub mod theme;
mod ui;

use anyhow::Result;

use crate::config::Config;
use crate::store::Store;

/// Take over the terminal until the user quits. The terminal is restored
/// even when the app loop fails.
pub fn run(store: Store, config: Config) -> Result<()> {
    let mut terminal = ratatui::init();
    let mut app = app::App::new(store, config);
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}
