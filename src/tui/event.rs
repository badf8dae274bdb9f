use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Wait up to `tick_rate` for input. Key releases and repeats are folded
/// into `Tick` so each press acts once.
pub fn poll(tick_rate: Duration) -> Result<AppEvent> {
    if !event::poll(tick_rate)? {
        return Ok(AppEvent::Tick);
    }
    Ok(match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
        Event::Resize(..) => AppEvent::Resize,
        _ => AppEvent::Tick,
    })
}
