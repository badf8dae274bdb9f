pub mod config;
pub mod engine;
pub mod logging;
pub mod store;
pub mod transfer;
pub mod tui;
