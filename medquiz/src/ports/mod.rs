// src/ports/mod.rs
pub mod http;
pub mod terminal;

pub use http::{router, AppState};
pub use terminal::TerminalPresenter;
