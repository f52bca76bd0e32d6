//! Ratatui front-end: a saved reports browser with a modal project form and a
//! read-only report view. All persistence goes through the `ReportStore`
//! owned by [`App`].

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
