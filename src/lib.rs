//! Core library surface for the Solar Kit Sizer TUI application.
//!
//! The sizing engine and the report store are the two pieces with real logic;
//! `report`, `config`, `logging` and `ui` are the glue around them. Everything
//! is public so the `bin` target and the integration tests share one API.
pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod models;
pub mod report;
pub mod sizing;
pub mod ui;

/// Convenience re-exports for the persistence layer.
pub use db::ReportStore;

pub use errors::{SizingError, StoreError};

/// The domain types that other layers manipulate.
pub use models::{PanelPower, ProjectInput, ReportSummary, SizingResult};

pub use sizing::compute_sizing;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
