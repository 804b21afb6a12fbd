pub mod actions;
pub mod align;
pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod report;
pub mod selector;
pub mod source;
pub mod state;
pub mod stats;
pub mod strategy;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::{AppState, Selection};
pub use source::ingest;
