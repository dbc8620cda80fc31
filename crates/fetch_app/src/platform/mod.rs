mod actions;
mod app;
pub mod cli;
mod logging;
mod settings;
mod status;

pub use app::run_app;
