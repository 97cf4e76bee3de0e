mod cli;
pub mod completion;
pub mod config;
mod entry;
mod handlers;
pub mod hover;
mod state;
pub mod text;

pub use cli::evaluate_probe;
pub use entry::run;
