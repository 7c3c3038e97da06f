pub mod batch;
pub mod cli;
pub mod config;
pub mod images;
pub mod op;
pub mod presets;
pub mod progress;
pub mod runner;
pub mod toolkit;
pub mod util;
