pub mod completions;
pub mod config;
pub mod refresh;
pub mod slot;
pub mod task;
pub mod timer;
