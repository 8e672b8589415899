pub mod config;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod prompt;
pub mod saju;
pub mod tui;
