// Library surface for the binary and for headless/integration tests.
// Rendering stays in the binary; everything here runs without a TTY.
pub mod app;
pub mod app_dirs;
pub mod board;
pub mod config;
pub mod evaluate;
pub mod input;
pub mod rules;
pub mod runtime;
pub mod scheduler;
pub mod session;

pub use rules::{active_set, Level};
pub use session::{Intent, Phase, Session};
