pub mod engine;
pub mod notify;
pub mod state;

use std::time::Duration;

pub use engine::PromptEngine;
pub use notify::{DueNotifier, LogNotifier};
pub use state::PromptState;

/// Minimum entry text length after trimming.
pub const MIN_TEXT_LENGTH: usize = 15;

/// How often the engine re-runs the due-prompt check. Coarse polling on
/// purpose: tolerant of clock and timer drift, no exact-deadline scheduling.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(60);
