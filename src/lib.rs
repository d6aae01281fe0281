//! Honest Hours core: an hourly self-reporting time journal.
//!
//! Once per hour, while the application is visible, the prompt engine
//! decides whether the user owes an entry for the hour that just ended, and
//! the journal store guarantees at most one entry per hour slot. UI,
//! notifications, and file export are external collaborators wired in
//! through the surfaces exposed here.

pub mod daily_log;
pub mod db;
pub mod error;
pub mod export;
pub mod prompt;
pub mod settings;
pub mod timeslot;

use std::{path::Path, sync::Arc};

use anyhow::Result;

pub use daily_log::{build_daily_log, DailyLog, LogSlot};
pub use db::{Database, HourEntry};
pub use error::{PromptError, StoreError};
pub use prompt::{DueNotifier, LogNotifier, PromptEngine, PromptState};
pub use settings::{Settings, SettingsStore, SettingsUpdate, Theme};

const DB_FILE_NAME: &str = "honesthours.sqlite3";

/// The wired-up application core: database, settings, and prompt engine
/// sharing one storage handle.
pub struct App {
    pub db: Database,
    pub settings: SettingsStore,
    pub prompt: PromptEngine,
}

impl App {
    /// Opens (or creates) the journal under `data_dir` and wires the prompt
    /// engine to `notifier`. Call [`PromptEngine::start`] to begin the
    /// recurring due check.
    pub fn open(data_dir: &Path, notifier: Arc<dyn DueNotifier>) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let db = Database::new(data_dir.join(DB_FILE_NAME))?;
        let settings = SettingsStore::new(db.clone());
        let prompt = PromptEngine::new(db.clone(), settings.clone(), notifier);

        Ok(Self {
            db,
            settings,
            prompt,
        })
    }
}

/// Initializes logging from `RUST_LOG`, defaulting to Info.
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn app_opens_and_shares_one_store() {
        let dir = TempDir::new().unwrap();
        let app = App::open(dir.path(), Arc::new(LogNotifier)).unwrap();

        assert_eq!(app.prompt.state().await, PromptState::Idle);

        app.db
            .create_entry("2026-01-05", "2026-01-05 09:00", "wired everything together", None)
            .await
            .unwrap();
        let settings = app.settings.get().await.unwrap();
        assert_eq!(settings.day_start_hour, 6);

        let log = build_daily_log(
            &app.db,
            chrono::NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            settings.day_start_hour,
            chrono::Local::now(),
        )
        .await
        .unwrap();
        assert_eq!(log.total_hours, 18); // 06:00 through 23:00
        assert_eq!(log.missing_count, 17);
    }
}
