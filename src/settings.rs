use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::db::Database;

pub const DEFAULT_PROMPT_INTERVAL_MIN: u32 = 60;
pub const DEFAULT_DAY_START_HOUR: u8 = 6;

/// Configurable bounds for the prompt interval, minutes.
pub const MIN_PROMPT_INTERVAL_MIN: u32 = 30;
pub const MAX_PROMPT_INTERVAL_MIN: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Singleton configuration record. Every field carries a serde default, so a
/// partially-written persisted blob overlays the defaults field-by-field
/// instead of producing an absent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Minutes between prompts; validated to 30-120 on update.
    pub prompt_interval: u32,
    /// Hour (0-23) at which a day of expected slots begins.
    pub day_start_hour: u8,
    pub theme: Theme,
    /// Epoch milliseconds of the last completed prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_prompt_time: Option<i64>,
    /// Optional display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt_interval: DEFAULT_PROMPT_INTERVAL_MIN,
            day_start_hour: DEFAULT_DAY_START_HOUR,
            theme: Theme::System,
            last_prompt_time: None,
            name: None,
        }
    }
}

/// Partial update; `None` fields leave the current value untouched.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub prompt_interval: Option<u32>,
    pub day_start_hour: Option<u8>,
    pub theme: Option<Theme>,
    pub last_prompt_time: Option<i64>,
    pub name: Option<String>,
}

/// Persistence for the singleton [`Settings`] record, stored as a JSON blob
/// in the database's settings table. Last-write-wins; updates originate from
/// a single UI thread of control.
#[derive(Clone)]
pub struct SettingsStore {
    db: Database,
}

impl SettingsStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The persisted record merged over hard-coded defaults.
    pub async fn get(&self) -> Result<Settings> {
        match self.db.read_settings_blob().await? {
            Some(blob) => {
                serde_json::from_str(&blob).context("failed to parse persisted settings")
            }
            None => Ok(Settings::default()),
        }
    }

    /// Shallow-merges `update` over the current (defaulted) settings,
    /// persists, and returns the merged record.
    pub async fn update(&self, update: SettingsUpdate) -> Result<Settings> {
        let mut settings = self.get().await?;

        if let Some(interval) = update.prompt_interval {
            if !(MIN_PROMPT_INTERVAL_MIN..=MAX_PROMPT_INTERVAL_MIN).contains(&interval) {
                bail!(
                    "prompt interval must be between {MIN_PROMPT_INTERVAL_MIN} and \
                     {MAX_PROMPT_INTERVAL_MIN} minutes, got {interval}"
                );
            }
            settings.prompt_interval = interval;
        }
        if let Some(hour) = update.day_start_hour {
            if hour > 23 {
                bail!("day start hour must be 0-23, got {hour}");
            }
            settings.day_start_hour = hour;
        }
        if let Some(theme) = update.theme {
            settings.theme = theme;
        }
        if let Some(last_prompt_time) = update.last_prompt_time {
            settings.last_prompt_time = Some(last_prompt_time);
        }
        if let Some(name) = update.name {
            settings.name = Some(name);
        }

        self.persist(&settings).await?;
        Ok(settings)
    }

    /// Persists the hard-coded defaults, discarding prompt history.
    pub async fn reset(&self) -> Result<Settings> {
        let settings = Settings::default();
        self.persist(&settings).await?;
        Ok(settings)
    }

    pub async fn set_last_prompt_time(&self, epoch_ms: i64) -> Result<Settings> {
        self.update(SettingsUpdate {
            last_prompt_time: Some(epoch_ms),
            ..Default::default()
        })
        .await
    }

    async fn persist(&self, settings: &Settings) -> Result<()> {
        let blob = serde_json::to_string(settings).context("failed to serialize settings")?;
        self.db.write_settings_blob(blob).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, SettingsStore) {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("journal.sqlite3")).unwrap();
        (dir, SettingsStore::new(db))
    }

    #[tokio::test]
    async fn defaults_when_nothing_is_persisted() {
        let (_dir, store) = open_store();
        let settings = store.get().await.unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.prompt_interval, 60);
        assert_eq!(settings.day_start_hour, 6);
    }

    #[tokio::test]
    async fn partial_blob_merges_over_defaults() {
        let (_dir, store) = open_store();
        store
            .db
            .write_settings_blob(r#"{"dayStartHour":8}"#.to_string())
            .await
            .unwrap();

        let settings = store.get().await.unwrap();
        assert_eq!(settings.day_start_hour, 8);
        assert_eq!(settings.prompt_interval, 60);
        assert_eq!(settings.theme, Theme::System);
    }

    #[tokio::test]
    async fn update_merges_and_persists() {
        let (_dir, store) = open_store();
        let updated = store
            .update(SettingsUpdate {
                day_start_hour: Some(7),
                theme: Some(Theme::Dark),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.day_start_hour, 7);
        assert_eq!(updated.theme, Theme::Dark);

        let reread = store.get().await.unwrap();
        assert_eq!(reread, updated);
    }

    #[tokio::test]
    async fn update_rejects_out_of_range_values() {
        let (_dir, store) = open_store();
        assert!(store
            .update(SettingsUpdate {
                prompt_interval: Some(20),
                ..Default::default()
            })
            .await
            .is_err());
        assert!(store
            .update(SettingsUpdate {
                day_start_hour: Some(24),
                ..Default::default()
            })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn reset_discards_prompt_history() {
        let (_dir, store) = open_store();
        store.set_last_prompt_time(1_700_000_000_000).await.unwrap();
        assert!(store.get().await.unwrap().last_prompt_time.is_some());

        let reset = store.reset().await.unwrap();
        assert_eq!(reset, Settings::default());
        assert!(store.get().await.unwrap().last_prompt_time.is_none());
    }
}
