use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::{anyhow, Result};
use chrono::{Local, Utc};
use log::{error, info, warn};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time,
};

use crate::{
    db::{Database, HourEntry},
    error::{PromptError, StoreError},
    settings::SettingsStore,
    timeslot,
};

use super::{notify::DueNotifier, PromptState, CHECK_INTERVAL, MIN_TEXT_LENGTH};

/// The prompt-due decision engine.
///
/// A one-minute ticker re-runs the due check; visibility changes trigger an
/// immediate re-check. The user owes an entry when the previous hour slot is
/// empty, the prompt interval has elapsed since the last completed prompt,
/// and the application is visible. State transitions are published over a
/// watch channel so any number of observers can follow along.
#[derive(Clone)]
pub struct PromptEngine {
    db: Database,
    settings: SettingsStore,
    state: Arc<Mutex<PromptState>>,
    state_tx: Arc<watch::Sender<PromptState>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    /// Re-entrancy guard: a tick that fires while a previous check's storage
    /// round-trip is outstanding is skipped, not queued.
    checking: Arc<AtomicBool>,
    visible: Arc<AtomicBool>,
    last_notified_slot: Arc<Mutex<Option<String>>>,
    notifier: Arc<dyn DueNotifier>,
}

impl PromptEngine {
    pub fn new(db: Database, settings: SettingsStore, notifier: Arc<dyn DueNotifier>) -> Self {
        let (state_tx, _) = watch::channel(PromptState::Idle);

        Self {
            db,
            settings,
            state: Arc::new(Mutex::new(PromptState::Idle)),
            state_tx: Arc::new(state_tx),
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: CHECK_INTERVAL,
            checking: Arc::new(AtomicBool::new(false)),
            visible: Arc::new(AtomicBool::new(true)),
            last_notified_slot: Arc::new(Mutex::new(None)),
            notifier,
        }
    }

    pub async fn state(&self) -> PromptState {
        self.state.lock().await.clone()
    }

    /// Follow state transitions without polling.
    pub fn subscribe(&self) -> watch::Receiver<PromptState> {
        self.state_tx.subscribe()
    }

    /// Starts the recurring due check and runs one immediately.
    pub async fn start(&self) {
        {
            let mut ticker_guard = self.ticker.lock().await;
            if let Some(handle) = ticker_guard.take() {
                handle.abort();
            }

            let engine = self.clone();
            let tick_interval = self.tick_interval;
            let handle = tokio::spawn(async move {
                let mut interval = time::interval(tick_interval);
                loop {
                    interval.tick().await;
                    if let Err(err) = engine.evaluate().await {
                        error!("Prompt check failed: {err:#}");
                    }
                }
            });

            *ticker_guard = Some(handle);
        }

        if let Err(err) = self.evaluate().await {
            error!("Initial prompt check failed: {err:#}");
        }
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    /// Reports foreground visibility. Either edge re-runs the due check:
    /// a regained window may owe a prompt, a hidden one must retract the
    /// modal rather than persist invisibly.
    pub async fn set_visible(&self, visible: bool) -> Result<()> {
        let was_visible = self.visible.swap(visible, Ordering::SeqCst);
        if was_visible != visible {
            self.evaluate().await?;
        }
        Ok(())
    }

    /// Runs the four-condition due check once. Storage failures propagate
    /// and leave state unchanged: no spurious prompt, no spurious dismissal.
    pub async fn evaluate(&self) -> Result<()> {
        if self
            .checking
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }

        let result = self.evaluate_inner().await;
        self.checking.store(false, Ordering::SeqCst);
        result
    }

    async fn evaluate_inner(&self) -> Result<()> {
        let now = Local::now();
        let slot = timeslot::previous_hour_slot(now);

        let settings = self.settings.get().await?;
        let existing = self.db.entry_by_slot(&slot).await?;

        let last_prompt_ms = settings.last_prompt_time.unwrap_or(0);
        let interval_ms = i64::from(settings.prompt_interval) * 60_000;
        let owed =
            existing.is_none() && now.timestamp_millis() - last_prompt_ms >= interval_ms;
        let visible = self.visible.load(Ordering::SeqCst);

        if owed && !visible {
            self.notify_backgrounded(&slot).await?;
        }

        let next = if owed && visible {
            PromptState::Active {
                time_range: timeslot::format_slot_as_range(&slot)?,
                hour_slot: slot,
            }
        } else {
            PromptState::Idle
        };

        let mut state = self.state.lock().await;
        if *state != next {
            if next.is_active() {
                info!("Prompt due: {next:?}");
            }
            *state = next;
            self.state_tx.send_replace(state.clone());
        }

        Ok(())
    }

    /// Signals the notification collaborator once per candidate slot.
    async fn notify_backgrounded(&self, slot: &str) -> Result<()> {
        let mut last_notified = self.last_notified_slot.lock().await;
        if last_notified.as_deref() == Some(slot) {
            return Ok(());
        }

        let time_range = timeslot::format_slot_as_range(slot)?;
        self.notifier.notify_due(slot, &time_range);
        *last_notified = Some(slot.to_string());
        Ok(())
    }

    /// Completes the active prompt with the user's text. The only path that
    /// writes an entry in normal operation.
    ///
    /// A storage outage propagates and leaves the prompt active so the
    /// caller can retry with the uncommitted text. A duplicate-slot failure
    /// means the slot got filled through another path; the prompt is treated
    /// as satisfied and the existing entry returned.
    pub async fn complete(
        &self,
        text: &str,
        tag: Option<String>,
    ) -> Result<HourEntry, PromptError> {
        let trimmed = text.trim();
        let len = trimmed.chars().count();
        if len < MIN_TEXT_LENGTH {
            return Err(PromptError::TextTooShort {
                min: MIN_TEXT_LENGTH,
                len,
            });
        }

        let slot = match &*self.state.lock().await {
            PromptState::Active { hour_slot, .. } => hour_slot.clone(),
            PromptState::Idle => return Err(PromptError::NoActivePrompt),
        };

        let date = timeslot::slot_date(&slot)
            .map_err(PromptError::Other)?
            .format("%Y-%m-%d")
            .to_string();

        let entry = match self.db.create_entry(&date, &slot, trimmed, tag).await {
            Ok(entry) => entry,
            Err(StoreError::DuplicateSlot { .. }) => {
                warn!("Slot {slot} already has an entry; treating prompt as satisfied");
                self.db
                    .entry_by_slot(&slot)
                    .await
                    .map_err(PromptError::Other)?
                    .ok_or_else(|| {
                        PromptError::Other(anyhow!("entry for slot {slot} vanished mid-completion"))
                    })?
            }
            Err(err) => return Err(err.into()),
        };

        if let Err(err) = self
            .settings
            .set_last_prompt_time(Utc::now().timestamp_millis())
            .await
        {
            // The entry is committed; bookkeeping failure must not undo that.
            warn!("Failed to record last prompt time: {err:#}");
        }

        let mut state = self.state.lock().await;
        *state = PromptState::Idle;
        self.state_tx.send_replace(state.clone());

        Ok(entry)
    }
}
