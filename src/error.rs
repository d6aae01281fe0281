use thiserror::Error;

/// Failures surfaced by the journal store.
///
/// The `hour_slot` UNIQUE constraint is enforced inside SQLite, so a
/// duplicate create fails atomically even when two writers race past the
/// engine's existence pre-check.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an entry already exists for slot {slot}")]
    DuplicateSlot { slot: String },

    #[error("storage unavailable")]
    Unavailable(#[source] anyhow::Error),
}

impl StoreError {
    /// Wraps a storage failure, re-classifying UNIQUE violations on the
    /// hour-slot index as `DuplicateSlot`.
    pub(crate) fn from_storage(err: anyhow::Error, slot: &str) -> Self {
        if is_unique_violation(&err) {
            StoreError::DuplicateSlot {
                slot: slot.to_string(),
            }
        } else {
            StoreError::Unavailable(err)
        }
    }
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    // Match the extended result code: a NOT NULL or CHECK failure is also a
    // ConstraintViolation but does not mean the slot is filled. The id
    // primary key only collides when the slot and instant both repeat, so it
    // counts as a duplicate too.
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(failure, _))
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Failures surfaced by the prompt engine's completion path.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("entry text must be at least {min} characters after trimming, got {len}")]
    TextTooShort { min: usize, len: usize },

    #[error("no prompt is currently active")]
    NoActivePrompt,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
