use serde::Serialize;

/// The engine's two states. It cycles between them for the lifetime of the
/// session; there is no terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PromptState {
    /// No entry is owed.
    Idle,
    /// The user owes an entry for `hour_slot`.
    Active { hour_slot: String, time_range: String },
}

impl PromptState {
    pub fn is_active(&self) -> bool {
        matches!(self, PromptState::Active { .. })
    }
}
