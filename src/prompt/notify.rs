use log::info;

pub const NOTIFICATION_TITLE: &str = "Honest Hours - Time to log!";

/// Body of the due-prompt notification.
pub fn due_notification_body(time_range: &str) -> String {
    format!("What did you do from {time_range}?")
}

/// One-way outbound port for the due-but-backgrounded case. The engine calls
/// it best-effort; delivery or acknowledgement never affects engine state —
/// only a stored entry counts as logged.
pub trait DueNotifier: Send + Sync {
    fn notify_due(&self, hour_slot: &str, time_range: &str);
}

/// Default sink when no notification collaborator is wired in.
pub struct LogNotifier;

impl DueNotifier for LogNotifier {
    fn notify_due(&self, hour_slot: &str, time_range: &str) {
        info!(
            "{NOTIFICATION_TITLE} {} (slot {hour_slot})",
            due_notification_body(time_range)
        );
    }
}
