use crate::combat::{LogEntry, PopupDescriptor};

/// Receives result descriptors for on-map popups (damage numbers, banners).
pub trait PopupSink {
    fn popup(&mut self, popup: PopupDescriptor);
}

/// Receives combat narration.
pub trait CombatLog {
    fn record(&mut self, entry: LogEntry);
}

impl PopupSink for Vec<PopupDescriptor> {
    fn popup(&mut self, popup: PopupDescriptor) {
        self.push(popup);
    }
}

impl CombatLog for Vec<LogEntry> {
    fn record(&mut self, entry: LogEntry) {
        self.push(entry);
    }
}
