#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Stats {
    sent: u64,
    answered: u64,
    failed: u64,
}

impl Stats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_sent(&mut self) {
        self.sent += 1;
    }

    pub(crate) fn record_answered(&mut self) {
        self.answered += 1;
    }

    pub(crate) fn record_failed(&mut self) {
        self.failed += 1;
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn answered(&self) -> u64 {
        self.answered
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Requests that have neither been answered nor failed yet.
    pub fn pending(&self) -> u64 {
        self.sent.saturating_sub(self.answered + self.failed)
    }
}
