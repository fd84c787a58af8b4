pub type MessageId = String;

/// Human-readable line accumulated per fetched message. Also the row shape
/// of the SQLite cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSummary {
    pub id: MessageId,
    pub from: String,
    pub subject: String,
    pub snippet: String,
    pub date_epoch: i64,
}

impl std::fmt::Display for MessageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} — {}: {}", self.from, self.subject, self.snippet)
    }
}
