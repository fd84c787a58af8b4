use anyhow::Result;

use crate::domain::email::{MessageId, MessageSummary};

/// Local cache of checked messages. Scaffolding for a future notification
/// path; the poll loop itself re-fetches from scratch every tick and does
/// not read from here.
pub trait MessageRepository {
    fn upsert_summaries(&mut self, items: &[MessageSummary]) -> Result<()>;

    fn get_summary(&self, id: &MessageId) -> Result<Option<MessageSummary>>;
    fn list_recent(&self, limit: u32) -> Result<Vec<MessageSummary>>;

    fn prune_keep_recent(&mut self, keep: usize) -> Result<()>;

    fn get_meta_i64(&self, key: &str) -> Result<Option<i64>>;
    fn set_meta_i64(&mut self, key: &str, value: i64) -> Result<()>;
}
