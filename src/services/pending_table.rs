use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::PendingAdjustment;

/// Adjustments awaiting a reply, keyed by `(recipient, symbol)` and kept in
/// arrival order so a bare reply goes to the oldest request.
#[derive(Clone, Default)]
pub struct PendingTable {
    entries: Arc<Mutex<Vec<PendingAdjustment>>>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for the same recipient and symbol.
    pub async fn insert(&self, entry: PendingAdjustment) {
        let mut entries = self.entries.lock().await;
        match entries
            .iter_mut()
            .find(|p| p.recipient == entry.recipient && p.symbol == entry.symbol)
        {
            Some(slot) => *slot = entry,
            None => entries.push(entry),
        }
    }

    pub async fn oldest_for(&self, recipient: &str) -> Option<PendingAdjustment> {
        let entries = self.entries.lock().await;
        entries.iter().find(|p| p.recipient == recipient).cloned()
    }

    pub async fn find(&self, recipient: &str, symbol: &str) -> Option<PendingAdjustment> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .find(|p| p.recipient == recipient && p.symbol == symbol)
            .cloned()
    }

    pub async fn remove(&self, recipient: &str, symbol: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|p| !(p.recipient == recipient && p.symbol == symbol));
        entries.len() != before
    }

    /// Drops every entry for `symbol`, whoever owes the reply.
    pub async fn remove_symbol(&self, symbol: &str) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|p| p.symbol != symbol);
        before - entries.len()
    }

    pub async fn has_for(&self, recipient: &str) -> bool {
        let entries = self.entries.lock().await;
        entries.iter().any(|p| p.recipient == recipient)
    }

    pub async fn count_for_symbol(&self, symbol: &str) -> usize {
        let entries = self.entries.lock().await;
        entries.iter().filter(|p| p.symbol == symbol).count()
    }
}
