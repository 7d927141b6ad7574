use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::NotifyError;

/// Outbound text delivery to a recipient.
///
/// `await_reply` asks the client to prompt the user for an answer; routing
/// that answer back is the job of [`ReplyRouter`].
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, recipient: &str, text: &str, await_reply: bool) -> Result<(), NotifyError>;
}

/// One-shot continuations: recipients whose next free-text message goes to
/// the adjustment handler.
#[derive(Clone, Default)]
pub struct ReplyRouter {
    armed: Arc<Mutex<HashSet<String>>>,
}

impl ReplyRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn arm(&self, recipient: &str) {
        self.armed.lock().await.insert(recipient.to_string());
    }

    /// Consumes the continuation. Returns false when none was armed.
    pub async fn take(&self, recipient: &str) -> bool {
        self.armed.lock().await.remove(recipient)
    }

    pub async fn is_armed(&self, recipient: &str) -> bool {
        self.armed.lock().await.contains(recipient)
    }
}
