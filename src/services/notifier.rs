use std::{sync::Arc, time::Duration};

use tokio::time;

use crate::services::channel::{NotificationChannel, ReplyRouter};

/// Delivers messages with a bounded number of attempts and a fixed pause between them.
#[derive(Clone)]
pub struct Notifier {
    channel: Arc<dyn NotificationChannel>,
    replies: ReplyRouter,
    max_retries: u32,
    backoff: Duration,
}

impl Notifier {
    pub fn new(channel: Arc<dyn NotificationChannel>, max_retries: u32, backoff: Duration) -> Self {
        Self {
            channel,
            replies: ReplyRouter::new(),
            max_retries: max_retries.max(1),
            backoff,
        }
    }

    pub fn replies(&self) -> &ReplyRouter {
        &self.replies
    }

    /// Returns whether the message got through. Exhaustion is only logged;
    /// callers never retry on top of this.
    pub async fn notify(&self, recipient: &str, text: &str, await_reply: bool) -> bool {
        for attempt in 1..=self.max_retries {
            match self.channel.send(recipient, text, await_reply).await {
                Ok(()) => {
                    if await_reply {
                        self.replies.arm(recipient).await;
                    }
                    return true;
                }
                Err(e) => {
                    tracing::warn!(
                        "Attempt {}/{} failed to send message to {}: {}",
                        attempt,
                        self.max_retries,
                        recipient,
                        e
                    );
                    // no pause after the last attempt
                    if attempt < self.max_retries {
                        time::sleep(self.backoff).await;
                    }
                }
            }
        }

        tracing::error!("All {} attempts to message {} failed", self.max_retries, recipient);
        false
    }
}
