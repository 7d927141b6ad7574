use std::sync::Arc;

use crate::{
    config::MonitorConfig,
    error::{AdjustError, MonitorError},
    services::{
        adjustment::{Adjusted, AdjustmentHandler},
        alert_registry::{AlertRegistry, Upsert},
        channel::NotificationChannel,
        notifier::Notifier,
        pending_table::PendingTable,
        quotes::QuoteProvider,
        scheduler::WatcherScheduler,
        watcher::WatcherContext,
    },
};

/// Entry point for commands and replies. All watcher creation goes through
/// the single scheduler held here.
#[derive(Clone)]
pub struct Monitor {
    registry: AlertRegistry,
    pending: PendingTable,
    quotes: Arc<dyn QuoteProvider>,
    notifier: Notifier,
    scheduler: WatcherScheduler,
    adjustments: AdjustmentHandler,
}

impl Monitor {
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        channel: Arc<dyn NotificationChannel>,
        config: MonitorConfig,
    ) -> Self {
        let registry = AlertRegistry::new();
        let pending = PendingTable::new();
        let notifier = Notifier::new(channel, config.max_retries, config.notify_backoff);

        let ctx = Arc::new(WatcherContext {
            registry: registry.clone(),
            pending: pending.clone(),
            quotes: quotes.clone(),
            notifier: notifier.clone(),
            config,
        });
        let scheduler = WatcherScheduler::new(ctx);
        let adjustments = AdjustmentHandler::new(
            registry.clone(),
            pending.clone(),
            scheduler.clone(),
            notifier.clone(),
        );

        Self {
            registry,
            pending,
            quotes,
            notifier,
            scheduler,
            adjustments,
        }
    }

    /// Validates the symbol against the quote provider, then creates or updates
    /// its alert. A watcher is spawned only for a new or restarted alert.
    pub async fn set_alert(
        &self,
        recipient: &str,
        symbol: &str,
        target_rise: f64,
        target_fall: f64,
    ) -> Result<Upsert, MonitorError> {
        let valid = |p: f64| p.is_finite() && p > 0.0;
        if !valid(target_rise) || !valid(target_fall) {
            return Err(MonitorError::InvalidThreshold);
        }

        self.quotes
            .quote(symbol)
            .await
            .map_err(MonitorError::InvalidSymbolOrProvider)?;

        let outcome = self
            .registry
            .upsert(symbol, recipient, target_rise, target_fall)
            .await;

        if outcome.needs_watcher() {
            let alert = outcome.alert().clone();
            if let Err(e) = self.scheduler.spawn(alert.clone()) {
                match outcome {
                    Upsert::Created(_) => {
                        self.registry.remove(&alert.symbol).await;
                    }
                    _ => {
                        self.registry.stop(&alert.symbol, alert.epoch).await;
                    }
                }
                return Err(e);
            }
        }

        Ok(outcome)
    }

    /// Deletes the alert and any reply it was waiting for. The watcher, if any,
    /// stops on its next iteration.
    pub async fn remove_alert(&self, symbol: &str) -> bool {
        let Some(alert) = self.registry.remove(symbol).await else {
            return false;
        };
        let dropped = self.pending.remove_symbol(symbol).await;
        tracing::info!(
            "Stopped monitoring {} for {} ({} pending adjustment(s) dropped)",
            alert.symbol,
            alert.recipient,
            dropped
        );
        true
    }

    /// Feeds free text to the adjustment handler if the recipient has an armed
    /// continuation or still owes a reply (the prompt may never have been
    /// delivered). None means the text was not expected.
    pub async fn handle_reply(&self, recipient: &str, text: &str) -> Option<Result<Adjusted, AdjustError>> {
        let armed = self.notifier.replies().take(recipient).await;
        if !armed && !self.pending.has_for(recipient).await {
            return None;
        }
        Some(self.adjustments.handle(recipient, text).await)
    }

    pub fn registry(&self) -> &AlertRegistry {
        &self.registry
    }

    pub fn pending(&self) -> &PendingTable {
        &self.pending
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn scheduler(&self) -> &WatcherScheduler {
        &self.scheduler
    }
}
