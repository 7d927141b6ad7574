use crate::{
    error::AdjustError,
    models::{Direction, PendingAdjustment},
    services::{
        alert_registry::AlertRegistry, notifier::Notifier, pending_table::PendingTable,
        scheduler::WatcherScheduler,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct Adjusted {
    pub symbol: String,
    pub direction: Direction,
    pub value: f64,
}

/// Reply is either `PRICE` (oldest pending request) or `SYMBOL PRICE`.
fn parse_reply(text: &str) -> Result<(Option<String>, f64), AdjustError> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let (symbol, raw) = match parts.as_slice() {
        [price] => (None, *price),
        [symbol, price] => (Some(symbol.to_uppercase()), *price),
        _ => return Err(AdjustError::Parse),
    };

    let value = raw.trim_start_matches('$').parse::<f64>().map_err(|_| AdjustError::Parse)?;
    if !value.is_finite() || value <= 0.0 {
        return Err(AdjustError::Parse);
    }
    Ok((symbol, value))
}

/// Applies a recipient's reply to a paused alert and restarts monitoring.
#[derive(Clone)]
pub struct AdjustmentHandler {
    registry: AlertRegistry,
    pending: PendingTable,
    scheduler: WatcherScheduler,
    notifier: Notifier,
}

impl AdjustmentHandler {
    pub fn new(
        registry: AlertRegistry,
        pending: PendingTable,
        scheduler: WatcherScheduler,
        notifier: Notifier,
    ) -> Self {
        Self {
            registry,
            pending,
            scheduler,
            notifier,
        }
    }

    pub async fn handle(&self, recipient: &str, text: &str) -> Result<Adjusted, AdjustError> {
        let result = self.apply(recipient, text).await;

        let reply = match &result {
            Ok(a) => format!(
                "The {} target price for {} has been updated to: ${}",
                a.direction, a.symbol, a.value
            ),
            Err(AdjustError::Parse) => "Please enter a valid price.".to_string(),
            Err(AdjustError::NoPending) => {
                "No stock found that requires a price adjustment.".to_string()
            }
            Err(AdjustError::Scheduler(e)) => format!("Could not resume monitoring: {e}"),
        };
        self.notifier.notify(recipient, &reply, false).await;

        // keep listening while this recipient still owes replies
        if self.pending.has_for(recipient).await {
            self.notifier.replies().arm(recipient).await;
        }

        result
    }

    async fn apply(&self, recipient: &str, text: &str) -> Result<Adjusted, AdjustError> {
        let (symbol, value) = parse_reply(text)?;

        let entry = match &symbol {
            Some(s) => self.pending.find(recipient, s).await,
            None => self.pending.oldest_for(recipient).await,
        };
        let Some(PendingAdjustment { symbol, direction, .. }) = entry else {
            return Err(AdjustError::NoPending);
        };

        let Some(alert) = self.registry.resume(&symbol, direction, value).await else {
            // alert vanished or is no longer paused; the entry is stale
            self.pending.remove(recipient, &symbol).await;
            return Err(AdjustError::NoPending);
        };
        self.pending.remove(recipient, &symbol).await;

        if let Err(e) = self.scheduler.spawn(alert.clone()) {
            self.registry.stop(&alert.symbol, alert.epoch).await;
            return Err(AdjustError::Scheduler(e));
        }

        tracing::info!("{} {} target adjusted to {}", symbol, direction, value);
        Ok(Adjusted {
            symbol,
            direction,
            value,
        })
    }
}

