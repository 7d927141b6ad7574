//! Per-alert polling loop.
//!
//! A watcher owns one activation (`epoch`) of one alert. It keeps polling while
//! the registry still shows that alert `Running` with the same epoch, so removal
//! or a newer activation cancels it. The check happens once per iteration and
//! the loop is never interrupted mid-request or mid-sleep: cancellation takes
//! effect within one poll interval plus one quote request.

use std::sync::Arc;

use chrono::{FixedOffset, Utc};
use tokio::time;

use crate::{
    config::MonitorConfig,
    models::{Alert, Direction, PendingAdjustment},
    services::{
        alert_registry::AlertRegistry, notifier::Notifier, pending_table::PendingTable,
        quotes::QuoteProvider,
    },
};

/// Everything a watcher needs; shared by all of them.
pub struct WatcherContext {
    pub registry: AlertRegistry,
    pub pending: PendingTable,
    pub quotes: Arc<dyn QuoteProvider>,
    pub notifier: Notifier,
    pub config: MonitorConfig,
}

/// How a watcher ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchExit {
    /// Threshold crossed; the alert waits for an adjustment reply.
    Paused(Direction),
    /// Quote lookups failed `max_retries` times in a row.
    Stopped,
    /// Alert was removed or re-activated under another watcher.
    Cancelled,
}

pub fn crossing(alert: &Alert, price: f64) -> Option<Direction> {
    if price >= alert.target_rise {
        Some(Direction::Rise)
    } else if price <= alert.target_fall {
        Some(Direction::Fall)
    } else {
        None
    }
}

pub async fn run(ctx: Arc<WatcherContext>, alert: Alert) -> WatchExit {
    let symbol = alert.symbol;
    let epoch = alert.epoch;
    let mut failures: u32 = 0;

    tracing::info!("Monitoring {}...", symbol);

    loop {
        // thresholds may have been updated in place since the last iteration
        let Some(current) = ctx.registry.active(&symbol, epoch).await else {
            tracing::info!("Watcher for {} cancelled", symbol);
            return WatchExit::Cancelled;
        };

        match ctx.quotes.quote(&symbol).await {
            Ok(price) => {
                failures = 0;
                if let Some(direction) = crossing(&current, price) {
                    return pause(&ctx, &current, direction, price).await;
                }
                time::sleep(ctx.config.poll_interval).await;
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(
                    "Error while monitoring {} ({}/{}): {}",
                    symbol,
                    failures,
                    ctx.config.max_retries,
                    e
                );

                if failures < ctx.config.max_retries {
                    time::sleep(ctx.config.retry_backoff).await;
                    continue;
                }

                return exhaust(&ctx, &current).await;
            }
        }
    }
}

async fn pause(ctx: &WatcherContext, alert: &Alert, direction: Direction, price: f64) -> WatchExit {
    // Recorded before the pause so a concurrent removal, which drops the
    // registry entry and then the pending entries, always sees it.
    ctx.pending
        .insert(PendingAdjustment {
            recipient: alert.recipient.clone(),
            symbol: alert.symbol.clone(),
            direction,
        })
        .await;

    if !ctx.registry.pause(&alert.symbol, alert.epoch).await {
        ctx.pending.remove(&alert.recipient, &alert.symbol).await;
        return WatchExit::Cancelled;
    }

    let text = crossing_message(alert, direction, price, ctx.config.utc_offset_hours);
    tracing::info!("{}", text);
    ctx.notifier.notify(&alert.recipient, &text, true).await;

    WatchExit::Paused(direction)
}

async fn exhaust(ctx: &WatcherContext, alert: &Alert) -> WatchExit {
    if !ctx.registry.stop(&alert.symbol, alert.epoch).await {
        return WatchExit::Cancelled;
    }

    let text = format!(
        "Continuous errors occurred while monitoring {}. Monitoring is being stopped.",
        alert.symbol
    );
    tracing::error!("{}", text);
    ctx.notifier.notify(&alert.recipient, &text, false).await;

    WatchExit::Stopped
}

fn crossing_message(alert: &Alert, direction: Direction, price: f64, utc_offset_hours: i32) -> String {
    let now = utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .map(|tz| Utc::now().with_timezone(&tz).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d %H:%M:%S").to_string());

    match direction {
        Direction::Rise => format!(
            "{} has reached or exceeded the target rise price: ${} (current: ${}, time: {}). \
             Would you like to adjust the target rise price? Please reply with the new price.",
            alert.symbol, alert.target_rise, price, now
        ),
        Direction::Fall => format!(
            "{} has reached or fallen below the target fall price: ${} (current: ${}, time: {}). \
             Would you like to adjust the target fall price? Please reply with the new price.",
            alert.symbol, alert.target_fall, price, now
        ),
    }
}
