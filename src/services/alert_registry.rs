use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::models::{Alert, AlertState, Direction};

/// Result of registering a symbol.
#[derive(Debug, Clone)]
pub enum Upsert {
    /// New alert; the caller must spawn its watcher.
    Created(Alert),
    /// Thresholds changed in place; state and watcher untouched.
    Updated(Alert),
    /// Alert was `Stopped` and is `Running` again; the caller must spawn its watcher.
    Restarted(Alert),
}

impl Upsert {
    pub fn alert(&self) -> &Alert {
        match self {
            Upsert::Created(a) | Upsert::Updated(a) | Upsert::Restarted(a) => a,
        }
    }

    pub fn needs_watcher(&self) -> bool {
        !matches!(self, Upsert::Updated(_))
    }
}

#[derive(Default)]
struct Inner {
    alerts: HashMap<String, Alert>,
    next_epoch: u64,
}

impl Inner {
    fn bump_epoch(&mut self) -> u64 {
        self.next_epoch += 1;
        self.next_epoch
    }
}

/// Symbol -> Alert map shared by commands, watchers and the adjustment handler.
///
/// Every operation takes the single lock, so a watcher never sees a half-applied
/// removal or threshold update.
#[derive(Clone, Default)]
pub struct AlertRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl AlertRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, symbol: &str, recipient: &str, target_rise: f64, target_fall: f64) -> Upsert {
        let mut inner = self.inner.lock().await;
        let epoch = inner.bump_epoch();

        if let Some(existing) = inner.alerts.get_mut(symbol) {
            existing.target_rise = target_rise;
            existing.target_fall = target_fall;
            existing.recipient = recipient.to_string();

            if existing.state == AlertState::Stopped {
                existing.state = AlertState::Running;
                existing.epoch = epoch;
                return Upsert::Restarted(existing.clone());
            }
            return Upsert::Updated(existing.clone());
        }

        let alert = Alert {
            symbol: symbol.to_string(),
            recipient: recipient.to_string(),
            target_rise,
            target_fall,
            state: AlertState::Running,
            epoch,
        };
        inner.alerts.insert(symbol.to_string(), alert.clone());
        Upsert::Created(alert)
    }

    /// Deletes the alert and hands back its final `Removed` snapshot.
    /// Its watcher notices on its next loop iteration.
    pub async fn remove(&self, symbol: &str) -> Option<Alert> {
        let mut inner = self.inner.lock().await;
        let mut alert = inner.alerts.remove(symbol)?;
        alert.state = AlertState::Removed;
        Some(alert)
    }

    pub async fn get(&self, symbol: &str) -> Option<Alert> {
        self.inner.lock().await.alerts.get(symbol).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.alerts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of the alert if the watcher owning `epoch` may keep polling it.
    pub async fn active(&self, symbol: &str, epoch: u64) -> Option<Alert> {
        let inner = self.inner.lock().await;
        inner
            .alerts
            .get(symbol)
            .filter(|a| a.state == AlertState::Running && a.epoch == epoch)
            .cloned()
    }

    /// Running -> Paused for the owning watcher. False if the watcher was cancelled.
    pub async fn pause(&self, symbol: &str, epoch: u64) -> bool {
        self.transition(symbol, epoch, AlertState::Paused).await
    }

    /// Running -> Stopped for the owning watcher. False if the watcher was cancelled.
    pub async fn stop(&self, symbol: &str, epoch: u64) -> bool {
        self.transition(symbol, epoch, AlertState::Stopped).await
    }

    async fn transition(&self, symbol: &str, epoch: u64, to: AlertState) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.alerts.get_mut(symbol) {
            Some(a) if a.state == AlertState::Running && a.epoch == epoch => {
                a.state = to;
                true
            }
            _ => false,
        }
    }

    /// Paused -> Running with the adjusted threshold and a fresh epoch.
    /// Returns the alert to hand to a new watcher, or None if it is not paused.
    pub async fn resume(&self, symbol: &str, direction: Direction, value: f64) -> Option<Alert> {
        let mut inner = self.inner.lock().await;
        let epoch = inner.bump_epoch();
        let alert = inner.alerts.get_mut(symbol)?;
        if alert.state != AlertState::Paused {
            return None;
        }

        match direction {
            Direction::Rise => alert.target_rise = value,
            Direction::Fall => alert.target_fall = value,
        }
        alert.state = AlertState::Running;
        alert.epoch = epoch;
        Some(alert.clone())
    }
}
