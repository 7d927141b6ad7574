use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use tokio::{sync::Semaphore, task::JoinHandle};

use crate::{
    error::MonitorError,
    models::Alert,
    services::watcher::{self, WatchExit, WatcherContext},
};

/// Runs watchers on a bounded number of slots.
///
/// Up to `max_workers` watchers poll at once; up to `max_queued` more wait for
/// a slot. Beyond that `spawn` rejects. No per-symbol dedupe happens here: the
/// registry's `Upsert` / `resume` results decide when a watcher is due.
#[derive(Clone)]
pub struct WatcherScheduler {
    ctx: Arc<WatcherContext>,
    slots: Arc<Semaphore>,
    queued: Arc<AtomicUsize>,
    running: Arc<AtomicUsize>,
    max_queued: usize,
}

// Keeps `running` honest even if a watcher panics.
struct RunningGuard(Arc<AtomicUsize>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl WatcherScheduler {
    pub fn new(ctx: Arc<WatcherContext>) -> Self {
        let max_workers = ctx.config.max_workers.max(1);
        let max_queued = ctx.config.max_queued;
        Self {
            ctx,
            slots: Arc::new(Semaphore::new(max_workers)),
            queued: Arc::new(AtomicUsize::new(0)),
            running: Arc::new(AtomicUsize::new(0)),
            max_queued,
        }
    }

    pub fn spawn(&self, alert: Alert) -> Result<JoinHandle<WatchExit>, MonitorError> {
        let ready = self.slots.clone().try_acquire_owned().ok();

        if ready.is_none() {
            let waiting = self.queued.fetch_add(1, Ordering::SeqCst);
            if waiting >= self.max_queued {
                self.queued.fetch_sub(1, Ordering::SeqCst);
                tracing::warn!("Watcher queue full, rejecting {}", alert.symbol);
                return Err(MonitorError::Saturated);
            }
            tracing::info!("All watcher slots busy, queueing {}", alert.symbol);
        }

        let ctx = self.ctx.clone();
        let slots = self.slots.clone();
        let queued = self.queued.clone();
        let running = self.running.clone();

        Ok(tokio::spawn(async move {
            let _permit = match ready {
                Some(p) => p,
                None => {
                    let acquired = slots.acquire_owned().await;
                    queued.fetch_sub(1, Ordering::SeqCst);
                    match acquired {
                        Ok(p) => p,
                        Err(_) => return WatchExit::Cancelled,
                    }
                }
            };

            running.fetch_add(1, Ordering::SeqCst);
            let _guard = RunningGuard(running);
            watcher::run(ctx, alert).await
        }))
    }

    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }
}
