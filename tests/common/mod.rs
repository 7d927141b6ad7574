#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use pricewatch::{
    config::MonitorConfig,
    error::{NotifyError, QuoteError},
    services::{channel::NotificationChannel, monitor::Monitor, quotes::QuoteProvider},
};

pub const CHAT: &str = "5157836313";

/// Scripted quotes per symbol. `None` entries fail; the last entry repeats forever.
#[derive(Default)]
pub struct FakeQuotes {
    scripts: Mutex<HashMap<String, VecDeque<Option<f64>>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeQuotes {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_price(&self, symbol: &str, price: f64) {
        self.script(symbol, vec![Some(price)]);
    }

    pub fn script(&self, symbol: &str, steps: Vec<Option<f64>>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(symbol.to_string(), steps.into_iter().collect());
    }

    pub fn calls(&self, symbol: &str) -> usize {
        self.calls.lock().unwrap().get(symbol).copied().unwrap_or(0)
    }
}

#[async_trait]
impl QuoteProvider for FakeQuotes {
    async fn quote(&self, symbol: &str) -> Result<f64, QuoteError> {
        *self.calls.lock().unwrap().entry(symbol.to_string()).or_default() += 1;

        let mut scripts = self.scripts.lock().unwrap();
        let step = match scripts.get_mut(symbol) {
            Some(steps) if steps.len() > 1 => steps.pop_front().flatten(),
            Some(steps) => steps.front().copied().flatten(),
            None => None,
        };
        step.ok_or_else(|| QuoteError::MissingPrice(symbol.to_string()))
    }
}

/// Answers the first lookup at once; every later lookup waits for `release`.
pub struct GatedQuotes {
    price: f64,
    gate: Semaphore,
    calls: AtomicUsize,
}

impl GatedQuotes {
    pub fn new(price: f64) -> Arc<Self> {
        Arc::new(Self {
            price,
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for GatedQuotes {
    async fn quote(&self, _symbol: &str) -> Result<f64, QuoteError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }
        Ok(self.price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub recipient: String,
    pub text: String,
    pub await_reply: bool,
}

/// Records every delivered message. The first `failures` sends fail.
#[derive(Default)]
pub struct FakeChannel {
    sent: Mutex<Vec<Sent>>,
    attempts: Mutex<usize>,
    failures: Mutex<usize>,
}

impl FakeChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next(&self, n: usize) {
        *self.failures.lock().unwrap() = n;
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    pub fn reply_requests(&self) -> Vec<Sent> {
        self.sent().into_iter().filter(|s| s.await_reply).collect()
    }

    pub fn containing(&self, needle: &str) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| s.text.contains(needle))
            .collect()
    }
}

#[async_trait]
impl NotificationChannel for FakeChannel {
    async fn send(&self, recipient: &str, text: &str, await_reply: bool) -> Result<(), NotifyError> {
        *self.attempts.lock().unwrap() += 1;

        {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(NotifyError::Rejected("simulated outage".to_string()));
            }
        }

        self.sent.lock().unwrap().push(Sent {
            recipient: recipient.to_string(),
            text: text.to_string(),
            await_reply,
        });
        Ok(())
    }
}

pub fn fast_config() -> MonitorConfig {
    MonitorConfig {
        poll_interval: Duration::from_millis(20),
        retry_backoff: Duration::from_millis(5),
        notify_backoff: Duration::from_millis(1),
        max_retries: 5,
        max_workers: 20,
        max_queued: 100,
        utc_offset_hours: 8,
    }
}

pub fn monitor_with(config: MonitorConfig) -> (Monitor, Arc<FakeQuotes>, Arc<FakeChannel>) {
    let quotes = FakeQuotes::new();
    let channel = FakeChannel::new();
    let monitor = Monitor::new(quotes.clone(), channel.clone(), config);
    (monitor, quotes, channel)
}

pub fn monitor() -> (Monitor, Arc<FakeQuotes>, Arc<FakeChannel>) {
    monitor_with(fast_config())
}

/// Polls `cond` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut cond: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if cond().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
