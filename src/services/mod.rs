pub mod quotes;
pub mod finnhub;
pub mod channel;
pub mod telegram;

pub mod alert_registry;
pub mod pending_table;
pub mod notifier;
pub mod watcher;
pub mod scheduler;
pub mod adjustment;
pub mod monitor;
