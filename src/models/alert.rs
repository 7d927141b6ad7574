#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    Running,
    Paused,
    // retries exhausted, waits for the user to re-register
    Stopped,
    Removed,
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub symbol: String,
    pub recipient: String,

    pub target_rise: f64,
    pub target_fall: f64,

    pub state: AlertState,

    // bumped on every activation; a watcher only owns the epoch it was spawned for
    pub epoch: u64,
}
