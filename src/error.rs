use thiserror::Error;

/// Failure of a single quote lookup. The watcher treats every variant as transient.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("FINNHUB_API_KEY is missing")]
    MissingKey,

    #[error("quote request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Finnhub quote failed: {status} {body}")]
    Status { status: u16, body: String },

    #[error("could not get the price for {0} from Finnhub")]
    MissingPrice(String),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("TG_API_KEY is missing")]
    MissingToken,

    #[error("telegram request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("telegram rejected message: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("invalid stock symbol or there was a problem fetching the stock price: {0}")]
    InvalidSymbolOrProvider(#[source] QuoteError),

    #[error("prices must be positive numbers")]
    InvalidThreshold,

    #[error("too many alerts are waiting for a monitoring slot, try again later")]
    Saturated,
}

#[derive(Error, Debug)]
pub enum AdjustError {
    #[error("please enter a valid price")]
    Parse,

    #[error("no stock found that requires a price adjustment")]
    NoPending,

    #[error(transparent)]
    Scheduler(#[from] MonitorError),
}
