use std::fmt;

/// Which threshold a reply will update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rise,
    Fall,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Rise => f.write_str("rise"),
            Direction::Fall => f.write_str("fall"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAdjustment {
    pub recipient: String,
    pub symbol: String,
    pub direction: Direction,
}
