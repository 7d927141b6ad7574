pub mod alert;
pub mod pending;
pub mod update;

pub use alert::{Alert, AlertState};
pub use pending::{Direction, PendingAdjustment};
pub use update::{Chat, Message, Update};
