use chrono::{DateTime, Utc};

/// Source of the current time for timestamps and calendar windows.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}
