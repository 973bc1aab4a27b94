use chrono::{DateTime, Utc};

/// Clock port for reading the current time.
///
/// Every overdue and monthly computation depends on "now". Injecting the
/// time source keeps the borrowing service and the statistics aggregator
/// deterministic under test.
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}
