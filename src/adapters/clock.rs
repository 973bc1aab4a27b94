use crate::ports::Clock;
use chrono::{DateTime, Utc};

/// System wall-clock adapter used in production wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
