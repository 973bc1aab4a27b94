use crate::ports::Clock as ClockTrait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Clockのモック実装
///
/// 固定時刻を返すことで延滞判定や月次集計を決定的にテストできる。
/// `advance`で時間経過をシミュレートする。
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// テスト用に現在時刻を設定
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    /// テスト用に時間を進める
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += delta;
    }
}

impl ClockTrait for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
