//! Clock port - 時刻の抽象化
//!
//! - SystemClock: 本番用
//! - FixedClock: テスト用
//! - TokioClock（impls）: tokio の仮想時間に追従する

use chrono::{DateTime, Utc};

/// Clock は現在時刻を提供
///
/// load-time 系の probe は attach 直前と load イベント時の 2 点を読みます。
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Whole milliseconds from `start` to `end`.
pub fn elapsed_ms(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_milliseconds()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}
