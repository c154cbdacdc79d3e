//! IdGenerator port - measurement ID 生成の抽象化
//!
//! 通常 measurement ID はサーバーから設定として渡されます。
//! CLI でシナリオを再生するときなど、手元で払い出す必要がある場合に使います。

use crate::domain::MeasurementId;

pub trait MeasurementIdGenerator {
    fn generate(&self) -> MeasurementId;
}

/// Random 63-bit ids, formatted as 16 hex digits.
#[cfg(feature = "runtime")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

#[cfg(feature = "runtime")]
impl MeasurementIdGenerator for RandomIdGenerator {
    fn generate(&self) -> MeasurementId {
        MeasurementId::from_bits(rand::random::<u64>())
    }
}
