//! Domain identifiers.
//!
//! # MeasurementId
//! サーバーが 1 ページロードごとに払い出す不透明な ID です。
//! harness は中身を解釈せず、`cmh-id` としてそのまま送り返します。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ConfigError;

/// Opaque identifier tying every submission of one page load together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MeasurementId(String);

impl MeasurementId {
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ConfigError::EmptyMeasurementId);
        }
        Ok(Self(value))
    }

    /// Format a random 63-bit value the way the collection server does
    /// (16 lowercase hex digits, zero padded).
    pub fn from_bits(bits: u64) -> Self {
        Self(format!("{:016x}", bits & (i64::MAX as u64)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MeasurementId {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MeasurementId> for String {
    fn from(id: MeasurementId) -> Self {
        id.0
    }
}

impl fmt::Display for MeasurementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
