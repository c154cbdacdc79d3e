//! Errors - エラー型と分類
//!
//! 層ごとに enum を分けています。
//! - ConfigError: 設定値の検証エラー（起動時に検出）
//! - PageError: ブラウザ側（DOM）の操作エラー
//! - ProbeError: probe 実行中のエラー（boundary で `exception` に変換される）
//! - HarnessError: bootstrap の失敗

use thiserror::Error;

/// Invalid task configuration, detected before anything runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("measurement id must not be empty")]
    EmptyMeasurementId,

    #[error("cannot build endpoint '{path}' from server url: {source}")]
    InvalidEndpoint {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("css probe needs a non-empty {0}")]
    EmptyCssField(&'static str),

    #[error("control marker id '{0}' must differ from the target marker id")]
    DuplicateMarker(String),

    #[error("max_message_len must be at least 1")]
    ZeroMessageLength,
}

/// A failure reported by the page adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("element '{0}' not found")]
    ElementNotFound(String),

    #[error("dom operation failed: {0}")]
    Dom(String),

    #[error("operation not supported by this page: {0}")]
    Unsupported(&'static str),
}

/// Anything that goes wrong inside a probe body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Page(#[from] PageError),

    #[error("probe panicked: {0}")]
    Panicked(String),
}

/// Failures that stop the task before its probe is ever scheduled.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("utility library at {url} failed to load")]
    DependencyLoad { url: String },

    #[error(transparent)]
    Page(#[from] PageError),
}
