//! Beacon port - 結果送信の抽象化
//!
//! fire-and-forget の GET を 1 本投げるだけです。
//! 応答の検証もリトライもしません。

use url::Url;

/// Sends a single GET to `url` without waiting for, or looking at, the response.
///
/// Implementations must not block and must not report errors.
pub trait Beacon {
    fn dispatch(&self, url: Url);
}
