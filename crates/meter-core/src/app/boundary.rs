//! Boundary - probe の失敗を閉じ込める
//!
//! probe 本体（および独立した control 分岐）はここを通して実行します。
//! `Err` も unwind する panic も `exception` 1 件に変換し、外へは何も伝播させません。
//!
//! wasm32-unknown-unknown では panic は abort になるため、ブラウザ上で
//! 変換されるのは `Err` だけです。panic を拾えるのは native の実行時のみです。

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use super::reporter::Reporter;
use crate::domain::ProbeError;

/// Run `body`; report `exception` if it fails, or if it panics on a target
/// where panics unwind. On wasm32 a panic aborts the module instead.
pub async fn guarded<F>(reporter: &Reporter, label: &str, body: F)
where
    F: Future<Output = Result<(), ProbeError>>,
{
    let err = match AssertUnwindSafe(body).catch_unwind().await {
        Ok(Ok(())) => return,
        Ok(Err(err)) => err,
        Err(payload) => ProbeError::Panicked(panic_message(payload.as_ref())),
    };
    tracing::warn!(probe = label, error = %err, "probe raised");
    reporter.send_exception(&err);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
