//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **ScriptedPage**: `PageScript` 通りに振る舞うページ（tokio の時刻で遅延）
//! - **RecordingBeacon**: 送信 URL を記録する Beacon
//! - **TokioClock**: tokio の timer に従う Clock
//!
//! # ブラウザ用実装
//! ブラウザ用の実装は別クレートに配置します：
//! - `meter-web`: DomPage / FetchBeacon / DateClock

pub mod recording_beacon;
#[cfg(feature = "runtime")]
pub mod scripted_page;
#[cfg(feature = "runtime")]
pub mod tokio_clock;

pub use self::recording_beacon::RecordingBeacon;
#[cfg(feature = "runtime")]
pub use self::scripted_page::{PageScript, ScriptedEvent, ScriptedLoad, ScriptedPage, ScriptedStyle};
#[cfg(feature = "runtime")]
pub use self::tokio_clock::TokioClock;
