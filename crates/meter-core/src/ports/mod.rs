//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! harness は外の世界（ブラウザ文書、ネットワーク、時計）にここ経由でのみ触れます。
//!
//! # 設計原則
//! - ブラウザのイベントループは単一スレッド: Page は `?Send`
//! - 送信は fire-and-forget: Beacon は同期・失敗なし
//! - 時刻は差し替え可能: Clock

pub mod beacon;
pub mod clock;
pub mod id_generator;
pub mod page;

pub use self::beacon::Beacon;
pub use self::clock::{Clock, FixedClock, SystemClock, elapsed_ms};
pub use self::id_generator::MeasurementIdGenerator;
#[cfg(feature = "runtime")]
pub use self::id_generator::RandomIdGenerator;
pub use self::page::{Page, Resource, ResourceKind, StylesheetRequest};
