//! meter-core
//!
//! Core building blocks for the censorship measurement harness.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, config, hints, outcome, submission, state, errors）
//! - **ports**: 抽象化レイヤー（Page, Beacon, Clock, MeasurementIdGenerator）
//! - **probes**: 計測戦略（img, script, iframe-load, iframe-cache, iframe-cache-control, css）
//! - **app**: アプリケーションロジック（builder, task, reporter, bootstrap, boundary, overlay）
//! - **impls**: 実装（ScriptedPage など開発用・テスト用）
//!
//! # feature
//! - `runtime`（default）: tokio に依存する開発用実装を有効にする。wasm 向けには無効にする。

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod probes;

pub use app::{BuildError, Task, TaskBuilder};
pub use domain::{HarnessError, ResultState, TaskConfig};
