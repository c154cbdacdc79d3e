//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせて harness の制御フローを実装します。
//!
//! # 主要コンポーネント
//! - **TaskBuilder**: Task の構築とワイヤリング（起動時検証）
//! - **Task**: 1 ページ分の計測（bootstrap → init → probe / overlay）
//! - **Reporter**: 結果の送信と送信記録
//! - **bootstrap**: 依存ライブラリの確保
//! - **boundary**: probe の失敗を `exception` 報告に閉じ込める
//! - **overlay**: 訪問者数の表示（表示のみ、失敗しない）

pub mod bootstrap;
pub mod boundary;
pub mod builder;
pub mod overlay;
pub mod reporter;
pub mod task;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, TaskBuilder};
pub use self::reporter::Reporter;
pub use self::task::Task;
