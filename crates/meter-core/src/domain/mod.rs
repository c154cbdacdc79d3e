//! Domain model (ids, config, hints, outcomes, submissions, probe phases).
//!
//! ここには副作用を持たない値だけを置きます。
//! ブラウザやネットワークへの依存は ports 側に切り出しています。

pub mod config;
pub mod errors;
pub mod hints;
pub mod ids;
pub mod outcome;
pub mod state;
pub mod submission;

pub use config::{ControlReport, CssSpec, ProbeSpec, StyleScope, TaskConfig, TimingReport};
pub use errors::{ConfigError, HarnessError, PageError, ProbeError};
pub use hints::{LibraryHint, TaskHints};
pub use ids::MeasurementId;
pub use outcome::{DEFAULT_MAX_MESSAGE_LEN, Outcome, ResultState};
pub use state::{LoadEvent, ProbePhase};
pub use submission::{Submission, SubmissionError};
