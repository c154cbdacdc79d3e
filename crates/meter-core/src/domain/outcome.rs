//! Outcome model: what a probe reports back to the collection server.
//!
//! The state vocabulary is fixed by the collection server; it is serialized
//! in kebab-case exactly as it appears in `cmh-result`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default upper bound for `cmh-message`, in characters.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 64;

/// The categorical result of a measurement (the `cmh-result` value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultState {
    Init,
    Success,
    Failure,
    Exception,
    SuccessControl,
    FailureControl,
    LoadTime,
    LoadTimeIframe,
    LoadTimeImg,
    LoadTimeControlImg,
}

impl ResultState {
    pub const ALL: [ResultState; 10] = [
        ResultState::Init,
        ResultState::Success,
        ResultState::Failure,
        ResultState::Exception,
        ResultState::SuccessControl,
        ResultState::FailureControl,
        ResultState::LoadTime,
        ResultState::LoadTimeIframe,
        ResultState::LoadTimeImg,
        ResultState::LoadTimeControlImg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResultState::Init => "init",
            ResultState::Success => "success",
            ResultState::Failure => "failure",
            ResultState::Exception => "exception",
            ResultState::SuccessControl => "success-control",
            ResultState::FailureControl => "failure-control",
            ResultState::LoadTime => "load-time",
            ResultState::LoadTimeIframe => "load-time-iframe",
            ResultState::LoadTimeImg => "load-time-img",
            ResultState::LoadTimeControlImg => "load-time-control-img",
        }
    }

    /// Does this state describe the control resource rather than the target?
    pub fn is_control(self) -> bool {
        matches!(
            self,
            ResultState::SuccessControl
                | ResultState::FailureControl
                | ResultState::LoadTimeControlImg
        )
    }
}

impl fmt::Display for ResultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown result state '{0}'")]
pub struct UnknownState(pub String);

impl FromStr for ResultState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResultState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

/// One reported result: a state plus an optional diagnostic message.
///
/// - `exception` carries the error description.
/// - `load-time*` carry elapsed milliseconds (`"50"` or a composite `"50,5"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub state: ResultState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Outcome {
    pub fn new(state: ResultState) -> Self {
        Self {
            state,
            message: None,
        }
    }

    pub fn success() -> Self {
        Self::new(ResultState::Success)
    }

    pub fn failure() -> Self {
        Self::new(ResultState::Failure)
    }

    pub fn exception(description: impl fmt::Display) -> Self {
        Self::new(ResultState::Exception).with_message(description.to_string())
    }

    /// A primary comparison: `success` when the check held, `failure` otherwise.
    pub fn verdict(passed: bool) -> Self {
        if passed {
            Self::success()
        } else {
            Self::failure()
        }
    }

    /// A control comparison: `success-control` / `failure-control`.
    pub fn control_verdict(passed: bool) -> Self {
        if passed {
            Self::new(ResultState::SuccessControl)
        } else {
            Self::new(ResultState::FailureControl)
        }
    }

    pub fn timing(state: ResultState, elapsed_ms: i64) -> Self {
        Self::new(state).with_message(elapsed_ms.to_string())
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Cut the message down to at most `max_chars` characters.
    pub fn truncated(mut self, max_chars: usize) -> Self {
        if let Some(message) = self.message.as_mut() {
            let keep = truncate_message(message, max_chars).len();
            message.truncate(keep);
        }
        self
    }
}

/// First `max_chars` characters of `message`, never splitting a character.
pub fn truncate_message(message: &str, max_chars: usize) -> &str {
    match message.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &message[..byte_idx],
        None => message,
    }
}
