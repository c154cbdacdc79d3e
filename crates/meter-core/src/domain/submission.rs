//! Submission: the wire form of one reported outcome.
//!
//! ```text
//! GET {server}/submit?cmh-id={measurement_id}&cmh-result={state}&cmh-message={message}
//! ```

use serde::{Deserialize, Serialize};
use url::Url;

use super::ids::MeasurementId;
use super::outcome::{Outcome, ResultState};

pub const PARAM_ID: &str = "cmh-id";
pub const PARAM_RESULT: &str = "cmh-result";
pub const PARAM_MESSAGE: &str = "cmh-message";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub measurement_id: MeasurementId,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("submission is missing '{0}'")]
    MissingParam(&'static str),

    #[error("invalid '{param}' value: {value}")]
    InvalidParam { param: &'static str, value: String },
}

impl Submission {
    pub fn new(measurement_id: MeasurementId, outcome: Outcome) -> Self {
        Self {
            measurement_id,
            outcome,
        }
    }

    /// Form-urlencode this submission onto the submit endpoint.
    ///
    /// `cmh-message` is always present and empty when there is no message.
    pub fn to_url(&self, submit_url: &Url) -> Url {
        let mut url = submit_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair(PARAM_ID, self.measurement_id.as_str())
            .append_pair(PARAM_RESULT, self.outcome.state.as_str())
            .append_pair(PARAM_MESSAGE, self.outcome.message.as_deref().unwrap_or(""));
        url
    }

    /// Decode a submit URL the way the collection server reads it.
    ///
    /// An empty `cmh-message` decodes to no message.
    pub fn from_url(url: &Url) -> Result<Self, SubmissionError> {
        let mut id = None;
        let mut result = None;
        let mut message = None;
        for (key, value) in url.query_pairs() {
            let slot = match &*key {
                PARAM_ID => &mut id,
                PARAM_RESULT => &mut result,
                PARAM_MESSAGE => &mut message,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        let id = id.ok_or(SubmissionError::MissingParam(PARAM_ID))?;
        let measurement_id =
            MeasurementId::new(id.clone()).map_err(|_| SubmissionError::InvalidParam {
                param: PARAM_ID,
                value: id,
            })?;

        let result = result.ok_or(SubmissionError::MissingParam(PARAM_RESULT))?;
        let state: ResultState = result.parse().map_err(|_| SubmissionError::InvalidParam {
            param: PARAM_RESULT,
            value: result,
        })?;

        let mut outcome = Outcome::new(state);
        outcome.message = message.filter(|m| !m.is_empty());
        Ok(Self::new(measurement_id, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit_url() -> Url {
        Url::parse("http://localhost:8080/submit").unwrap()
    }

    #[test]
    fn success_has_an_empty_message_param() {
        let s = Submission::new(MeasurementId::new("abc").unwrap(), Outcome::success());
        assert_eq!(
            s.to_url(&submit_url()).as_str(),
            "http://localhost:8080/submit?cmh-id=abc&cmh-result=success&cmh-message="
        );
    }

    #[test]
    fn messages_are_form_encoded() {
        let s = Submission::new(
            MeasurementId::new("a b").unwrap(),
            Outcome::exception("TypeError: x is undefined & more"),
        );
        let url = s.to_url(&submit_url());
        assert_eq!(
            url.query(),
            Some("cmh-id=a+b&cmh-result=exception&cmh-message=TypeError%3A+x+is+undefined+%26+more")
        );
        assert_eq!(Submission::from_url(&url).unwrap(), s);
    }

    #[test]
    fn decoding_treats_empty_message_as_none() {
        let url = Url::parse(
            "http://localhost:8080/submit?cmh-id=abc&cmh-result=load-time&cmh-message=",
        )
        .unwrap();
        let s = Submission::from_url(&url).unwrap();
        assert_eq!(s.outcome, Outcome::new(ResultState::LoadTime));
    }

    #[test]
    fn decoding_rejects_unknown_states() {
        let url = Url::parse("http://h/submit?cmh-id=abc&cmh-result=bogus").unwrap();
        assert!(matches!(
            Submission::from_url(&url),
            Err(SubmissionError::InvalidParam { param: PARAM_RESULT, .. })
        ));
    }

    #[test]
    fn decoding_requires_an_id() {
        let url = Url::parse("http://h/submit?cmh-result=init").unwrap();
        assert_eq!(
            Submission::from_url(&url),
            Err(SubmissionError::MissingParam(PARAM_ID))
        );
    }
}
