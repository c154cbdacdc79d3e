//! Reporter - 結果の送信
//!
//! `report()` は送信記録（submitted）を同期的に更新してから Beacon に渡します。
//! ネットワーク側が失敗しても、記録は常に最後に送ろうとした state を指します。

use std::cell::Cell;

use url::Url;

use crate::domain::{ConfigError, MeasurementId, Outcome, ResultState, Submission, TaskConfig};
use crate::ports::Beacon;

pub struct Reporter {
    submit_url: Url,
    measurement_id: MeasurementId,
    max_message_len: usize,
    beacon: Box<dyn Beacon>,
    submitted: Cell<Option<ResultState>>,
}

impl Reporter {
    pub fn new(config: &TaskConfig, beacon: Box<dyn Beacon>) -> Result<Self, ConfigError> {
        Ok(Self {
            submit_url: config.submit_url()?,
            measurement_id: config.measurement_id.clone(),
            max_message_len: config.max_message_len,
            beacon,
            submitted: Cell::new(None),
        })
    }

    /// Record `state`, truncate `message` and fire the submission.
    pub fn report(&self, state: ResultState, message: Option<&str>) {
        let mut outcome = Outcome::new(state);
        outcome.message = message.map(str::to_string);
        self.submit(outcome);
    }

    pub fn submit(&self, outcome: Outcome) {
        self.submitted.set(Some(outcome.state));
        let outcome = outcome.truncated(self.max_message_len);
        tracing::info!(
            measurement_id = %self.measurement_id,
            state = %outcome.state,
            message = outcome.message.as_deref().unwrap_or(""),
            "submitting result"
        );
        let submission = Submission::new(self.measurement_id.clone(), outcome);
        self.beacon.dispatch(submission.to_url(&self.submit_url));
    }

    pub fn send_failure(&self) {
        self.submit(Outcome::failure());
    }

    pub fn send_exception(&self, err: &dyn std::error::Error) {
        self.submit(Outcome::exception(err));
    }

    /// The last state handed to the beacon, if any.
    pub fn submitted(&self) -> Option<ResultState> {
        self.submitted.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PageError, ProbeSpec};
    use crate::impls::RecordingBeacon;

    fn config(max_message_len: usize) -> TaskConfig {
        let mut config = TaskConfig::new(
            Url::parse("http://localhost:8080").unwrap(),
            MeasurementId::new("m-42").unwrap(),
            ProbeSpec::Image {
                image_url: Url::parse("http://target.example/x.png").unwrap(),
            },
        );
        config.max_message_len = max_message_len;
        config
    }

    #[test]
    fn report_updates_the_submission_record_and_sends() {
        let beacon = RecordingBeacon::new();
        let reporter = Reporter::new(&config(64), Box::new(beacon.clone())).unwrap();
        assert_eq!(reporter.submitted(), None);

        reporter.report(ResultState::Init, None);
        assert_eq!(reporter.submitted(), Some(ResultState::Init));
        assert_eq!(
            beacon.urls()[0].as_str(),
            "http://localhost:8080/submit?cmh-id=m-42&cmh-result=init&cmh-message="
        );
    }

    #[test]
    fn messages_are_truncated_before_sending() {
        let beacon = RecordingBeacon::new();
        let reporter = Reporter::new(&config(8), Box::new(beacon.clone())).unwrap();

        reporter.report(ResultState::Exception, Some("ReferenceError: LazyLoad"));

        let sent = beacon.outcomes();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message.as_deref(), Some("Referenc"));
    }

    #[test]
    fn exceptions_carry_the_error_description() {
        let beacon = RecordingBeacon::new();
        let reporter = Reporter::new(&config(64), Box::new(beacon.clone())).unwrap();

        reporter.send_exception(&PageError::ElementNotFound("cmh-css-probe".into()));

        assert_eq!(
            beacon.outcomes(),
            vec![Outcome::exception("element 'cmh-css-probe' not found")]
        );
        assert_eq!(reporter.submitted(), Some(ResultState::Exception));
    }

    #[test]
    fn record_tracks_the_latest_state() {
        let beacon = RecordingBeacon::new();
        let reporter = Reporter::new(&config(64), Box::new(beacon.clone())).unwrap();

        reporter.submit(Outcome::success());
        reporter.send_failure();
        assert_eq!(reporter.submitted(), Some(ResultState::Failure));
        assert_eq!(beacon.states(), vec![ResultState::Success, ResultState::Failure]);
    }
}
