//! RecordingBeacon - 送信 URL を記録するだけの Beacon

use std::cell::RefCell;
use std::rc::Rc;

use url::Url;

use crate::domain::{Outcome, ResultState, Submission};
use crate::ports::Beacon;

/// Keeps every dispatched URL. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingBeacon {
    sent: Rc<RefCell<Vec<Url>>>,
}

impl RecordingBeacon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn urls(&self) -> Vec<Url> {
        self.sent.borrow().clone()
    }

    /// Dispatched URLs decoded back into submissions. Undecodable URLs are skipped.
    pub fn submissions(&self) -> Vec<Submission> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|url| Submission::from_url(url).ok())
            .collect()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.submissions().into_iter().map(|s| s.outcome).collect()
    }

    pub fn states(&self) -> Vec<ResultState> {
        self.submissions()
            .into_iter()
            .map(|s| s.outcome.state)
            .collect()
    }
}

impl Beacon for RecordingBeacon {
    fn dispatch(&self, url: Url) {
        self.sent.borrow_mut().push(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_log() {
        let beacon = RecordingBeacon::new();
        let handle = beacon.clone();
        beacon.dispatch(
            Url::parse("http://localhost/submit?cmh-id=m&cmh-result=load-time&cmh-message=12")
                .unwrap(),
        );
        beacon.dispatch(Url::parse("http://localhost/elsewhere").unwrap());

        assert_eq!(handle.urls().len(), 2);
        assert_eq!(
            handle.outcomes(),
            vec![Outcome::timing(ResultState::LoadTime, 12)]
        );
    }
}
