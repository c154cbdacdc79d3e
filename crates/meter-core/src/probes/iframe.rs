//! Iframe load timing probe.

use async_trait::async_trait;
use url::Url;

use super::{ProbeSession, ProbeStrategy};
use crate::domain::{Outcome, ProbeError, ResultState};
use crate::ports::Resource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IframeLoadProbe {
    iframe_url: Url,
}

impl IframeLoadProbe {
    pub fn new(iframe_url: Url) -> Self {
        Self { iframe_url }
    }
}

#[async_trait(?Send)]
impl ProbeStrategy for IframeLoadProbe {
    fn name(&self) -> &'static str {
        "iframe-load"
    }

    /// `load-time` with the elapsed milliseconds, or `failure` on an error event.
    async fn execute(&self, session: &ProbeSession<'_>) -> Result<(), ProbeError> {
        let iframe = session.load(Resource::iframe(self.iframe_url.clone())).await?;
        if iframe.loaded() {
            session
                .reporter
                .submit(Outcome::timing(ResultState::LoadTime, iframe.elapsed_ms));
        } else {
            session.reporter.send_failure();
        }
        Ok(())
    }
}
