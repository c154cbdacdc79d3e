//! Cache timing probe
//!
//! iframe を読み込み、その load を待ってから同じサイトの画像を読み込みます。
//! iframe が画像をキャッシュしていれば、画像の load は速くなります。
//!
//! - 画像の時間は画像自身の attach から測る（iframe の開始からではない）
//! - control 画像は primary と並行に attach し、独立に報告する

use async_trait::async_trait;
use url::Url;

use super::{ProbeSession, ProbeStrategy};
use crate::app::boundary::guarded;
use crate::domain::{ControlReport, Outcome, ProbeError, ResultState, TimingReport};
use crate::ports::Resource;

/// The baseline image raced against the primary pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlImage {
    url: Url,
    report: ControlReport,
}

impl ControlImage {
    pub fn new(url: Url, report: ControlReport) -> Self {
        Self { url, report }
    }

    async fn run(&self, session: &ProbeSession<'_>) -> Result<(), ProbeError> {
        let image = session.load(Resource::image(self.url.clone())).await?;
        let outcome = match (image.loaded(), self.report) {
            (true, ControlReport::Verdict) => Outcome::control_verdict(true),
            (true, ControlReport::Timing) => {
                Outcome::timing(ResultState::LoadTimeControlImg, image.elapsed_ms)
            }
            (false, _) => Outcome::control_verdict(false),
        };
        session.reporter.submit(outcome);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheProbe {
    iframe_url: Url,
    image_url: Url,
    timing: TimingReport,
    control: Option<ControlImage>,
}

impl CacheProbe {
    pub fn new(iframe_url: Url, image_url: Url, timing: TimingReport) -> Self {
        Self {
            iframe_url,
            image_url,
            timing,
            control: None,
        }
    }

    pub fn with_control(mut self, control: ControlImage) -> Self {
        self.control = Some(control);
        self
    }

    async fn primary(&self, session: &ProbeSession<'_>) -> Result<(), ProbeError> {
        let iframe = session.load(Resource::iframe(self.iframe_url.clone())).await?;
        if !iframe.loaded() {
            session.reporter.send_failure();
            return Ok(());
        }
        if self.timing == TimingReport::Separate {
            session
                .reporter
                .submit(Outcome::timing(ResultState::LoadTimeIframe, iframe.elapsed_ms));
        }

        let image = session.load(Resource::image(self.image_url.clone())).await?;
        if !image.loaded() {
            session.reporter.send_failure();
            return Ok(());
        }
        let outcome = match self.timing {
            TimingReport::Composite => Outcome::new(ResultState::LoadTime)
                .with_message(format!("{},{}", iframe.elapsed_ms, image.elapsed_ms)),
            TimingReport::Separate => Outcome::timing(ResultState::LoadTimeImg, image.elapsed_ms),
        };
        session.reporter.submit(outcome);
        Ok(())
    }
}

#[async_trait(?Send)]
impl ProbeStrategy for CacheProbe {
    fn name(&self) -> &'static str {
        if self.control.is_some() {
            "iframe-cache-control"
        } else {
            "iframe-cache"
        }
    }

    async fn execute(&self, session: &ProbeSession<'_>) -> Result<(), ProbeError> {
        let Some(control) = &self.control else {
            return self.primary(session).await;
        };
        // A failing branch must not silence the other one.
        futures::join!(
            guarded(session.reporter, "iframe-cache", self.primary(session)),
            guarded(session.reporter, "control-img", control.run(session)),
        );
        Ok(())
    }
}
