//! Probes - 計測戦略
//!
//! 戦略は閉じた集合（`Probe` enum）で、設定の `task_type` から 1 つ選ばれます。
//!
//! # 二層構造
//! - **ProbeStrategy trait**: 各戦略の `execute`
//! - **Probe enum**: 設定から構築され、選ばれた戦略に委譲する
//!
//! 各戦略は transient な要素を attach し、ブラウザのイベントを待って
//! Reporter に 1 回以上報告します。失敗は `Err` で返し、boundary が `exception` に変換します。

pub mod cache;
pub mod css;
pub mod iframe;
pub mod load;

use async_trait::async_trait;

use crate::app::reporter::Reporter;
use crate::domain::{ProbeError, ProbePhase, ProbeSpec};
use crate::ports::{Clock, Page, Resource, elapsed_ms};

pub use self::cache::{CacheProbe, ControlImage};
pub use self::css::CssProbe;
pub use self::iframe::IframeLoadProbe;
pub use self::load::LoadProbe;

/// Everything a probe may touch during one execution.
pub struct ProbeSession<'a> {
    pub page: &'a dyn Page,
    pub clock: &'a dyn Clock,
    pub reporter: &'a Reporter,
}

/// A resource that settled, with the time it took from attach to event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    /// `Succeeded` or `Failed`.
    pub phase: ProbePhase,
    pub elapsed_ms: i64,
}

impl Settled {
    pub fn loaded(&self) -> bool {
        self.phase == ProbePhase::Succeeded
    }
}

impl<'a> ProbeSession<'a> {
    pub fn new(page: &'a dyn Page, clock: &'a dyn Clock, reporter: &'a Reporter) -> Self {
        Self {
            page,
            clock,
            reporter,
        }
    }

    /// Attach `resource` and wait for its first load or error event.
    ///
    /// The start time is taken immediately before the element is attached.
    pub async fn load(&self, resource: Resource) -> Result<Settled, ProbeError> {
        let phase = ProbePhase::Idle.attach();
        let started = self.clock.now();
        tracing::debug!(kind = ?resource.kind, url = %resource.url, "attaching resource");

        let event = match self.page.attach(&resource).await {
            Ok(event) => event,
            Err(err) => {
                tracing::debug!(url = %resource.url, error = %err, "attach failed");
                return Err(err.into());
            }
        };

        let settled = Settled {
            phase: phase.settle(event),
            elapsed_ms: elapsed_ms(started, self.clock.now()),
        };
        tracing::debug!(
            url = %resource.url,
            phase = ?settled.phase,
            elapsed_ms = settled.elapsed_ms,
            "resource settled"
        );
        Ok(settled)
    }
}

#[async_trait(?Send)]
pub trait ProbeStrategy {
    fn name(&self) -> &'static str;

    /// Run the probe once. Report through `session.reporter`.
    async fn execute(&self, session: &ProbeSession<'_>) -> Result<(), ProbeError>;
}

/// The probe selected for a task.
#[derive(Debug, Clone, PartialEq)]
pub enum Probe {
    Image(LoadProbe),
    Script(LoadProbe),
    IframeLoad(IframeLoadProbe),
    IframeCache(CacheProbe),
    IframeCacheControl(CacheProbe),
    Css(CssProbe),
}

impl From<&ProbeSpec> for Probe {
    fn from(spec: &ProbeSpec) -> Self {
        match spec {
            ProbeSpec::Image { image_url } => Probe::Image(LoadProbe::image(image_url.clone())),
            ProbeSpec::Script { script_url } => {
                Probe::Script(LoadProbe::script(script_url.clone()))
            }
            ProbeSpec::IframeLoad { iframe_url } => {
                Probe::IframeLoad(IframeLoadProbe::new(iframe_url.clone()))
            }
            ProbeSpec::IframeCache {
                iframe_url,
                image_url,
                timing,
            } => Probe::IframeCache(CacheProbe::new(
                iframe_url.clone(),
                image_url.clone(),
                *timing,
            )),
            ProbeSpec::IframeCacheControl {
                iframe_url,
                image_url,
                control_image_url,
                timing,
                control,
            } => Probe::IframeCacheControl(
                CacheProbe::new(iframe_url.clone(), image_url.clone(), *timing)
                    .with_control(ControlImage::new(control_image_url.clone(), *control)),
            ),
            ProbeSpec::Css(css) => Probe::Css(CssProbe::new(css.clone())),
        }
    }
}

impl Probe {
    fn strategy(&self) -> &dyn ProbeStrategy {
        match self {
            Probe::Image(p) | Probe::Script(p) => p,
            Probe::IframeLoad(p) => p,
            Probe::IframeCache(p) | Probe::IframeCacheControl(p) => p,
            Probe::Css(p) => p,
        }
    }
}

#[async_trait(?Send)]
impl ProbeStrategy for Probe {
    fn name(&self) -> &'static str {
        self.strategy().name()
    }

    async fn execute(&self, session: &ProbeSession<'_>) -> Result<(), ProbeError> {
        self.strategy().execute(session).await
    }
}
