//! Task - 1 ページ分の計測のオーケストレーション
//!
//! # 流れ
//! 1. launch(): opt-out を確認し、依存ライブラリを確保する
//! 2. run(): `init` を報告する
//! 3. 文書構造の準備ができたら probe を boundary 内で実行
//! 4. 同じ合図で stats overlay を描画（probe とは独立、順序なし）

use url::Url;

use super::boundary::guarded;
use super::bootstrap::ensure_library;
use super::builder::TaskBuilder;
use super::overlay::render_stats;
use super::reporter::Reporter;
use crate::domain::{HarnessError, ResultState, TaskConfig};
use crate::ports::{Clock, Page};
use crate::probes::{Probe, ProbeSession, ProbeStrategy};

/// A configured measurement, wired to its page, beacon and clock.
///
/// Built with [`TaskBuilder`].
pub struct Task {
    pub(super) config: TaskConfig,
    pub(super) page: Box<dyn Page>,
    pub(super) clock: Box<dyn Clock>,
    pub(super) reporter: Reporter,
    pub(super) probe: Probe,
    pub(super) library_url: Url,
    pub(super) refer_url: Url,
}

impl Task {
    pub fn builder(config: TaskConfig) -> TaskBuilder {
        TaskBuilder::new(config)
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// The last state handed to the beacon, if any.
    pub fn submitted(&self) -> Option<ResultState> {
        self.reporter.submitted()
    }

    /// Entry point for an injected task: bootstrap, then [`Task::run`].
    ///
    /// Fails only when the utility library reports a load error; nothing is
    /// sent in that case.
    pub async fn launch(&self) -> Result<(), HarnessError> {
        if self.config.hints.opted_out {
            tracing::info!(measurement_id = %self.config.measurement_id, "visitor opted out");
            return Ok(());
        }
        ensure_library(self.page.as_ref(), self.config.hints.library, &self.library_url).await?;
        self.run().await;
        Ok(())
    }

    /// Report `init`, then run the probe and the overlay once the page is ready.
    ///
    /// Every call starts a fresh probe execution.
    pub async fn run(&self) {
        tracing::info!(
            measurement_id = %self.config.measurement_id,
            task_type = self.config.probe.task_type(),
            "starting measurement"
        );
        self.reporter.report(ResultState::Init, None);

        let page = self.page.as_ref();
        let session = ProbeSession::new(page, self.clock.as_ref(), &self.reporter);
        let probe = async {
            page.structure_ready().await;
            guarded(&self.reporter, self.probe.name(), self.probe.execute(&session)).await;
        };
        let overlay = async {
            if !self.config.hints.show_stats {
                return;
            }
            page.structure_ready().await;
            render_stats(page, self.config.hints.prior_count, &self.refer_url);
        };
        futures::join!(probe, overlay);
    }
}
