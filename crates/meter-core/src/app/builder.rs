//! TaskBuilder - Task の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 開発体験の改善（明確なエラーメッセージ）

use super::reporter::Reporter;
use super::task::Task;
use crate::domain::{ConfigError, TaskConfig};
use crate::ports::{Beacon, Clock, Page, SystemClock};
use crate::probes::Probe;

/// TaskBuilder は 1 ページ分の Task を構築
///
/// # 使用例
/// ```ignore
/// let task = TaskBuilder::new(config)
///     .page(DomPage::new()?)
///     .beacon(FetchBeacon)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - build() 時に設定を検証し、派生 URL を全て解決する
/// - page / beacon が無ければ BuildError を返す
pub struct TaskBuilder {
    config: TaskConfig,
    page: Option<Box<dyn Page>>,
    beacon: Option<Box<dyn Beacon>>,
    clock: Option<Box<dyn Clock>>,
}

/// BuildError は Task 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing port: {0}. Call TaskBuilder::{0}() before build().")]
    MissingPort(&'static str),

    #[error("Invalid task config: {0}")]
    Config(#[from] ConfigError),
}

impl TaskBuilder {
    pub fn new(config: TaskConfig) -> Self {
        Self {
            config,
            page: None,
            beacon: None,
            clock: None,
        }
    }

    pub fn page(mut self, page: impl Page + 'static) -> Self {
        self.page = Some(Box::new(page));
        self
    }

    pub fn beacon(mut self, beacon: impl Beacon + 'static) -> Self {
        self.beacon = Some(Box::new(beacon));
        self
    }

    /// Defaults to `SystemClock`.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn build(self) -> Result<Task, BuildError> {
        self.config.validate()?;
        let page = self.page.ok_or(BuildError::MissingPort("page"))?;
        let beacon = self.beacon.ok_or(BuildError::MissingPort("beacon"))?;
        let clock = self.clock.unwrap_or_else(|| Box::new(SystemClock));

        let reporter = Reporter::new(&self.config, beacon)?;
        let library_url = self.config.library_url()?;
        let refer_url = self.config.stats_refer_url()?;
        let probe = Probe::from(&self.config.probe);

        Ok(Task {
            config: self.config,
            page,
            clock,
            reporter,
            probe,
            library_url,
            refer_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CssSpec, MeasurementId, ProbeSpec};
    use crate::impls::{PageScript, RecordingBeacon, ScriptedPage};
    use url::Url;

    fn config() -> TaskConfig {
        TaskConfig::new(
            Url::parse("http://localhost:8080").unwrap(),
            MeasurementId::new("m").unwrap(),
            ProbeSpec::Image {
                image_url: Url::parse("http://t.example/a.png").unwrap(),
            },
        )
    }

    #[test]
    fn test_build_success() {
        let task = TaskBuilder::new(config())
            .page(ScriptedPage::new(PageScript::default()))
            .beacon(RecordingBeacon::new())
            .build();
        assert!(task.is_ok());
    }

    #[test]
    fn test_build_missing_page() {
        let task = TaskBuilder::new(config())
            .beacon(RecordingBeacon::new())
            .build();
        assert!(matches!(task, Err(BuildError::MissingPort("page"))));
    }

    #[test]
    fn test_build_missing_beacon() {
        let task = TaskBuilder::new(config())
            .page(ScriptedPage::new(PageScript::default()))
            .build();
        assert!(matches!(task, Err(BuildError::MissingPort("beacon"))));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = config();
        config.probe = ProbeSpec::Css(CssSpec::new(
            Url::parse("http://t.example/s.css").unwrap(),
            "",
            "absolute",
        ));
        let task = TaskBuilder::new(config)
            .page(ScriptedPage::new(PageScript::default()))
            .beacon(RecordingBeacon::new())
            .build();
        assert!(matches!(
            task,
            Err(BuildError::Config(ConfigError::EmptyCssField("property")))
        ));
    }
}
