//! Scenario files: a task config plus the page it runs against.
//!
//! ```json
//! {
//!   "config": {
//!     "server_url": "http://localhost:8080",
//!     "probe": {"task_type": "img", "image_url": "http://target.example/logo.png"}
//!   },
//!   "page": {"resources": {"http://target.example/logo.png": {"event": "error"}}}
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use meter_core::domain::{DEFAULT_MAX_MESSAGE_LEN, MeasurementId, ProbeSpec, TaskConfig, TaskHints};
use meter_core::impls::PageScript;
use meter_core::ports::MeasurementIdGenerator;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub config: ScenarioConfig,
    #[serde(default)]
    pub page: PageScript,
}

/// A `TaskConfig` whose measurement id may be left for the CLI to pick.
#[derive(Debug, Deserialize)]
pub struct ScenarioConfig {
    pub server_url: Url,
    #[serde(default)]
    pub measurement_id: Option<MeasurementId>,
    pub probe: ProbeSpec,
    #[serde(default)]
    pub hints: TaskHints,
    #[serde(default)]
    pub max_message_len: Option<usize>,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    /// Resolve the task config. `hints`, when given, replace the file's hints.
    pub fn into_parts(
        self,
        ids: &dyn MeasurementIdGenerator,
        hints: Option<TaskHints>,
    ) -> (TaskConfig, PageScript) {
        let c = self.config;
        let measurement_id = c.measurement_id.unwrap_or_else(|| ids.generate());
        let mut config = TaskConfig::new(c.server_url, measurement_id, c.probe)
            .with_hints(hints.unwrap_or(c.hints));
        config.max_message_len = c.max_message_len.unwrap_or(DEFAULT_MAX_MESSAGE_LEN);
        (config, self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_core::domain::LibraryHint;
    use std::io::Write;

    struct FixedIds;

    impl MeasurementIdGenerator for FixedIds {
        fn generate(&self) -> MeasurementId {
            MeasurementId::from_bits(0xbeef)
        }
    }

    fn write(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_measurement_id_is_generated() {
        let file = write(
            r#"{"config": {
                "server_url": "http://localhost:8080",
                "probe": {"task_type": "script", "script_url": "http://t.example/a.js"}
            }}"#,
        );

        let (config, page) = Scenario::load(file.path())
            .unwrap()
            .into_parts(&FixedIds, None);

        assert_eq!(config.measurement_id.as_str(), "000000000000beef");
        assert_eq!(config.probe.task_type(), "script");
        assert_eq!(config.max_message_len, DEFAULT_MAX_MESSAGE_LEN);
        assert!(page.resources.is_empty());
    }

    #[test]
    fn command_line_hints_replace_file_hints() {
        let file = write(
            r#"{"config": {
                "server_url": "http://localhost:8080",
                "measurement_id": "fixed",
                "probe": {"task_type": "iframe-load", "iframe_url": "http://t.example/"},
                "hints": {"library": "present", "prior_count": 4}
            }}"#,
        );
        let hints = TaskHints {
            library: LibraryHint::Absent,
            ..TaskHints::default()
        };

        let (config, _) = Scenario::load(file.path())
            .unwrap()
            .into_parts(&FixedIds, Some(hints));

        assert_eq!(config.measurement_id.as_str(), "fixed");
        assert_eq!(config.hints.library, LibraryHint::Absent);
        assert_eq!(config.hints.prior_count, 0);
    }

    #[test]
    fn unreadable_scenario_names_the_file() {
        let err = Scenario::load(Path::new("/nonexistent/scenario.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/scenario.json"));
    }
}
