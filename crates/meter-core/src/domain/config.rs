//! Task configuration: immutable, resolved once per page load.
//!
//! Per-deployment values (server URL, measurement id, targets) are filled in
//! outside the harness; this module only accepts already-typed values and
//! checks that they fit together.

use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::ConfigError;
use super::hints::TaskHints;
use super::ids::MeasurementId;
use super::outcome::DEFAULT_MAX_MESSAGE_LEN;

pub const SUBMIT_PATH: &str = "submit";
pub const LIBRARY_PATH: &str = "jquery.js";
pub const STATS_REFER_PATH: &str = "stats/refer";

/// Marker element id used by the CSS probe when none is configured.
pub const DEFAULT_CSS_MARKER_ID: &str = "cmh-css-probe";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Base URL of the collection server.
    pub server_url: Url,

    pub measurement_id: MeasurementId,

    /// Which probe to run, with its targets.
    pub probe: ProbeSpec,

    #[serde(default)]
    pub hints: TaskHints,

    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

fn default_max_message_len() -> usize {
    DEFAULT_MAX_MESSAGE_LEN
}

impl TaskConfig {
    pub fn new(server_url: Url, measurement_id: MeasurementId, probe: ProbeSpec) -> Self {
        Self {
            server_url,
            measurement_id,
            probe,
            hints: TaskHints::default(),
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
        }
    }

    pub fn with_hints(mut self, hints: TaskHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn submit_url(&self) -> Result<Url, ConfigError> {
        endpoint(&self.server_url, SUBMIT_PATH)
    }

    pub fn library_url(&self) -> Result<Url, ConfigError> {
        endpoint(&self.server_url, LIBRARY_PATH)
    }

    pub fn stats_refer_url(&self) -> Result<Url, ConfigError> {
        endpoint(&self.server_url, STATS_REFER_PATH)
    }

    /// Check everything that can be checked before the page is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_len == 0 {
            return Err(ConfigError::ZeroMessageLength);
        }
        self.submit_url()?;
        self.library_url()?;
        self.stats_refer_url()?;
        if let ProbeSpec::Css(css) = &self.probe {
            css.validate()?;
        }
        Ok(())
    }
}

/// `{base}/{path}`, regardless of whether `base` ends in a slash.
fn endpoint(base: &Url, path: &str) -> Result<Url, ConfigError> {
    let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&joined).map_err(|source| ConfigError::InvalidEndpoint {
        path: path.to_string(),
        source,
    })
}

/// The closed set of probe strategies, tagged by `task_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task_type", rename_all = "kebab-case")]
pub enum ProbeSpec {
    #[serde(rename = "img")]
    Image { image_url: Url },

    Script { script_url: Url },

    IframeLoad { iframe_url: Url },

    IframeCache {
        iframe_url: Url,
        image_url: Url,
        #[serde(default)]
        timing: TimingReport,
    },

    IframeCacheControl {
        iframe_url: Url,
        image_url: Url,
        control_image_url: Url,
        #[serde(default)]
        timing: TimingReport,
        #[serde(default)]
        control: ControlReport,
    },

    Css(CssSpec),
}

impl ProbeSpec {
    /// The `task_type` tag, as used in logs.
    pub fn task_type(&self) -> &'static str {
        match self {
            ProbeSpec::Image { .. } => "img",
            ProbeSpec::Script { .. } => "script",
            ProbeSpec::IframeLoad { .. } => "iframe-load",
            ProbeSpec::IframeCache { .. } => "iframe-cache",
            ProbeSpec::IframeCacheControl { .. } => "iframe-cache-control",
            ProbeSpec::Css(_) => "css",
        }
    }
}

/// How the cache probe reports its two timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimingReport {
    /// One `load-time` record, message `"{iframe_ms},{img_ms}"`.
    #[default]
    Composite,
    /// `load-time-iframe` and `load-time-img` records.
    Separate,
}

/// How the control image of the cache probe is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlReport {
    /// `success-control` on load, `failure-control` on error.
    #[default]
    Verdict,
    /// `load-time-control-img` with the elapsed time on load.
    Timing,
}

/// Where the CSS probe loads its stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleScope {
    /// A `<link>` in the live page, styling `<span>` markers.
    #[default]
    Live,
    /// An inline-document iframe holding the `<link>` and `<p>` markers.
    Isolated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssSpec {
    pub stylesheet_url: Url,

    /// CSS property to read, e.g. `position`.
    pub property: String,

    /// Value the property takes when the stylesheet applied unmodified.
    pub expected_value: String,

    #[serde(default = "default_marker_id")]
    pub marker_id: String,

    /// A marker the stylesheet must *not* style with `expected_value`.
    #[serde(default)]
    pub control_marker_id: Option<String>,

    #[serde(default)]
    pub scope: StyleScope,
}

fn default_marker_id() -> String {
    DEFAULT_CSS_MARKER_ID.to_string()
}

impl CssSpec {
    pub fn new(
        stylesheet_url: Url,
        property: impl Into<String>,
        expected_value: impl Into<String>,
    ) -> Self {
        Self {
            stylesheet_url,
            property: property.into(),
            expected_value: expected_value.into(),
            marker_id: default_marker_id(),
            control_marker_id: None,
            scope: StyleScope::Live,
        }
    }

    pub fn with_control(mut self, control_marker_id: impl Into<String>) -> Self {
        self.control_marker_id = Some(control_marker_id.into());
        self
    }

    pub fn isolated(mut self) -> Self {
        self.scope = StyleScope::Isolated;
        self
    }

    /// Target marker first, then the control marker if any.
    pub fn marker_ids(&self) -> Vec<String> {
        let mut ids = vec![self.marker_id.clone()];
        ids.extend(self.control_marker_id.iter().cloned());
        ids
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.property.trim().is_empty() {
            return Err(ConfigError::EmptyCssField("property"));
        }
        if self.marker_id.trim().is_empty() {
            return Err(ConfigError::EmptyCssField("marker_id"));
        }
        if let Some(control) = &self.control_marker_id {
            if control.trim().is_empty() {
                return Err(ConfigError::EmptyCssField("control_marker_id"));
            }
            if *control == self.marker_id {
                return Err(ConfigError::DuplicateMarker(control.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn config(server: &str) -> TaskConfig {
        TaskConfig::new(
            url(server),
            MeasurementId::new("m1").unwrap(),
            ProbeSpec::Image {
                image_url: url("http://target.example/favicon.ico"),
            },
        )
    }

    #[rstest]
    #[case("http://localhost:8080")]
    #[case("http://localhost:8080/")]
    fn endpoints_hang_off_the_server_url(#[case] server: &str) {
        let c = config(server);
        assert_eq!(c.submit_url().unwrap().as_str(), "http://localhost:8080/submit");
        assert_eq!(c.library_url().unwrap().as_str(), "http://localhost:8080/jquery.js");
        assert_eq!(
            c.stats_refer_url().unwrap().as_str(),
            "http://localhost:8080/stats/refer"
        );
    }

    #[test]
    fn endpoints_keep_a_path_prefix() {
        let c = config("https://meter.example/encore/");
        assert_eq!(
            c.submit_url().unwrap().as_str(),
            "https://meter.example/encore/submit"
        );
    }

    #[test]
    fn probe_is_tagged_by_task_type() {
        let json = r#"{
            "server_url": "http://localhost:8080",
            "measurement_id": "abc",
            "probe": {
                "task_type": "css",
                "stylesheet_url": "http://target.example/style.css",
                "property": "position",
                "expected_value": "absolute",
                "control_marker_id": "cmh-control"
            }
        }"#;
        let c: TaskConfig = serde_json::from_str(json).unwrap();
        assert_eq!(c.max_message_len, 64);
        let ProbeSpec::Css(css) = &c.probe else {
            panic!("expected css probe, got {:?}", c.probe);
        };
        assert_eq!(css.marker_id, DEFAULT_CSS_MARKER_ID);
        assert_eq!(css.scope, StyleScope::Live);
        assert_eq!(css.marker_ids(), vec!["cmh-css-probe", "cmh-control"]);
        assert_eq!(c.probe.task_type(), "css");
        c.validate().unwrap();
    }

    #[test]
    fn image_probe_uses_img_tag() {
        let json = r#"{ "task_type": "img", "image_url": "http://t.example/a.png" }"#;
        let spec: ProbeSpec = serde_json::from_str(json).unwrap();
        assert!(matches!(spec, ProbeSpec::Image { .. }));
    }

    #[test]
    fn cache_probe_defaults_to_composite_timing() {
        let json = r#"{
            "task_type": "iframe-cache-control",
            "iframe_url": "http://t.example/",
            "image_url": "http://t.example/logo.png",
            "control_image_url": "http://control.example/logo.png"
        }"#;
        let spec: ProbeSpec = serde_json::from_str(json).unwrap();
        let ProbeSpec::IframeCacheControl { timing, control, .. } = spec else {
            panic!("wrong variant");
        };
        assert_eq!(timing, TimingReport::Composite);
        assert_eq!(control, ControlReport::Verdict);
    }

    #[test]
    fn css_control_marker_must_differ() {
        let mut c = config("http://localhost:8080");
        c.probe = ProbeSpec::Css(
            CssSpec::new(url("http://t.example/s.css"), "position", "absolute")
                .with_control(DEFAULT_CSS_MARKER_ID),
        );
        assert!(matches!(c.validate(), Err(ConfigError::DuplicateMarker(_))));
    }

    #[test]
    fn css_property_must_be_set() {
        let mut c = config("http://localhost:8080");
        c.probe = ProbeSpec::Css(CssSpec::new(url("http://t.example/s.css"), " ", "absolute"));
        assert!(matches!(
            c.validate(),
            Err(ConfigError::EmptyCssField("property"))
        ));
    }

    #[test]
    fn zero_message_length_is_rejected() {
        let mut c = config("http://localhost:8080");
        c.max_message_len = 0;
        assert!(matches!(c.validate(), Err(ConfigError::ZeroMessageLength)));
    }
}
