//! Behavioural hints that travel with a task.
//!
//! Hints arrive as plain strings. On the task request they are query
//! parameters, overridden by `cmh-`-prefixed cookies. On the embedding page
//! only `cmh-`-prefixed cookies and query keys count, so the host page's own
//! parameters never reach the harness. They are parsed once into typed values
//! here; nothing downstream sees the raw strings.

use serde::{Deserialize, Serialize};

/// Prefix marking a cookie, or a query key on the embedding page, as a hint.
pub const HINT_PREFIX: &str = "cmh-";

const KEY_LIBRARY: &str = "jQueryAlreadyLoaded";
const KEY_SHOW_STATS: &str = "showStats";
const KEY_COUNT: &str = "count";
const KEY_DISABLE: &str = "disable";

/// Whether the DOM utility library is already on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryHint {
    Present,
    Absent,
    /// Look at the page when the task starts.
    #[default]
    Unknown,
}

impl LibraryHint {
    /// `"true"` means present, `"false"` absent; anything else is unknown.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => LibraryHint::Present,
            "false" => LibraryHint::Absent,
            _ => LibraryHint::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskHints {
    pub library: LibraryHint,

    /// Render the visitor-count overlay.
    pub show_stats: bool,

    /// Measurements already recorded for the embedding page.
    pub prior_count: u64,

    /// The visitor opted out; the task must do nothing.
    pub opted_out: bool,
}

impl Default for TaskHints {
    fn default() -> Self {
        Self {
            library: LibraryHint::Unknown,
            show_stats: true,
            prior_count: 0,
            opted_out: false,
        }
    }
}

impl TaskHints {
    /// Hints of a task request: query parameters, then `cmh-` cookies.
    ///
    /// Only the first value of a repeated query key counts. Cookies without
    /// the `cmh-` prefix are ignored; the rest override query values.
    pub fn from_query_and_cookies<'a>(
        query: impl IntoIterator<Item = (&'a str, &'a str)>,
        cookies: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut raw = first_values(query);
        override_with(&mut raw, prefixed(cookies));
        Self::from_pairs(raw)
    }

    /// Hints visible to the embedding page: `location.search` (leading `?`
    /// allowed) and `document.cookie` (`a=1; b=2`).
    ///
    /// Only `cmh-` keys are read from either source. Query keys override
    /// cookies.
    pub fn from_page(search: &str, cookie_header: &str) -> Self {
        let query: Vec<(String, String)> =
            url::form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
                .into_owned()
                .collect();
        let mut raw = first_values(prefixed(cookie_pairs(cookie_header)));
        override_with(
            &mut raw,
            first_values(prefixed(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))),
        );
        Self::from_pairs(raw)
    }

    fn from_pairs(raw: Vec<(&str, &str)>) -> Self {
        let mut hints = TaskHints::default();
        for (key, value) in raw {
            match key {
                KEY_LIBRARY => hints.library = LibraryHint::parse(value),
                KEY_SHOW_STATS => hints.show_stats = value != "false",
                KEY_DISABLE => hints.opted_out = value == "true",
                // The count only feeds the overlay text; garbage reads as zero.
                KEY_COUNT => hints.prior_count = value.trim().parse().unwrap_or(0),
                _ => {}
            }
        }
        hints
    }
}

fn first_values<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Vec<(&'a str, &'a str)> {
    let mut out: Vec<(&str, &str)> = Vec::new();
    for (key, value) in pairs {
        if !out.iter().any(|(k, _)| *k == key) {
            out.push((key, value));
        }
    }
    out
}

fn override_with<'a>(
    raw: &mut Vec<(&'a str, &'a str)>,
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) {
    for (key, value) in pairs {
        raw.retain(|(k, _)| *k != key);
        raw.push((key, value));
    }
}

fn prefixed<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> impl Iterator<Item = (&'a str, &'a str)> {
    pairs
        .into_iter()
        .filter_map(|(name, value)| Some((name.strip_prefix(HINT_PREFIX)?, value)))
}

fn cookie_pairs(header: &str) -> impl Iterator<Item = (&str, &str)> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
}
