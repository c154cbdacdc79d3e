//! Stats overlay: a visitor-count note rendered into a fixed page element.
//!
//! Purely cosmetic. A missing element is the common case and is not an error;
//! nothing here ever reaches the reporter.

use url::Url;

use crate::ports::Page;

/// Id of the element the embedding page reserves for the overlay.
pub const STATS_ELEMENT_ID: &str = "encore-stats";

pub fn stats_message(prior_count: u64, refer_url: &Url) -> String {
    let link = format!(r#"<a href="{refer_url}">Learn more</a>."#);
    match prior_count {
        0 => format!("Visitors of this page automatically measure Web filtering. {link}"),
        1 => format!(
            "Visitors of this page have performed 1 measurement of Web filtering. {link}"
        ),
        n => format!(
            "Visitors of this page have performed {n} measurements of Web filtering. {link}"
        ),
    }
}

/// Render the overlay if the page has a place for it. Never fails.
pub fn render_stats(page: &dyn Page, prior_count: u64, refer_url: &Url) {
    let html = stats_message(prior_count, refer_url);
    match page.set_inner_html(STATS_ELEMENT_ID, &html) {
        Ok(true) => tracing::debug!(prior_count, "stats overlay rendered"),
        Ok(false) => tracing::debug!("no stats element on page"),
        Err(err) => tracing::debug!(error = %err, "stats overlay skipped"),
    }
}
