//! CSS computed-style probe
//!
//! スタイルシートを読み込み、marker 要素の computed style を期待値と比べます。
//! 読み込み自体が成功しても、中身が差し替えられていれば値が変わります。
//!
//! - Live: ページに `<span>` marker と `<link>` を直接追加
//! - Isolated: inline document の iframe 内で `<p>` marker を読む
//! - control marker は期待値と「一致しない」ことが正常（判定は反転）

use async_trait::async_trait;

use super::{ProbeSession, ProbeStrategy};
use crate::domain::{CssSpec, Outcome, ProbeError, StyleScope};
use crate::ports::StylesheetRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssProbe {
    spec: CssSpec,
}

impl CssProbe {
    pub fn new(spec: CssSpec) -> Self {
        Self { spec }
    }

    fn read(&self, session: &ProbeSession<'_>, element_id: &str) -> Result<String, ProbeError> {
        let value = session
            .page
            .computed_style(self.spec.scope, element_id, &self.spec.property)?;
        tracing::debug!(
            element_id,
            property = %self.spec.property,
            value = %value,
            "computed style read"
        );
        Ok(value)
    }
}

#[async_trait(?Send)]
impl ProbeStrategy for CssProbe {
    fn name(&self) -> &'static str {
        "css"
    }

    async fn execute(&self, session: &ProbeSession<'_>) -> Result<(), ProbeError> {
        let marker_ids = self.spec.marker_ids();
        if self.spec.scope == StyleScope::Live {
            for id in &marker_ids {
                session.page.insert_marker(id)?;
            }
        }

        let request = StylesheetRequest {
            url: self.spec.stylesheet_url.clone(),
            scope: self.spec.scope,
            marker_ids,
        };
        let event = session.page.load_stylesheet(&request).await?;
        // An errored sheet is still compared: blocking shows up as a mismatch.
        tracing::debug!(url = %request.url, ?event, "stylesheet settled");

        let value = self.read(session, &self.spec.marker_id)?;
        session
            .reporter
            .submit(Outcome::verdict(value == self.spec.expected_value));

        if let Some(control_id) = &self.spec.control_marker_id {
            let value = self.read(session, control_id)?;
            session
                .reporter
                .submit(Outcome::control_verdict(value != self.spec.expected_value));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PageError, ResultState};
    use crate::impls::{
        PageScript, RecordingBeacon, ScriptedLoad, ScriptedPage, ScriptedStyle, TokioClock,
    };
    use crate::probes::testing::{reporter, url};
    use rstest::rstest;

    const SHEET: &str = "http://t.example/style.css";

    fn style(scope: StyleScope, element_id: &str, value: &str) -> ScriptedStyle {
        ScriptedStyle {
            scope,
            element_id: element_id.to_string(),
            property: "position".to_string(),
            value: value.to_string(),
        }
    }

    fn page(sheet: ScriptedLoad, styles: Vec<ScriptedStyle>) -> ScriptedPage {
        let mut script = PageScript {
            styles,
            ..PageScript::default()
        };
        script.resources.insert(SHEET.to_string(), sheet);
        ScriptedPage::new(script)
    }

    async fn run(spec: CssSpec, page: &ScriptedPage) -> RecordingBeacon {
        let beacon = RecordingBeacon::new();
        let reporter = reporter(&beacon);
        let clock = TokioClock::new();
        let session = ProbeSession::new(page, &clock, &reporter);
        CssProbe::new(spec).execute(&session).await.unwrap();
        beacon
    }

    fn live() -> CssSpec {
        CssSpec::new(url(SHEET), "position", "absolute")
    }

    #[rstest]
    #[case::matches("absolute", ResultState::Success)]
    #[case::tampered("static", ResultState::Failure)]
    #[tokio::test]
    async fn live_style_is_compared_with_expected(
        #[case] computed: &str,
        #[case] expected: ResultState,
    ) {
        let page = page(
            ScriptedLoad::loaded(),
            vec![style(StyleScope::Live, "cmh-css-probe", computed)],
        );

        let beacon = run(live(), &page).await;

        assert_eq!(beacon.states(), vec![expected]);
        assert_eq!(page.attached_urls(), vec![url(SHEET)]);
    }

    #[tokio::test]
    async fn blocked_stylesheet_is_a_failure() {
        let page = page(
            ScriptedLoad::error(),
            vec![style(StyleScope::Live, "cmh-css-probe", "absolute")],
        );

        let beacon = run(live(), &page).await;

        assert_eq!(beacon.states(), vec![ResultState::Failure]);
    }

    #[tokio::test]
    async fn isolated_document_reads_its_own_markers() {
        let page = page(
            ScriptedLoad::loaded(),
            vec![
                style(StyleScope::Live, "cmh-css-probe", "static"),
                style(StyleScope::Isolated, "cmh-css-probe", "absolute"),
            ],
        );

        let beacon = run(live().isolated(), &page).await;

        assert_eq!(beacon.states(), vec![ResultState::Success]);
    }

    #[rstest]
    #[case::tampered_target_normal_control("static", "static", ResultState::Failure, ResultState::SuccessControl)]
    #[case::both_normal("absolute", "static", ResultState::Success, ResultState::SuccessControl)]
    #[case::control_styled_too("absolute", "absolute", ResultState::Success, ResultState::FailureControl)]
    #[tokio::test]
    async fn control_marker_is_inverted(
        #[case] target: &str,
        #[case] control: &str,
        #[case] primary: ResultState,
        #[case] control_state: ResultState,
    ) {
        let page = page(
            ScriptedLoad::loaded(),
            vec![
                style(StyleScope::Live, "cmh-css-probe", target),
                style(StyleScope::Live, "cmh-css-control", control),
            ],
        );

        let beacon = run(live().with_control("cmh-css-control"), &page).await;

        assert_eq!(beacon.states(), vec![primary, control_state]);
    }

    #[rstest]
    #[case::control_left_alone("static", ResultState::SuccessControl)]
    #[case::control_styled_too("absolute", ResultState::FailureControl)]
    #[tokio::test]
    async fn isolated_control_paragraph_is_inverted(
        #[case] control: &str,
        #[case] control_state: ResultState,
    ) {
        // The live document disagrees with the isolated one on both markers.
        let page = page(
            ScriptedLoad::loaded(),
            vec![
                style(StyleScope::Live, "cmh-css-probe", "static"),
                style(StyleScope::Live, "cmh-css-control", "absolute"),
                style(StyleScope::Isolated, "cmh-css-probe", "absolute"),
                style(StyleScope::Isolated, "cmh-css-control", control),
            ],
        );

        let spec = live().isolated().with_control("cmh-css-control");
        let beacon = run(spec, &page).await;

        assert_eq!(beacon.states(), vec![ResultState::Success, control_state]);
    }

    #[tokio::test]
    async fn dom_failure_surfaces_as_error() {
        let page = page(ScriptedLoad::loaded(), Vec::new());
        page.fail_dom_with(PageError::Dom("getComputedStyle threw".into()));
        let beacon = RecordingBeacon::new();
        let reporter = reporter(&beacon);
        let clock = TokioClock::new();
        let session = ProbeSession::new(&page, &clock, &reporter);

        let err = CssProbe::new(live()).execute(&session).await.unwrap_err();

        assert!(matches!(err, ProbeError::Page(PageError::Dom(_))));
        assert!(beacon.urls().is_empty());
    }
}
