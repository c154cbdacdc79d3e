//! Bootstrap - 依存ライブラリの確保
//!
//! probe より先に DOM ユーティリティがページにあることを保証します。
//! - Present: そのまま進む
//! - Absent: script タグで注入し、load を待つ
//! - Unknown: 呼び出し時点のページを見て、上のどちらかに分岐

use url::Url;

use crate::domain::{HarnessError, LibraryHint, LoadEvent};
use crate::ports::Page;

/// Make sure the utility library is on the page.
///
/// Returns once the library is usable. If the injected script never settles,
/// neither does this future.
pub async fn ensure_library(
    page: &dyn Page,
    hint: LibraryHint,
    library_url: &Url,
) -> Result<(), HarnessError> {
    let present = match hint {
        LibraryHint::Present => true,
        LibraryHint::Absent => false,
        LibraryHint::Unknown => page.library_present(),
    };
    if present {
        return Ok(());
    }

    tracing::debug!(url = %library_url, "injecting utility library");
    match page.load_library(library_url).await? {
        LoadEvent::Loaded => Ok(()),
        LoadEvent::Errored => {
            tracing::warn!(url = %library_url, "utility library failed to load");
            Err(HarnessError::DependencyLoad {
                url: library_url.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{PageScript, ScriptedLoad, ScriptedPage};
    use rstest::rstest;

    fn library_url() -> Url {
        Url::parse("http://localhost:8080/jquery.js").unwrap()
    }

    #[rstest]
    #[case::hinted_present(LibraryHint::Present, false)]
    #[case::detected(LibraryHint::Unknown, true)]
    #[tokio::test]
    async fn present_library_is_not_injected(
        #[case] hint: LibraryHint,
        #[case] library_present: bool,
    ) {
        let page = ScriptedPage::new(PageScript {
            library_present,
            ..PageScript::default()
        });

        ensure_library(&page, hint, &library_url()).await.unwrap();
        assert!(page.attached_urls().is_empty());
    }

    #[rstest]
    #[case::hinted_absent(LibraryHint::Absent, true)]
    #[case::detected_missing(LibraryHint::Unknown, false)]
    #[tokio::test]
    async fn missing_library_is_injected(
        #[case] hint: LibraryHint,
        #[case] library_present: bool,
    ) {
        let page = ScriptedPage::new(PageScript {
            library_present,
            ..PageScript::default()
        });

        ensure_library(&page, hint, &library_url()).await.unwrap();
        assert_eq!(page.attached_urls(), vec![library_url()]);
    }

    #[tokio::test]
    async fn library_error_is_surfaced() {
        let page = ScriptedPage::new(PageScript {
            library: ScriptedLoad::error(),
            ..PageScript::default()
        });

        let err = ensure_library(&page, LibraryHint::Absent, &library_url())
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::DependencyLoad { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn library_that_never_loads_blocks_forever() {
        let page = ScriptedPage::new(PageScript {
            library: ScriptedLoad::never(),
            ..PageScript::default()
        });

        let res = tokio::time::timeout(
            std::time::Duration::from_secs(3600),
            ensure_library(&page, LibraryHint::Absent, &library_url()),
        )
        .await;
        assert!(res.is_err());
    }
}
