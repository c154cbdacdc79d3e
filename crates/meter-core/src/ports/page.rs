//! Page port - ブラウザ文書の抽象化
//!
//! probe はこの trait 経由でのみ DOM に触ります。
//! - wasm: `meter-web` の DomPage（web-sys）
//! - native / テスト: `impls::ScriptedPage`
//!
//! # イベントモデル
//! ブラウザの load / error コールバックは「最初のイベントで解決する future」として表現します。
//! どちらのイベントも来ないリソースは、永遠に pending のままです（タイムアウトなし）。

use async_trait::async_trait;
use url::Url;

use crate::domain::{LoadEvent, PageError, StyleScope};

/// Kinds of transient element a probe can attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Image,
    Script,
    Iframe,
}

impl ResourceKind {
    pub fn tag_name(self) -> &'static str {
        match self {
            ResourceKind::Image => "img",
            ResourceKind::Script => "script",
            ResourceKind::Iframe => "iframe",
        }
    }
}

/// A hidden element pointing at `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub url: Url,
}

impl Resource {
    pub fn new(kind: ResourceKind, url: Url) -> Self {
        Self { kind, url }
    }

    pub fn image(url: Url) -> Self {
        Self::new(ResourceKind::Image, url)
    }

    pub fn script(url: Url) -> Self {
        Self::new(ResourceKind::Script, url)
    }

    pub fn iframe(url: Url) -> Self {
        Self::new(ResourceKind::Iframe, url)
    }
}

/// Load a stylesheet so that `computed_style` can be read afterwards.
///
/// - `Live`: `marker_ids` must already be in the page (`insert_marker`).
/// - `Isolated`: the page creates an inline document containing the
///   stylesheet and one `<p>` per marker id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetRequest {
    pub url: Url,
    pub scope: StyleScope,
    pub marker_ids: Vec<String>,
}

/// The embedding page, as seen from a single-threaded event loop.
#[async_trait(?Send)]
pub trait Page {
    /// Is the DOM utility library already defined on the page?
    fn library_present(&self) -> bool;

    /// Inject the utility library and wait for its load or error event.
    async fn load_library(&self, url: &Url) -> Result<LoadEvent, PageError>;

    /// Resolves once the document structure is parsed.
    async fn structure_ready(&self);

    /// Append a hidden element for `resource` and wait for it to settle.
    async fn attach(&self, resource: &Resource) -> Result<LoadEvent, PageError>;

    /// Append an empty `<span id=...>` to the live page.
    fn insert_marker(&self, element_id: &str) -> Result<(), PageError>;

    async fn load_stylesheet(&self, request: &StylesheetRequest) -> Result<LoadEvent, PageError>;

    /// Computed value of `property` on `element_id` within `scope`.
    fn computed_style(
        &self,
        scope: StyleScope,
        element_id: &str,
        property: &str,
    ) -> Result<String, PageError>;

    /// Replace the contents of `element_id`. `Ok(false)` when there is no such element.
    fn set_inner_html(&self, element_id: &str, html: &str) -> Result<bool, PageError>;
}
