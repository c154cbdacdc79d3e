//! ScriptedPage - 開発用・テスト用のページ
//!
//! ブラウザの代わりに、`PageScript` に書かれた通りにイベントを返します。
//! 遅延は tokio の sleep で表現するので、`start_paused` のテストでは時刻が決定的になります。
//!
//! # 使用例
//! ```ignore
//! let mut script = PageScript::default();
//! script.resources.insert("http://t.example/".into(), ScriptedLoad::loaded_after(50));
//! let page = ScriptedPage::new(script);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{LoadEvent, PageError, StyleScope};
use crate::ports::{Page, Resource, StylesheetRequest};

/// Which event a scripted resource fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptedEvent {
    #[default]
    Load,
    Error,
    /// Neither event ever fires.
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptedLoad {
    pub after_ms: u64,
    pub event: ScriptedEvent,
}

impl ScriptedLoad {
    pub fn loaded() -> Self {
        Self::default()
    }

    pub fn loaded_after(after_ms: u64) -> Self {
        Self {
            after_ms,
            event: ScriptedEvent::Load,
        }
    }

    pub fn error() -> Self {
        Self::error_after(0)
    }

    pub fn error_after(after_ms: u64) -> Self {
        Self {
            after_ms,
            event: ScriptedEvent::Error,
        }
    }

    pub fn never() -> Self {
        Self {
            after_ms: 0,
            event: ScriptedEvent::Never,
        }
    }

    async fn settle(self) -> LoadEvent {
        let event = match self.event {
            ScriptedEvent::Load => LoadEvent::Loaded,
            ScriptedEvent::Error => LoadEvent::Errored,
            ScriptedEvent::Never => return std::future::pending().await,
        };
        // Callbacks always run on a later turn of the loop.
        if self.after_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.after_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
        event
    }
}

/// Computed value of `property` on a marker once its stylesheet applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedStyle {
    #[serde(default)]
    pub scope: StyleScope,
    pub element_id: String,
    pub property: String,
    pub value: String,
}

/// Everything a scripted page does, as plain data.
///
/// Resources not listed in `resources` load immediately.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageScript {
    pub library_present: bool,
    pub library: ScriptedLoad,
    pub ready_after_ms: u64,
    /// Keyed by URL; keys are normalized the way `Url` prints them.
    pub resources: HashMap<String, ScriptedLoad>,
    pub styles: Vec<ScriptedStyle>,
    /// Ids of elements present in the page (e.g. the stats element).
    pub elements: Vec<String>,
}

#[derive(Default)]
struct State {
    attached: Vec<Url>,
    markers: HashSet<(StyleScope, String)>,
    applied: HashSet<StyleScope>,
    inner_html: HashMap<String, String>,
    failure: Option<PageError>,
}

/// A deterministic `Page`. Clones share state, so a test can keep a handle
/// while the task owns another.
#[derive(Clone)]
pub struct ScriptedPage {
    script: Rc<PageScript>,
    state: Rc<RefCell<State>>,
}

impl ScriptedPage {
    pub fn new(mut script: PageScript) -> Self {
        script.resources = script
            .resources
            .into_iter()
            .map(|(key, load)| match Url::parse(&key) {
                Ok(url) => (url.to_string(), load),
                Err(_) => (key, load),
            })
            .collect();
        Self {
            script: Rc::new(script),
            state: Rc::new(RefCell::new(State::default())),
        }
    }

    /// Make every later DOM operation fail with `err`.
    pub fn fail_dom_with(&self, err: PageError) {
        self.state.borrow_mut().failure = Some(err);
    }

    /// URLs requested so far, in request order (library and stylesheets included).
    pub fn attached_urls(&self) -> Vec<Url> {
        self.state.borrow().attached.clone()
    }

    pub fn inner_html(&self, element_id: &str) -> Option<String> {
        self.state.borrow().inner_html.get(element_id).cloned()
    }

    fn check(&self) -> Result<(), PageError> {
        match &self.state.borrow().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn request(&self, url: &Url) -> ScriptedLoad {
        self.state.borrow_mut().attached.push(url.clone());
        self.script
            .resources
            .get(url.as_str())
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait(?Send)]
impl Page for ScriptedPage {
    fn library_present(&self) -> bool {
        self.script.library_present
    }

    async fn load_library(&self, url: &Url) -> Result<LoadEvent, PageError> {
        self.check()?;
        self.state.borrow_mut().attached.push(url.clone());
        Ok(self.script.library.settle().await)
    }

    async fn structure_ready(&self) {
        if self.script.ready_after_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.script.ready_after_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }

    async fn attach(&self, resource: &Resource) -> Result<LoadEvent, PageError> {
        self.check()?;
        let load = self.request(&resource.url);
        Ok(load.settle().await)
    }

    fn insert_marker(&self, element_id: &str) -> Result<(), PageError> {
        self.check()?;
        self.state
            .borrow_mut()
            .markers
            .insert((StyleScope::Live, element_id.to_string()));
        Ok(())
    }

    async fn load_stylesheet(&self, request: &StylesheetRequest) -> Result<LoadEvent, PageError> {
        self.check()?;
        if request.scope == StyleScope::Isolated {
            let mut state = self.state.borrow_mut();
            for id in &request.marker_ids {
                state.markers.insert((StyleScope::Isolated, id.clone()));
            }
        }
        let load = self.request(&request.url);
        let event = load.settle().await;
        if event == LoadEvent::Loaded {
            self.state.borrow_mut().applied.insert(request.scope);
        }
        Ok(event)
    }

    fn computed_style(
        &self,
        scope: StyleScope,
        element_id: &str,
        property: &str,
    ) -> Result<String, PageError> {
        self.check()?;
        let state = self.state.borrow();
        if !state.markers.contains(&(scope, element_id.to_string())) {
            return Err(PageError::ElementNotFound(element_id.to_string()));
        }
        if !state.applied.contains(&scope) {
            return Ok(String::new());
        }
        let value = self
            .script
            .styles
            .iter()
            .find(|s| s.scope == scope && s.element_id == element_id && s.property == property)
            .map(|s| s.value.clone())
            .unwrap_or_default();
        Ok(value)
    }

    fn set_inner_html(&self, element_id: &str, html: &str) -> Result<bool, PageError> {
        self.check()?;
        if !self.script.elements.iter().any(|e| e == element_id) {
            return Ok(false);
        }
        self.state
            .borrow_mut()
            .inner_html
            .insert(element_id.to_string(), html.to_string());
        Ok(true)
    }
}
