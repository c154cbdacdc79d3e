//! DomPage - web-sys で実装した Page
//!
//! load / error の DOM コールバックを oneshot channel に流し、future として待ちます。
//! 最初に届いたイベントだけが使われ、どちらも来なければ future は pending のままです。

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use meter_core::domain::{LoadEvent, PageError, StyleScope};
use meter_core::ports::{Page, Resource, ResourceKind, StylesheetRequest};
use url::Url;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlIFrameElement, Window};

/// Global the utility library defines once loaded.
const LIBRARY_GLOBAL: &str = "jQuery";

/// `document.readyState` while the parser is still running.
const READY_STATE_LOADING: &str = "loading";

pub struct DomPage {
    window: Window,
    document: Document,
    /// Inline document created by the last isolated stylesheet load.
    isolated: RefCell<Option<HtmlIFrameElement>>,
}

impl DomPage {
    pub fn new() -> Result<Self, PageError> {
        let window = web_sys::window().ok_or(PageError::Unsupported("window"))?;
        let document = window.document().ok_or(PageError::Unsupported("document"))?;
        Ok(Self {
            window,
            document,
            isolated: RefCell::new(None),
        })
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn window(&self) -> &Window {
        &self.window
    }

    fn create(&self, tag: &str) -> Result<HtmlElement, PageError> {
        self.document
            .create_element(tag)
            .map_err(dom_error)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| PageError::Dom(format!("<{tag}> is not an html element")))
    }

    /// Transient elements go at the end of `<html>`, hidden.
    fn append(&self, element: &HtmlElement) -> Result<(), PageError> {
        let root = self
            .document
            .document_element()
            .ok_or_else(|| PageError::ElementNotFound("html".to_string()))?;
        root.append_child(element).map_err(dom_error)?;
        Ok(())
    }

    fn hidden(&self, kind: ResourceKind) -> Result<HtmlElement, PageError> {
        let element = self.create(kind.tag_name())?;
        let style = element.style();
        style.set_property("display", "none").map_err(dom_error)?;
        if kind == ResourceKind::Iframe {
            style.set_property("width", "0").map_err(dom_error)?;
            style.set_property("height", "0").map_err(dom_error)?;
        }
        Ok(element)
    }

    async fn load(
        &self,
        element: HtmlElement,
        attr: &str,
        url: &Url,
    ) -> Result<LoadEvent, PageError> {
        let listener = Listener::register(&element);
        element.set_attribute(attr, url.as_str()).map_err(dom_error)?;
        self.append(&element)?;
        Ok(listener.wait().await)
    }

    fn isolated_document(&self) -> Result<(Window, Document), PageError> {
        let frame = self.isolated.borrow();
        let frame = frame
            .as_ref()
            .ok_or(PageError::Unsupported("isolated style read before load"))?;
        let window = frame
            .content_window()
            .ok_or(PageError::Unsupported("isolated frame window"))?;
        let document = frame
            .content_document()
            .ok_or(PageError::Unsupported("isolated frame document"))?;
        Ok((window, document))
    }
}

#[async_trait(?Send)]
impl Page for DomPage {
    fn library_present(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str(LIBRARY_GLOBAL)).unwrap_or(false)
    }

    async fn load_library(&self, url: &Url) -> Result<LoadEvent, PageError> {
        let script = self.create("script")?;
        self.load(script, "src", url).await
    }

    async fn structure_ready(&self) {
        if !still_parsing(&self.document.ready_state()) {
            return;
        }
        let (tx, rx) = oneshot::channel::<()>();
        let mut tx = Some(tx);
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx.take() {
                let _ = tx.send(());
            }
        });
        let registered = self
            .document
            .add_event_listener_with_callback("DOMContentLoaded", callback.as_ref().unchecked_ref());
        if registered.is_err() {
            tracing::warn!("could not wait for DOMContentLoaded");
            return;
        }
        if rx.await.is_err() {
            std::future::pending::<()>().await;
        }
        let _ = self
            .document
            .remove_event_listener_with_callback("DOMContentLoaded", callback.as_ref().unchecked_ref());
    }

    async fn attach(&self, resource: &Resource) -> Result<LoadEvent, PageError> {
        let element = self.hidden(resource.kind)?;
        self.load(element, "src", &resource.url).await
    }

    fn insert_marker(&self, element_id: &str) -> Result<(), PageError> {
        let span = self.create("span")?;
        span.set_id(element_id);
        self.append(&span)
    }

    async fn load_stylesheet(&self, request: &StylesheetRequest) -> Result<LoadEvent, PageError> {
        match request.scope {
            StyleScope::Live => {
                let link = self.create("link")?;
                link.set_attribute("rel", "stylesheet").map_err(dom_error)?;
                self.load(link, "href", &request.url).await
            }
            StyleScope::Isolated => {
                let frame = self
                    .hidden(ResourceKind::Iframe)?
                    .dyn_into::<HtmlIFrameElement>()
                    .map_err(|_| PageError::Dom("iframe is not an iframe".to_string()))?;
                frame.set_srcdoc(&isolated_srcdoc(&request.url, &request.marker_ids));
                *self.isolated.borrow_mut() = Some(frame.clone());

                let listener = Listener::register(&frame);
                self.append(&frame)?;
                Ok(listener.wait().await)
            }
        }
    }

    fn computed_style(
        &self,
        scope: StyleScope,
        element_id: &str,
        property: &str,
    ) -> Result<String, PageError> {
        let (window, document) = match scope {
            StyleScope::Live => (self.window.clone(), self.document.clone()),
            StyleScope::Isolated => self.isolated_document()?,
        };
        let element: Element = document
            .get_element_by_id(element_id)
            .ok_or_else(|| PageError::ElementNotFound(element_id.to_string()))?;
        let style = window
            .get_computed_style(&element)
            .map_err(dom_error)?
            .ok_or_else(|| PageError::Dom(format!("no computed style for '{element_id}'")))?;
        style.get_property_value(property).map_err(dom_error)
    }

    fn set_inner_html(&self, element_id: &str, html: &str) -> Result<bool, PageError> {
        match self.document.get_element_by_id(element_id) {
            Some(element) => {
                element.set_inner_html(html);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// onload / onerror handlers feeding one oneshot channel.
struct Listener {
    element: HtmlElement,
    rx: oneshot::Receiver<LoadEvent>,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

impl Listener {
    fn register(element: &HtmlElement) -> Self {
        let (tx, rx) = oneshot::channel();
        let tx = Rc::new(RefCell::new(Some(tx)));
        let handler = |event: LoadEvent| {
            let tx = Rc::clone(&tx);
            Closure::<dyn FnMut()>::new(move || {
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(event);
                }
            })
        };
        let onload = handler(LoadEvent::Loaded);
        let onerror = handler(LoadEvent::Errored);
        element.set_onload(Some(onload.as_ref().unchecked_ref()));
        element.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        Self {
            element: element.clone(),
            rx,
            _onload: onload,
            _onerror: onerror,
        }
    }

    async fn wait(self) -> LoadEvent {
        let event = match self.rx.await {
            Ok(event) => event,
            // Both senders live in the closures we hold; this cannot happen.
            Err(_) => std::future::pending().await,
        };
        self.element.set_onload(None);
        self.element.set_onerror(None);
        event
    }
}

fn still_parsing(ready_state: &str) -> bool {
    ready_state == READY_STATE_LOADING
}

fn isolated_srcdoc(stylesheet: &Url, marker_ids: &[String]) -> String {
    let mut doc = format!(
        r#"<!DOCTYPE html><html><head><link rel="stylesheet" href="{}"></head><body>"#,
        escape_attr(stylesheet.as_str())
    );
    for id in marker_ids {
        doc.push_str(&format!(r#"<p id="{}"></p>"#, escape_attr(id)));
    }
    doc.push_str("</body></html>");
    doc
}

fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

pub(crate) fn dom_error(err: JsValue) -> PageError {
    let message = err
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    PageError::Dom(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srcdoc_holds_the_sheet_and_one_paragraph_per_marker() {
        let doc = isolated_srcdoc(
            &Url::parse("http://t.example/s.css?a=1&b=2").unwrap(),
            &["cmh-css-probe".to_string(), "x\"y".to_string()],
        );
        assert!(doc.contains(r#"href="http://t.example/s.css?a=1&amp;b=2""#));
        assert!(doc.contains(r#"<p id="cmh-css-probe"></p>"#));
        assert!(doc.contains(r#"<p id="x&quot;y"></p>"#));
    }

    #[test]
    fn structure_is_ready_once_parsing_ends() {
        assert!(still_parsing("loading"));
        assert!(!still_parsing("interactive"));
        assert!(!still_parsing("complete"));
    }
}
