//! # meter-web
//!
//! Browser bindings for the measurement harness.
//!
//! ## Usage
//!
//! ```javascript
//! import init, { start, page_hints } from './pkg/meter_web.js';
//!
//! await init();
//! start({
//!   server_url: "http://collector.example",
//!   measurement_id: "3f2a9c0d11e4b7a2",
//!   probe: { task_type: "img", image_url: "http://target.example/logo.png" },
//!   hints: page_hints(),
//! });
//! ```

mod beacon;
mod clock;
mod page;

use meter_core::Task;
use meter_core::domain::{TaskConfig, TaskHints};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

pub use beacon::FetchBeacon;
pub use clock::DateClock;
pub use page::DomPage;

#[wasm_bindgen(start)]
pub fn init() {
    tracing_wasm::set_as_global_default();
}

/// Build a task from `config` and run it on the page's event loop.
///
/// Returns once the task is scheduled; results go to the collection server.
#[wasm_bindgen]
pub fn start(config: JsValue) -> Result<(), JsValue> {
    let config: TaskConfig = serde_wasm_bindgen::from_value(config)?;
    let page = DomPage::new().map_err(to_js)?;
    let beacon = FetchBeacon::new(page.window().clone());

    let task = Task::builder(config)
        .page(page)
        .beacon(beacon)
        .clock(DateClock)
        .build()
        .map_err(to_js)?;

    spawn_local(async move {
        if let Err(err) = task.launch().await {
            tracing::warn!(error = %err, "measurement task stopped");
        }
    });
    Ok(())
}

/// Hints from the current page's `cmh-` query keys and `cmh-` cookies.
///
/// Everything else in the page URL belongs to the host page and is ignored.
#[wasm_bindgen]
pub fn page_hints() -> Result<JsValue, JsValue> {
    let page = DomPage::new().map_err(to_js)?;
    let query = page.window().location().search()?;
    let cookies = page
        .document()
        .dyn_ref::<web_sys::HtmlDocument>()
        .map(|doc| doc.cookie())
        .transpose()?
        .unwrap_or_default();
    let hints = TaskHints::from_page(&query, &cookies);
    Ok(serde_wasm_bindgen::to_value(&hints)?)
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
