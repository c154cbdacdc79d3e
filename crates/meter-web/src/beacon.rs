//! FetchBeacon - fire-and-forget GET via `window.fetch`.

use meter_core::ports::Beacon;
use url::Url;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::Window;

pub struct FetchBeacon {
    window: Window,
}

impl FetchBeacon {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Beacon for FetchBeacon {
    fn dispatch(&self, url: Url) {
        let request = self.window.fetch_with_str(url.as_str());
        // The response is never inspected; a failed request is only logged.
        spawn_local(async move {
            if let Err(err) = JsFuture::from(request).await {
                tracing::debug!(url = %url, error = ?err, "submission request failed");
            }
        });
    }
}
