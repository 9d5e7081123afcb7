//! Asynchronous boundary dataset loading.
//!
//! Uses channel-based communication to bridge the async fetch with egui's
//! synchronous update loop, the same way file picking and downloads do.

use super::boundary::{parse_feature_collection, BoundaryFeature};
use crate::error::EngineError;
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Result of a dataset load.
pub type DatasetLoadResult = Result<Vec<BoundaryFeature>, EngineError>;

/// Where the boundary dataset comes from.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    /// A file on disk (native) or a URL relative to the page (WASM).
    Location(String),
    /// An in-memory GeoJSON document.
    Inline(String),
}

/// Channel-based loader for the boundary dataset.
///
/// The load is the only awaited operation in the bootstrap. It has no
/// timeout; failure is signalled by an `Err` result on the channel.
pub struct DatasetChannel {
    sender: Sender<DatasetLoadResult>,
    receiver: Receiver<DatasetLoadResult>,
}

impl Default for DatasetChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Starts loading the dataset.
    ///
    /// Inline documents are parsed immediately. Locations are read on a
    /// worker thread (native) or fetched with `spawn_local` (WASM). When the
    /// load completes, the result is sent through the channel and a repaint
    /// is requested so the update loop can pick it up.
    pub fn load(&self, source: DatasetSource, ctx: Option<egui::Context>) {
        let sender = self.sender.clone();

        match source {
            DatasetSource::Inline(document) => {
                let _ = sender.send(parse_feature_collection(&document));
                if let Some(ctx) = ctx {
                    ctx.request_repaint();
                }
            }
            DatasetSource::Location(location) => {
                log::info!("Loading boundary dataset from {}", location);

                #[cfg(not(target_arch = "wasm32"))]
                {
                    std::thread::spawn(move || {
                        let result = read_file(&location);
                        let _ = sender.send(result);
                        if let Some(ctx) = ctx {
                            ctx.request_repaint();
                        }
                    });
                }

                #[cfg(target_arch = "wasm32")]
                {
                    wasm_bindgen_futures::spawn_local(async move {
                        let result = fetch_text(&location)
                            .await
                            .and_then(|text| parse_feature_collection(&text));
                        let _ = sender.send(result);
                        if let Some(ctx) = ctx {
                            ctx.request_repaint();
                        }
                    });
                }
            }
        }
    }

    /// Non-blocking check for a completed load.
    pub fn try_recv(&self) -> Option<DatasetLoadResult> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read_file(path: &str) -> DatasetLoadResult {
    let text = std::fs::read_to_string(path)
        .map_err(|e| EngineError::DataLoadFailure(format!("Failed to read {}: {}", path, e)))?;
    parse_feature_collection(&text)
}

#[cfg(target_arch = "wasm32")]
async fn fetch_text(url: &str) -> Result<String, EngineError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fail = |what: &str, e: wasm_bindgen::JsValue| {
        EngineError::DataLoadFailure(format!("{} {}: {:?}", what, url, e))
    };

    let window = web_sys::window()
        .ok_or_else(|| EngineError::DataLoadFailure("No window available".to_string()))?;

    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| fail("Failed to fetch", e))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|e| fail("Unexpected fetch result for", e))?;

    if !response.ok() {
        return Err(EngineError::DataLoadFailure(format!(
            "Fetching {} returned HTTP {}",
            url,
            response.status()
        )));
    }

    let text = JsFuture::from(response.text().map_err(|e| fail("No body for", e))?)
        .await
        .map_err(|e| fail("Failed to read body of", e))?;

    text.as_string()
        .ok_or_else(|| EngineError::DataLoadFailure(format!("Body of {} is not text", url)))
}
