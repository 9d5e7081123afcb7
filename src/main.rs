#![warn(clippy::all)]

//! World Rings - an interactive re-centering world map.
//!
//! The map uses an azimuthal equidistant projection around a chosen center,
//! overlays reference rings for flight distances or planetary radii, and
//! plots major cities. It runs natively and in the browser.

mod config;
mod engine;
mod error;
mod geo;
mod lifecycle;
mod render;
mod state;
mod ui;

use config::EngineConfig;
use eframe::egui;
use geo::DatasetSource;
use lifecycle::LifecycleController;
use state::AppState;

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "World Rings",
        native_options,
        Box::new(|cc| Ok(Box::new(WorldRingsApp::new(cc)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");

        let canvas = document
            .get_element_by_id("app_canvas")
            .expect("Failed to find app_canvas")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("app_canvas was not a HtmlCanvasElement");

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(WorldRingsApp::new(cc)))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    panic!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Main application state and logic.
pub struct WorldRingsApp {
    /// Panel state
    state: AppState,

    /// Map bootstrap and the render engine it owns
    controller: LifecycleController,
}

impl WorldRingsApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = EngineConfig::load();
        log::info!(
            "Starting map at {} in {} mode",
            config.initial_center,
            config.initial_mode.label()
        );

        let state = AppState::new(config.initial_mode);
        let source = DatasetSource::Location(config.dataset.clone());

        let mut controller = LifecycleController::new(config);
        controller.mount(source, Some(cc.egui_ctx.clone()));

        Self { state, controller }
    }
}

impl eframe::App for WorldRingsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Side and top/bottom panels must be rendered before CentralPanel
        ui::render_top_bar(ctx, &mut self.state, self.controller.engine_mut());
        ui::render_canvas(ctx, &mut self.state, &mut self.controller);
    }
}

impl Drop for WorldRingsApp {
    fn drop(&mut self) {
        self.controller.dispose();
    }
}
