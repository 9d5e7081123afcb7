//! Central canvas UI: the map area.
//!
//! Feeds the container size, pointer position and clock into the lifecycle
//! controller each frame, then paints whatever the engine has drawn.

use super::colors;
use crate::engine::EngineState;
use crate::lifecycle::{LifecycleController, LifecycleEvent, LifecyclePhase};
use crate::state::AppState;
use eframe::egui::{self, Align2, CursorIcon, FontId, Sense};
use web_time::Instant;

pub fn render_canvas(ctx: &egui::Context, state: &mut AppState, controller: &mut LifecycleController) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let available_size = ui.available_size();
            let (response, painter) = ui.allocate_painter(available_size, Sense::hover());
            let rect = response.rect;

            painter.rect_filled(rect, 0.0, colors::canvas::BACKGROUND);

            let now = Instant::now();
            if let Some(event) = controller.tick(now, rect.size()) {
                handle_event(state, event);
            }

            // Hover, sent only when the pointer actually moved
            let pointer = response.hover_pos().map(|p| p - rect.min.to_vec2());
            if pointer != state.last_pointer {
                controller.engine_mut().pointer_moved(pointer);
            }

            let revision = controller.engine().revision();
            if state.readout_stale(pointer, revision) {
                state.last_pointer = pointer;
                state.readout_revision = revision;
                state.pointer_geo = pointer.and_then(|p| {
                    controller
                        .engine()
                        .projection()
                        .and_then(|proj| proj.screen_to_geo(p))
                });
                state.pointer_country = pointer.and_then(|p| {
                    controller
                        .engine()
                        .basemap()
                        .shape_at(p)
                        .map(|(key, shape)| shape.name.clone().unwrap_or_else(|| key.to_string()))
                });
            }

            let engine = controller.engine();
            if engine.rings().tooltip().is_visible() || engine.markers().hovered().is_some() {
                ctx.set_cursor_icon(CursorIcon::PointingHand);
            }

            if engine.state() == EngineState::Ready {
                engine.paint(&painter, rect);
            } else if let Some(text) = placeholder_text(controller.phase()) {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    text,
                    FontId::proportional(14.0),
                    colors::canvas::READOUT,
                );
            }

            if let Some(geo) = state.pointer_geo {
                let readout = match &state.pointer_country {
                    Some(country) => format!("{}  {}", country, geo),
                    None => geo.to_string(),
                };
                painter.text(
                    rect.left_bottom() + egui::vec2(8.0, -8.0),
                    Align2::LEFT_BOTTOM,
                    readout,
                    FontId::monospace(11.0),
                    colors::canvas::READOUT,
                );
            }

            if let Some(wait) = controller.next_wake(now) {
                ctx.request_repaint_after(wait);
            }
        });
}

fn placeholder_text(phase: &LifecyclePhase) -> Option<&'static str> {
    match phase {
        LifecyclePhase::LoadingData => Some("Loading map data..."),
        LifecyclePhase::AcquiringContainer => Some("Waiting for layout..."),
        LifecyclePhase::Failed(_) => Some("Map unavailable"),
        LifecyclePhase::Idle | LifecyclePhase::Ready | LifecyclePhase::Disposed => None,
    }
}

fn handle_event(state: &mut AppState, event: LifecycleEvent) {
    match event {
        LifecycleEvent::Ready(handle) => {
            state.handle = Some(handle);
            state.status_message = "Ready".to_string();
        }
        LifecycleEvent::Failed(e) => {
            state.failed = true;
            state.status_message = format!("Map unavailable: {}", e);
        }
    }
}
