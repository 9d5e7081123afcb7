//! Top bar UI: app title, ring mode, city navigation and status.

use super::colors;
use crate::engine::RenderEngine;
use crate::render::RingMode;
use crate::state::AppState;
use eframe::egui::{self, Color32, RichText};

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState, engine: &mut RenderEngine) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                // App title
                ui.label(
                    RichText::new("World Rings")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                // Ring mode selector
                ui.label(RichText::new("Rings:").size(12.0).color(Color32::GRAY));
                state.ring_mode = engine.mode();
                let previous = state.ring_mode;
                for mode in RingMode::all() {
                    ui.selectable_value(&mut state.ring_mode, *mode, mode.label());
                }
                if state.ring_mode != previous {
                    if let Err(e) = engine.set_metric_mode(state.ring_mode) {
                        log::warn!("Ring mode change ignored: {}", e);
                    }
                }

                ui.separator();

                render_go_to(ui, state);

                ui.separator();

                // Status text
                let status_color = if state.failed {
                    colors::ui::ERROR
                } else if state.handle.is_some() {
                    colors::ui::SUCCESS
                } else {
                    Color32::GRAY
                };
                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(status_color),
                );
            });
        });
}

/// "Go to" city list. Disabled until the map is ready.
fn render_go_to(ui: &mut egui::Ui, state: &mut AppState) {
    ui.label(RichText::new("Go to:").size(12.0).color(Color32::GRAY));

    let selected_text = state
        .selected_city
        .as_deref()
        .and_then(|id| state.cities.iter().find(|c| c.id == id))
        .map(|c| c.label.clone())
        .unwrap_or_else(|| "Choose a city".to_string());

    let previous = state.selected_city.clone();
    ui.add_enabled_ui(state.handle.is_some(), |ui| {
        egui::ComboBox::from_id_salt("go_to_city")
            .selected_text(selected_text)
            .width(140.0)
            .show_ui(ui, |ui| {
                for city in &state.cities {
                    ui.selectable_value(
                        &mut state.selected_city,
                        Some(city.id.clone()),
                        &city.label,
                    );
                }
            });
    });

    if state.selected_city == previous {
        return;
    }
    let Some(city) = state
        .selected_city
        .as_deref()
        .and_then(|id| state.cities.iter().find(|c| c.id == id))
    else {
        return;
    };
    if let Some(handle) = &state.handle {
        handle.navigate_to(city.coordinate.longitude(), city.coordinate.latitude());
        state.status_message = format!("Centered on {}", city.label);
    }
}
