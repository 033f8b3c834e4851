use eframe::egui::{self, RichText, Ui};

use crate::api::client::Endpoint;
use crate::state::{AppState, Screen};

// ---------------------------------------------------------------------------
// Left side panel – page navigation
// ---------------------------------------------------------------------------

/// Render the navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.heading("Pricing");
    ui.separator();

    for screen in Screen::ALL {
        let label = RichText::new(screen.label()).size(15.0);
        ui.selectable_value(&mut state.screen, screen, label);
    }

    ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui: &mut Ui| {
        ui.weak(state.api.base_url());
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Upload Data…").clicked() {
                state.screen = Screen::Upload;
                ui.close_menu();
            }
            if ui.button("Refresh").clicked() {
                state.refresh_all();
                ui.close_menu();
            }
        });

        ui.separator();

        match &state.upload.table {
            Some(table) => {
                ui.label(format!("{} rows uploaded", table.dataset().len()));
            }
            None => {
                ui.label("No data uploaded");
            }
        }
        ui.label(format!("{} formulas", state.formulas.formulas.len()));

        let busy = [
            Endpoint::Data,
            Endpoint::Formulas,
            Endpoint::CreateFormula,
            Endpoint::Calculate,
            Endpoint::Reports,
        ]
        .into_iter()
        .any(|e| state.api.is_pending(e));
        if busy {
            ui.separator();
            ui.spinner();
        }
    });
}
