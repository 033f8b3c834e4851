use chrono::NaiveDate;
use eframe::egui::{self, RichText, Ui};

use super::table::data_table;
use super::{ACCENT_COLOR, ERROR_COLOR, SUCCESS_COLOR, stat_tile};
use crate::api::client::Endpoint;
use crate::state::AppState;

pub fn calculate_page(ui: &mut Ui, state: &mut AppState, today: NaiveDate) {
    ui.heading("Calculate Prices");
    ui.add_space(8.0);

    let selected_text = state
        .selected_formula()
        .map(|f| f.name.clone())
        .unwrap_or_else(|| "Select a formula".into());
    egui::ComboBox::from_label("Formula")
        .selected_text(selected_text)
        .width(260.0)
        .show_ui(ui, |ui: &mut Ui| {
            for formula in &state.formulas.formulas {
                ui.selectable_value(
                    &mut state.calculate.selected_formula,
                    Some(formula.id.clone()),
                    formula.name.as_str(),
                );
            }
        });

    if let Some(formula) = state.selected_formula() {
        ui.label("Selected Formula:");
        ui.code(formula.formula_string.as_str());
    }

    let rows = state.uploaded_rows().len();
    if rows == 0 {
        ui.weak("No uploaded data yet.");
    } else {
        ui.weak(format!("{rows} uploaded rows"));
    }

    let pending = state.api.is_pending(Endpoint::Calculate);
    ui.horizontal(|ui: &mut Ui| {
        let ready = state.calculate.selected_formula.is_some() && rows > 0 && !pending;
        let label = if pending { "Calculating…" } else { "Calculate Prices" };
        if ui.add_enabled(ready, egui::Button::new(label)).clicked() {
            state.start_calculation();
        }
        if pending {
            ui.spinner();
        }
    });
    super::notice(ui, &state.calculate.notice);

    let (Some(summary), Some(results)) = (
        state.calculate.summary.as_ref(),
        state.calculate.results.as_mut(),
    ) else {
        return;
    };

    ui.add_space(12.0);
    ui.label(
        RichText::new(format!("Calculation Results - {}", summary.formula_name))
            .strong()
            .size(16.0),
    );
    if !summary.formula_used.is_empty() {
        ui.code(summary.formula_used.as_str());
    }
    ui.horizontal(|ui: &mut Ui| {
        stat_tile(ui, "Total Processed", summary.total_processed, ACCENT_COLOR);
        stat_tile(ui, "Compliant", summary.compliant_count, SUCCESS_COLOR);
        stat_tile(ui, "Non-Compliant", summary.non_compliant_count, ERROR_COLOR);
    });
    ui.add_space(8.0);
    data_table(ui, "calculation_results", results, today);
}
