use chrono::NaiveDate;
use eframe::egui::{self, RichText, Ui};

use super::{ACCENT_COLOR, ERROR_COLOR, SUCCESS_COLOR, stat_tile};
use crate::state::{AppState, Screen};

const RECENT_ACTIVITY: usize = 5;

pub fn home_page(ui: &mut Ui, state: &mut AppState, today: NaiveDate) {
    ui.heading("Drug Price Calculator Dashboard");
    ui.add_space(8.0);

    let stats = state.stats(today);
    ui.horizontal(|ui: &mut Ui| {
        stat_tile(ui, "Calculations Today", stats.calculations_today, ACCENT_COLOR);
        stat_tile(ui, "Compliant Prices", stats.compliant_prices, SUCCESS_COLOR);
        stat_tile(ui, "Non-Compliant Prices", stats.non_compliant_prices, ERROR_COLOR);
    });

    ui.add_space(16.0);
    ui.label(RichText::new("Quick Actions").strong().size(16.0));
    ui.horizontal(|ui: &mut Ui| {
        for (screen, title, blurb) in [
            (Screen::Upload, "Upload Data", "Upload new sales data for calculation"),
            (Screen::Formulas, "Create Formula", "Build a new pricing formula"),
            (Screen::Calculate, "Run Calculation", "Calculate prices using existing data"),
        ] {
            if ui.button(title).on_hover_text(blurb).clicked() {
                state.screen = screen;
            }
        }
    });

    ui.add_space(16.0);
    ui.label(RichText::new("Recent Activity").strong().size(16.0));
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        let recent: Vec<_> = state
            .reports
            .reports
            .calculations
            .iter()
            .rev()
            .take(RECENT_ACTIVITY)
            .collect();
        if recent.is_empty() {
            ui.label("No recent activity");
        }
        for record in recent {
            let name = record.formula_name.as_deref().unwrap_or(&record.formula_id);
            ui.label(format!(
                "{}  {}: {} rows processed",
                record.display_time(),
                name,
                record.rows_processed
            ));
        }
    });
}
