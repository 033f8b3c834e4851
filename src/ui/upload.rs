use chrono::NaiveDate;
use eframe::egui::{self, RichText, Ui};

use super::table::data_table;
use super::{ACCENT_COLOR, ERROR_COLOR};
use crate::api::client::Endpoint;
use crate::api::upload::ALLOWED_EXTENSIONS;
use crate::data::template::{TEMPLATE_FILE_NAME, save_template};
use crate::state::{AppState, Notice};

pub fn upload_page(ui: &mut Ui, state: &mut AppState, today: NaiveDate) {
    ui.heading("Upload Sales Data");
    ui.add_space(8.0);

    let pending = state.api.is_pending(Endpoint::Upload);
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Choose File…").clicked() {
            pick_file(state);
        }
        if ui.button("Download Template").clicked() {
            download_template(state);
        }
    });

    match &state.upload.selected {
        Some(file) => {
            ui.label(format!("Selected: {} ({:.1} KB)", file.name(), file.len() as f64 / 1024.0));
        }
        None => {
            ui.weak("CSV, XLS or XLSX up to 10MB");
        }
    }

    ui.horizontal(|ui: &mut Ui| {
        let can_upload = state.upload.selected.is_some() && !pending;
        let label = if pending { "Uploading…" } else { "Upload" };
        if ui.add_enabled(can_upload, egui::Button::new(label)).clicked() {
            state.start_upload();
        }
        if pending {
            ui.spinner();
        }
    });
    super::notice(ui, &state.upload.notice);

    let Some(table) = state.upload.table.as_mut() else {
        return;
    };

    ui.add_space(12.0);
    ui.label(RichText::new("Validation Summary").strong().size(16.0));
    let summary = &state.upload.validation;
    egui::Grid::new("validation_summary")
        .num_columns(2)
        .spacing([24.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            for (label, count) in [
                ("Missing discounts", summary.missing_discounts),
                ("Government transactions", summary.govt_transactions),
                ("Duplicate transactions", summary.duplicate_transactions),
                ("Total columns", summary.total_columns),
            ] {
                ui.label(label);
                let color = if count > 0 && label != "Total columns" {
                    ERROR_COLOR
                } else {
                    ACCENT_COLOR
                };
                ui.colored_label(color, count.to_string());
                ui.end_row();
            }
        });
    if !summary.available_columns.is_empty() {
        ui.label(format!("Columns: {}", summary.available_columns.join(", ")));
    }

    ui.add_space(12.0);
    ui.label(RichText::new("Uploaded Data").strong().size(16.0));
    data_table(ui, "uploaded_data", table, today);
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn pick_file(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Choose sales data")
        .add_filter("Sales data", &ALLOWED_EXTENSIONS)
        .pick_file();

    if let Some(path) = file {
        state.select_file(&path);
    }
}

fn download_template(state: &mut AppState) {
    let target = rfd::FileDialog::new()
        .set_title("Save template")
        .set_file_name(TEMPLATE_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    let Some(path) = target else {
        return;
    };
    match save_template(&path) {
        Ok(()) => {
            log::info!("template written to {}", path.display());
            state.upload.notice = Some(Notice::Success(format!("Template saved to {}", path.display())));
        }
        Err(e) => {
            log::error!("Failed to save template: {e:#}");
            state.upload.notice = Some(Notice::Error(format!("Error: {e:#}")));
        }
    }
}
