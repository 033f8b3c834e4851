pub mod calculate;
pub mod formulas;
pub mod home;
pub mod panels;
pub mod reports;
pub mod table;
pub mod upload;

use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::Notice;

pub const SUCCESS_COLOR: Color32 = Color32::from_rgb(0x16, 0xa3, 0x4a);
pub const ERROR_COLOR: Color32 = Color32::from_rgb(0xdc, 0x26, 0x26);
pub const ACCENT_COLOR: Color32 = Color32::from_rgb(0x25, 0x63, 0xeb);

/// Render an inline success/error message, if any.
pub fn notice(ui: &mut Ui, notice: &Option<Notice>) {
    match notice {
        Some(Notice::Success(msg)) => {
            ui.colored_label(SUCCESS_COLOR, msg.as_str());
        }
        Some(Notice::Error(msg)) => {
            ui.colored_label(ERROR_COLOR, msg.as_str());
        }
        None => {}
    }
}

/// A titled number tile, as on the dashboard and calculation summary.
pub fn stat_tile(ui: &mut Ui, title: &str, value: impl ToString, color: Color32) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(160.0);
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(title).strong());
            ui.label(RichText::new(value.to_string()).size(28.0).strong().color(color));
        });
    });
}
