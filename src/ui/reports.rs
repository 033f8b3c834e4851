use chrono::NaiveDate;
use eframe::egui::{Align, Layout, RichText, Ui};
use egui_extras::{Column, DatePickerButton, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::api::client::Endpoint;
use crate::data::calendar::QuickRange;
use crate::data::model::NULL_PLACEHOLDER;
use crate::state::AppState;

pub fn reports_page(ui: &mut Ui, state: &mut AppState, today: NaiveDate) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Calculation Reports");
        if state.api.is_pending(Endpoint::Reports) {
            ui.spinner();
        }
    });
    ui.add_space(8.0);

    range_controls(ui, state, today);
    super::notice(ui, &state.reports.notice);

    let summary = &state.reports.reports.summary;
    ui.add_space(8.0);
    ui.label(format!("Total calculations: {}", summary.total_calculations));
    if let Some(latest) = &summary.latest_calculation {
        ui.label(format!(
            "Latest: {} ({} rows)",
            latest.display_time(),
            latest.rows_processed
        ));
    }

    ui.add_space(8.0);
    rows_chart(ui, state);
    ui.add_space(8.0);
    history_table(ui, state);
}

// ---------------------------------------------------------------------------
// Date range
// ---------------------------------------------------------------------------

fn range_controls(ui: &mut Ui, state: &mut AppState, today: NaiveDate) {
    let mut apply = None;
    ui.horizontal(|ui: &mut Ui| {
        let input = &mut state.reports.range_input;
        for (label, bound, id) in [
            ("Start date", &mut input.start_date, "report_start"),
            ("End date", &mut input.end_date, "report_end"),
        ] {
            let mut enabled = bound.is_some();
            if ui.checkbox(&mut enabled, label).changed() {
                *bound = enabled.then_some(today);
            }
            if let Some(date) = bound {
                ui.add(DatePickerButton::new(date).id_salt(id));
            }
            ui.separator();
        }

        if ui.button("Apply").clicked() {
            apply = Some((input.start_date, input.end_date));
        }
        if ui.button("Clear").clicked() {
            apply = Some((None, None));
        }
        ui.separator();
        for range in QuickRange::ALL {
            if ui.small_button(range.label()).clicked() {
                let r = range.ending(today);
                apply = Some((Some(r.start), Some(r.end)));
            }
        }
    });

    if let Some((start, end)) = apply {
        state.set_report_range(start, end);
    }
}

// ---------------------------------------------------------------------------
// Rows processed per calculation
// ---------------------------------------------------------------------------

fn rows_chart(ui: &mut Ui, state: &AppState) {
    let calculations = &state.reports.reports.calculations;
    if calculations.is_empty() {
        ui.label("No calculations in this range.");
        return;
    }

    // One chart per formula so the legend names formulas.
    let colors = &state.reports.colors;
    let charts: Vec<BarChart> = colors
        .legend_entries()
        .into_iter()
        .map(|(formula_id, color)| {
            let bars: Vec<Bar> = calculations
                .iter()
                .enumerate()
                .filter(|(_, c)| c.formula_id == formula_id)
                .map(|(i, c)| {
                    Bar::new(i as f64, c.rows_processed as f64)
                        .fill(color)
                        .name(c.display_time())
                })
                .collect();
            let label = calculations
                .iter()
                .find(|c| c.formula_id == formula_id)
                .and_then(|c| c.formula_name.clone())
                .unwrap_or_else(|| format!("Formula {formula_id}"));
            BarChart::new(bars).name(label).color(color).width(0.6)
        })
        .collect();

    Plot::new("reports_chart")
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label("Calculation")
        .y_axis_label("Rows Processed")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

fn history_table(ui: &mut Ui, state: &AppState) {
    let calculations = &state.reports.reports.calculations;
    let colors = &state.reports.colors;
    if calculations.is_empty() {
        return;
    }
    ui.label(RichText::new("Calculation History").strong().size(16.0));

    ui.push_id("report_history", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(Column::auto().at_least(100.0), 5)
            .header(24.0, |mut header| {
                for title in ["Timestamp", "Formula", "Rows Processed", "Compliant", "Non-Compliant"] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for record in calculations.iter().rev() {
                    body.row(20.0, |mut row| {
                        let count = |n: Option<u64>| n.map_or_else(|| NULL_PLACEHOLDER.to_string(), |n| n.to_string());
                        let cells = [
                            record.display_time(),
                            record
                                .formula_name
                                .clone()
                                .unwrap_or_else(|| record.formula_id.clone()),
                            record.rows_processed.to_string(),
                            count(record.compliant_count),
                            count(record.non_compliant_count),
                        ];
                        let formula_color = colors.color_for(&record.formula_id);
                        for (i, text) in cells.into_iter().enumerate() {
                            row.col(|ui: &mut Ui| {
                                // Formula column matches its bar colour.
                                if i == 1 {
                                    ui.colored_label(formula_color, text);
                                } else {
                                    ui.label(text);
                                }
                            });
                        }
                    });
                }
            });
    });
}
