use chrono::NaiveDate;
use eframe::egui::{self, Align, Layout, RichText, TextEdit, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::status_color;
use crate::data::calendar::{QuickRange, parse_iso};
use crate::data::columns::ColumnType;
use crate::data::filter::{FilterOp, FilterSpec, FilterValue};
use crate::data::model::cell;
use crate::state::{TableAction, TableModel};

const STATUS_COLUMN_HINT: &str = "compliance status";

// ---------------------------------------------------------------------------
// Generic data table: filters, sortable headers, paging
// ---------------------------------------------------------------------------

/// Render `model` with its filter bar, header row and pager. `today` anchors
/// the quick date ranges.
pub fn data_table(ui: &mut Ui, id: &str, model: &mut TableModel, today: NaiveDate) {
    ui.push_id(id, |ui: &mut Ui| {
        let mut actions: Vec<TableAction> = Vec::new();

        toolbar(ui, model, &mut actions);

        egui::CollapsingHeader::new(RichText::new("Filters").strong())
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                filter_controls(ui, model, today, &mut actions);
            });

        if let Some(err) = &model.filter_error {
            ui.colored_label(super::ERROR_COLOR, err.as_str());
        }
        ui.separator();

        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            rows(ui, model, &mut actions);
        });

        ui.separator();
        pager(ui, model, &mut actions);

        for action in actions {
            model.dispatch(action);
        }
    });
}

fn toolbar(ui: &mut Ui, model: &TableModel, actions: &mut Vec<TableAction>) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!(
            "{} of {} rows",
            model.view().len(),
            model.dataset().len()
        ));
        ui.separator();

        ui.menu_button("Columns", |ui: &mut Ui| {
            for info in model.dataset().columns() {
                let mut visible = !model.state().is_hidden(&info.name);
                if ui.checkbox(&mut visible, info.name.as_str()).changed() {
                    actions.push(TableAction::ToggleColumn(info.name.clone()));
                }
            }
            ui.separator();
            if ui.button("Show all").clicked() {
                actions.push(TableAction::ShowAllColumns);
                ui.close_menu();
            }
        });

        let has_filters = !model.state().filters().is_empty();
        if ui
            .add_enabled(has_filters, egui::Button::new("Clear filters"))
            .clicked()
        {
            actions.push(TableAction::ClearFilters);
        }
        if ui
            .add_enabled(model.state().sort().is_some(), egui::Button::new("Clear sort"))
            .clicked()
        {
            actions.push(TableAction::ClearSort);
        }
    });
}

fn filter_controls(
    ui: &mut Ui,
    model: &mut TableModel,
    today: NaiveDate,
    actions: &mut Vec<TableAction>,
) {
    let columns: Vec<(String, ColumnType)> = model
        .visible_columns()
        .iter()
        .map(|c| (c.name.clone(), c.kind))
        .collect();
    let mut commit: Vec<String> = Vec::new();

    egui::Grid::new("filters")
        .num_columns(3)
        .spacing([8.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            for (name, kind) in &columns {
                let options = match kind {
                    ColumnType::Select => model.dataset().distinct_values(name),
                    _ => Vec::new(),
                };
                let active = model.state().filter(name).map(describe_filter);
                let input = model.input_mut(name);
                let mut changed = false;

                let title = format!("{name} ({})", kind.label());
                match &active {
                    Some(text) => {
                        ui.label(RichText::new(title).strong().color(super::ACCENT_COLOR))
                            .on_hover_text(format!("Active: {text}"));
                    }
                    None => {
                        ui.label(title);
                    }
                }

                egui::ComboBox::from_id_salt(("filter_op", name))
                    .width(80.0)
                    .selected_text(input.op.to_string())
                    .show_ui(ui, |ui: &mut Ui| {
                        for op in FilterOp::allowed_for(*kind) {
                            changed |= ui
                                .selectable_value(&mut input.op, *op, op.to_string())
                                .changed();
                        }
                    });

                ui.horizontal(|ui: &mut Ui| {
                    let hint = match kind {
                        ColumnType::Date => "YYYY-MM-DD",
                        ColumnType::Number => "number",
                        _ => "text",
                    };
                    if input.op == FilterOp::Between {
                        for (bound, label) in [(&mut input.min, "min"), (&mut input.max, "max")] {
                            changed |= ui
                                .add(TextEdit::singleline(bound).hint_text(label).desired_width(90.0))
                                .changed();
                        }
                    } else if *kind == ColumnType::Select && input.op == FilterOp::Equals {
                        let selected = if input.text.is_empty() {
                            "All".to_string()
                        } else {
                            input.text.clone()
                        };
                        egui::ComboBox::from_id_salt(("filter_value", name))
                            .selected_text(selected)
                            .show_ui(ui, |ui: &mut Ui| {
                                changed |= ui
                                    .selectable_value(&mut input.text, String::new(), "All")
                                    .changed();
                                for value in &options {
                                    changed |= ui
                                        .selectable_value(&mut input.text, value.clone(), value.as_str())
                                        .changed();
                                }
                            });
                    } else {
                        changed |= ui
                            .add(TextEdit::singleline(&mut input.text).hint_text(hint).desired_width(180.0))
                            .changed();
                        let text = input.text.trim();
                        if *kind == ColumnType::Date && !text.is_empty() && parse_iso(text).is_none() {
                            ui.colored_label(super::ERROR_COLOR, "⚠")
                                .on_hover_text("Dates compare as YYYY-MM-DD text");
                        }
                    }

                    if *kind == ColumnType::Date {
                        for range in QuickRange::ALL {
                            if ui.small_button(range.label()).clicked() {
                                actions.push(TableAction::QuickRange {
                                    column: name.clone(),
                                    range,
                                    today,
                                });
                            }
                        }
                    }
                    if ui.small_button("✖").on_hover_text("Clear filter").clicked() {
                        actions.push(TableAction::ClearFilter(name.clone()));
                    }
                });

                if changed {
                    commit.push(name.clone());
                }
                ui.end_row();
            }
        });

    for name in commit {
        model.apply_input(&name);
    }
}

/// Installed filter as shown in the hover text, e.g. `between 10 and 20`.
fn describe_filter(spec: &FilterSpec) -> String {
    match spec.value() {
        FilterValue::Scalar(v) => format!("{} {}", spec.op(), v.trim()),
        FilterValue::Range(lo, hi) => format!("{} {} and {}", spec.op(), lo.trim(), hi.trim()),
    }
}

fn rows(ui: &mut Ui, model: &TableModel, actions: &mut Vec<TableAction>) {
    let columns: Vec<String> = model
        .visible_columns()
        .iter()
        .map(|c| c.name.clone())
        .collect();
    if columns.is_empty() {
        ui.label("All columns are hidden.");
        return;
    }
    let dataset = model.dataset();
    let sort = model.state().sort();

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(80.0), columns.len())
        .header(24.0, |mut header| {
            for name in &columns {
                header.col(|ui: &mut Ui| {
                    let label = match sort {
                        Some(s) if s.column == *name => format!("{name} {}", s.direction.arrow()),
                        _ => name.clone(),
                    };
                    let button = egui::Button::new(RichText::new(label).strong()).frame(false);
                    if ui.add(button).on_hover_text("Sort").clicked() {
                        actions.push(TableAction::SortBy(name.clone()));
                    }
                });
            }
        })
        .body(|mut body| {
            for &index in model.view().page_rows() {
                let Some(row) = dataset.row(index) else {
                    continue;
                };
                body.row(20.0, |mut table_row| {
                    for name in &columns {
                        table_row.col(|ui: &mut Ui| {
                            let text = dataset.format_cell(row, name);
                            if name.to_lowercase().contains(STATUS_COLUMN_HINT) && !cell(row, name).is_null() {
                                ui.colored_label(status_color(&text), text);
                            } else {
                                ui.label(text);
                            }
                        });
                    }
                });
            }
        });

    if model.view().is_empty() {
        ui.label("No rows match the current filters.");
    }
}

fn pager(ui: &mut Ui, model: &TableModel, actions: &mut Vec<TableAction>) {
    let view = model.view();
    ui.horizontal(|ui: &mut Ui| {
        if ui
            .add_enabled(view.has_previous(), egui::Button::new("◀ Previous"))
            .clicked()
        {
            actions.push(TableAction::GoToPage(view.page() - 1));
        }
        ui.label(format!("Page {} of {}", view.page(), view.total_pages()));
        if ui
            .add_enabled(view.has_next(), egui::Button::new("Next ▶"))
            .clicked()
        {
            actions.push(TableAction::GoToPage(view.page() + 1));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn active_filters_are_described() {
        let contains =
            FilterSpec::new(ColumnType::Text, FilterOp::Contains, " drug ".into()).unwrap();
        assert_eq!(describe_filter(&contains), "contains drug");

        let between = FilterSpec::new(
            ColumnType::Date,
            FilterOp::Between,
            FilterValue::range("2024-01-15", "2024-04-15"),
        )
        .unwrap();
        assert_eq!(describe_filter(&between), "between 2024-01-15 and 2024-04-15");
    }
}
