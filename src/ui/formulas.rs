use eframe::egui::{self, RichText, TextEdit, Ui};

use super::ERROR_COLOR;
use crate::api::client::Endpoint;
use crate::formula::{FormulaToken, Operator};
use crate::state::AppState;

pub fn formulas_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Pricing Formulas");
    ui.add_space(8.0);

    ui.columns(2, |cols: &mut [Ui]| {
        create_form(&mut cols[0], state);
        formula_list(&mut cols[1], state);
    });
}

fn create_form(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("Create New Formula").strong().size(16.0));

    let page = &mut state.formulas;
    egui::Grid::new("formula_form")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Name");
            ui.add(TextEdit::singleline(&mut page.draft.name).hint_text("e.g. Basic Discount"));
            ui.end_row();
            ui.label("Description");
            ui.add(TextEdit::singleline(&mut page.draft.description));
            ui.end_row();
        });

    ui.add_space(6.0);
    ui.label("Formula");
    ui.add(
        TextEdit::multiline(&mut page.draft.formula)
            .code_editor()
            .desired_rows(3)
            .desired_width(f32::INFINITY),
    );
    match page.draft.open_parens() {
        0 => {}
        n if n > 0 => {
            ui.colored_label(ERROR_COLOR, format!("{n} unclosed parenthesis"));
        }
        n => {
            ui.colored_label(ERROR_COLOR, format!("{} unmatched ')'", -n));
        }
    }

    ui.add_space(6.0);
    ui.label(RichText::new("Formula Builder").strong());

    let mut tokens: Vec<FormulaToken> = Vec::new();
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label("Variables:");
        for variable in &page.variables {
            let hover = match &variable.example {
                Some(example) => format!("{} (e.g. {example})", variable.description),
                None => variable.description.clone(),
            };
            if ui.button(variable.name.as_str()).on_hover_text(hover).clicked() {
                tokens.push(FormulaToken::Variable(variable.name.clone()));
            }
        }
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Operators:");
        for op in Operator::ALL {
            if ui.button(op.symbol()).clicked() {
                tokens.push(FormulaToken::Operator(op));
            }
        }
        if ui.button("(").clicked() {
            tokens.push(FormulaToken::OpenParen);
        }
        if ui.button(")").clicked() {
            tokens.push(FormulaToken::CloseParen);
        }
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.add(TextEdit::singleline(&mut page.number_input).hint_text("number").desired_width(80.0));
        let number = page.number_input.trim().to_string();
        let valid = number.parse::<f64>().is_ok();
        if ui.add_enabled(valid, egui::Button::new("Add number")).clicked() {
            tokens.push(FormulaToken::Number(number));
            page.number_input.clear();
        }
        ui.separator();
        if ui.button("Reset").clicked() {
            page.draft.reset_formula();
        }
        if ui.button("Clear").clicked() {
            page.draft.clear_formula();
        }
    });
    for token in &tokens {
        page.draft.push(token);
    }

    ui.add_space(8.0);
    let pending = state.api.is_pending(Endpoint::CreateFormula);
    ui.horizontal(|ui: &mut Ui| {
        let label = if pending { "Creating…" } else { "Create Formula" };
        if ui.add_enabled(!pending, egui::Button::new(label)).clicked() {
            state.submit_formula();
        }
        if pending {
            ui.spinner();
        }
    });
    super::notice(ui, &state.formulas.notice);
}

fn formula_list(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new("Existing Formulas").strong().size(16.0));
        if ui.small_button("⟳").on_hover_text("Reload").clicked() {
            state.api.fetch_formulas();
        }
    });

    if state.formulas.formulas.is_empty() {
        ui.label("No formulas yet.");
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("formula_list")
        .show(ui, |ui: &mut Ui| {
            for formula in &state.formulas.formulas {
                egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(RichText::new(&formula.name).strong());
                    if !formula.description.is_empty() {
                        ui.label(formula.description.as_str());
                    }
                    ui.code(formula.formula_string.as_str());
                    if let Some(created) = &formula.created_at {
                        ui.weak(format!("Created {created}"));
                    }
                });
            }
        });
}
