use eframe::egui;

use crate::api::client::ApiClient;
use crate::config::Config;
use crate::data::calendar;
use crate::state::{AppState, Screen};
use crate::ui::{calculate, formulas, home, panels, reports, upload};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PricingDashboardApp {
    pub state: AppState,
}

impl PricingDashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &Config) -> Self {
        let mut api = ApiClient::new(config.api_base_url.clone());
        api.set_repaint_context(cc.egui_ctx.clone());
        let mut state = AppState::new(api);
        state.refresh_all();
        Self { state }
    }
}

impl eframe::App for PricingDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.drain_events();
        let today = calendar::today();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation ----
        egui::SidePanel::left("nav_panel")
            .default_width(170.0)
            .resizable(false)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.screen {
                    Screen::Home => home::home_page(ui, &mut self.state, today),
                    Screen::Upload => upload::upload_page(ui, &mut self.state, today),
                    Screen::Formulas => formulas::formulas_page(ui, &mut self.state),
                    Screen::Calculate => calculate::calculate_page(ui, &mut self.state, today),
                    Screen::Reports => reports::reports_page(ui, &mut self.state, today),
                });
        });
    }
}
