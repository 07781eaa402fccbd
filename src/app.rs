use eframe::egui;

use crate::state::AppState;
use crate::ui::{diagram, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CarbonFlowApp {
    pub state: AppState,
}

impl Default for CarbonFlowApp {
    fn default() -> Self {
        Self {
            state: AppState::default(),
        }
    }
}

impl eframe::App for CarbonFlowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: pipeline controls ----
        egui::SidePanel::left("controls_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: alluvial diagram ----
        egui::CentralPanel::default().show(ctx, |ui| {
            diagram::alluvial_diagram(ui, &self.state);
        });
    }
}
