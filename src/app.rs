use std::path::Path;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustySmithApp {
    pub state: AppState,
}

impl RustySmithApp {
    /// Start the viewer, optionally with a file already open.
    pub fn new(initial: Option<&Path>) -> Self {
        let mut app = Self::default();
        if let Some(path) = initial {
            app.state.open(path);
        }
        app
    }
}

impl eframe::App for RustySmithApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: reading + display controls ----
        egui::SidePanel::left("control_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::sparam_plot(ui, &self.state);
        });
    }
}
