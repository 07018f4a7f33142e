/// Main `eframe::App` implementation for TextSleuth.
///
/// Top-level layout that composes the search panel and the status bar.
use crate::panels::search_panel;
use crate::state::{AppPhase, AppState};
use crate::widgets;

/// The TextSleuth application.
pub struct TextSleuthApp {
    state: AppState,
}

impl TextSleuthApp {
    /// Create a new application instance from pre-built state.
    ///
    /// Build the state (including loading the tree) *before*
    /// `eframe::run_native` so the first frame has something to show.
    pub fn with_state(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Self { state }
    }
}

impl eframe::App for TextSleuthApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Process background messages ───────────────────────────────────
        let _data_changed = self.state.process_search_messages();

        if self.state.phase == AppPhase::Searching {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }

        egui::TopBottomPanel::top("query").show(ctx, |ui| {
            ui.add_space(6.0);
            search_panel::query_controls(ui, &mut self.state);
            ui.add_space(4.0);
            search_panel::progress_bar(ui, &self.state);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status_bar")
            .min_height(24.0)
            .show(ctx, |ui| {
                ui.add_space(2.0);
                widgets::status_bar::status_bar(ui, &self.state);
                ui.add_space(2.0);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            search_panel::results_list(ui, &mut self.state);
        });
    }
}
