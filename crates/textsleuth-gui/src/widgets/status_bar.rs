/// Bottom status bar: search state, match count and timing.
use crate::state::{AppPhase, AppState};
use egui::Ui;

/// Draw the status bar at the bottom of the window.
pub fn status_bar(ui: &mut Ui, state: &AppState) {
    let color_weak = ui.visuals().weak_text_color();
    let color_normal = ui.visuals().text_color();
    let color_accent = ui.visuals().hyperlink_color;
    let color_warning = egui::Color32::from_rgb(0xfa, 0xb3, 0x87);
    let color_success = egui::Color32::from_rgb(0xa6, 0xe3, 0xa1);

    ui.horizontal(|ui| {
        match state.phase {
            AppPhase::Idle => {
                let files = state.scope.leaf_count(&state.tree);
                let bytes = state.scope.byte_size(&state.tree);
                ui.label(
                    egui::RichText::new(format!("Ready: {files} files, {bytes} bytes in scope"))
                        .size(12.0)
                        .color(color_weak),
                );
            }
            AppPhase::Searching => {
                ui.spinner();
                ui.label(
                    egui::RichText::new(format!("Searching… {} found", state.matches.len()))
                        .size(12.0)
                        .color(color_normal),
                );
            }
            AppPhase::Results => {
                let (text, color) = if state.search_was_cancelled {
                    ("\u{23f9} Search stopped", color_warning)
                } else {
                    ("\u{2713} Search complete", color_success)
                };
                ui.label(egui::RichText::new(text).size(12.0).color(color));
                ui.separator();
                ui.label(
                    egui::RichText::new(format!("{} found", state.matches.len()))
                        .size(12.0)
                        .color(color_accent),
                );
                if let Some(duration) = state.search_duration {
                    ui.separator();
                    ui.label(
                        egui::RichText::new(format!("{:.1}s", duration.as_secs_f64()))
                            .size(12.0)
                            .color(color_weak),
                    );
                }
            }
        }

        if state.search_error_count > 0 {
            ui.separator();
            ui.label(
                egui::RichText::new(format!("{} unreadable", state.search_error_count))
                    .size(12.0)
                    .color(color_warning),
            )
            .on_hover_text(error_summary(state));
        }

        if let Some(path) = state.selected_path() {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(truncate_path(&path, 60))
                        .size(11.0)
                        .color(color_weak),
                );
            });
        }
    });
}

fn error_summary(state: &AppState) -> String {
    state
        .search_errors
        .iter()
        .take(10)
        .map(|(path, message)| format!("{path}: {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shorten a path to at most `max_chars` characters, replacing the middle
/// with "...".
fn truncate_path(path: &str, max_chars: usize) -> String {
    let count = path.chars().count();
    if count <= max_chars {
        return path.to_string();
    }
    let half = (max_chars.saturating_sub(3)) / 2;
    let head: String = path.chars().take(half).collect();
    let tail: String = path.chars().skip(count - half).collect();
    format!("{head}...{tail}")
}
