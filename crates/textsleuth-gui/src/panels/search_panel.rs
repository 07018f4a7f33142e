/// Search panel: text field, charset picker, find button, progress bar and
/// the live list of matching files.
use crate::state::{AppPhase, AppState};
use egui::Ui;
use textsleuth_core::search::pattern::SUPPORTED_ENCODINGS;
use textsleuth_core::search::ProgressCounter;

/// Draw the query controls at the top of the panel.
pub fn query_controls(ui: &mut Ui, state: &mut AppState) {
    let can_search = state.can_search();
    let mut submit = false;

    ui.horizontal(|ui| {
        ui.label("Text to search:");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let find_btn = ui
                .add_enabled(
                    can_search,
                    egui::Button::new("🔍 Find").min_size(egui::vec2(70.0, 24.0)),
                )
                .on_disabled_hover_text(format!(
                    "Enter at least {} characters",
                    state.config().min_pattern_len
                ));
            if find_btn.clicked() {
                submit = true;
            }

            let edit = ui.add_enabled(
                state.controls_enabled,
                egui::TextEdit::singleline(&mut state.pattern_text)
                    .desired_width(f32::INFINITY)
                    .hint_text("text to find in file contents"),
            );
            if state.focus_text && state.controls_enabled {
                edit.request_focus();
                state.focus_text = false;
            }
            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) && can_search {
                submit = true;
            }
        });
    });

    ui.horizontal(|ui| {
        ui.label("Charset:");
        let current = state.encoding.clone();
        ui.add_enabled_ui(state.controls_enabled, |ui| {
            egui::ComboBox::from_id_salt("charset")
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for label in SUPPORTED_ENCODINGS {
                        ui.selectable_value(&mut state.encoding, label.to_string(), *label);
                    }
                });
        });
    });

    if let Some(ref err) = state.last_error {
        ui.colored_label(ui.visuals().error_fg_color, err);
    }

    if submit {
        state.start_search();
    }
}

/// Draw the progress bar in one of its three modes.
pub fn progress_bar(ui: &mut Ui, state: &AppState) {
    match state.progress {
        ProgressCounter::Indeterminate => {
            if state.phase == AppPhase::Searching {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Searching…");
                });
            } else {
                ui.add_enabled(false, egui::ProgressBar::new(0.0));
            }
        }
        ProgressCounter::Determinate { value, max } => {
            let fraction = state.progress.fraction().unwrap_or(0.0);
            ui.add(
                egui::ProgressBar::new(fraction)
                    .text(format!("{value} / {max} files"))
                    .animate(state.phase == AppPhase::Searching),
            );
        }
        ProgressCounter::Done => {
            ui.add_enabled(false, egui::ProgressBar::new(1.0).text("Done"));
        }
    }
}

/// Draw the virtualised list of matches.
pub fn results_list(ui: &mut Ui, state: &mut AppState) {
    let row_height = ui.text_style_height(&egui::TextStyle::Body);
    let total = state.matches.len();
    let mut clicked = None;

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show_rows(ui, row_height, total, |ui, range| {
            for i in range {
                let Some(node) = state.matches.get(i) else {
                    continue;
                };
                let label = state.tree.full_path(node);
                if ui
                    .selectable_label(state.selected == Some(i), label)
                    .clicked()
                {
                    clicked = Some(i);
                }
            }
        });

    if let Some(i) = clicked {
        state.select(i);
    }
}
