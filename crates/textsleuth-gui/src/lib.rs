/// TextSleuth GUI: egui-based desktop frontend.
///
/// This crate contains all UI code. Search logic lives in `textsleuth-core`.
pub mod app;
pub mod panels;
pub mod state;
pub mod widgets;

pub use app::TextSleuthApp;
pub use state::AppState;
