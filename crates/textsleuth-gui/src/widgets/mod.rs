/// Reusable UI widgets.
pub mod status_bar;
