/// UI panels.
pub mod search_panel;
