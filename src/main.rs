//! TextSleuth: find files whose contents contain a piece of text.
//!
//! Thin binary entry point. All logic lives in the `textsleuth-core`
//! and `textsleuth-gui` crates.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use textsleuth_core::model::FileTree;
use textsleuth_core::SearchConfig;

/// Environment variable naming an optional JSON config file.
const CONFIG_ENV: &str = "TEXTSLEUTH_CONFIG";

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("TextSleuth starting");

    let root = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            SearchConfig::load(&path)
                .with_context(|| format!("loading config from {}", path.display()))?
        }
        None => SearchConfig::default(),
    };

    // Load the tree *before* opening the window so the first frame already
    // shows the scope.
    let tree = FileTree::load(&root)
        .with_context(|| format!("cannot read {}", root.display()))?;
    tracing::info!(
        root = %root.display(),
        nodes = tree.len(),
        "Tree loaded"
    );

    let state = textsleuth_gui::AppState::new(Arc::new(tree), config);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title(format!("TextSleuth -- {}", root.display()))
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([500.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "TextSleuth",
        options,
        Box::new(move |cc| {
            Ok(Box::new(textsleuth_gui::TextSleuthApp::with_state(
                cc, state,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    Ok(())
}
