mod document;
mod renderer;

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use folio_core::model::Content;
use folio_core::{Page, PageConfig};

fn main() -> Result<()> {
    setup_tracing();

    let content = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            Content::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Content::builtin()?,
    };
    let page = Page::new(content, PageConfig::default())?;

    renderer::run_tui(page)
}

/// Log to the file named by `FOLIO_LOG`; the terminal itself is the UI.
fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let Some(path) = std::env::var_os("FOLIO_LOG").map(PathBuf::from) else {
        return;
    };
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("folio_core=debug,folio_tui=debug,info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    tracing::info!(path = %path.display(), "folio tracing initialized");
}
