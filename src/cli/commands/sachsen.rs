//! AWO Sachsen export command.

use std::path::PathBuf;

use anyhow::Context;
use console::style;
use tracing::info;

use crate::config::Settings;
use crate::scrapers::{sachsen, BrowserSession};
use crate::storage;

/// Open the search page, tick every district and return the page markup.
async fn reveal(settings: &Settings) -> anyhow::Result<String> {
    let session = BrowserSession::launch(&settings.browser)
        .await
        .context("Failed to start browser")?;

    let result = sachsen::reveal_all_filters(&session, &settings.sachsen).await;
    session.close().await;

    result.context("Failed to reveal all district filters")
}

pub async fn cmd_sachsen(
    settings: &Settings,
    from_snapshot: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = &settings.sachsen;

    let snapshot = match from_snapshot {
        Some(path) => {
            info!("Using saved page {}", path.display());
            path
        }
        None => {
            let html = reveal(settings).await?;
            storage::save_snapshot(&config.snapshot_path, &html)?;
            info!("Page source saved to {}", config.snapshot_path.display());
            config.snapshot_path.clone()
        }
    };

    let html = storage::load_snapshot(&snapshot)?;
    let records = sachsen::collect_entries(&html)
        .with_context(|| format!("Failed to extract entries from {}", snapshot.display()))?;

    let output = output.unwrap_or_else(|| config.output_path.clone());
    storage::write_csv(&output, &records)?;

    println!(
        "{} Wrote {} AWO Sachsen entries to {}",
        style("✓").green(),
        records.len(),
        output.display()
    );

    Ok(())
}
