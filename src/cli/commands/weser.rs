//! AWO Weser-Ems export command.

use std::path::PathBuf;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use crate::config::Settings;
use crate::scrapers::weser::{self, ExpandedListing};
use crate::scrapers::{BrowserSession, HttpClient};
use crate::storage;

/// Open the location list and click "view more" until it is exhausted.
async fn reveal(settings: &Settings) -> anyhow::Result<ExpandedListing> {
    let session = BrowserSession::launch(&settings.browser)
        .await
        .context("Failed to start browser")?;

    let result = weser::expand_listing(&session, &settings.weser).await;
    session.close().await;

    result.context("Failed to expand location list")
}

pub async fn cmd_weser(settings: &Settings, output: Option<PathBuf>) -> anyhow::Result<()> {
    let listing = reveal(settings).await?;
    info!("Location list expanded with {} clicks", listing.clicks);

    let base = Url::parse(&listing.page_url)
        .with_context(|| format!("Invalid page URL {}", listing.page_url))?;
    let links =
        weser::detail_links(&listing.html, &base).context("Failed to read location list")?;

    let client = HttpClient::new(&settings.http).context("Failed to build HTTP client")?;

    let progress = ProgressBar::new(links.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")?
            .progress_chars("█▓░"),
    );
    progress.set_message("Fetching location details");

    let records = weser::collect_details(&client, &links, &progress).await;
    progress.finish_and_clear();

    let skipped = links.len() - records.len();
    let output = output.unwrap_or_else(|| settings.weser.output_path.clone());
    storage::write_csv(&output, &records)?;

    println!(
        "{} Wrote {} AWO Weser-Ems locations to {}",
        style("✓").green(),
        records.len(),
        output.display()
    );
    if skipped > 0 {
        println!(
            "  {} {} locations skipped (see log)",
            style("!").yellow(),
            skipped
        );
    }

    Ok(())
}
