//! AWO Weser-Ems location list.
//!
//! The list page loads more locations each time its "view more" button is
//! clicked. Once the button is gone, every location card links to a detail
//! page that is fetched over plain HTTP and parsed by marker text.

use std::time::Duration;

use indicatif::ProgressBar;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::browser::{BrowserSession, ClickOutcome};
use super::http_client::DocumentFetcher;
use crate::config::WeserConfig;
use crate::error::{ExtractError, RevealError};
use crate::models::WeserRecord;
use crate::utils::html::{
    child_elements, closest, element_text, find_with_attr_prefix, find_with_text, selector,
};

const MORE_BUTTON: &str = ".btn.btn-outline-primary.view-more-button";
const LOCATION_LIST: &str = ".row.g-3.standorte-list";
const LOCATION_CARD: &str = ".filter-item.col-md-6.col-lg-4.standort-append-item";
const DETAIL_LINK: &str = ".btn.btn-link.mt-auto.text-left.stretched-link.position-static";

const ADDRESS_MARKER: &str = "Anschrift";
const CONTACT_MARKER: &str = "Ansprechperson";

/// Log a progress line every this many detail pages.
const PROGRESS_EVERY: usize = 10;

/// The fully expanded location list.
#[derive(Debug, Clone)]
pub struct ExpandedListing {
    pub html: String,
    /// Page URL after expansion; detail links are resolved against it.
    pub page_url: String,
    pub clicks: usize,
}

/// Click "view more" until the button stops appearing, then return the page.
///
/// A button that never shows up within the wait is the normal end of the
/// list. A button that shows up but cannot be clicked also ends the loop,
/// with a warning, since the list is then as complete as it will get.
pub async fn expand_listing(
    session: &BrowserSession,
    config: &WeserConfig,
) -> Result<ExpandedListing, RevealError> {
    let wait = Duration::from_secs(config.wait_timeout_secs);
    let scroll_pause = Duration::from_secs(config.scroll_delay_secs);
    let settle = Duration::from_secs(config.settle_delay_secs);

    session.goto(&config.listing_url).await?;

    let mut clicks = 0;
    loop {
        match session.click_centered(MORE_BUTTON, wait, scroll_pause).await {
            ClickOutcome::Clicked => {
                clicks += 1;
                debug!("Clicked 'view more' ({})", clicks);
                tokio::time::sleep(settle).await;
            }
            ClickOutcome::NotFound => {
                info!("All locations loaded after {} clicks", clicks);
                break;
            }
            ClickOutcome::Failed(e) => {
                warn!(
                    "'View more' button could not be clicked, stopping after {} clicks: {}",
                    clicks, e
                );
                break;
            }
        }
    }

    let html = session.content().await?;
    let page_url = session
        .url()
        .await?
        .unwrap_or_else(|| config.listing_url.clone());

    Ok(ExpandedListing {
        html,
        page_url,
        clicks,
    })
}

/// Detail page URLs of every location card, in page order.
///
/// Cards without a usable link are logged and skipped.
pub fn detail_links(html: &str, base: &Url) -> Result<Vec<String>, ExtractError> {
    let document = Html::parse_document(html);
    let list_selector = selector(LOCATION_LIST)?;
    let card_selector = selector(LOCATION_CARD)?;
    let link_selector = selector(DETAIL_LINK)?;

    let list = document
        .select(&list_selector)
        .next()
        .ok_or(ExtractError::MissingElement("location list"))?;

    let cards: Vec<_> = list.select(&card_selector).collect();
    info!("Number of locations: {}", cards.len());

    let mut links = Vec::with_capacity(cards.len());
    for (idx, card) in cards.into_iter().enumerate() {
        match card_link(card, &link_selector, base) {
            Ok(url) => links.push(url),
            Err(e) => warn!("Skipping location {}: {}", idx, e),
        }
    }

    Ok(links)
}

/// Absolute detail URL of one location card.
fn card_link(card: ElementRef, link: &Selector, base: &Url) -> Result<String, ExtractError> {
    let href = card
        .select(link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or(ExtractError::MissingElement("detail link"))?;

    base.join(href)
        .map(String::from)
        .map_err(|e| ExtractError::InvalidLink {
            href: href.to_string(),
            reason: e.to_string(),
        })
}

/// Extract one record from a facility detail page.
///
/// Each field is looked up independently; a missing marker leaves its field
/// empty. A marker whose surrounding card is malformed is an error.
pub fn extract_details(document: &Html) -> Result<WeserRecord, ExtractError> {
    let root = document.root_element();
    let mut record = WeserRecord::default();

    if let Some(title) = find_with_text(root, &selector("span.card-title")?, ADDRESS_MARKER) {
        let card_body = closest(title, &selector("div.card-body")?)
            .ok_or(ExtractError::MissingElement("address card body"))?;

        let divs = child_elements(card_body, "div");
        let block = divs
            .len()
            .checked_sub(2)
            .map(|idx| divs[idx])
            .ok_or(ExtractError::MissingElement("address block"))?;

        let name = block
            .select(&selector("span.fw-bold")?)
            .next()
            .ok_or(ExtractError::MissingElement("facility name"))?;
        record.name = element_text(name).trim().to_string();

        let spans: Vec<_> = block.select(&selector("span")?).collect();
        if spans.len() >= 3 {
            record.address = format!(
                "{}\n{}",
                element_text(spans[1]).trim(),
                element_text(spans[2]).trim()
            );
        }
    }

    let anchor = selector("a[href]")?;
    if let Some(a) = find_with_attr_prefix(root, &anchor, "href", "tel:") {
        record.telephone = element_text(a);
    }
    if let Some(a) = find_with_attr_prefix(root, &anchor, "href", "mailto:") {
        record.email = element_text(a);
    }

    let contact_heading = selector("span.h3.text-primary")?;
    if let Some(heading) = find_with_text(root, &contact_heading, CONTACT_MARKER) {
        let card = closest(heading, &selector("div.card")?)
            .ok_or(ExtractError::MissingElement("contact card"))?;
        let name = card
            .select(&selector("span.card-title.text-dark")?)
            .next()
            .ok_or(ExtractError::MissingElement("contact name"))?;
        record.contact_person = element_text(name);
    }

    Ok(record)
}

/// Fetch and parse every detail page, one at a time.
///
/// A page that fails to fetch or parse is logged and left out.
pub async fn collect_details<F>(
    fetcher: &F,
    links: &[String],
    progress: &ProgressBar,
) -> Vec<WeserRecord>
where
    F: DocumentFetcher + ?Sized,
{
    let mut records = Vec::with_capacity(links.len());

    for (idx, link) in links.iter().enumerate() {
        if idx % PROGRESS_EVERY == 0 {
            info!("{} location details extracted", idx);
        }

        match fetcher.fetch_text(link).await {
            Ok(html) => match extract_details(&Html::parse_document(&html)) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping {}: {}", link, e),
            },
            Err(e) => warn!("Skipping {}: {}", link, e),
        }

        progress.inc(1);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS_CARD: &str = r#"
        <div class="card"><div class="card-body">
            <span class="card-title">Anschrift</span>
            <div>
                <span class="fw-bold"> AWO Kita Sonnenblume </span><br>
                <span> Donnerschweer Str. 5 </span><br>
                <span> 26123 Oldenburg </span>
            </div>
            <div class="map"></div>
        </div></div>
    "#;

    const CONTACT_CARD: &str = r#"
        <div class="card">
            <span class="h3 text-primary">Ihre Ansprechperson</span>
            <div class="card-body"><span class="card-title text-dark">Anna Schmidt</span></div>
        </div>
    "#;

    fn page(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{body}</body></html>"))
    }

    #[test]
    fn test_full_detail_page() {
        let doc = page(&format!(
            r#"{ADDRESS_CARD}
            <a href="tel:+494419999"> 0441 9999</a>
            <a href="mailto:kita@awo-ol.de">kita@awo-ol.de</a>
            {CONTACT_CARD}"#
        ));

        let record = extract_details(&doc).unwrap();

        assert_eq!(record.name, "AWO Kita Sonnenblume");
        assert_eq!(record.address, "Donnerschweer Str. 5\n26123 Oldenburg");
        assert_eq!(record.telephone, " 0441 9999");
        assert_eq!(record.email, "kita@awo-ol.de");
        assert_eq!(record.contact_person, "Anna Schmidt");
    }

    #[test]
    fn test_empty_page_yields_empty_record() {
        let record = extract_details(&page("<p>Keine Angaben</p>")).unwrap();
        assert_eq!(record, WeserRecord::default());
    }

    #[test]
    fn test_no_address_marker_leaves_name_empty() {
        let doc = page(r#"<span class="card-title">Öffnungszeiten</span><a href="tel:1">1</a>"#);

        let record = extract_details(&doc).unwrap();

        assert_eq!(record.name, "");
        assert_eq!(record.address, "");
        assert_eq!(record.telephone, "1");
    }

    #[test]
    fn test_short_address_block_keeps_address_empty() {
        let doc = page(
            r#"<div class="card-body"><span class="card-title">Anschrift</span>
               <div><span class="fw-bold">Nur Name</span></div><div></div></div>"#,
        );

        let record = extract_details(&doc).unwrap();

        assert_eq!(record.name, "Nur Name");
        assert_eq!(record.address, "");
    }

    #[test]
    fn test_first_tel_link_wins_and_is_untrimmed() {
        let doc = page(
            r#"<a href="/kontakt">Kontakt</a><a href="tel:1"> 0441 1 </a><a href="tel:2">2</a>"#,
        );
        let record = extract_details(&doc).unwrap();
        assert_eq!(record.telephone, " 0441 1 ");
    }

    #[test]
    fn test_marker_without_card_body_is_an_error() {
        let doc = page(r#"<div><span class="card-title">Anschrift</span></div>"#);
        let err = extract_details(&doc).unwrap_err();
        assert!(matches!(err, ExtractError::MissingElement("address card body")));
    }

    #[test]
    fn test_detail_links_resolved_against_page() {
        let html = r#"<div class="row g-3 standorte-list">
                <div class="filter-item col-md-6 col-lg-4 standort-append-item">
                    <a class="btn btn-link mt-auto text-left stretched-link position-static" href="/standort/kita-a">Mehr</a>
                </div>
                <div class="filter-item col-md-6 col-lg-4 standort-append-item"><p>kein Link</p></div>
                <div class="filter-item col-md-6 col-lg-4 standort-append-item">
                    <a class="btn btn-link mt-auto text-left stretched-link position-static" href="https://other.de/b">Mehr</a>
                </div>
            </div>"#;
        let base =
            Url::parse("https://awo-ol.de/meine-awo-karriere/awo-weser-ems/standorte-leistungen")
                .unwrap();

        let links = detail_links(html, &base).unwrap();

        assert_eq!(
            links,
            vec![
                "https://awo-ol.de/standort/kita-a".to_string(),
                "https://other.de/b".to_string(),
            ]
        );
    }

    #[test]
    fn test_detail_links_without_list_fails() {
        let base = Url::parse("https://awo-ol.de/").unwrap();
        let err = detail_links("<html></html>", &base).unwrap_err();
        assert!(matches!(err, ExtractError::MissingElement("location list")));
    }

    #[test]
    fn test_card_link_reports_unresolvable_href() {
        let doc = Html::parse_fragment(
            r#"<div><a class="go" href="http://[::1">x</a></div>"#,
        );
        let card = doc.root_element();
        let base = Url::parse("https://awo-ol.de/").unwrap();

        let err = card_link(card, &selector("a.go").unwrap(), &base).unwrap_err();

        assert!(matches!(err, ExtractError::InvalidLink { .. }));
    }
}
