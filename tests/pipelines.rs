//! End-to-end extraction and export without a browser.

use std::collections::HashMap;

use async_trait::async_trait;
use indicatif::ProgressBar;

use awo_directory::error::FetchError;
use awo_directory::models::{SachsenRecord, WeserRecord};
use awo_directory::scrapers::{sachsen, weser, DocumentFetcher};
use awo_directory::storage;

const SACHSEN_PAGE: &str = r#"<html><body>
<ul id="resultList">
<li><a href="/e/1"> Kita Sonnenschein </a><div class="resultAdresse"> Hauptstr. 1 <br>01067 Dresden <br><br>Frau Müller<br><span>Telefon:</span> 0351 1<br><span>EMail:</span> kita@awo.de<br><a href="https://awo-dresden.de">AWO Dresden </a> </div></li>
<li><a href="/e/2">Beratungsstelle</a><div class="resultAdresse">Ring 2<br>04109 Leipzig<br><br><span>Web:</span> www.awo-leipzig.de<br><a>AWO Leipzig</a> </div></li>
</ul>
</body></html>"#;

fn read_rows(path: &std::path::Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn test_sachsen_snapshot_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("page_source.html");
    let output = dir.path().join("data").join("scraped_sachsen.csv");

    storage::save_snapshot(&snapshot, SACHSEN_PAGE).unwrap();
    let html = storage::load_snapshot(&snapshot).unwrap();
    let records = sachsen::collect_entries(&html).unwrap();
    storage::write_csv(&output, &records).unwrap();

    assert_eq!(
        records[0],
        SachsenRecord {
            name: "Kita Sonnenschein".into(),
            address: "Hauptstr. 1\n01067 Dresden".into(),
            contact_person: "Frau Müller".into(),
            telephone: " 0351 1".into(),
            email: " kita@awo.de".into(),
            organisation: "AWO Dresden".into(),
            organisation_website: "https://awo-dresden.de".into(),
            ..Default::default()
        }
    );
    assert_eq!(records[1].contact_person, "");
    assert_eq!(records[1].website, " www.awo-leipzig.de");
    assert_eq!(records[1].organisation_website, "");

    let rows = read_rows(&output);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "name");
    assert_eq!(rows[0][8], "organisation_website");
    assert_eq!(rows[1][1], "Hauptstr. 1\n01067 Dresden");
    assert_eq!(rows[2][0], "Beratungsstelle");
}

#[test]
fn test_sachsen_page_without_result_list_fails() {
    assert!(sachsen::collect_entries("<html><body></body></html>").is_err());
}

/// Serves canned pages; unknown URLs answer 404.
struct CannedPages(HashMap<&'static str, &'static str>);

#[async_trait]
impl DocumentFetcher for CannedPages {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.0
            .get(url)
            .map(|page| page.to_string())
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

const DETAIL_PAGE: &str = r#"<html><body>
<div class="card"><div class="card-body">
  <span class="card-title">Anschrift</span>
  <div><span class="fw-bold">AWO Kita Regenbogen</span><span>Am Markt 3</span><span>26603 Aurich</span></div>
  <div></div>
</div></div>
<a href="tel:049411">04941 1</a>
<a href="mailto:regenbogen@awo-ol.de">regenbogen@awo-ol.de</a>
</body></html>"#;

const BROKEN_PAGE: &str =
    r#"<html><body><span class="card-title">Anschrift</span></body></html>"#;

#[tokio::test]
async fn test_weser_details_skip_failures_and_keep_order() {
    let fetcher = CannedPages(HashMap::from([
        ("https://awo-ol.de/standort/a", DETAIL_PAGE),
        ("https://awo-ol.de/standort/broken", BROKEN_PAGE),
        ("https://awo-ol.de/standort/empty", "<html><body></body></html>"),
    ]));
    let links: Vec<String> = [
        "https://awo-ol.de/standort/a",
        "https://awo-ol.de/standort/missing",
        "https://awo-ol.de/standort/broken",
        "https://awo-ol.de/standort/empty",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let progress = ProgressBar::hidden();

    let records = weser::collect_details(&fetcher, &links, &progress).await;

    assert_eq!(progress.position(), 4);
    assert_eq!(
        records,
        vec![
            WeserRecord {
                name: "AWO Kita Regenbogen".into(),
                address: "Am Markt 3\n26603 Aurich".into(),
                contact_person: String::new(),
                telephone: "04941 1".into(),
                email: "regenbogen@awo-ol.de".into(),
            },
            WeserRecord::default(),
        ]
    );

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("scraped_weser.csv");
    storage::write_csv(&output, &records).unwrap();

    let rows = read_rows(&output);
    assert_eq!(
        rows[0],
        vec!["name", "address", "contact_person", "telephone", "email"]
    );
    assert_eq!(rows.len(), 3);
}
