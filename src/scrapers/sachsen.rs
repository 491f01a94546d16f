//! AWO Sachsen facility search.
//!
//! The search page lists facilities per district. Every district filter is
//! toggled on so the result list holds all entries at once, then each `<li>`
//! of `ul#resultList` is parsed positionally.

use std::time::Duration;

use scraper::{ElementRef, Html};
use tracing::{debug, info};

use super::browser::BrowserSession;
use crate::config::SachsenConfig;
use crate::error::{ExtractError, RevealError};
use crate::models::SachsenRecord;
use crate::utils::html::{child_nodes, element_text, selector};

/// Child index of the optional contact person inside `div.resultAdresse`.
const CONTACT_SLOT: usize = 5;

/// Field markers that precede a value inside the address block.
const LABELS: &[&str] = &["Telefon:", "Fax:", "EMail:", "Web:"];

/// Filter checkbox selector for district `index` (1-based).
pub fn filter_selector(index: usize) -> String {
    format!(r#"[name="entry_landkreis_filter[{index}][{index}]"]"#)
}

/// Toggle every district filter and return the fully populated page markup.
///
/// Fails on the first checkbox that does not become clickable in time.
pub async fn reveal_all_filters(
    session: &BrowserSession,
    config: &SachsenConfig,
) -> Result<String, RevealError> {
    let wait = Duration::from_secs(config.wait_timeout_secs);
    let settle = Duration::from_secs(config.settle_delay_secs);

    session.goto(&config.search_url).await?;

    for index in 1..=config.filter_count {
        session.click_when_ready(&filter_selector(index), wait).await?;
        info!("Clicked filter {}", index);
        tokio::time::sleep(settle).await;
    }

    tokio::time::sleep(Duration::from_secs(config.final_delay_secs)).await;

    session.content().await
}

/// Parse every entry of the search result list.
pub fn collect_entries(html: &str) -> Result<Vec<SachsenRecord>, ExtractError> {
    let document = Html::parse_document(html);
    let list_selector = selector("ul#resultList")?;
    let item_selector = selector("li")?;

    let list = document
        .select(&list_selector)
        .next()
        .ok_or(ExtractError::MissingElement("ul#resultList"))?;

    let records = list
        .select(&item_selector)
        .map(parse_entry)
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Parsed {} entries from result list", records.len());
    Ok(records)
}

/// Parse one `<li>` of the result list.
///
/// Layout of `div.resultAdresse` children: 0 street, 1 break, 2 city,
/// 5 optional contact person, then label/value pairs up to the
/// organisation link in the second-to-last slot.
pub fn parse_entry(entry: ElementRef<'_>) -> Result<SachsenRecord, ExtractError> {
    let name_link = entry
        .select(&selector("a")?)
        .next()
        .ok_or(ExtractError::MissingElement("entry name link"))?;
    let address_block = entry
        .select(&selector("div.resultAdresse")?)
        .next()
        .ok_or(ExtractError::MissingElement("div.resultAdresse"))?;

    let children = child_nodes(address_block);
    let child = |index: usize| {
        children.get(index).ok_or(ExtractError::MissingChild {
            index,
            len: children.len(),
        })
    };

    let mut record = SachsenRecord {
        name: element_text(name_link).trim().to_string(),
        address: format!(
            "{}\n{}",
            child(0)?.text().trim(),
            child(2)?.text().trim()
        ),
        ..Default::default()
    };

    let mut pos = CONTACT_SLOT;
    let contact = child(CONTACT_SLOT)?.text();
    if !contact.is_empty() && !LABELS.contains(&contact.trim()) {
        record.contact_person = contact.trim().to_string();
        pos += 1;
    }

    // `children.len() >= 6` here, so the subtraction cannot underflow.
    let last = children.len() - 1;
    while pos < last {
        let label = children[pos].text();
        if let Some(field) = label_field(&mut record, label.trim()) {
            *field = children[pos + 1].text();
            pos += 1;
        }
        pos += 1;
    }

    let org_index = children.len() - 2;
    let organisation = child(org_index)?
        .as_element()
        .ok_or(ExtractError::NotAnElement(org_index))?;
    record.organisation = element_text(organisation).trim().to_string();
    record.organisation_website = organisation
        .value()
        .attr("href")
        .unwrap_or_default()
        .to_string();

    Ok(record)
}

/// Record field that receives the value following `label`.
fn label_field<'r>(record: &'r mut SachsenRecord, label: &str) -> Option<&'r mut String> {
    match label {
        "Telefon:" => Some(&mut record.telephone),
        "Fax:" => Some(&mut record.fax),
        "EMail:" => Some(&mut record.email),
        "Web:" => Some(&mut record.website),
        _ => None,
    }
}
