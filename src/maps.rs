//! Request-level scraping flows: Maps listing discovery and website contact
//! extraction. Each flow owns one browser session for its whole lifetime and
//! drives pages strictly sequentially.

use anyhow::Result;
use headless_chrome::Tab;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use utoipa::ToSchema;

use crate::browser::{self, BrowserSession};
use crate::contacts::{extract_contacts, ContactBundle};
use crate::detail::extract_detail_fields;
use crate::discovery::{discover_listings, ListingStub, ResultFeed, ScrollTuning};

const FEED_SELECTOR: &str = r#"div[role="feed"]"#;
const ANCHOR_SELECTOR: &str = "a.hfpxzc";

/// One scraped business: a listing stub composed with its detail fields.
/// Empty string marks a field the heuristics could not find.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BusinessRecord {
    pub name: String,
    pub maps_link: String,
    pub phone: String,
    pub website: String,
    pub rating: String,
    pub reviews: String,
}

/// The Maps result panel, queried live through the search tab.
struct MapsFeed {
    tab: Arc<Tab>,
}

impl ResultFeed for MapsFeed {
    fn container_present(&self) -> bool {
        self.tab.find_element(FEED_SELECTOR).is_ok()
    }

    fn scroll_feed(&self) -> Result<()> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector('{}');
                if (el) el.scrollBy(0, el.scrollHeight);
            }})();"#,
            FEED_SELECTOR
        );
        self.tab.evaluate(&script, false)?;
        Ok(())
    }

    fn anchor_count(&self) -> Result<usize> {
        let count = self
            .tab
            .evaluate(
                &format!("document.querySelectorAll('{}').length", ANCHOR_SELECTOR),
                false,
            )?
            .value
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        Ok(count as usize)
    }

    fn read_stubs(&self) -> Result<Vec<ListingStub>> {
        let script = format!(
            r#"JSON.stringify(
                [...document.querySelectorAll('{}')].map(a => ({{
                    name: a.getAttribute('aria-label') || '',
                    link: a.href
                }}))
            )"#,
            ANCHOR_SELECTOR
        );
        let raw = self
            .tab
            .evaluate(&script, false)?
            .value
            .and_then(|v| v.as_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "[]".to_string());
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Discover up to `target` businesses for a Maps search query and extract the
/// detail fields of each. A failure on one listing drops that listing only.
pub async fn scrape_maps(query: &str, target: usize) -> Result<Vec<BusinessRecord>> {
    let session = BrowserSession::launch()?;

    println!("🌐 Navigating to Google Maps for: {}", query);
    let tab = session.open_tab(Duration::from_secs(90))?;
    let search_url = format!(
        "https://www.google.com/maps/search/{}",
        urlencoding::encode(query)
    );
    browser::navigate(&tab, &search_url)?;

    println!("📜 Scrolling left panel to load businesses...");
    let feed = MapsFeed { tab: tab.clone() };
    let stubs = discover_listings(&feed, target, &ScrollTuning::default()).await?;

    let mut results = Vec::new();
    for stub in stubs {
        println!("🔍 Processing: {}", stub.name);
        match process_listing(&session, &stub).await {
            Ok(record) => results.push(record),
            Err(e) => tracing::warn!("Error processing {}: {}", stub.name, e),
        }
    }

    println!("✅ Done scraping {} businesses", results.len());
    Ok(results)
}

async fn process_listing(session: &BrowserSession, stub: &ListingStub) -> Result<BusinessRecord> {
    let tab = session.open_tab_blocking_media(Duration::from_secs(60))?;
    // Close the tab whether the visit succeeded or not; failed listings must
    // not accumulate open tabs for the rest of the batch.
    let result = visit_detail(&tab, stub).await;
    let _ = tab.close(true);
    result
}

async fn visit_detail(tab: &Arc<Tab>, stub: &ListingStub) -> Result<BusinessRecord> {
    browser::navigate(tab, &stub.link)?;

    // Let the detail panel hydrate before snapshotting
    sleep(Duration::from_secs(3)).await;

    let html = tab.get_content()?;
    let fields = extract_detail_fields(&html);

    Ok(BusinessRecord {
        name: stub.name.clone(),
        maps_link: stub.link.clone(),
        phone: fields.phone,
        website: fields.website,
        rating: fields.rating,
        reviews: fields.reviews,
    })
}

/// Render a website and pull contact channels out of its markup. Launch
/// failures propagate to the caller; render failures degrade to an all-empty
/// bundle. The session is torn down on every path when it drops.
pub async fn extract_contact_info(url: &str) -> Result<ContactBundle> {
    let session = BrowserSession::launch()?;

    match visit_and_extract(&session, url).await {
        Ok(bundle) => Ok(bundle),
        Err(e) => {
            tracing::warn!("Failed to extract website info: {}", e);
            Ok(ContactBundle::default())
        }
    }
}

async fn visit_and_extract(session: &BrowserSession, url: &str) -> Result<ContactBundle> {
    println!("🌐 Visiting website: {}", url);
    let tab = session.open_tab_blocking_media(Duration::from_secs(60))?;
    browser::navigate(&tab, url)?;

    // JS-rendered sites put contact links in late; give hydration a beat
    sleep(Duration::from_secs(5)).await;

    let html = tab.get_content()?;
    let bundle = extract_contacts(&html);

    println!("📧 Emails found: {}", bundle.emails.len());
    println!("📘 Facebook links found: {}", bundle.facebook.len());
    println!("📸 Instagram links found: {}", bundle.instagram.len());

    Ok(bundle)
}
