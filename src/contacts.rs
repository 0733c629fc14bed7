//! Contact channel extraction from rendered website HTML.
//!
//! Target pages are arbitrary third-party sites, so extraction runs regexes
//! over the serialized markup instead of querying DOM structure. The filter
//! rules below exist to suppress the false positives that approach produces.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

static FACEBOOK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)https://(www\.)?facebook\.com/[^\s"'<>]+"#).unwrap());

static INSTAGRAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)https://(www\.)?instagram\.com/[^\s"'<>]+"#).unwrap());

/// Contact channels found on one website. Each list is duplicate-free,
/// in first-seen document order. Built fresh per extraction call.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ContactBundle {
    pub emails: Vec<String>,
    pub facebook: Vec<String>,
    pub instagram: Vec<String>,
}

/// Dedup by exact string equality, keeping first-seen order.
fn dedup_keep_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|s| seen.insert(s.clone())).collect()
}

/// Extract emails, Facebook links and Instagram links from page markup.
/// Never fails: malformed input just yields empty lists.
pub fn extract_contacts(html: &str) -> ContactBundle {
    // Emails, minus asset-URL fragments the pattern misfires on (e.g. logo@2x.png)
    let emails = dedup_keep_order(
        EMAIL_RE
            .find_iter(html)
            .map(|m| m.as_str().to_string())
            .filter(|e| !e.to_lowercase().ends_with(".png"))
            .collect(),
    );

    let facebook = dedup_keep_order(
        FACEBOOK_RE
            .find_iter(html)
            .map(|m| m.as_str().to_string())
            .filter(|link| !link.contains("/login"))
            .collect(),
    );

    let instagram_links = dedup_keep_order(
        INSTAGRAM_RE
            .find_iter(html)
            .map(|m| m.as_str().to_string())
            .collect(),
    );

    let profiles: Vec<String> = instagram_links
        .iter()
        .filter(|link| !link.contains("/p/") && !link.contains("/reel/"))
        .cloned()
        .collect();

    let instagram = if profiles.is_empty() && !instagram_links.is_empty() {
        // Fallback: a post/reel link still identifies the account
        vec![instagram_links[0].clone()]
    } else {
        profiles
    };

    ContactBundle { emails, facebook, instagram }
}
