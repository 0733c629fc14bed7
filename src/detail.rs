//! Field extraction from a rendered Maps detail page.
//!
//! The detail panel carries no stable semantic markup, so every field is a
//! best-effort positional/pattern heuristic over the rendered document. Each
//! heuristic is independent; a miss yields an empty string, never an error.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static PHONE_SHAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+?\d[\d\s\-().]{7,}").unwrap());

static PHONE_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d+()\-\s]").unwrap());

static RATING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").unwrap());

static REVIEW_COUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\d{1,3}(,\d{3})*\)").unwrap());

/// Fields pulled from one detail page. Empty string means "not found".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailFields {
    pub phone: String,
    pub website: String,
    pub rating: String,
    pub reviews: String,
}

/// Run all detail heuristics over the rendered page HTML.
pub fn extract_detail_fields(html: &str) -> DetailFields {
    let document = Html::parse_document(html);

    DetailFields {
        phone: extract_phone(&document),
        website: extract_website(&document),
        rating: extract_rating(&document),
        reviews: extract_review_count(&document),
    }
}

/// First button/span whose text looks phone-shaped, with everything outside
/// digits/`+()- ` stripped out.
fn extract_phone(document: &Html) -> String {
    let selector = Selector::parse("button, span").unwrap();

    document
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .find(|text| PHONE_SHAPE_RE.is_match(text))
        .map(|text| PHONE_STRIP_RE.replace_all(&text, "").trim().to_string())
        .unwrap_or_default()
}

/// The listing's authoritative external link, when the page marks one.
fn extract_website(document: &Html) -> String {
    let selector = Selector::parse(r#"a[data-item-id="authority"]"#).unwrap();

    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .unwrap_or_default()
        .to_string()
}

/// The rating renders as a bare decimal inside an aria-hidden span.
fn extract_rating(document: &Html) -> String {
    let selector = Selector::parse("span").unwrap();

    document
        .select(&selector)
        .filter(|el| el.value().attr("aria-hidden") == Some("true"))
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|text| RATING_RE.is_match(text))
        .unwrap_or_default()
}

/// The review count renders as a parenthesized number with thousands
/// separators, e.g. `(1,234)`. Returned with the parentheses stripped.
fn extract_review_count(document: &Html) -> String {
    let selector = Selector::parse("span").unwrap();

    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|text| REVIEW_COUNT_RE.is_match(text))
        .map(|text| text.replace(['(', ')'], "").trim().to_string())
        .unwrap_or_default()
}
