//! HTTP endpoints for the scraper.

use axum::{extract::Query, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::{IntoParams, ToSchema};

use crate::auth::ApiKey;
use crate::maps::{self, BusinessRecord};

const DEFAULT_COUNT: usize = 5;

type ApiError = (StatusCode, Json<Value>);

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error(message: &str) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": message })))
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GmapParams {
    /// Free-text Maps search, e.g. "hotels in los angeles"
    pub query: Option<String>,
    /// How many businesses to return (default 5)
    pub count: Option<String>,
}

/// Resolve the raw `count` param leniently: anything that is not a positive
/// integer (absent, non-numeric, zero) falls back to the default instead of
/// failing the request.
fn resolve_count(raw: Option<&str>) -> usize {
    raw.and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|&c| c > 0)
        .unwrap_or(DEFAULT_COUNT)
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WebsiteParams {
    /// Website to visit, e.g. https://example.com
    pub url: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ContactResponse {
    pub success: bool,
    pub url: String,
    pub emails: Vec<String>,
    pub facebook: Vec<String>,
    pub instagram: Vec<String>,
}

/// Scrape Google Maps businesses for a search query.
#[utoipa::path(
    get,
    path = "/gmap",
    params(GmapParams),
    responses(
        (status = 200, description = "Scraped business records", body = [BusinessRecord]),
        (status = 400, description = "Missing query parameter"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Scraping failed"),
    ),
    tag = "scraper"
)]
pub async fn gmap(
    _key: ApiKey,
    Query(params): Query<GmapParams>,
) -> Result<Json<Vec<BusinessRecord>>, ApiError> {
    let query = params
        .query
        .filter(|q| !q.is_empty())
        .ok_or_else(|| bad_request("Missing query parameter ?query=hotels+in+los+angeles"))?;
    let count = resolve_count(params.count.as_deref());

    match maps::scrape_maps(&query, count).await {
        Ok(results) => Ok(Json(results)),
        Err(e) => {
            tracing::error!("API error on /gmap: {}", e);
            Err(internal_error("Something went wrong during scraping."))
        }
    }
}

/// Extract emails and social links from a website.
#[utoipa::path(
    get,
    path = "/website",
    params(WebsiteParams),
    responses(
        (status = 200, description = "Extracted contact channels", body = ContactResponse),
        (status = 400, description = "Missing url parameter"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Extraction failed"),
    ),
    tag = "scraper"
)]
pub async fn website(
    _key: ApiKey,
    Query(params): Query<WebsiteParams>,
) -> Result<Json<ContactResponse>, ApiError> {
    let url = params
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| bad_request("Missing query parameter ?url=https://example.com"))?;

    match maps::extract_contact_info(&url).await {
        Ok(bundle) => Ok(Json(ContactResponse {
            success: true,
            url,
            emails: bundle.emails,
            facebook: bundle.facebook,
            instagram: bundle.instagram,
        })),
        Err(e) => {
            tracing::error!("API error on /website: {}", e);
            Err(internal_error("Something went wrong during website scraping."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    #[test]
    fn test_count_defaults_when_missing() {
        assert_eq!(resolve_count(None), 5);
    }

    #[test]
    fn test_count_zero_falls_back_to_default() {
        assert_eq!(resolve_count(Some("0")), 5);
    }

    #[test]
    fn test_count_non_numeric_falls_back_to_default() {
        assert_eq!(resolve_count(Some("abc")), 5);
        assert_eq!(resolve_count(Some("-3")), 5);
        assert_eq!(resolve_count(Some("")), 5);
    }

    #[test]
    fn test_count_positive_integer_used_as_given() {
        assert_eq!(resolve_count(Some("12")), 12);
    }

    #[test]
    fn test_non_numeric_count_still_deserializes() {
        // A junk count must reach the handler (and fall back there), not
        // fail extraction with a framework-level rejection.
        let uri: Uri = "/gmap?query=hotels&count=abc".parse().unwrap();
        let Query(params) = Query::<GmapParams>::try_from_uri(&uri).unwrap();
        assert_eq!(params.query.as_deref(), Some("hotels"));
        assert_eq!(resolve_count(params.count.as_deref()), 5);
    }
}
