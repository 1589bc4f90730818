//! Stack Exchange search API fetcher.
//!
//! One synchronous-feeling call per keyword: build the search URL, GET it,
//! map the JSON `items` array into [`ScrapedQuestion`] rows. No pagination
//! past the first page, no retry, no rate-limit handling: a network or
//! decode failure propagates to the caller.
//!
//! The response-to-row mapping is kept separate from the HTTP call so it can
//! be exercised on canned JSON without a network.

use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::PulseError;
use crate::models::ScrapedQuestion;

const SEARCH_ENDPOINT: &str = "https://api.stackexchange.com/2.3/search";
const SITE: &str = "stackoverflow";
const PAGE_SIZE: &str = "100";

/// Wire shape of the search response. Fields we do not read are ignored.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: Option<String>,
    owner: Option<Owner>,
    score: Option<i64>,
    link: Option<String>,
    answer_count: Option<i64>,
    is_answered: Option<bool>,
    view_count: Option<i64>,
    /// Epoch seconds.
    creation_date: Option<i64>,
    tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Owner {
    display_name: Option<String>,
}

/// Build the search URL for a keyword: highest-voted questions whose title
/// contains the keyword, first 100 results.
fn search_url(keyword: &str) -> Result<Url, PulseError> {
    let url = Url::parse_with_params(
        SEARCH_ENDPOINT,
        &[
            ("order", "desc"),
            ("sort", "votes"),
            ("intitle", keyword),
            ("site", SITE),
            ("pagesize", PAGE_SIZE),
        ],
    )?;
    Ok(url)
}

/// Fetch the top questions for a keyword and map them into scraped rows.
#[instrument(level = "info", skip_all, fields(%keyword))]
pub async fn fetch_questions(
    client: &Client,
    keyword: &str,
) -> Result<Vec<ScrapedQuestion>, PulseError> {
    let url = search_url(keyword)?;
    debug!(%url, "Requesting search results");

    let response: SearchResponse = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let rows = map_items(response.items);
    info!(keyword, count = rows.len(), "Fetched questions");
    Ok(rows)
}

fn map_items(items: Vec<SearchItem>) -> Vec<ScrapedQuestion> {
    items.into_iter().map(map_item).collect()
}

fn map_item(item: SearchItem) -> ScrapedQuestion {
    ScrapedQuestion {
        title: item.title.unwrap_or_else(|| "No title".to_string()),
        author: item
            .owner
            .and_then(|o| o.display_name)
            .unwrap_or_else(|| "Anonymous".to_string()),
        score: item.score.unwrap_or(0),
        url: item.link.unwrap_or_default(),
        answer_count: item.answer_count.unwrap_or(0),
        is_answered: item.is_answered.unwrap_or(false),
        view_count: item.view_count.unwrap_or(0),
        creation_date: item.creation_date.and_then(epoch_to_timestamp),
        tags: item.tags.unwrap_or_default().join(","),
    }
}

/// Epoch seconds to `YYYY-MM-DD HH:MM:SS` UTC; out-of-range values become None.
fn epoch_to_timestamp(epoch: i64) -> Option<String> {
    DateTime::from_timestamp(epoch, 0)
        .map(|dt| dt.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_keyword() {
        let url = search_url("borrow checker").unwrap();
        let s = url.as_str();
        assert!(s.starts_with("https://api.stackexchange.com/2.3/search?"));
        assert!(s.contains("intitle=borrow+checker") || s.contains("intitle=borrow%20checker"));
        assert!(s.contains("site=stackoverflow"));
        assert!(s.contains("pagesize=100"));
        assert!(s.contains("sort=votes"));
    }

    #[test]
    fn test_map_full_item() {
        let body = r#"{
            "items": [{
                "title": "Why is processing a sorted array faster?",
                "owner": {"display_name": "GManNickG"},
                "score": 27000,
                "link": "https://stackoverflow.com/q/11227809",
                "answer_count": 25,
                "is_answered": true,
                "view_count": 1900000,
                "creation_date": 1000000000,
                "tags": ["java", "c++", "performance"]
            }]
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let rows = map_items(response.items);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.title, "Why is processing a sorted array faster?");
        assert_eq!(row.author, "GManNickG");
        assert_eq!(row.score, 27000);
        assert_eq!(row.url, "https://stackoverflow.com/q/11227809");
        assert_eq!(row.answer_count, 25);
        assert!(row.is_answered);
        assert_eq!(row.view_count, 1900000);
        assert_eq!(row.creation_date.as_deref(), Some("2001-09-09 01:46:40"));
        assert_eq!(row.tags, "java,c++,performance");
    }

    #[test]
    fn test_map_item_applies_defaults() {
        let body = r#"{"items": [{}]}"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let rows = map_items(response.items);

        let row = &rows[0];
        assert_eq!(row.title, "No title");
        assert_eq!(row.author, "Anonymous");
        assert_eq!(row.score, 0);
        assert_eq!(row.url, "");
        assert_eq!(row.answer_count, 0);
        assert!(!row.is_answered);
        assert_eq!(row.view_count, 0);
        assert_eq!(row.creation_date, None);
        assert_eq!(row.tags, "");
    }

    #[test]
    fn test_map_item_anonymous_owner_without_display_name() {
        let body = r#"{"items": [{"title": "t", "owner": {}}]}"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let rows = map_items(response.items);
        assert_eq!(rows[0].author, "Anonymous");
    }

    #[test]
    fn test_missing_items_array_is_empty() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(map_items(response.items).is_empty());
    }
}
