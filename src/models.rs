//! Data models for scraped questions and their derived representations.
//!
//! Two shapes flow through the pipeline:
//! - [`QuestionRow`]: a raw record as persisted by the store. Text columns
//!   are nullable because the table enforces nothing at insert time.
//! - [`PreparedQuestion`]: an analysis-ready row produced by the normalizer,
//!   carrying the decoded title and every derived metric the chart builders
//!   read. Never persisted; recomputed on each request.

use chrono::{NaiveDate, NaiveDateTime};

/// A question record as stored in (and read back from) the `questions` table.
///
/// Rows are appended by the fetcher and never updated in place. `title`,
/// `author` and `url` are optional because historical rows may carry NULLs;
/// the normalizer drops such rows rather than guessing at defaults.
#[derive(Debug, Clone)]
pub struct QuestionRow {
    /// The search term this row was scraped under (partition key).
    pub keyword: String,
    /// Local timestamp of the scrape, `YYYY-MM-DD HH:MM:SS`.
    pub scraped_at: String,
    /// Raw question title, HTML-entity encoded as the API returns it.
    pub title: Option<String>,
    /// Display name of the question owner.
    pub author: Option<String>,
    /// Vote score at scrape time.
    pub score: i64,
    /// Link to the question (natural key within a keyword).
    pub url: Option<String>,
    /// Number of answers at scrape time.
    pub answer_count: i64,
    /// Whether the question has an accepted answer.
    pub is_answered: bool,
    /// View count at scrape time.
    pub view_count: i64,
    /// Question creation time, `YYYY-MM-DD HH:MM:SS` UTC, if the API sent one.
    pub creation_date: Option<String>,
    /// Comma-joined tag list.
    pub tags: Option<String>,
}

/// A freshly fetched question, before the store stamps keyword and
/// scrape timestamp onto it.
///
/// All fields are non-optional: the fetcher substitutes defaults
/// (`"No title"`, `"Anonymous"`, zeros) where the API omits a value.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedQuestion {
    pub title: String,
    pub author: String,
    pub score: i64,
    pub url: String,
    pub answer_count: i64,
    pub is_answered: bool,
    pub view_count: i64,
    pub creation_date: Option<String>,
    pub tags: String,
}

/// A normalized question with every derived field the chart builders use.
///
/// Produced by [`crate::prepare::prepare`]; unique by `title` within one
/// keyword's set, guaranteed to have a non-empty `url`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuestion {
    /// Title with HTML entities decoded.
    pub title: String,
    pub author: String,
    pub score: i64,
    pub url: String,
    pub answer_count: i64,
    pub is_answered: bool,
    pub view_count: i64,
    /// Comma-joined tag list as stored; use [`Self::tag_list`] to iterate.
    pub tags: String,
    /// Length of the decoded title, in characters.
    pub title_len: usize,
    /// Decoded title capped at 80 chars (77 + `...`), used in hover text.
    pub short_title: String,
    /// Short title capped again at 50 chars (47 + `...`), used on axes.
    pub axis_label: String,
    /// Lexicon sentiment polarity of the decoded title, in [-1.0, 1.0].
    pub sentiment: f64,
    /// score + 2 * answer_count + view_count / 100.
    pub hotness: f64,
    /// Parsed creation timestamp, when present and well-formed.
    pub creation_date: Option<NaiveDateTime>,
    /// Date-only bucket of `creation_date`, for time-series grouping.
    pub creation_day: Option<NaiveDate>,
}

impl PreparedQuestion {
    /// Iterate the non-empty tags of this question.
    ///
    /// Splits the stored comma-joined list, trimming whitespace and skipping
    /// empty segments (a row scraped with no tags stores `""`).
    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(tags: &str) -> PreparedQuestion {
        PreparedQuestion {
            title: "How do I exit Vim?".to_string(),
            author: "jclancy".to_string(),
            score: 5000,
            url: "https://stackoverflow.com/q/11828270".to_string(),
            answer_count: 50,
            is_answered: true,
            view_count: 3_000_000,
            tags: tags.to_string(),
            title_len: 18,
            short_title: "How do I exit Vim?".to_string(),
            axis_label: "How do I exit Vim?".to_string(),
            sentiment: 0.0,
            hotness: 5000.0 + 100.0 + 30_000.0,
            creation_date: None,
            creation_day: None,
        }
    }

    #[test]
    fn test_tag_list_splits_and_trims() {
        let q = prepared("vim, editor,linux");
        let tags: Vec<&str> = q.tag_list().collect();
        assert_eq!(tags, vec!["vim", "editor", "linux"]);
    }

    #[test]
    fn test_tag_list_empty_string_yields_nothing() {
        let q = prepared("");
        assert_eq!(q.tag_list().count(), 0);
    }

    #[test]
    fn test_tag_list_skips_empty_segments() {
        let q = prepared("vim,,editor,");
        let tags: Vec<&str> = q.tag_list().collect();
        assert_eq!(tags, vec!["vim", "editor"]);
    }

    #[test]
    fn test_question_row_construction() {
        let row = QuestionRow {
            keyword: "rust".to_string(),
            scraped_at: "2025-11-02 10:15:00".to_string(),
            title: Some("Borrow checker question".to_string()),
            author: Some("ferris".to_string()),
            score: 12,
            url: Some("https://stackoverflow.com/q/1".to_string()),
            answer_count: 3,
            is_answered: true,
            view_count: 450,
            creation_date: Some("2025-10-30 08:00:00".to_string()),
            tags: Some("rust,borrow-checker".to_string()),
        };
        assert_eq!(row.keyword, "rust");
        assert!(row.is_answered);
    }
}
