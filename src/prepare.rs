//! The data-preparation pipeline: raw stored rows in, analysis-ready rows out.
//!
//! For each row, in order: decode HTML entities in the title, compute the
//! title length and the two display truncations, score the title with a
//! lexicon sentiment analyzer, parse the creation timestamp into a day
//! bucket, compute hotness, drop rows missing title/author/url, and finally
//! deduplicate by title keeping the first occurrence.
//!
//! The whole pass is deterministic and does no I/O; it runs fresh on every
//! request and its output is never cached.

use chrono::NaiveDateTime;
use itertools::Itertools;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::models::{PreparedQuestion, QuestionRow};

/// Timestamp layout used for `creation_date` in the store.
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Hover-text truncation: titles longer than 80 chars keep 77 plus `...`.
const SHORT_TITLE_MAX: usize = 80;
const SHORT_TITLE_KEEP: usize = 77;

/// Axis-label truncation: short titles longer than 50 chars keep 47 plus `...`.
const AXIS_LABEL_MAX: usize = 50;
const AXIS_LABEL_KEEP: usize = 47;

/// Composite popularity score: score + 2 x answers + views / 100.
pub fn hotness(score: i64, answer_count: i64, view_count: i64) -> f64 {
    score as f64 + 2.0 * answer_count as f64 + view_count as f64 / 100.0
}

/// Normalize one keyword's stored rows into chart-ready rows.
///
/// Output length is never greater than input length: rows are only dropped
/// (missing title/author/url, empty url) or merged (duplicate titles, first
/// occurrence wins), never added.
pub fn prepare(rows: Vec<QuestionRow>) -> Vec<PreparedQuestion> {
    let analyzer = SentimentIntensityAnalyzer::new();
    rows.into_iter()
        .filter_map(|row| prepare_row(&analyzer, row))
        .unique_by(|q| q.title.clone())
        .collect()
}

fn prepare_row(analyzer: &SentimentIntensityAnalyzer, row: QuestionRow) -> Option<PreparedQuestion> {
    let (Some(title), Some(author), Some(url)) = (row.title, row.author, row.url) else {
        return None;
    };
    if url.is_empty() {
        return None;
    }

    let title = html_escape::decode_html_entities(&title).into_owned();
    let title_len = title.chars().count();
    let short_title = clip(&title, SHORT_TITLE_MAX, SHORT_TITLE_KEEP);
    let axis_label = clip(&short_title, AXIS_LABEL_MAX, AXIS_LABEL_KEEP);
    let sentiment = title_polarity(analyzer, &title);

    // Unparseable timestamps drop out of time-series grouping only; the row
    // itself stays.
    let creation_date = row
        .creation_date
        .as_deref()
        .and_then(|s| NaiveDateTime::parse_from_str(s, DATE_FORMAT).ok());
    let creation_day = creation_date.map(|dt| dt.date());

    Some(PreparedQuestion {
        title_len,
        short_title,
        axis_label,
        sentiment,
        hotness: hotness(row.score, row.answer_count, row.view_count),
        creation_date,
        creation_day,
        title,
        author,
        score: row.score,
        url,
        answer_count: row.answer_count,
        is_answered: row.is_answered,
        view_count: row.view_count,
        tags: row.tags.unwrap_or_default(),
    })
}

/// Keep `s` whole up to `max` chars, otherwise the first `keep` chars + `...`.
fn clip(s: &str, max: usize, keep: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(keep).collect();
        out.push_str("...");
        out
    }
}

/// Compound lexicon polarity of a title, clamped to [-1, 1] by the analyzer.
/// Empty and whitespace-only titles score 0.0.
fn title_polarity(analyzer: &SentimentIntensityAnalyzer, text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }
    analyzer
        .polarity_scores(text)
        .get("compound")
        .copied()
        .unwrap_or(0.0)
}
