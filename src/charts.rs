//! Chart builders: normalized rows in, renderable chart descriptions out.
//!
//! Every builder is a pure function over `&[PreparedQuestion]` returning
//! `Option<Chart>`, where `None` means "this chart has nothing to show" (no
//! creation dates, no tags, no rows). Selection criteria are fixed per chart:
//! top 5 hottest, top 5 longest, top 15 ranking, top 5 authors, top 10 tags,
//! top 60 cloud words. The three ranked bar charts share one parameterized
//! builder. No builder mutates its input.
//!
//! A [`Chart`] is plain serializable data (kind, axis labels, palette,
//! points with hover fields and click-through urls). The chart toolkit that
//! turns it into pixels lives entirely on the rendered page.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::PreparedQuestion;

const TOP_HOT_LIMIT: usize = 5;
const LONGEST_LIMIT: usize = 5;
const RANKING_LIMIT: usize = 15;
const AUTHOR_LIMIT: usize = 5;
const TAG_LIMIT: usize = 10;
const CLOUD_LIMIT: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    HBar,
    VBar,
    Scatter,
    Line,
    Pie,
}

/// Continuous color scale a renderer should map the point values through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    Oranges,
    Blues,
    Purples,
    Viridis,
}

#[derive(Debug, Clone, Serialize)]
pub struct HoverField {
    pub name: &'static str,
    pub value: String,
}

/// One datum: a category label plus coordinates, hover rows, and an
/// optional click-through url.
#[derive(Debug, Clone, Serialize)]
pub struct Point {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub hover: Vec<HoverField>,
    pub url: Option<String>,
}

/// A renderable chart description.
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub palette: Palette,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Word frequencies for the title cloud, heaviest first.
#[derive(Debug, Clone, Serialize)]
pub struct WordCloud {
    pub words: Vec<WordCount>,
}

/// The full chart set for one keyword, the unit the page renders per pane.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordCharts {
    pub label: String,
    pub top_hot: Option<Chart>,
    pub longest: Option<Chart>,
    pub hot_rank: Option<Chart>,
    pub authors: Option<Chart>,
    pub sentiment: Option<Chart>,
    pub titlelen: Option<Chart>,
    pub time_series: Option<Chart>,
    pub tags: Option<Chart>,
    pub wordcloud: Option<WordCloud>,
}

/// Fan one keyword's normalized rows out to every builder.
pub fn build_keyword_charts(rows: &[PreparedQuestion], label: &str) -> KeywordCharts {
    KeywordCharts {
        label: label.to_string(),
        top_hot: top_hot(rows, label),
        longest: longest_titles(rows, label),
        hot_rank: hotness_ranking(rows, label),
        authors: author_activity(rows, label),
        sentiment: sentiment_vs_hotness(rows, label),
        titlelen: title_length_vs_hotness(rows, label),
        time_series: questions_over_time(rows, label),
        tags: top_tags(rows, label),
        wordcloud: word_cloud(rows),
    }
}

/// Shape of one ranked horizontal bar chart: which metric, how many bars,
/// which scale, what to call it.
struct RankSpec<'a> {
    title: String,
    x_label: &'static str,
    hover_name: &'static str,
    top_n: usize,
    palette: Palette,
    metric: &'a dyn Fn(&PreparedQuestion) -> f64,
}

/// Sort descending by the metric, keep the top N, and emit bars bottom-up
/// so the strongest row renders at the top of the chart.
fn ranked_bar(rows: &[PreparedQuestion], spec: RankSpec) -> Option<Chart> {
    if rows.is_empty() {
        return None;
    }
    let mut ranked: Vec<&PreparedQuestion> = rows.iter().collect();
    ranked.sort_by(|a, b| {
        (spec.metric)(b)
            .partial_cmp(&(spec.metric)(a))
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(spec.top_n);
    ranked.reverse();

    let points = ranked
        .into_iter()
        .map(|q| {
            let value = (spec.metric)(q);
            Point {
                label: q.axis_label.clone(),
                x: value,
                y: 0.0,
                hover: vec![
                    HoverField { name: "Title", value: q.short_title.clone() },
                    HoverField { name: spec.hover_name, value: format_metric(value) },
                ],
                url: Some(q.url.clone()),
            }
        })
        .collect();

    Some(Chart {
        kind: ChartKind::HBar,
        title: spec.title,
        x_label: spec.x_label,
        y_label: "Question",
        palette: spec.palette,
        points,
    })
}

fn top_hot(rows: &[PreparedQuestion], label: &str) -> Option<Chart> {
    ranked_bar(
        rows,
        RankSpec {
            title: format!("Top 5 Hottest Questions — {label}"),
            x_label: "Hotness Score",
            hover_name: "Hotness",
            top_n: TOP_HOT_LIMIT,
            palette: Palette::Oranges,
            metric: &|q| q.hotness,
        },
    )
}

fn longest_titles(rows: &[PreparedQuestion], label: &str) -> Option<Chart> {
    ranked_bar(
        rows,
        RankSpec {
            title: format!("Top 5 Longest Titles — {label}"),
            x_label: "Title Length",
            hover_name: "Length",
            top_n: LONGEST_LIMIT,
            palette: Palette::Blues,
            metric: &|q| q.title_len as f64,
        },
    )
}

fn hotness_ranking(rows: &[PreparedQuestion], label: &str) -> Option<Chart> {
    ranked_bar(
        rows,
        RankSpec {
            title: format!("Hotness Ranking (Top 15) — {label}"),
            x_label: "Hotness Score",
            hover_name: "Hotness",
            top_n: RANKING_LIMIT,
            palette: Palette::Viridis,
            metric: &|q| q.hotness,
        },
    )
}

/// Top 5 authors by question count, as a pie.
fn author_activity(rows: &[PreparedQuestion], label: &str) -> Option<Chart> {
    if rows.is_empty() {
        return None;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for q in rows {
        *counts.entry(q.author.as_str()).or_insert(0) += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    // Stable across runs: by count descending, then name.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(AUTHOR_LIMIT);

    let points = ranked
        .into_iter()
        .map(|(author, count)| Point {
            label: author.to_string(),
            x: 0.0,
            y: count as f64,
            hover: vec![
                HoverField { name: "Author", value: author.to_string() },
                HoverField { name: "Questions", value: count.to_string() },
            ],
            url: None,
        })
        .collect();

    Some(Chart {
        kind: ChartKind::Pie,
        title: format!("Top 5 Authors — {label}"),
        x_label: "",
        y_label: "",
        palette: Palette::Purples,
        points,
    })
}

fn scatter(
    rows: &[PreparedQuestion],
    title: String,
    x_label: &'static str,
    palette: Palette,
    x_of: impl Fn(&PreparedQuestion) -> f64,
) -> Option<Chart> {
    if rows.is_empty() {
        return None;
    }
    let points = rows
        .iter()
        .map(|q| Point {
            label: q.axis_label.clone(),
            x: x_of(q),
            y: q.hotness,
            hover: vec![
                HoverField { name: "Title", value: q.short_title.clone() },
                HoverField { name: x_label, value: format_metric(x_of(q)) },
                HoverField { name: "Hotness", value: format_metric(q.hotness) },
            ],
            url: Some(q.url.clone()),
        })
        .collect();

    Some(Chart {
        kind: ChartKind::Scatter,
        title,
        x_label,
        y_label: "Hotness",
        palette,
        points,
    })
}

fn sentiment_vs_hotness(rows: &[PreparedQuestion], label: &str) -> Option<Chart> {
    scatter(
        rows,
        format!("Sentiment vs Hotness — {label}"),
        "Sentiment",
        Palette::Viridis,
        |q| q.sentiment,
    )
}

fn title_length_vs_hotness(rows: &[PreparedQuestion], label: &str) -> Option<Chart> {
    scatter(
        rows,
        format!("Title Length vs Hotness — {label}"),
        "Title Length",
        Palette::Purples,
        |q| q.title_len as f64,
    )
}

/// Questions per creation day. Rows without a parseable creation date are
/// not grouped; the chart disappears entirely when no row has one.
fn questions_over_time(rows: &[PreparedQuestion], label: &str) -> Option<Chart> {
    let mut per_day: BTreeMap<chrono::NaiveDate, usize> = BTreeMap::new();
    for q in rows {
        if let Some(day) = q.creation_day {
            *per_day.entry(day).or_insert(0) += 1;
        }
    }
    if per_day.is_empty() {
        return None;
    }

    let points = per_day
        .into_iter()
        .map(|(day, count)| Point {
            label: day.to_string(),
            x: 0.0,
            y: count as f64,
            hover: vec![
                HoverField { name: "Date", value: day.to_string() },
                HoverField { name: "Questions", value: count.to_string() },
            ],
            url: None,
        })
        .collect();

    Some(Chart {
        kind: ChartKind::Line,
        title: format!("Questions Over Time — {label}"),
        x_label: "Date",
        y_label: "Questions",
        palette: Palette::Blues,
        points,
    })
}

/// Top 10 tags by frequency across the keyword's questions.
fn top_tags(rows: &[PreparedQuestion], label: &str) -> Option<Chart> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for q in rows {
        for tag in q.tag_list() {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    if counts.is_empty() {
        return None;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(TAG_LIMIT);

    let points = ranked
        .into_iter()
        .map(|(tag, count)| Point {
            label: tag.to_string(),
            x: 0.0,
            y: count as f64,
            hover: vec![
                HoverField { name: "Tag", value: tag.to_string() },
                HoverField { name: "Count", value: count.to_string() },
            ],
            url: None,
        })
        .collect();

    Some(Chart {
        kind: ChartKind::VBar,
        title: format!("Top 10 Tags — {label}"),
        x_label: "Tag",
        y_label: "Occurrences",
        palette: Palette::Blues,
        points,
    })
}

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9+#']+").unwrap());

/// Filler words that would otherwise dominate every cloud of question titles.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "best", "between", "but", "by",
    "can", "cannot", "do", "does", "doesn't", "for", "from", "get", "has",
    "have", "how", "if", "in", "into", "is", "it", "my", "not", "of", "on",
    "or", "should", "that", "the", "there", "this", "to", "use", "using",
    "vs", "way", "what", "when", "which", "why", "with", "without", "you",
    "your",
];

/// Word frequencies across all decoded titles, heaviest first, capped at 60.
fn word_cloud(rows: &[PreparedQuestion]) -> Option<WordCloud> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for q in rows {
        for m in WORD.find_iter(&q.title) {
            let word = m.as_str().to_lowercase();
            if STOPWORDS.contains(&word.as_str()) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }
    }
    if counts.is_empty() {
        return None;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(CLOUD_LIMIT);

    Some(WordCloud {
        words: ranked
            .into_iter()
            .map(|(word, count)| WordCount { word, count })
            .collect(),
    })
}

fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
