//! HTTP presentation shell for the dashboard.
//!
//! One route, two verbs: GET renders the empty form, POST runs an action.
//! `load` orchestrates the whole pipeline for the requested keyword
//! (fetch-if-empty, normalize, chart fan-out) and optionally a comparison
//! keyword; `reset` wipes the store. Failures on the comparison keyword
//! degrade to an inline message while the main pane still renders; failures
//! on the main keyword surface as a 500 with a plain error page.

use std::sync::Arc;

use axum::Form;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

use crate::charts::{KeywordCharts, build_keyword_charts};
use crate::error::PulseError;
use crate::fetch;
use crate::page::{PageContext, render_dashboard};
use crate::prepare::prepare;
use crate::store::{HISTORY_LIMIT, QuestionStore};

/// Shared state: the store handle and one reused HTTP client.
pub struct AppState {
    pub store: QuestionStore,
    pub client: reqwest::Client,
}

/// Build the axum router for the dashboard.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard_form).post(dashboard_submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Form fields posted by the dashboard. Everything is optional on the wire;
/// missing fields default to empty strings.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardForm {
    #[serde(default)]
    pub keyword: String,
    /// Fallback keyword source: the history selector.
    #[serde(default)]
    pub keyword_history: String,
    #[serde(default)]
    pub compare_keyword: String,
    /// `load` or `reset`; anything else is treated as `load`.
    #[serde(default)]
    pub action: String,
}

type PageResult = Result<Html<String>, (StatusCode, Html<String>)>;

async fn dashboard_form(State(state): State<Arc<AppState>>) -> PageResult {
    let history = state
        .store
        .recent_keywords(HISTORY_LIMIT)
        .map_err(internal_error)?;
    Ok(Html(render_dashboard(&PageContext::empty(&history))))
}

async fn dashboard_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DashboardForm>,
) -> PageResult {
    match form.action.as_str() {
        "reset" => reset(&state).await,
        _ => load(&state, &form).await,
    }
}

/// The `reset` action: drop all history, render the empty state.
async fn reset(state: &AppState) -> PageResult {
    state.store.reset().map_err(internal_error)?;
    info!("Store reset via dashboard");
    let mut ctx = PageContext::empty(&[]);
    ctx.message = Some("History cleared.".to_string());
    Ok(Html(render_dashboard(&ctx)))
}

/// The `load` action: validate, run the pipeline for the main keyword and
/// optionally the comparison keyword, render both panes.
async fn load(state: &AppState, form: &DashboardForm) -> PageResult {
    let compare_input = form.compare_keyword.trim();

    let Some(keyword) = pick_keyword(&form.keyword, &form.keyword_history) else {
        let history = state
            .store
            .recent_keywords(HISTORY_LIMIT)
            .map_err(internal_error)?;
        let mut ctx = PageContext::empty(&history);
        ctx.message = Some("Please enter or select a keyword.".to_string());
        return Ok(Html(render_dashboard(&ctx)));
    };

    let mut message = None;
    let mut compare_shown = "";
    let mut compare_charts = None;

    // Main keyword failures propagate; there is nothing useful to render.
    let main = load_keyword(state, keyword).await.map_err(internal_error)?;
    if main.is_none() {
        message = Some(format!("No data for '{keyword}'."));
    } else if !compare_input.is_empty() {
        if compare_input == keyword {
            message = Some("Compare keyword matches the main keyword.".to_string());
        } else {
            // Compare-side failures degrade to a message; the main pane
            // still renders.
            match load_keyword(state, compare_input).await {
                Ok(Some(charts)) => {
                    compare_shown = compare_input;
                    compare_charts = Some(charts);
                }
                Ok(None) => {
                    message = Some(format!("No data for compare keyword '{compare_input}'."));
                }
                Err(e) => {
                    warn!(keyword = compare_input, error = %e, "Compare keyword failed");
                    message = Some(format!("Could not load compare keyword '{compare_input}'."));
                }
            }
        }
    }

    let history = state
        .store
        .recent_keywords(HISTORY_LIMIT)
        .map_err(internal_error)?;
    Ok(Html(render_dashboard(&PageContext {
        keyword,
        compare_keyword: compare_shown,
        message,
        history: &history,
        main,
        compare: compare_charts,
    })))
}

/// Run the pipeline for one keyword: stored rows, else one fetch + append,
/// then normalize and build charts. `None` means "nothing to show".
#[instrument(level = "info", skip(state))]
async fn load_keyword(
    state: &AppState,
    keyword: &str,
) -> Result<Option<KeywordCharts>, PulseError> {
    let mut rows = state.store.query(keyword)?;
    if rows.is_empty() {
        let scraped = fetch::fetch_questions(&state.client, keyword).await?;
        if !scraped.is_empty() {
            state.store.append(keyword, &scraped)?;
            rows = state.store.query(keyword)?;
        }
    }
    if rows.is_empty() {
        return Ok(None);
    }

    let prepared = prepare(rows);
    if prepared.is_empty() {
        return Ok(None);
    }
    Ok(Some(build_keyword_charts(&prepared, keyword)))
}

/// Main keyword as typed, else the history selection; None when both blank.
fn pick_keyword<'a>(typed: &'a str, from_history: &'a str) -> Option<&'a str> {
    let typed = typed.trim();
    if !typed.is_empty() {
        return Some(typed);
    }
    let from_history = from_history.trim();
    if !from_history.is_empty() {
        return Some(from_history);
    }
    None
}

fn internal_error(err: PulseError) -> (StatusCode, Html<String>) {
    error!(error = %err, "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!("Request failed: {err}")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScrapedQuestion;

    fn scraped(title: &str, url: &str) -> ScrapedQuestion {
        ScrapedQuestion {
            title: title.to_string(),
            author: "someone".to_string(),
            score: 3,
            url: url.to_string(),
            answer_count: 1,
            is_answered: true,
            view_count: 200,
            creation_date: Some("2025-10-01 12:00:00".to_string()),
            tags: "rust".to_string(),
        }
    }

    fn state_with_store(dir: &tempfile::TempDir) -> Arc<AppState> {
        Arc::new(AppState {
            store: QuestionStore::new(dir.path().join("questions.db")),
            client: reqwest::Client::new(),
        })
    }

    fn form(keyword: &str, history: &str, compare: &str, action: &str) -> DashboardForm {
        DashboardForm {
            keyword: keyword.to_string(),
            keyword_history: history.to_string(),
            compare_keyword: compare.to_string(),
            action: action.to_string(),
        }
    }

    #[test]
    fn test_pick_keyword_prefers_typed_over_history() {
        assert_eq!(pick_keyword("rust", "python"), Some("rust"));
        assert_eq!(pick_keyword("  rust  ", ""), Some("rust"));
        assert_eq!(pick_keyword("", "python"), Some("python"));
        assert_eq!(pick_keyword("   ", "  "), None);
    }

    #[tokio::test]
    async fn test_empty_keyword_is_rejected_inline() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(&dir);

        let Html(body) = load(&state, &form("", "", "", "load")).await.unwrap();
        assert!(body.contains("Please enter or select a keyword."));
        assert!(!body.contains("data-pane"));
    }

    #[tokio::test]
    async fn test_compare_equal_to_main_is_rejected_without_compare_pane() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(&dir);
        // Preloaded rows mean load() never touches the network.
        state
            .store
            .append("rust", &[scraped("A", "u1"), scraped("B", "u2")])
            .unwrap();

        let Html(body) = load(&state, &form("rust", "", "rust", "load"))
            .await
            .unwrap();
        assert!(body.contains("Compare keyword matches the main keyword."));
        assert!(body.contains("data-pane=\"0\""));
        assert!(!body.contains("data-pane=\"1\""));
    }

    #[tokio::test]
    async fn test_rows_that_normalize_to_nothing_render_no_data_message() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(&dir);
        // Stored rows exist (so no fetch happens) but every one is invalid.
        state.store.append("rust", &[scraped("A", "")]).unwrap();

        let Html(body) = load(&state, &form("rust", "", "", "load")).await.unwrap();
        assert!(body.contains("No data for 'rust'."));
        assert!(!body.contains("data-pane"));
    }

    #[tokio::test]
    async fn test_keyword_falls_back_to_history_selection() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(&dir);
        state.store.append("rust", &[scraped("A", "u1")]).unwrap();

        let Html(body) = load(&state, &form("", "rust", "", "load")).await.unwrap();
        assert!(body.contains("data-pane=\"0\""));
        assert!(body.contains("Top 5 Hottest Questions"));
    }

    #[tokio::test]
    async fn test_compare_pane_renders_alongside_main() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(&dir);
        state.store.append("rust", &[scraped("A", "u1")]).unwrap();
        state.store.append("python", &[scraped("B", "u2")]).unwrap();

        let Html(body) = load(&state, &form("rust", "", "python", "load"))
            .await
            .unwrap();
        assert!(body.contains("data-pane=\"0\""));
        assert!(body.contains("data-pane=\"1\""));
        assert!(body.contains("panes split"));
    }

    #[tokio::test]
    async fn test_reset_action_clears_store() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_store(&dir);
        state.store.append("rust", &[scraped("A", "u1")]).unwrap();

        let Html(body) = reset(&state).await.unwrap();
        assert!(body.contains("History cleared."));
        assert!(!state.store.path().exists());
        assert!(state.store.recent_keywords(HISTORY_LIMIT).unwrap().is_empty());
    }
}
