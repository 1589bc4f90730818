//! Dashboard HTML rendering.
//!
//! The page is assembled with plain string building, the same way the
//! pipeline's other text outputs are: a form shell, an optional inline
//! message, and one pane per keyword. Chart descriptions are embedded as
//! JSON and drawn client-side; the word cloud is emitted server-side as
//! weighted markup. User-supplied text is HTML-escaped at every insertion
//! point.

use std::fmt::Write;

use crate::charts::{KeywordCharts, WordCloud};

/// Everything the dashboard page needs for one render.
#[derive(Debug)]
pub struct PageContext<'a> {
    pub keyword: &'a str,
    pub compare_keyword: &'a str,
    pub message: Option<String>,
    pub history: &'a [String],
    pub main: Option<KeywordCharts>,
    pub compare: Option<KeywordCharts>,
}

impl<'a> PageContext<'a> {
    /// An empty form with only the keyword history populated.
    pub fn empty(history: &'a [String]) -> Self {
        Self {
            keyword: "",
            compare_keyword: "",
            message: None,
            history,
            main: None,
            compare: None,
        }
    }
}

const STYLE: &str = "
body { background: #111111; color: #dddddd; font-family: sans-serif; margin: 0 auto; max-width: 1200px; padding: 1rem; }
h1, h2 { color: #ffffff; }
form { background: #1a1a1a; border: 1px solid #444444; border-radius: 8px; padding: 1rem; margin-bottom: 1rem; }
input, select { background: #222222; color: #dddddd; border: 1px solid #444444; border-radius: 4px; padding: 0.4rem; margin-right: 0.5rem; }
button { background: #333333; color: #ffffff; border: 1px solid #555555; border-radius: 4px; padding: 0.4rem 1rem; cursor: pointer; }
.message { background: #332222; border: 1px solid #664444; border-radius: 4px; padding: 0.6rem; margin-bottom: 1rem; }
.panes { display: grid; gap: 1rem; }
.panes.split { grid-template-columns: 1fr 1fr; }
.pane { border: 1px solid #333333; border-radius: 8px; padding: 0.5rem; }
.chart { margin-bottom: 1rem; }
.cloud { line-height: 2.2; padding: 0.5rem; }
.cloud span { margin-right: 0.6rem; color: #88bbee; }
";

const RENDER_JS: &str = r#"
const SCALES = {oranges: 'Oranges', blues: 'Blues', purples: 'Purples', viridis: 'Viridis'};
const CHART_KEYS = ['top_hot', 'longest', 'authors', 'hot_rank', 'sentiment', 'titlelen', 'time_series', 'tags'];

function hoverText(p) {
  return p.hover.map(h => '<b>' + h.name + ':</b> ' + h.value).join('<br>');
}

function baseLayout(spec) {
  return {
    title: {text: spec.title, font: {color: '#ffffff'}},
    paper_bgcolor: '#111111',
    plot_bgcolor: '#111111',
    font: {color: '#dddddd'},
    xaxis: {title: {text: spec.x_label}, gridcolor: '#333333'},
    yaxis: {title: {text: spec.y_label}, gridcolor: '#333333'},
    margin: {l: 160, r: 20, t: 50, b: 50},
  };
}

function traceFor(spec) {
  const pts = spec.points;
  const scale = SCALES[spec.palette];
  const text = pts.map(hoverText);
  switch (spec.kind) {
    case 'h_bar':
      return {type: 'bar', orientation: 'h',
              y: pts.map(p => p.label), x: pts.map(p => p.x),
              marker: {color: pts.map(p => p.x), colorscale: scale},
              hovertext: text, hoverinfo: 'text'};
    case 'v_bar':
      return {type: 'bar',
              x: pts.map(p => p.label), y: pts.map(p => p.y),
              marker: {color: pts.map(p => p.y), colorscale: scale},
              hovertext: text, hoverinfo: 'text'};
    case 'scatter':
      return {type: 'scatter', mode: 'markers',
              x: pts.map(p => p.x), y: pts.map(p => p.y),
              marker: {size: 8, color: pts.map(p => p.y), colorscale: scale},
              hovertext: text, hoverinfo: 'text'};
    case 'line':
      return {type: 'scatter', mode: 'lines+markers',
              x: pts.map(p => p.label), y: pts.map(p => p.y),
              line: {width: 2},
              hovertext: text, hoverinfo: 'text'};
    case 'pie':
      return {type: 'pie',
              labels: pts.map(p => p.label), values: pts.map(p => p.y),
              hovertext: text, hoverinfo: 'text'};
  }
}

function renderPane(pane, container) {
  for (const key of CHART_KEYS) {
    const spec = pane[key];
    if (!spec) continue;
    const div = document.createElement('div');
    div.className = 'chart';
    container.appendChild(div);
    Plotly.newPlot(div, [traceFor(spec)], baseLayout(spec), {displayModeBar: false});
    div.on('plotly_click', ev => {
      const url = spec.points[ev.points[0].pointIndex]?.url;
      if (url) window.open(url, '_blank');
    });
  }
}

document.querySelectorAll('[data-pane]').forEach(el => {
  renderPane(PANES[parseInt(el.dataset.pane, 10)], el);
});
"#;

/// Render the whole dashboard page.
pub fn render_dashboard(ctx: &PageContext) -> String {
    let mut html = String::new();

    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Stack Pulse</title>\n");
    html.push_str("<script src=\"https://cdn.plot.ly/plotly-2.35.2.min.js\"></script>\n");
    write!(html, "<style>{STYLE}</style>\n</head>\n<body>\n").unwrap();
    html.push_str("<h1>Stack Pulse</h1>\n");

    render_form(&mut html, ctx);

    if let Some(msg) = &ctx.message {
        writeln!(html, "<div class=\"message\">{}</div>", escape(msg)).unwrap();
    }

    let mut panes: Vec<&KeywordCharts> = Vec::new();
    if let Some(main) = &ctx.main {
        panes.push(main);
    }
    if let Some(compare) = &ctx.compare {
        panes.push(compare);
    }

    if !panes.is_empty() {
        let split = if panes.len() == 2 { " split" } else { "" };
        writeln!(html, "<div class=\"panes{split}\">").unwrap();
        for (i, pane) in panes.iter().enumerate() {
            writeln!(html, "<section class=\"pane\">").unwrap();
            writeln!(html, "<h2>{}</h2>", escape(&pane.label)).unwrap();
            writeln!(html, "<div data-pane=\"{i}\"></div>").unwrap();
            if let Some(cloud) = &pane.wordcloud {
                render_cloud(&mut html, &pane.label, cloud);
            }
            html.push_str("</section>\n");
        }
        html.push_str("</div>\n");

        let pane_json: Vec<String> = panes.iter().map(|p| json_for_script(p)).collect();
        writeln!(html, "<script>\nconst PANES = [{}];", pane_json.join(", ")).unwrap();
        html.push_str(RENDER_JS);
        html.push_str("</script>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_form(html: &mut String, ctx: &PageContext) {
    html.push_str("<form method=\"post\" action=\"/\">\n");
    writeln!(
        html,
        "<input type=\"text\" name=\"keyword\" placeholder=\"Keyword\" value=\"{}\">",
        escape_attr(ctx.keyword)
    )
    .unwrap();

    html.push_str("<select name=\"keyword_history\">\n<option value=\"\">History...</option>\n");
    for keyword in ctx.history {
        writeln!(
            html,
            "<option value=\"{0}\">{1}</option>",
            escape_attr(keyword),
            escape(keyword)
        )
        .unwrap();
    }
    html.push_str("</select>\n");

    writeln!(
        html,
        "<input type=\"text\" name=\"compare_keyword\" placeholder=\"Compare with...\" value=\"{}\">",
        escape_attr(ctx.compare_keyword)
    )
    .unwrap();

    html.push_str("<button type=\"submit\" name=\"action\" value=\"load\">Load</button>\n");
    html.push_str("<button type=\"submit\" name=\"action\" value=\"reset\">Reset history</button>\n");
    html.push_str("</form>\n");
}

/// Weighted tag cloud: font size scales linearly between 12px and 48px with
/// the word's share of the heaviest count.
fn render_cloud(html: &mut String, label: &str, cloud: &WordCloud) {
    let max = cloud.words.iter().map(|w| w.count).max().unwrap_or(1) as f64;
    writeln!(html, "<h2>Word Cloud — {}</h2>", escape(label)).unwrap();
    html.push_str("<div class=\"cloud\">\n");
    for word in &cloud.words {
        let size = 12.0 + 36.0 * (word.count as f64 / max);
        writeln!(
            html,
            "<span style=\"font-size:{:.0}px\" title=\"{}\">{}</span>",
            size,
            word.count,
            escape(&word.word)
        )
        .unwrap();
    }
    html.push_str("</div>\n");
}

fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

fn escape_attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

/// Serialize for embedding inside a `<script>` block. `</` is escaped so a
/// hostile title cannot close the tag early.
fn json_for_script<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::build_keyword_charts;
    use crate::models::PreparedQuestion;

    fn rows() -> Vec<PreparedQuestion> {
        vec![PreparedQuestion {
            title: "How to parse JSON".to_string(),
            author: "alice".to_string(),
            score: 4,
            url: "https://stackoverflow.com/q/1".to_string(),
            answer_count: 2,
            is_answered: true,
            view_count: 300,
            tags: "json,parsing".to_string(),
            title_len: 17,
            short_title: "How to parse JSON".to_string(),
            axis_label: "How to parse JSON".to_string(),
            sentiment: 0.1,
            hotness: 11.0,
            creation_date: None,
            creation_day: None,
        }]
    }

    #[test]
    fn test_empty_page_has_form_but_no_panes() {
        let history = vec!["rust".to_string()];
        let html = render_dashboard(&PageContext::empty(&history));
        assert!(html.contains("name=\"keyword\""));
        assert!(html.contains("<option value=\"rust\">rust</option>"));
        assert!(!html.contains("data-pane"));
        assert!(!html.contains("const PANES"));
    }

    #[test]
    fn test_message_is_escaped() {
        let html = render_dashboard(&PageContext {
            keyword: "",
            compare_keyword: "",
            message: Some("No data for '<script>'".to_string()),
            history: &[],
            main: None,
            compare: None,
        });
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<div class=\"message\">No data for '<script>'"));
    }

    #[test]
    fn test_single_pane_embeds_chart_specs() {
        let charts = build_keyword_charts(&rows(), "json");
        let html = render_dashboard(&PageContext {
            keyword: "json",
            compare_keyword: "",
            message: None,
            history: &[],
            main: Some(charts),
            compare: None,
        });
        assert!(html.contains("const PANES"));
        assert!(html.contains("data-pane=\"0\""));
        assert!(!html.contains("panes split"));
        assert!(html.contains("Top 5 Hottest Questions"));
        assert!(html.contains("class=\"cloud\""));
    }

    #[test]
    fn test_two_panes_render_side_by_side() {
        let main = build_keyword_charts(&rows(), "json");
        let compare = build_keyword_charts(&rows(), "xml");
        let html = render_dashboard(&PageContext {
            keyword: "json",
            compare_keyword: "xml",
            message: None,
            history: &[],
            main: Some(main),
            compare: Some(compare),
        });
        assert!(html.contains("panes split"));
        assert!(html.contains("data-pane=\"1\""));
    }

    #[test]
    fn test_script_closing_tag_is_neutralized() {
        let mut questions = rows();
        questions[0].short_title = "bad </script> title".to_string();
        questions[0].axis_label = questions[0].short_title.clone();
        let charts = build_keyword_charts(&questions, "json");
        let html = render_dashboard(&PageContext {
            keyword: "json",
            compare_keyword: "",
            message: None,
            history: &[],
            main: Some(charts),
            compare: None,
        });
        assert!(!html.contains("bad </script> title"));
        assert!(html.contains("bad <\\/script> title"));
    }
}
