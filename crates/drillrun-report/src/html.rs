//! HTML report generator.
//!
//! Produces a self-contained HTML results page with all CSS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use drillrun_core::model::Outcome;
use drillrun_core::report::ScoreReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate the results page for one completed drill.
pub fn generate_html(report: &ScoreReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>drillrun results: {}</title>\n",
        html_escape(&report.scenario_title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!(
        "<h1>{}</h1>\n",
        html_escape(&report.scenario_title)
    ));
    html.push_str(&format!(
        "<p class=\"meta\">{} drill | {} questions | completed {}</p>\n",
        report.hazard,
        report.total_questions,
        report.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(message) = &report.completion_message {
        html.push_str(&format!(
            "<p class=\"message\">{}</p>\n",
            html_escape(message)
        ));
    }
    html.push_str("</header>\n");

    // Score cards
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Score</h2>\n");
    html.push_str("<div class=\"cards\">\n");
    push_card(&mut html, "Total points", &report.total_points.to_string());
    push_card(&mut html, "Accuracy", &format!("{:.1}%", report.accuracy));
    push_card(&mut html, "Time bonus", &format!("+{}", report.time_bonus));
    push_card(
        &mut html,
        "Time",
        &format!(
            "{}s ({}s / question)",
            report.elapsed_seconds, report.avg_seconds_per_question
        ),
    );
    html.push_str("</div>\n");

    html.push_str(&generate_outcome_bar(&report.outcomes));

    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Correct</th><th>Wrong</th><th>Timed out</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td class=\"correct\">{}</td><td class=\"wrong\">{}</td><td class=\"timeout\">{}</td></tr></tbody>\n",
        report.correct_count, report.wrong_count, report.timeout_count
    ));
    html.push_str("</table>\n");
    html.push_str("</section>\n");

    // Badges
    html.push_str("<section class=\"badges\">\n");
    html.push_str("<h2>Badges</h2>\n");
    if report.badges.is_empty() {
        html.push_str("<p class=\"meta\">No badges earned this time.</p>\n");
    } else {
        html.push_str("<ul>\n");
        for badge in &report.badges {
            html.push_str(&format!("<li>{}</li>\n", html_escape(badge.label())));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</section>\n");

    // Per-question outcomes
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<table class=\"results-table\">\n");
    html.push_str("<thead><tr><th>#</th><th>Question id</th><th>Outcome</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (i, (id, outcome)) in report
        .question_order
        .iter()
        .zip(&report.outcomes)
        .enumerate()
    {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>\n",
            i + 1,
            id,
            outcome_class(*outcome),
            outcome
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ScoreReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn push_card(html: &mut String, label: &str, value: &str) {
    html.push_str(&format!(
        "<div class=\"card\"><span class=\"label\">{}</span><span class=\"value\">{}</span></div>\n",
        html_escape(label),
        html_escape(value)
    ));
}

fn outcome_class(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Correct => "correct",
        Outcome::Wrong => "wrong",
        Outcome::Timeout => "timeout",
        Outcome::Pending => "pending",
    }
}

/// Segmented bar with one cell per question, in presentation order.
fn generate_outcome_bar(outcomes: &[Outcome]) -> String {
    let cell_width = 36;
    let cell_height = 16;
    let gap = 4;

    let total_width = outcomes.len() * (cell_width + gap);
    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        total_width.max(1),
        cell_height
    );

    for (i, outcome) in outcomes.iter().enumerate() {
        let color = match outcome {
            Outcome::Correct => "#22c55e",
            Outcome::Wrong => "#ef4444",
            Outcome::Timeout => "#eab308",
            Outcome::Pending => "#9ca3af",
        };
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"><title>{}</title></rect>\n",
            i * (cell_width + gap),
            cell_width,
            cell_height,
            color,
            outcome
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --correct: #dcfce7; --wrong: #fde2e2; --timeout: #fef9c3; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --correct: #064e3b; --wrong: #7f1d1d; --timeout: #713f12; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.message { font-size: 1.1rem; }
.cards { display: flex; flex-wrap: wrap; gap: 1rem; }
.card { border: 1px solid var(--border); border-radius: 8px; padding: 1rem 1.5rem; display: flex; flex-direction: column; }
.card .label { color: #6b7280; font-size: 0.85rem; }
.card .value { font-size: 1.5rem; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.correct { background: var(--correct); }
.wrong { background: var(--wrong); }
.timeout { background: var(--timeout); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;
