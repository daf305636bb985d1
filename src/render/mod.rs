//! Index page rendering.
//!
//! Rendering is a pure function of the entries passed in: it never touches
//! the filesystem or the process working directory.

use crate::model::{ResultsSummary, RunKey, RunStatus};
use std::fmt::Write as _;

/// One row of the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: RunKey,
    /// Directory of the run relative to the index root.
    pub dir_name: String,
    pub summary: Option<ResultsSummary>,
}

impl IndexEntry {
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.summary
            .as_ref()
            .map_or(RunStatus::NoData, ResultsSummary::status)
    }
}

/// Page title shown in the browser tab and the heading.
pub const PAGE_TITLE: &str = "Test Automation Reports";

const STYLES: &str = r#"
:root {
  --bg-color: #1e1e1e; --text-color: #cccccc; --title-color: #e8e8e8;
  --container-bg: #252526; --link-color: #4fc1ff; --link-hover-color: #ffffff;
  --border-color: #333333; --font-family: system-ui, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
  --status-passed-color: #4caf50; --status-failed-color: #f44336;
  --status-timeout-color: #ffb667; --status-skipped-color: #99e9e9; --status-nodata-color: #444444;
}
html, body { margin: 0; padding: 0; background-color: var(--bg-color); color: var(--text-color); font-family: var(--font-family); line-height: 1.6; }
.container { max-width: 960px; margin: auto; padding: 1.5em 2.5em; background-color: var(--container-bg); border-radius: 6px; }
h3 { color: var(--title-color); text-align: center; font-weight: 400; }
ul.report-list { list-style: none; padding: 0; border-bottom: 1px solid var(--border-color); }
li { display: flex; justify-content: space-between; align-items: center; padding: 0.6em 1em; margin-bottom: 0.3em; border-radius: 6px; border-left: 5px solid transparent; background-color: rgba(255,255,255,0.03); }
li a { color: var(--link-color); text-decoration: none; font-weight: 500; margin-right: 1.5em; }
li a:hover { color: var(--link-hover-color); }
.results-summary span { display: inline-block; margin-right: 0.5em; }
.icon-passed { color: var(--status-passed-color); }
.icon-failed { color: var(--status-failed-color); }
.icon-timeout { color: var(--status-timeout-color); }
.icon-skipped { color: var(--status-skipped-color); }
li.status-passed { border-left-color: var(--status-passed-color); }
li.status-failed { border-left-color: var(--status-failed-color); }
li.status-timeout { border-left-color: var(--status-timeout-color); }
li.status-nodata { border-left-color: var(--status-nodata-color); opacity: 0.8; }
"#;

/// Render the index page. Entries are emitted in the order given.
#[must_use]
pub fn render_index(entries: &[IndexEntry], report_page: &str) -> String {
    let mut items = String::new();
    for entry in entries {
        render_item(&mut items, entry, report_page);
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{PAGE_TITLE}</title>
  <style>{STYLES}</style>
</head>
<body>
  <div class="container">
    <h3>{PAGE_TITLE}</h3>
    <ul class="report-list">
{items}    </ul>
  </div>
</body>
</html>
"#
    )
}

fn render_item(out: &mut String, entry: &IndexEntry, report_page: &str) {
    let key = escape_html(entry.key.as_str());
    let href = escape_html(&format!("./{}/{report_page}", entry.dir_name));
    let summary = entry.summary.as_ref().map_or_else(
        || r#"<span class="results-summary">Results N/A</span>"#.to_string(),
        |s| {
            // Skipped only shows up when a run actually skipped tests.
            let skipped = if s.skipped > 0 {
                format!(
                    r#"<span class="icon-skipped" title="Skipped">&#x1F6AB; {}</span>"#,
                    s.skipped
                )
            } else {
                String::new()
            };
            format!(
                concat!(
                    r#"<span class="results-summary">"#,
                    r#"<span class="icon-passed" title="Passed">&#x2705; {}</span>"#,
                    r#"<span class="icon-failed" title="Failed">&#x274C; {}</span>"#,
                    r#"<span class="icon-timeout" title="Timed out">&#x23F0; {}</span>"#,
                    "{}</span>"
                ),
                s.passed, s.failed, s.timed_out, skipped
            )
        },
    );

    let _ = writeln!(
        out,
        r#"      <li class="{class}"><a href="{href}" title="Report from {key}">{key}</a>{summary}</li>"#,
        class = entry.status().css_class(),
    );
}

/// Escape text for use in HTML content and double-quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
