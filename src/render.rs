//! Static HTML rendering and atomic output replacement.
//!
//! Rendering is a pure function of the [`DigestDocument`]: the same document
//! always produces byte-identical output (the embedded timestamp is a field
//! of the document, captured once per run). Every untrusted field (title,
//! summary, URL, source id) is escaped before it touches the markup.
//!
//! The output file is replaced atomically: the page is written to a sibling
//! temp file and renamed over the final path, so a cancelled run or a failed
//! write never leaves a partially-written digest behind.

use itertools::Itertools;
use std::fmt::Write as _;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::{DigestError, Result};
use crate::models::DigestDocument;

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  background: linear-gradient(135deg, #0f0f1a 0%, #1a1a2e 60%, #16213e 100%);
  min-height: 100vh; color: #e8e8e8; line-height: 1.6;
}
.container { max-width: 960px; margin: 0 auto; padding: 40px 24px; }
header { text-align: center; margin-bottom: 40px; padding-bottom: 24px;
  border-bottom: 1px solid rgba(255,255,255,0.08); }
h1 { font-size: 2.4em; font-weight: 300; letter-spacing: 6px; color: #ffffff; }
.subtitle { color: #8892b0; margin-top: 8px; }
.date { color: #64ffda; font-size: 0.9em; margin-top: 12px; }
.degraded { background: rgba(255, 170, 60, 0.12); border: 1px solid rgba(255, 170, 60, 0.4);
  border-radius: 10px; padding: 12px 18px; margin-bottom: 28px; color: #ffc876;
  font-size: 0.9em; }
.cards { display: grid; gap: 18px; }
.card { display: block; background: rgba(255,255,255,0.03);
  border: 1px solid rgba(255,255,255,0.08); border-radius: 14px; padding: 20px 24px;
  text-decoration: none; color: inherit; }
.card:hover { border-color: rgba(100, 255, 218, 0.35); background: rgba(255,255,255,0.05); }
.card-meta { display: flex; gap: 10px; margin-bottom: 10px; }
.badge { font-size: 0.7em; padding: 3px 10px; border-radius: 14px; letter-spacing: 0.5px;
  text-transform: uppercase; }
.badge-source { color: #64ffda; background: rgba(100, 255, 218, 0.1); }
.badge-domain { color: #c3b5ff; background: rgba(123, 104, 238, 0.15); }
.card h2 { font-size: 1.1em; font-weight: 600; color: #ffffff; margin-bottom: 8px; }
.card p { font-size: 0.9em; color: #a8b2d1; }
footer { text-align: center; margin-top: 40px; padding-top: 24px;
  border-top: 1px solid rgba(255,255,255,0.08); color: #5a6a8a; font-size: 0.85em; }
.sources-list { margin-top: 8px; color: #64ffda; }
"#;

fn esc(text: &str) -> String {
    html_escape::encode_text(text).to_string()
}

fn esc_attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).to_string()
}

/// Render a digest document to a standalone HTML page.
pub fn render(doc: &DigestDocument) -> Result<String> {
    let mut html = String::with_capacity(16 * 1024);
    build(&mut html, doc).map_err(|e| DigestError::Render(e.to_string()))?;
    Ok(html)
}

fn build(html: &mut String, doc: &DigestDocument) -> std::fmt::Result {
    let date_line = doc.generated_at.format("%A, %B %d, %Y · %H:%M UTC");

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\">")?;
    writeln!(html, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">")?;
    writeln!(html, "<title>Science Digest - {}</title>", date_line)?;
    writeln!(html, "<style>{}</style>", STYLE)?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, "<div class=\"container\">")?;
    writeln!(html, "<header>")?;
    writeln!(html, "<h1>SCIENCE DIGEST</h1>")?;
    writeln!(html, "<p class=\"subtitle\">Daily science news from free, open-access sources</p>")?;
    writeln!(html, "<p class=\"date\">{}</p>", date_line)?;
    writeln!(html, "</header>")?;

    if doc.is_degraded() {
        writeln!(
            html,
            "<div class=\"degraded\">Some sources did not respond this run: {} of {} contributed. \
             Items below come from the remaining sources.</div>",
            doc.sources_succeeded, doc.sources_attempted
        )?;
    }

    writeln!(html, "<main class=\"cards\">")?;
    for item in &doc.items {
        writeln!(
            html,
            "<a class=\"card\" href=\"{}\" target=\"_blank\" rel=\"noopener\">",
            esc_attr(&item.url)
        )?;
        writeln!(html, "<div class=\"card-meta\">")?;
        writeln!(html, "<span class=\"badge badge-source\">{}</span>", esc(&item.source_id))?;
        if let Some(domain) = item.domain {
            writeln!(html, "<span class=\"badge badge-domain\">{}</span>", domain.label())?;
        }
        writeln!(html, "</div>")?;
        writeln!(html, "<h2>{}</h2>", esc(&item.title))?;
        if let Some(summary) = item.summary.as_deref() {
            writeln!(html, "<p>{}</p>", esc(summary))?;
        }
        writeln!(html, "</a>")?;
    }
    writeln!(html, "</main>")?;

    let contributing: String = doc
        .items
        .iter()
        .map(|i| i.source_id.as_str())
        .unique()
        .map(esc)
        .join(" · ");
    writeln!(html, "<footer>")?;
    writeln!(
        html,
        "<p>{} of {} sources contributed</p>",
        doc.sources_succeeded, doc.sources_attempted
    )?;
    if !contributing.is_empty() {
        writeln!(html, "<p class=\"sources-list\">{}</p>", contributing)?;
    }
    writeln!(html, "</footer>")?;
    writeln!(html, "</div>")?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;

    Ok(())
}

/// Write the page to a sibling temp file, then rename over the final path.
/// The rename either fully applies or leaves the previous output in place.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_atomic(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp);

    fs::write(&tmp_path, html).await?;
    fs::rename(&tmp_path, path).await?;
    info!(bytes = html.len(), "Wrote digest HTML");
    Ok(())
}
