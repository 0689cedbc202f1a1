//! Text cleanup applied at the normalization boundary.
//!
//! Feed titles and summaries arrive with HTML fragments, entities, smart
//! quotes, and the occasional mojibake from double-encoded UTF-8. Everything
//! that reaches the Deduplicator has been through [`normalize_text`] so the
//! matching stages compare like with like.

use once_cell::sync::Lazy;
use regex::Regex;

/// Display cap for summaries; the digest links out, it never stores article
/// bodies.
pub const MAX_SUMMARY_CHARS: usize = 400;

/// Domains with hard or intermittent paywalls. Items resolving to these are
/// dropped at normalization; the digest only carries open-access sources.
const PAYWALLED_DOMAINS: &[&str] = &[
    "nature.com",
    "science.org",
    "sciencemag.org",
    "nytimes.com",
    "washingtonpost.com",
    "wsj.com",
    "nationalgeographic.com",
    "newscientist.com",
    "scientificamerican.com",
    "theatlantic.com",
    "wired.com",
];

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a raw text fragment: decode HTML entities, strip tags, map
/// smart punctuation to ASCII, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    out = RE_TAGS.replace_all(&out, "").to_string();

    // Mojibake first: UTF-8 bytes misread as Windows-1252 arrive as â€œ-style
    // runs and must be repaired before the plain smart-quote mapping.
    for (bad, good) in [
        ("\u{e2}\u{80}\u{99}", "'"),
        ("\u{e2}\u{80}\u{98}", "'"),
        ("\u{e2}\u{80}\u{9c}", "\""),
        ("\u{e2}\u{80}\u{9d}", "\""),
        ("\u{e2}\u{80}\u{93}", "-"),
        ("\u{e2}\u{80}\u{94}", "-"),
        ("\u{e2}\u{80}\u{a6}", "..."),
        ("\u{c2}\u{a0}", " "),
    ] {
        out = out.replace(bad, good);
    }

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}', '\u{201E}'], "\"")
        .replace(['\u{2018}', '\u{2019}', '\u{201A}', '\u{2032}'], "'")
        .replace(['\u{2013}', '\u{2014}', '\u{2015}', '\u{2012}'], "-")
        .replace('\u{2026}', "...")
        .replace('\u{00A0}', " ");

    out = RE_WS.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Clip a summary to [`MAX_SUMMARY_CHARS`], appending an ellipsis when cut.
pub fn clip_summary(s: &str) -> String {
    if s.chars().count() <= MAX_SUMMARY_CHARS {
        return s.to_string();
    }
    let clipped: String = s.chars().take(MAX_SUMMARY_CHARS).collect();
    format!("{}...", clipped.trim_end())
}

/// Whether a URL belongs to a known paywalled domain.
pub fn is_paywalled(url: &str) -> bool {
    let host = match url::Url::parse(url) {
        Ok(u) => u.host_str().unwrap_or_default().to_ascii_lowercase(),
        Err(_) => return false,
    };
    PAYWALLED_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_decodes_entities_and_strips_tags() {
        let s = "  <p>Black&nbsp;holes &amp; <b>quasars</b></p>  ";
        assert_eq!(normalize_text(s), "Black holes & quasars");
    }

    #[test]
    fn test_normalize_maps_smart_quotes() {
        let s = "\u{201C}Ocean warming\u{201D} \u{2014} what\u{2019}s next\u{2026}";
        assert_eq!(normalize_text(s), "\"Ocean warming\" - what's next...");
    }

    #[test]
    fn test_normalize_repairs_mojibake() {
        let s = "Earth\u{e2}\u{80}\u{99}s core";
        assert_eq!(normalize_text(s), "Earth's core");
    }

    #[test]
    fn test_clip_summary() {
        let short = "A brief note.";
        assert_eq!(clip_summary(short), short);

        let long = "x".repeat(MAX_SUMMARY_CHARS + 50);
        let clipped = clip_summary(&long);
        assert!(clipped.ends_with("..."));
        assert!(clipped.chars().count() <= MAX_SUMMARY_CHARS + 3);
    }

    #[test]
    fn test_paywall_detection() {
        assert!(is_paywalled("https://www.nature.com/articles/x"));
        assert!(is_paywalled("https://nytimes.com/science/y"));
        assert!(!is_paywalled("https://phys.org/space-news/z"));
        assert!(!is_paywalled("not a url"));
    }
}
