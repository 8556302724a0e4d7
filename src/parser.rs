use crate::types::{ArticleDraft, PipelineError, Result};
use chrono::Utc;
use feed_rs::parser;
use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::{debug, warn};

/// Content excerpts are capped so one verbose feed can't dominate storage.
const MAX_EXCERPT_CHARS: usize = 250;

/// Parse one feed document into normalized article drafts.
///
/// Every returned draft has a non-empty title and link. Entries without a
/// link are dropped (they can't serve as a dedup key), missing titles fall
/// back to "Untitled", and a missing or malformed per-item date becomes
/// `None` rather than failing the feed. Output is truncated to `max_items`.
pub fn parse_feed(source: &str, content: &str, max_items: usize) -> Result<Vec<ArticleDraft>> {
    let feed = parser::parse(content.as_bytes())
        .map_err(|e| PipelineError::Parse(format!("failed to parse feed from {}: {}", source, e)))?;

    let mut drafts = Vec::new();

    for entry in feed.entries.into_iter().take(max_items) {
        let link = match entry.links.first() {
            Some(link) if !link.href.is_empty() => link.href.clone(),
            _ => {
                warn!("Skipping entry without link in {}", source);
                continue;
            }
        };

        let title = entry
            .title
            .map(|t| t.content)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        // Prefer the published timestamp, fall back to updated.
        let published_date = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.with_timezone(&Utc));

        let raw_content = entry
            .content
            .and_then(|c| c.body)
            .or_else(|| entry.summary.map(|s| s.content))
            .unwrap_or_default();

        drafts.push(ArticleDraft {
            title,
            link,
            source: source.to_string(),
            published_date,
            content: excerpt(&clean_html(&raw_content), MAX_EXCERPT_CHARS),
        });
    }

    debug!("Parsed {} drafts from {}", drafts.len(), source);
    Ok(drafts)
}

/// Strip markup from feed item bodies: script/style blocks and tags removed,
/// entities decoded, whitespace collapsed.
pub fn clean_html(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    static RE_SCRIPT: OnceCell<Regex> = OnceCell::new();
    static RE_STYLE: OnceCell<Regex> = OnceCell::new();
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();

    let re_script =
        RE_SCRIPT.get_or_init(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
    let re_style = RE_STYLE.get_or_init(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());

    let text = re_script.replace_all(raw, "");
    let text = re_style.replace_all(&text, "");
    let text = re_tags.replace_all(&text, "");
    let text = html_escape::decode_html_entities(&text).to_string();
    let text = re_ws.replace_all(&text, " ");
    text.trim().to_string()
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated)
}
