//! Page metadata scraping for saved bookmarks.
//!
//! Best-effort by contract: any fetch or parse failure degrades to a record whose
//! title is the URL itself, so callers never have to branch on errors.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; MemoraBot/1.0)";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
    pub og_image_url: Option<String>,
}

impl PageMetadata {
    /// Fallback record used whenever the page cannot be fetched or parsed.
    pub fn fallback(url: &str) -> Self {
        Self {
            url: url.to_string(),
            title: url.to_string(),
            description: None,
            favicon_url: favicon_for(url),
            og_image_url: None,
        }
    }
}

/// Prepend https:// when the input has no scheme.
pub fn normalize_url(input: &str) -> String {
    let url = input.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn favicon_for(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str()?;
    Some(format!("{}/favicon.ico", parsed.origin().ascii_serialization()))
}

/// Extract a quoted attribute value from a single tag.
fn attr_value(tag: &str, name: &str) -> Option<String> {
    let lower = tag.to_ascii_lowercase();
    let needle = format!("{name}=");
    let mut search_from = 0;
    while let Some(rel) = lower[search_from..].find(&needle) {
        let at = search_from + rel;
        let val_start = at + needle.len();
        let preceded_ok = at == 0 || lower.as_bytes()[at - 1].is_ascii_whitespace();
        if preceded_ok {
            let rest = &tag[val_start..];
            if let Some(quote) = rest.chars().next() {
                if quote == '"' || quote == '\'' {
                    if let Some(end) = rest[1..].find(quote) {
                        return Some(rest[1..1 + end].to_string());
                    }
                }
            }
        }
        search_from = val_start;
    }
    None
}

/// Find `<meta property|name=key content=...>` anywhere in the document.
fn meta_content(html: &str, key: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let mut search_from = 0;
    while let Some(rel) = lower[search_from..].find("<meta") {
        let at = search_from + rel;
        let end = lower[at..].find('>').map(|e| at + e).unwrap_or(html.len());
        let tag = &html[at..end];
        let matches_key = |attr: Option<String>| {
            attr.map(|v| v.eq_ignore_ascii_case(key)).unwrap_or(false)
        };
        if matches_key(attr_value(tag, "property")) || matches_key(attr_value(tag, "name")) {
            if let Some(content) = attr_value(tag, "content") {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
        search_from = end;
    }
    None
}

fn title_of(html: &str) -> Option<String> {
    if let Some(og) = meta_content(html, "og:title") {
        return Some(og);
    }
    let lower = html.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let text_start = open + lower[open..].find('>')? + 1;
    let text_end = text_start + lower[text_start..].find("</title>")?;
    let title = html[text_start..text_end].trim();
    if title.is_empty() { None } else { Some(title.to_string()) }
}

/// Parse an already-fetched HTML document into bookmark display metadata.
pub fn parse_metadata(url: &str, html: &str) -> PageMetadata {
    PageMetadata {
        url: url.to_string(),
        title: title_of(html).unwrap_or_else(|| url.to_string()),
        description: meta_content(html, "og:description")
            .or_else(|| meta_content(html, "description")),
        favicon_url: favicon_for(url),
        og_image_url: meta_content(html, "og:image"),
    }
}

/// Fetch a page and scrape its metadata. Never fails; see [`PageMetadata::fallback`].
pub async fn fetch_page_metadata(raw_url: &str) -> PageMetadata {
    let url = normalize_url(raw_url);
    let client = match reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "metadata client build failed");
            return PageMetadata::fallback(&url);
        }
    };
    let html = match client.get(&url).send().await {
        Ok(resp) => match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(%url, error = %e, "metadata body read failed");
                return PageMetadata::fallback(&url);
            }
        },
        Err(e) => {
            tracing::debug!(%url, error = %e, "metadata fetch failed");
            return PageMetadata::fallback(&url);
        }
    };
    parse_metadata(&url, &html)
}
