//! Shareable links for a saved roast.

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Serialize;
use uuid::Uuid;

/// Pre-filled social post endpoint.
pub const POST_INTENT_URL: &str = "https://twitter.com/intent/tweet";
/// Characters of the roast quoted in the social post.
pub const EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct ShareLinks {
    pub share_url: String,
    pub post_url: String,
}

/// Link back to the record (`?roast_id=`) plus a social post quoting the roast.
pub fn share_links(public_base_url: &str, roast_id: Uuid, roast: &str) -> Result<ShareLinks> {
    let share_url = Url::parse_with_params(public_base_url, &[("roast_id", roast_id.to_string())])
        .context("PUBLIC_BASE_URL is not a valid URL")?;

    let text = format!("My resume just got roasted: \"{}\"", excerpt(roast, EXCERPT_CHARS));
    let post_url = Url::parse_with_params(
        POST_INTENT_URL,
        &[("text", text.as_str()), ("url", share_url.as_str())],
    )
    .context("invalid social post URL")?;

    Ok(ShareLinks {
        share_url: share_url.into(),
        post_url: post_url.into(),
    })
}

/// First `max_chars` characters of `text`, with `...` when something was cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
    }
}
