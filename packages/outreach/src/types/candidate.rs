//! A profile discovered on the listing page.

use serde::Serialize;
use url::Url;

/// One discovered profile eligible for outreach.
///
/// Unique by `profile_url` within a discovery pass. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub profile_url: String,
    pub display_name: String,
}

impl Candidate {
    pub fn new(profile_url: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            profile_url: profile_url.into(),
            display_name: display_name.into(),
        }
    }
}

/// First whitespace-delimited token of a display name.
pub fn first_name(full_name: &str) -> &str {
    full_name.split_whitespace().next().unwrap_or("")
}

/// Resolve `raw` against `base`, then strip query string and fragment so
/// tracking parameters do not defeat deduplication.
///
/// Listing anchors may be absolute or site-relative. Returns `None` for empty
/// hrefs and for anything that does not resolve to an http(s) URL.
pub fn normalize_profile_url(base: &Url, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let mut url = base.join(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}
