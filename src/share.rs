//! Share links for agents.
//!
//! An agent's public path is `/a/{id}-{slug}` where the slug is a cosmetic
//! rendering of the agent name. Only the numeric prefix up to the first
//! hyphen is authoritative; the slug text is ignored when resolving a link
//! back to a record. A second link form, `/run/{id}?key=value`, pre-fills
//! parameter values on the run page.

use std::collections::BTreeMap;

const SLUG_MAX_LEN: usize = 60;

/// Lowercase a display title into a URL slug.
///
/// Runs of non-alphanumeric characters collapse to a single hyphen, leading
/// and trailing hyphens are trimmed, and the result is capped at 60 bytes
/// (the input is reduced to ASCII first, so the cap never splits a
/// character).
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug.truncate(SLUG_MAX_LEN);
    slug
}

/// Public share path for an agent, e.g. `/a/123-mit-news-assistant`.
pub fn agent_share_path(id: u64, title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("/a/{id}")
    } else {
        format!("/a/{id}-{slug}")
    }
}

/// Run path with parameter values pre-filled as a query string.
///
/// Only pass values that differ from the schema defaults; the run page
/// overlays the query string on top of the defaults. Keys and values are
/// percent-encoded.
pub fn run_path_with_values(id: u64, values: &BTreeMap<String, String>) -> String {
    if values.is_empty() {
        return format!("/run/{id}");
    }
    let query = values
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("/run/{id}?{query}")
}

/// Resolve a share reference back to an agent id.
///
/// Accepts a bare id (`"12"`) or a full slug segment (`"12-mit-news"`).
/// Everything after the first hyphen is decorative and discarded. Returns
/// `None` when the leading segment is not a number.
pub fn resolve_share_ref(reference: &str) -> Option<u64> {
    let id_part = match reference.find('-') {
        Some(pos) => &reference[..pos],
        None => reference,
    };
    id_part.parse().ok()
}
