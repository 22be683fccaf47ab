// src/canonical.rs
//! Canonical URL form used as the dedupe key across one collection pass.
//!
//! Strips known tracking query parameters while preserving everything else
//! (scheme, host, path, remaining query pairs in order, fragment). Two links
//! that differ only in tracking noise must canonicalize identically.

use url::Url;

/// Query parameter names dropped during canonicalization (case-insensitive).
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
];

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS
        .iter()
        .any(|p| key.eq_ignore_ascii_case(p))
}

/// Strip tracking parameters from `raw`. Malformed URLs come back unchanged;
/// canonicalization must never abort the pipeline.
pub fn canonicalize(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed
            .query_pairs_mut()
            .clear()
            .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_utm_and_click_ids() {
        let a = canonicalize(
            "https://example.com/story?utm_source=rss&id=7&utm_medium=feed&fbclid=abc",
        );
        assert_eq!(a, "https://example.com/story?id=7");
    }

    #[test]
    fn tracking_only_query_is_removed_entirely() {
        let a = canonicalize("https://example.com/story?utm_campaign=daily");
        assert_eq!(a, "https://example.com/story");
    }

    #[test]
    fn preserves_order_and_fragment() {
        let a = canonicalize("https://example.com/p?b=2&utm_term=x&a=1#sec");
        assert_eq!(a, "https://example.com/p?b=2&a=1#sec");
    }

    #[test]
    fn keeps_blank_values() {
        let a = canonicalize("https://example.com/p?flag=&utm_content=z");
        assert_eq!(a, "https://example.com/p?flag=");
    }

    #[test]
    fn malformed_url_passes_through() {
        assert_eq!(canonicalize("not a url"), "not a url");
        assert_eq!(canonicalize(""), "");
    }

    #[test]
    fn tracking_variants_converge() {
        let a = canonicalize("https://example.com/s?gclid=1&x=y");
        let b = canonicalize("https://example.com/s?x=y&utm_source=mail");
        assert_eq!(a, b);
    }
}
