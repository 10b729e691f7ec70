use sha2::{Digest, Sha256};
use url::Url;

const TRACKING_PARAMS: [&str; 5] = ["gclid", "fbclid", "yclid", "mc_cid", "mc_eid"];

/// Stable identity of an item: SHA-256 over the normalized title and the canonical URL.
pub fn fingerprint(title: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_title(title).as_bytes());
    hasher.update(b"\n");
    hasher.update(canonicalize_url(url).as_bytes());
    format!("{:x}", hasher.finalize())
}

// trim, collapse inner whitespace, lowercase
pub fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Dedup key for a link: scheme ignored, host lowercased, fragment, tracking params,
/// default port and trailing slashes dropped. Path case is preserved.
pub fn canonicalize_url(input: &str) -> String {
    let s = input.trim();
    if s.is_empty() {
        return String::new();
    }
    let normalized = if s.contains("://") { s.to_string() } else { format!("https://{s}") };

    if let Ok(mut url) = Url::parse(&normalized) {
        url.set_fragment(None);

        if url.query().is_some() {
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| !is_tracking_param(k))
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            if pairs.is_empty() {
                url.set_query(None);
            } else {
                url.query_pairs_mut().clear().extend_pairs(pairs);
            }
        }

        // the url crate already drops a scheme's default port
        return strip_scheme_and_slashes(url.as_str());
    }

    // string fallback for links the url crate rejects
    let mut s = normalized;
    if let Some((left, _)) = s.split_once('#') { s = left.to_string(); }
    if let Some((left, _)) = s.split_once('?') { s = left.to_string(); }
    strip_scheme_and_slashes(&s.to_lowercase())
}

fn is_tracking_param(key: &str) -> bool {
    let k = key.to_ascii_lowercase();
    k.starts_with("utm_") || TRACKING_PARAMS.contains(&k.as_str())
}

fn strip_scheme_and_slashes(s: &str) -> String {
    let rest = match s.split_once("://") {
        Some((_, rest)) => rest,
        None => s,
    };
    rest.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic() {
        let a = fingerprint("Rust 2.0 released", "https://example.com/post/1");
        let b = fingerprint("Rust 2.0 released", "https://example.com/post/1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn whitespace_and_title_case_do_not_change_identity() {
        let a = fingerprint("  Rust   2.0\treleased ", "https://example.com/post/1");
        let b = fingerprint("rust 2.0 RELEASED", "https://example.com/post/1");
        assert_eq!(a, b);
    }

    #[test]
    fn url_variants_canonicalize_equally() {
        let base = fingerprint("t", "https://example.com/post/1");
        for v in [
            "HTTPS://Example.COM/post/1/",
            "http://example.com/post/1",
            "https://example.com:443/post/1#comments",
            "https://example.com/post/1?utm_source=rss&utm_medium=feed",
            " example.com/post/1 ",
        ] {
            assert_eq!(fingerprint("t", v), base, "variant {v}");
        }
    }

    #[test]
    fn functional_query_params_are_kept() {
        assert_eq!(canonicalize_url("https://example.com/item?id=42&utm_campaign=x"), "example.com/item?id=42");
        assert_ne!(fingerprint("t", "https://example.com/item?id=1"), fingerprint("t", "https://example.com/item?id=2"));
    }

    #[test]
    fn explicit_non_default_port_is_kept() {
        assert_eq!(canonicalize_url("https://example.com:8443/x"), "example.com:8443/x");
    }

    #[test]
    fn path_case_is_significant() {
        assert_ne!(canonicalize_url("https://example.com/A"), canonicalize_url("https://example.com/a"));
    }

    #[test]
    fn different_titles_differ() {
        assert_ne!(fingerprint("one", "https://example.com"), fingerprint("two", "https://example.com"));
    }

    #[test]
    fn empty_url_is_stable() {
        assert_eq!(canonicalize_url("   "), "");
        assert_eq!(fingerprint("only a title", ""), fingerprint("Only  a title", ""));
    }
}
