//! URL shape heuristics (C15): homepage detection, URL quality scoring, and
//! domain-allowlist credibility filtering.
//!
//! No `url` crate in the dependency tree; URLs are split by hand the same
//! way the original service does it with `urlparse`, which is simple enough
//! here (scheme, netloc, path) that a full parser would be overkill.

use std::collections::HashSet;

const HOMEPAGE_PATTERNS: [&str; 24] = [
    "home", "index", "main", "default", "welcome", "news", "about", "contact", "search",
    "sitemap", "fact-check", "factcheck", "technology", "tech", "politics", "sports",
    "entertainment", "business", "world", "national", "local", "opinion", "lifestyle", "health",
];
const HOMEPAGE_PATTERNS_EXTRA: [&str; 4] = ["science", "athletic", "sport", "athletics"];

const CATEGORY_PATTERNS: [&str; 10] = [
    "news", "sports", "sport", "athletic", "athletics", "technology", "tech", "politics",
    "business", "health",
];

const GENERIC_ARTICLE_PLURALS: [&str; 4] = ["news", "articles", "stories", "posts"];

fn is_homepage_pattern(segment: &str) -> bool {
    let lower = segment.to_ascii_lowercase();
    HOMEPAGE_PATTERNS.contains(&lower.as_str()) || HOMEPAGE_PATTERNS_EXTRA.contains(&lower.as_str())
}

/// Split a URL into (scheme, netloc, path) the way `urlparse` would, without
/// pulling in a full URL crate. Query/fragment are discarded.
fn split_url(url: &str) -> (&str, &str) {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    let after_scheme = match without_query.find("://") {
        Some(idx) => &without_query[idx + 3..],
        None => without_query,
    };
    match after_scheme.find('/') {
        Some(idx) => (&after_scheme[..idx], &after_scheme[idx..]),
        None => (after_scheme, ""),
    }
}

fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn looks_like_article_id(segment: &str) -> bool {
    let stripped: String = segment.chars().filter(|c| *c != '-' && *c != '_').collect();
    stripped.chars().all(|c| c.is_alphanumeric())
        && !stripped.is_empty()
        && segment.len() > 5
        && !GENERIC_ARTICLE_PLURALS.contains(&segment.to_ascii_lowercase().as_str())
}

/// Detect whether a URL is likely a homepage or category landing page rather
/// than a specific article.
pub fn is_homepage_url(url: &str) -> bool {
    if url.is_empty() {
        return true;
    }
    let (netloc, path) = split_url(url);
    let path = path.trim();
    if path.is_empty() || path == "/" {
        return true;
    }

    let segments = path_segments(path);

    if segments.len() == 1 && is_homepage_pattern(segments[0]) {
        return true;
    }

    let no_scheme = url.split("://").next_back().unwrap_or(url);
    let no_scheme = no_scheme
        .split('?')
        .next()
        .unwrap_or(no_scheme)
        .split('#')
        .next()
        .unwrap_or(no_scheme)
        .trim_end_matches('/');
    let netloc_lower = netloc.to_ascii_lowercase();
    if no_scheme.eq_ignore_ascii_case(&netloc_lower)
        || no_scheme.eq_ignore_ascii_case(&format!("www.{netloc_lower}"))
    {
        return true;
    }

    if segments.len() == 2 && path.ends_with('/') && !looks_like_article_id(segments[1]) {
        return true;
    }

    if segments.len() == 1 && path.ends_with('/') && is_homepage_pattern(segments[0]) {
        return true;
    }

    false
}

/// URL quality in `[0, 1]`: higher for article-specific paths, lower for
/// homepages and category landing pages.
pub fn url_quality(url: &str) -> f32 {
    if url.is_empty() {
        return 0.0;
    }
    let (_, path) = split_url(url);
    let path = path.trim();
    if path.is_empty() || path == "/" {
        return 0.0;
    }
    let segments = path_segments(path);
    match segments.len() {
        n if n >= 3 => 1.0,
        2 => {
            if looks_like_article_id(segments[1]) {
                0.9
            } else {
                0.3
            }
        }
        1 => {
            let lower = segments[0].to_ascii_lowercase();
            if CATEGORY_PATTERNS.contains(&lower.as_str()) || path.ends_with('/') {
                0.2
            } else {
                0.6
            }
        }
        _ => 0.5,
    }
}

/// Source preference used by the reranker's hybrid score.
pub fn source_preference(source: &str) -> f32 {
    match source {
        "web" => 1.0,
        "rag" => 0.7,
        _ => 0.8,
    }
}

/// Host with any leading `www.` stripped, lowercased. Empty for malformed
/// URLs.
pub fn domain_of(url: &str) -> String {
    let (netloc, _) = split_url(url);
    let lower = netloc.to_ascii_lowercase();
    lower.strip_prefix("www.").map(str::to_string).unwrap_or(lower)
}

/// True when the URL's domain is present in `allowed_domains`.
pub fn is_credible(url: &str, allowed_domains: &HashSet<String>) -> bool {
    if allowed_domains.is_empty() {
        return false;
    }
    let domain = domain_of(url);
    !domain.is_empty() && allowed_domains.contains(&domain)
}

/// Filter items to those whose URL is credible; `url_of` projects an item to
/// its URL. Order is preserved.
pub fn filter_credible<'a, T>(
    items: &'a [T],
    allowed_domains: &HashSet<String>,
    url_of: impl Fn(&T) -> &str,
) -> Vec<&'a T> {
    if allowed_domains.is_empty() {
        return Vec::new();
    }
    items.iter().filter(|item| is_credible(url_of(item), allowed_domains)).collect()
}

/// Soften an over-aggressive credibility filter: if nothing survived, or the
/// surviving set is both small (<3) and a minority (<30%) of the original,
/// fall back to the unfiltered set so evidence diversity isn't lost.
pub fn soften_filter<T: Clone>(original: &[T], credible: Vec<&T>) -> Vec<T> {
    if credible.is_empty() {
        return original.to_vec();
    }
    let too_few = credible.len() < 3;
    let too_small_fraction = (credible.len() as f64) < (original.len() as f64) * 0.3;
    if too_few && too_small_fraction {
        return original.to_vec();
    }
    credible.into_iter().cloned().collect()
}
