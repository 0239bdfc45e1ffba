//! Fixed values for the verification pipeline. Configurable values (env
//! var-backed) live in `crate::config`.

pub const COLLECTION_CURRENT_AFFAIRS_24H: &str = "current_affairs_24h";
pub const COLLECTION_STATIC_GK: &str = "static_gk";

/// Temp collection name for safe refresh: build here, then clone to the
/// live current-affairs collection.
pub const REFRESH_TEMP_COLLECTION: &str = "current_affairs_24h_new";

pub const DEFAULT_CREDIBLE_DOMAINS: &[&str] = &[
    "reuters.com",
    "apnews.com",
    "bbc.com",
    "bbc.co.uk",
    "nytimes.com",
    "theguardian.com",
    "washingtonpost.com",
    "npr.org",
    "factcheck.org",
    "snopes.com",
    "politifact.com",
    "afp.com",
    "usatoday.com",
    "cbsnews.com",
    "nbcnews.com",
    "abcnews.go.com",
    "poynter.org",
];

pub const DEFAULT_CURRENT_AFFAIRS_QUERIES: &[&str] = &[
    "today's top news",
    "breaking news today",
    "current affairs today",
    "headlines today",
    "world news today",
    "politics news today",
    "technology news today",
    "science news today",
    "health news today",
    "business news today",
    "sports news today",
    "climate environment news today",
    "economy news today",
    "fact check viral claim",
    "debunked news today",
    "misinformation fact check",
    "US news today",
    "international news today",
];
