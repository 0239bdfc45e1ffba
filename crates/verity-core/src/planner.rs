//! Search Planner (C2): derive a short, deduplicated list of search queries
//! from a single claim string. Rule-based, deterministic, no I/O.

const GENERIC_PREFIXES: [&str; 6] = [
    "fact check ",
    "is it true that ",
    "did ",
    "does ",
    "was ",
    "were ",
];

/// Strip a leading fact-checking framing phrase, case-insensitively. Only
/// used to decide whether a Title-Case run is "leading" noise; the returned
/// claim otherwise keeps its original casing.
fn strip_leading_framing(claim: &str) -> &str {
    let lower = claim.to_ascii_lowercase();
    for prefix in GENERIC_PREFIXES {
        if lower.starts_with(prefix) {
            return claim[prefix.len()..].trim_start();
        }
    }
    claim
}

/// Extract the single most important key phrase from a claim, per the
/// precedence: quoted substring, then longest Title-Case run, then longest
/// 2/3-word substring.
fn extract_key_phrase(claim: &str) -> Option<String> {
    if let Some(phrase) = first_quoted_phrase(claim) {
        return Some(phrase);
    }
    if let Some(phrase) = longest_title_case_run(claim) {
        return Some(phrase);
    }
    longest_short_substring(claim)
}

fn first_quoted_phrase(claim: &str) -> Option<String> {
    let start = claim.find('"')?;
    let rest = &claim[start + 1..];
    let end = rest.find('"')?;
    let phrase = &rest[..end];
    if phrase.is_empty() {
        None
    } else {
        Some(phrase.to_string())
    }
}

fn is_title_case_token(tok: &str) -> bool {
    let mut chars = tok.chars();
    match chars.next() {
        Some(c) if c.is_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_lowercase())
}

/// Longest run of >=2 consecutive Title-Case tokens, considered over the
/// claim with leading fact-check framing stripped (so "Did NASA launch..."
/// finds "NASA" style runs without the framing word interfering).
fn longest_title_case_run(claim: &str) -> Option<String> {
    let body = strip_leading_framing(claim);
    let words: Vec<&str> = body.split_whitespace().collect();
    let mut best: Option<(usize, usize)> = None; // (start, len) in words
    let mut run_start = None;
    for (i, w) in words.iter().enumerate() {
        let bare = w.trim_matches(|c: char| !c.is_alphanumeric());
        if is_title_case_token(bare) {
            if run_start.is_none() {
                run_start = Some(i);
            }
        } else {
            if let Some(s) = run_start {
                let len = i - s;
                if len >= 2 && best.map(|(_, bl)| len > bl).unwrap_or(true) {
                    best = Some((s, len));
                }
            }
            run_start = None;
        }
    }
    if let Some(s) = run_start {
        let len = words.len() - s;
        if len >= 2 && best.map(|(_, bl)| len > bl).unwrap_or(true) {
            best = Some((s, len));
        }
    }
    best.map(|(s, len)| words[s..s + len].join(" "))
}

/// Longest 2- or 3-word contiguous substring of the claim, by character
/// length; ties favor the first occurrence.
fn longest_short_substring(claim: &str) -> Option<String> {
    let words: Vec<&str> = claim.split_whitespace().collect();
    let mut best: Option<String> = None;
    for window in [3usize, 2usize] {
        if words.len() < window {
            continue;
        }
        for i in 0..=(words.len() - window) {
            let phrase = words[i..i + window].join(" ");
            if best.as_ref().map(|b| phrase.len() > b.len()).unwrap_or(true) {
                best = Some(phrase);
            }
        }
        if best.is_some() {
            break;
        }
    }
    best
}

/// Replace the first case-insensitive occurrence of `phrase` in `claim` with
/// a quoted version, preserving the original casing of the matched text.
fn quote_phrase_in_claim(claim: &str, phrase: &str) -> String {
    let lower_claim = claim.to_ascii_lowercase();
    let lower_phrase = phrase.to_ascii_lowercase();
    if let Some(pos) = lower_claim.find(&lower_phrase) {
        let matched = &claim[pos..pos + phrase.len()];
        format!("{}\"{}\"{}", &claim[..pos], matched, &claim[pos + phrase.len()..])
    } else {
        claim.replacen(phrase, &format!("\"{phrase}\""), 1)
    }
}

/// Generate 1-4 search queries for a claim.
pub fn plan(claim: &str) -> Vec<String> {
    let claim = claim.trim();
    if claim.is_empty() {
        return Vec::new();
    }

    let key_phrase = extract_key_phrase(claim);
    let mut queries: Vec<String> = Vec::with_capacity(4);

    // 1) claim with key phrase quoted, or the raw claim.
    match &key_phrase {
        Some(phrase) => queries.push(quote_phrase_in_claim(claim, phrase)),
        None => queries.push(claim.to_string()),
    }

    // 2) fact-check framing.
    match &key_phrase {
        Some(phrase) => queries.push(format!("fact check \"{phrase}\"")),
        None => queries.push(format!("fact check {claim}")),
    }

    // 3) bare quote, only if the phrase is substantial.
    if let Some(phrase) = &key_phrase {
        if phrase.len() > 10 {
            queries.push(format!("\"{phrase}\""));
        }
    }

    // 4) truncated prefix for long claims.
    if claim.len() > 80 {
        let prefix = &claim[..77];
        let short = match prefix.rfind(' ') {
            Some(idx) => &prefix[..idx],
            None => prefix,
        };
        if !short.is_empty() && !queries.iter().any(|q| q == short) {
            queries.push(short.to_string());
        }
    }

    // 5) debunk framing, only if there's still room.
    if queries.len() < 4 {
        let debunk = match &key_phrase {
            Some(phrase) => format!("\"{phrase}\" debunk"),
            None => format!("\"{claim}\" debunk"),
        };
        if !queries.iter().any(|q| q == &debunk) {
            queries.push(debunk);
        }
    }

    queries.truncate(4);
    queries
}
