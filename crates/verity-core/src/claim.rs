//! Claim Intake (C1): Unicode normalization and length validation.
//!
//! Deterministic, no I/O. `normalize` is idempotent: `normalize(normalize(s)) == normalize(s)`.

use unicode_normalization::UnicodeNormalization;

use crate::error::IntakeError;

/// A validated, normalized claim string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim(String);

impl Claim {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Claim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Apply compatibility Unicode normalization (NFKC), trim, and collapse runs
/// of whitespace to a single space.
pub fn normalize(s: &str) -> String {
    let nfkc: String = s.nfkc().collect();
    let mut out = String::with_capacity(nfkc.len());
    let mut last_was_space = false;
    for ch in nfkc.trim().chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

/// Reject empty (after normalize) and oversized strings.
pub fn validate(normalized: &str, max_length: usize) -> Result<(), IntakeError> {
    if normalized.is_empty() {
        return Err(IntakeError::Empty);
    }
    let actual = normalized.chars().count();
    if actual > max_length {
        return Err(IntakeError::TooLong { max: max_length, actual });
    }
    Ok(())
}

/// Normalize and validate a raw claim string in one step.
pub fn intake(raw: &str, max_length: usize) -> Result<Claim, IntakeError> {
    let normalized = normalize(raw);
    validate(&normalized, max_length)?;
    Ok(Claim(normalized))
}
