// src/matcher.rs

use crate::decode::{decode_base64_header, decode_header};

/// Substring test over decoded header text.
///
/// Case folding is Unicode-aware, so multi-byte text compares correctly.
/// An empty needle never matches.
pub fn contains(haystack: &str, needle: &str, case_insensitive: bool) -> bool {
    if needle.is_empty() {
        return false;
    }
    if case_insensitive {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    } else {
        haystack.contains(needle)
    }
}

/// Decode-then-match with the process-wide search options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMatcher {
    pub case_insensitive: bool,
    pub decode_base64: bool,
}

impl Default for HeaderMatcher {
    fn default() -> Self {
        HeaderMatcher::new(true, false)
    }
}

impl HeaderMatcher {
    pub fn new(case_insensitive: bool, decode_base64: bool) -> Self {
        HeaderMatcher {
            case_insensitive,
            decode_base64,
        }
    }

    /// True when `needle` occurs in the decoded `raw` header value.
    ///
    /// With base64 decoding enabled, a miss is retried once against the
    /// value read as base64.
    pub fn matches(&self, raw: &str, needle: &str) -> bool {
        if contains(&decode_header(raw), needle, self.case_insensitive) {
            return true;
        }
        if !self.decode_base64 {
            return false;
        }
        decode_base64_header(raw)
            .map(|decoded| contains(&decoded, needle, self.case_insensitive))
            .unwrap_or(false)
    }
}
