//! PHI Redaction Layer
//!
//! Scrubs phone numbers, e-mail addresses, and SSN-shaped digit groups from
//! strings before they reach the logs. Recognized raw text and patient payloads
//! go through here first.

use regex::Regex;
use std::sync::LazyLock;

static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
static SSN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());

/// Redacts PHI patterns in a string.
pub fn redact_phi(input: &str) -> String {
    let redacted = SSN_RE.replace_all(input, "[REDACTED_SSN]");
    let redacted = EMAIL_RE.replace_all(&redacted, "[REDACTED_EMAIL]");
    let redacted = TELEPHONE_RE.replace_all(&redacted, "[REDACTED_PHONE]");
    redacted.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "Name: Jane Doe\nPhone: (555) 123-4567\nEmail: jane.doe@example.com\nSSN: 123-45-6789";
        let clean = redact_phi(raw);
        assert!(!clean.contains("(555) 123-4567"));
        assert!(!clean.contains("jane.doe@example.com"));
        assert!(!clean.contains("123-45-6789"));
        assert!(clean.contains("Jane Doe"));
    }

    #[test]
    fn test_plain_text_untouched() {
        let raw = "Patient Intake Form";
        assert_eq!(redact_phi(raw), raw);
    }
}
