//! PII redaction for log fields.
//!
//! Emails and opaque tokens must never land in logs verbatim; wrap
//! them in [`Redacted`] at the logging call site.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").expect("vetted literal")
});

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // base64url-ish runs of 16+ chars, which covers JWT segments
    Regex::new(r"\b[A-Za-z0-9+/_-]{16,}={0,2}\b").expect("vetted literal")
});

/// Mask emails (keep first character of the local part and the full
/// domain) and replace token-like runs with a placeholder.
pub fn redact(input: &str) -> String {
    let email_redacted = EMAIL_REGEX.replace_all(input, |caps: &regex::Captures| {
        let full_match = &caps[0];
        match full_match.find('@') {
            Some(at_pos) if at_pos > 0 => {
                format!("{}***{}", &full_match[..1], &full_match[at_pos..])
            }
            _ => full_match.to_string(),
        }
    });

    TOKEN_REGEX
        .replace_all(&email_redacted, "[REDACTED_TOKEN]")
        .to_string()
}

/// A wrapper that redacts the inner string when displayed.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_redaction() {
        assert_eq!(redact("user@example.com"), "u***@example.com");
        assert_eq!(redact("a@test.org"), "a***@test.org");
        assert_eq!(
            redact("Contact user@example.com or admin@test.org"),
            "Contact u***@example.com or a***@test.org"
        );
    }

    #[test]
    fn test_token_redaction() {
        assert_eq!(
            redact("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"),
            "[REDACTED_TOKEN]"
        );
        // Short strings are left untouched
        assert_eq!(redact("short123"), "short123");
    }

    #[test]
    fn test_redacted_wrapper() {
        let redacted = Redacted("user@example.com");
        assert_eq!(format!("{redacted}"), "u***@example.com");
        assert_eq!(format!("{redacted:?}"), "u***@example.com");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(redact("Hello world"), "Hello world");
        assert_eq!(redact(""), "");
    }
}
