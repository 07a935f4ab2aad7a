//! PII detection and redaction.
//!
//! Recognises email addresses, phone numbers, IPv4 addresses, and
//! credit-card-like digit runs. Redaction runs email → card → IPv4 → phone:
//! card and address runs are consumed before the looser phone pattern can
//! claim a fragment of them. Counts reflect the replacements actually made.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email regex")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\+?\d{1,3}[\s.-]?)?(?:\(?\d{2,4}\)?[\s.-]?)\d{3,4}[\s.-]?\d{3,4}\b")
        .expect("phone regex")
});

static IPV4_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("ipv4 regex"));

static CARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:\d[ -]*?){13,19}\b").expect("card regex"));

pub const REDACTED_EMAIL: &str = "[REDACTED_EMAIL]";
pub const REDACTED_PHONE: &str = "[REDACTED_PHONE]";
pub const REDACTED_IP: &str = "[REDACTED_IP]";
pub const REDACTED_CARD: &str = "[REDACTED_CARD]";

/// Number of redactions made per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PiiCounts {
    pub email: usize,
    pub phone: usize,
    pub ip: usize,
    pub credit: usize,
}

impl PiiCounts {
    pub fn total(&self) -> usize {
        self.email + self.phone + self.ip + self.credit
    }

    pub fn any(&self) -> bool {
        self.total() > 0
    }
}

/// True if `text` contains anything that looks like PII.
pub fn contains_pii(text: &str) -> bool {
    EMAIL_RE.is_match(text)
        || PHONE_RE.is_match(text)
        || IPV4_RE.is_match(text)
        || CARD_RE.is_match(text)
}

/// Redact PII from `text`, returning the redacted text and counts.
pub fn redact_pii(text: &str) -> (String, PiiCounts) {
    let mut counts = PiiCounts::default();
    let (out, n) = replace_counted(&EMAIL_RE, text, REDACTED_EMAIL);
    counts.email = n;
    let (out, n) = replace_counted(&CARD_RE, &out, REDACTED_CARD);
    counts.credit = n;
    let (out, n) = replace_counted(&IPV4_RE, &out, REDACTED_IP);
    counts.ip = n;
    let (out, n) = replace_counted(&PHONE_RE, &out, REDACTED_PHONE);
    counts.phone = n;
    (out, counts)
}

fn replace_counted(re: &Regex, text: &str, replacement: &str) -> (String, usize) {
    let n = re.find_iter(text).count();
    if n == 0 {
        return (text.to_string(), 0);
    }
    (re.replace_all(text, replacement).into_owned(), n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_category() {
        assert!(contains_pii("Contact me at test@example.com"));
        assert!(contains_pii("Call +1-415-555-1212 for info"));
        assert!(contains_pii("Server at 192.168.1.10"));
        assert!(contains_pii("Card 4111 1111 1111 1111"));
        assert!(!contains_pii("Nothing sensitive in here."));
    }

    #[test]
    fn redacts_email_and_phone() {
        let (redacted, counts) = redact_pii("Email test@example.com and call 415-555-1212.");
        assert!(redacted.contains(REDACTED_EMAIL));
        assert!(redacted.contains(REDACTED_PHONE));
        assert!(!redacted.contains("example.com"));
        assert_eq!(counts.email, 1);
        assert_eq!(counts.phone, 1);
        assert!(counts.any());
    }

    #[test]
    fn card_is_redacted_whole() {
        let (redacted, counts) = redact_pii("Card 4111 1111 1111 1111 on file");
        assert_eq!(redacted, "Card [REDACTED_CARD] on file");
        assert_eq!(counts.credit, 1);
        assert_eq!(counts.phone, 0);
    }

    #[test]
    fn ip_is_redacted() {
        let (redacted, counts) = redact_pii("Server at 192.168.1.10 is down");
        assert_eq!(redacted, "Server at [REDACTED_IP] is down");
        assert_eq!(counts.ip, 1);
    }

    #[test]
    fn clean_text_is_untouched() {
        let (redacted, counts) = redact_pii("Plain words only.");
        assert_eq!(redacted, "Plain words only.");
        assert_eq!(counts, PiiCounts::default());
        assert!(!counts.any());
    }
}
