use std::sync::LazyLock;

use regex::{NoExpand, Regex};

/// Redacted text is cut to this many characters before the truncation marker.
pub const MAX_REDACTED_CHARS: usize = 5000;
pub const TRUNCATION_MARKER: &str = "...";

pub const CARD_PLACEHOLDER: &str = "[CARD_NUMBER]";
pub const EMAIL_PLACEHOLDER: &str = "[EMAIL]";
pub const SSN_PLACEHOLDER: &str = "[SSN]";

/// 13-16 digits, optionally grouped in fours with `-` or whitespace.
static CARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:\d{4}[-\s]?){3}\d{1,4}\b").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static SSN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());

/// Category of personally identifiable information the redactor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PiiKind {
    CardNumber,
    Email,
    Ssn,
}

impl PiiKind {
    /// Application order matters: a card number is replaced before the email
    /// and SSN patterns ever see it.
    pub const ALL: [PiiKind; 3] = [PiiKind::CardNumber, PiiKind::Email, PiiKind::Ssn];

    fn pattern(&self) -> &'static Regex {
        match self {
            PiiKind::CardNumber => &CARD_RE,
            PiiKind::Email => &EMAIL_RE,
            PiiKind::Ssn => &SSN_RE,
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            PiiKind::CardNumber => CARD_PLACEHOLDER,
            PiiKind::Email => EMAIL_PLACEHOLDER,
            PiiKind::Ssn => SSN_PLACEHOLDER,
        }
    }
}

/// Check which PII categories occur in `text`.
pub fn detect_pii(text: &str) -> Vec<PiiKind> {
    PiiKind::ALL
        .into_iter()
        .filter(|kind| kind.pattern().is_match(text))
        .collect()
}

/// Replace every PII match with its placeholder, one category at a time.
fn scrub(text: &str) -> String {
    let mut out = text.to_string();
    for kind in PiiKind::ALL {
        let replaced = kind.pattern().replace_all(&out, NoExpand(kind.placeholder()));
        out = replaced.into_owned();
    }
    out
}

fn take_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

/// Strip PII and cap the length at [`MAX_REDACTED_CHARS`]. Anything longer
/// is cut to exactly that many characters and [`TRUNCATION_MARKER`] appended.
///
/// The head left after truncation is scrubbed again: cutting through a long
/// digit run can leave a card-length number at the new end of the string. If
/// the placeholder is shorter than what it replaced, the head is padded with
/// spaces back to full length.
pub fn redact(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let scrubbed = scrub(text);
    if scrubbed.chars().count() <= MAX_REDACTED_CHARS {
        return scrubbed;
    }

    let mut head = scrub(&take_chars(&scrubbed, MAX_REDACTED_CHARS));
    let len = head.chars().count();
    if len > MAX_REDACTED_CHARS {
        head = take_chars(&head, MAX_REDACTED_CHARS);
    } else {
        head.extend(std::iter::repeat(' ').take(MAX_REDACTED_CHARS - len));
    }
    head.push_str(TRUNCATION_MARKER);
    head
}

/// Link fields keep long numeric ids intact, so only emails and SSNs are
/// replaced there (`mailto:` links, query strings).
pub fn redact_url(url: &str) -> String {
    [PiiKind::Email, PiiKind::Ssn]
        .into_iter()
        .fold(url.to_string(), |out, kind| {
            kind.pattern()
                .replace_all(&out, NoExpand(kind.placeholder()))
                .into_owned()
        })
}
