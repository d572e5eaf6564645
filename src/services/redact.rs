//! Scrub credentials out of text before it is persisted.

use std::sync::LazyLock;

use regex::Regex;

const REDACTED: &str = "[REDACTED]";

/// Known secrets shorter than this are too ambiguous to replace.
const MIN_KNOWN_SECRET_LEN: usize = 4;

/// OpenAI-style key tokens. Tails under 8 characters ("sk-learn") are left alone.
static KEY_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:sk|sess)-[A-Za-z0-9_-]{8,}").expect("key token pattern is valid")
});

/// Replace every known secret and every key-shaped token in `text`.
pub fn redact_secrets(text: &str, known_secrets: &[&str]) -> String {
    let mut out = text.to_string();
    for secret in known_secrets {
        let secret = secret.trim();
        if secret.len() >= MIN_KNOWN_SECRET_LEN {
            out = out.replace(secret, REDACTED);
        }
    }

    KEY_TOKEN.replace_all(&out, REDACTED).into_owned()
}
