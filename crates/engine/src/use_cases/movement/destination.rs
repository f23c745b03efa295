//! Destination phrase extraction from navigation failure messages.

use std::sync::OnceLock;

use regex_lite::Regex;

/// Tried in order; the first capture wins.
const DESTINATION_PATTERNS: [&str; 5] = [
    r"(?i)destination not found:\s*(.+)$",
    r"找不到目的地[:：]\s*(.+)$",
    r"(?i)cannot find destination:\s*(.+)",
    r"(?i)unknown destination:?\s*(.+)",
    r"(?i)no such place:\s*(.+)",
];

static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn patterns() -> &'static [Regex] {
    PATTERNS.get_or_init(|| {
        DESTINATION_PATTERNS
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::error!(pattern = p, error = %e, "Invalid destination pattern");
                    None
                }
            })
            .collect()
    })
}

/// Pull the destination phrase out of a navigation failure message.
pub fn extract_destination(message: &str) -> Option<String> {
    let message = message.trim();
    patterns().iter().find_map(|re| {
        let phrase = clean_phrase(re.captures(message)?.get(1)?.as_str());
        (!phrase.is_empty()).then_some(phrase)
    })
}

/// Strip trailing punctuation and wrapping quotes.
fn clean_phrase(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(['.', '!', '?', '。', '！'])
        .trim()
        .trim_matches(['"', '\'', '“', '”', '「', '」'])
        .trim()
        .to_string()
}
