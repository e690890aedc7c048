//! Text normalization applied before inference
//!
//! URLs and @-mentions are replaced with placeholder tokens, then the text is
//! lowercased and whitespace is collapsed. Nothing else is touched: no
//! stemming, punctuation stripping or stopword removal.

use regex::Regex;

const URL_TOKEN: &str = " URL ";
const USER_TOKEN: &str = " USER ";

/// Unicode whitespace plus the ASCII separators U+001C..=U+001F
///
/// Rust's `char::is_whitespace` leaves the separators out; text cleanup and
/// length checks treat them as spaces.
pub fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Canonicalizes raw input text for the classifier
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    url_pattern: Regex,
    user_pattern: Regex,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            url_pattern: Regex::new(r"http[^\s\x1C-\x1F]+").expect("URL pattern is valid"),
            user_pattern: Regex::new(r"@\w+").expect("mention pattern is valid"),
        }
    }

    /// Normalize `text`; empty input yields an empty string
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = self.url_pattern.replace_all(text, URL_TOKEN);
        let text = self.user_pattern.replace_all(&text, USER_TOKEN);
        let text = text.to_lowercase();

        // splitting on whitespace also drops leading and trailing runs
        text.split(is_whitespace)
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
