//! Final shaping: optional script whitelist, whitespace collapse, length cap.

use super::Stage;
use crate::config::CharacterWhitelist;

/// Removes characters outside a configured whitelist.
pub struct FilterCharacters {
    whitelist: CharacterWhitelist,
}

impl FilterCharacters {
    pub fn new(whitelist: CharacterWhitelist) -> Self {
        Self { whitelist }
    }
}

impl Stage for FilterCharacters {
    fn name(&self) -> &'static str {
        "filter-characters"
    }

    fn apply(&self, text: &str) -> String {
        text.chars().filter(|&c| self.whitelist.allows(c)).collect()
    }
}

/// Collapses every whitespace run (newlines included) to one space and trims.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollapseWhitespace;

impl Stage for CollapseWhitespace {
    fn name(&self) -> &'static str {
        "collapse-whitespace"
    }

    fn apply(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut pending_space = false;

        for c in text.chars() {
            if c.is_whitespace() {
                pending_space = !result.is_empty();
            } else {
                if pending_space {
                    result.push(' ');
                    pending_space = false;
                }
                result.push(c);
            }
        }
        result
    }
}

/// Hard character cap. May cut mid-word.
#[derive(Debug, Clone, Copy)]
pub struct Truncate {
    max_chars: usize,
}

impl Truncate {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Stage for Truncate {
    fn name(&self) -> &'static str {
        "truncate"
    }

    fn apply(&self, text: &str) -> String {
        match text.char_indices().nth(self.max_chars) {
            Some((cut, _)) => text[..cut].to_string(),
            None => text.to_string(),
        }
    }
}
