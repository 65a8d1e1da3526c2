//! Free-text input cleanup.
//!
//! Names, product ids and emails arrive from browser forms. They are trimmed
//! and stripped of angle brackets before validation or storage.

/// Trim `input` and drop every `<` and `>`.
#[must_use]
pub fn text(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Like [`text`], for optional fields. Blank results become `None`.
#[must_use]
pub fn optional_text(input: Option<&str>) -> Option<String> {
    input.map(text).filter(|s| !s.is_empty())
}
