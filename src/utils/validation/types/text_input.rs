//! Free text coming from users: names, titles, notes, diagnoses.
//!
//! Content is trimmed, bounded in length, free of control characters and
//! HTML, and NFKC-normalized so that lookalike characters compare equal.

use ammonia::is_html;
use anyhow::{bail, Context, Result};
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use validator::ValidateNonControlCharacter;

use crate::utils::validation::{MAX_CONTENT_LENGTH, MAX_SHORT_CONTENT_LENGTH};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextInput {
    text_content: String,
}

impl TextInput {
    /// Notes, descriptions, biographies
    pub fn new_long_form(content: &str) -> Result<Self> {
        Self::new(content, MAX_CONTENT_LENGTH).context("Invalid long text")
    }

    /// Names, titles, dosages and other one-liners
    pub fn new_short_form(content: &str) -> Result<Self> {
        Self::new(content, MAX_SHORT_CONTENT_LENGTH).context("Invalid short text")
    }

    /// Optional long text: absent or blank gives None, anything else must validate
    pub fn optional_long_form(content: Option<&str>) -> Result<Option<Self>> {
        match content.map(str::trim) {
            None | Some("") => Ok(None),
            Some(content) => Self::new_long_form(content).map(Some),
        }
    }

    /// Optional short text, same rules as [`TextInput::optional_long_form`]
    pub fn optional_short_form(content: Option<&str>) -> Result<Option<Self>> {
        match content.map(str::trim) {
            None | Some("") => Ok(None),
            Some(content) => Self::new_short_form(content).map(Some),
        }
    }

    fn new(content: &str, max_length: usize) -> Result<Self> {
        let trimmed = content.trim();

        if trimmed.is_empty() {
            bail!("Content cannot be empty");
        }

        if trimmed.chars().count() > max_length {
            bail!("Content exceeds maximum length of {} characters", max_length);
        }

        if !trimmed.validate_non_control_character() {
            bail!("Content contains invalid control characters");
        }

        if is_html(trimmed) {
            bail!("Content cannot contain HTML");
        }

        Ok(Self {
            text_content: trimmed.nfkc().collect(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text_content
    }

    pub fn into_string(self) -> String {
        self.text_content
    }
}

impl fmt::Display for TextInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text_content)
    }
}

impl AsRef<str> for TextInput {
    fn as_ref(&self) -> &str {
        &self.text_content
    }
}
