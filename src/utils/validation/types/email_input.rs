//! Email addresses used as login identifiers.
//!
//! Addresses are trimmed and lower-cased before being stored, so that the
//! uniqueness constraint on `users.email` cannot be bypassed by casing.

use anyhow::{bail, Result};
use std::fmt;
use validator::ValidateEmail;

use crate::utils::validation::MAX_EMAIL_LENGTH;

/// An email address in HTML5 format, normalized to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailInput {
    email: String,
}

impl EmailInput {
    pub fn new(email: &str) -> Result<Self> {
        let email = email.trim();

        if email.is_empty() {
            bail!("Email address cannot be empty");
        }

        if email.len() > MAX_EMAIL_LENGTH {
            bail!("Email address exceeds maximum length of {MAX_EMAIL_LENGTH} characters");
        }

        if !email.validate_email() {
            bail!("Invalid email format");
        }

        Ok(Self {
            email: email.to_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.email
    }

    /// The part before the `@`, checked against when choosing a password
    pub fn local_part(&self) -> &str {
        self.email
            .split_once('@')
            .map(|(local, _)| local)
            .unwrap_or(&self.email)
    }
}

impl fmt::Display for EmailInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

impl AsRef<str> for EmailInput {
    fn as_ref(&self) -> &str {
        &self.email
    }
}
