//! Passwords chosen at registration.

use anyhow::{bail, Result};
use zxcvbn::{zxcvbn, Score};

use crate::utils::validation::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

static MIN_SCORE: Score = Score::Three;

/// A password strong enough to be stored. Never displayed nor serialized.
pub struct PasswordInput(String);

impl PasswordInput {
    /// Checks length, similarity with the user's own data, and the
    /// zxcvbn entropy estimate.
    pub fn new(password: &str, user_inputs: &[&str]) -> Result<Self> {
        let length = password.chars().count();
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
            bail!(
                "Password must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH} characters long"
            );
        }

        if user_inputs
            .iter()
            .any(|input| password.eq_ignore_ascii_case(input))
        {
            bail!("Password must be different from your personal data");
        }

        let estimate = zxcvbn(password, user_inputs);
        if estimate.score() < MIN_SCORE {
            let hint = estimate
                .feedback()
                .and_then(|feedback| feedback.warning())
                .map(|warning| format!(": {warning}"))
                .unwrap_or_default();
            bail!("Password is too easy to guess{hint}");
        }

        Ok(Self(password.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
