//! Promo Code Names

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Longest code accepted, in characters.
pub const MAX_CODE_LENGTH: usize = 64;

/// Errors raised while parsing a promo code name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeNameError {
    /// Nothing left after trimming.
    #[error("promo code cannot be empty")]
    Empty,

    /// Longer than [`MAX_CODE_LENGTH`].
    #[error("promo code cannot be longer than 64 characters")]
    TooLong,

    /// Contains inner whitespace or control characters.
    #[error("promo code may only contain printable characters without spaces")]
    InvalidCharacter,
}

/// Canonical promo code: trimmed and upper-cased.
///
/// Codes are matched case-insensitively, so every lookup and every stored code
/// goes through [`PromoCodeName::parse`] and compares canonical forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PromoCodeName(String);

impl PromoCodeName {
    /// Canonicalise a user or admin supplied code.
    ///
    /// # Errors
    ///
    /// - [`CodeNameError::Empty`]: the code is blank.
    /// - [`CodeNameError::TooLong`]: the code exceeds [`MAX_CODE_LENGTH`].
    /// - [`CodeNameError::InvalidCharacter`]: the code contains whitespace or
    ///   control characters after trimming.
    pub fn parse(raw: &str) -> Result<Self, CodeNameError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(CodeNameError::Empty);
        }

        if trimmed.chars().count() > MAX_CODE_LENGTH {
            return Err(CodeNameError::TooLong);
        }

        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(CodeNameError::InvalidCharacter);
        }

        Ok(Self(trimmed.to_uppercase()))
    }

    /// Canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the canonical string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for PromoCodeName {
    type Err = CodeNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for PromoCodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PromoCodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_trims_and_uppercases() -> TestResult {
        let code = PromoCodeName::parse("  marble10 ")?;

        assert_eq!(code.as_str(), "MARBLE10");

        Ok(())
    }

    #[test]
    fn differently_cased_codes_are_equal() -> TestResult {
        assert_eq!(
            PromoCodeName::parse("Diwali-25")?,
            PromoCodeName::parse("DIWALI-25")?
        );

        Ok(())
    }

    #[test]
    fn blank_code_is_rejected() {
        assert_eq!(PromoCodeName::parse("   "), Err(CodeNameError::Empty));
    }

    #[test]
    fn inner_whitespace_is_rejected() {
        assert_eq!(
            PromoCodeName::parse("SPRING SALE"),
            Err(CodeNameError::InvalidCharacter)
        );
    }

    #[test]
    fn overlong_code_is_rejected() {
        let raw = "A".repeat(MAX_CODE_LENGTH + 1);

        assert_eq!(PromoCodeName::parse(&raw), Err(CodeNameError::TooLong));
    }

    #[test]
    fn from_str_matches_parse() -> TestResult {
        let code: PromoCodeName = "welcome".parse()?;

        assert_eq!(code.to_string(), "WELCOME");

        Ok(())
    }
}
