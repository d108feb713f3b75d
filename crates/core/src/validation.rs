//! Promo Code Validation
//!
//! Decides whether a code may be applied to a candidate order for a given user.
//! Rules are checked in a fixed order and the first failure is reported; when
//! several rules fail at once only the highest priority reason is surfaced.
//!
//! Validation never mutates the promo code. Usage counters and the redemption
//! log only change when a checkout commits.

use std::fmt;

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    money::{display_amount, is_negative},
    promo_codes::PromoCode,
};

/// Caller contract violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromoError {
    /// Order totals cannot be negative.
    #[error("order total cannot be negative")]
    NegativeOrderTotal,

    /// The order total is in a different currency from the promo code.
    #[error("order total is not in the promo code's currency")]
    CurrencyMismatch,
}

/// Why a promo code was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    /// The kill switch is off.
    Inactive,

    /// The activity window has not opened yet.
    NotYetValid,

    /// The activity window has closed.
    Expired,

    /// The global usage cap has been reached.
    UsageLimitReached,

    /// The order total is below the code's minimum.
    MinimumOrderNotMet {
        /// Minimum order value in major units, ready for display.
        minimum: String,
    },

    /// The user has used the code as often as allowed.
    PerUserLimitReached,
}

impl InvalidReason {
    /// Stable snake-case identifier, used for metrics and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::NotYetValid => "not_yet_valid",
            Self::Expired => "expired",
            Self::UsageLimitReached => "usage_limit_reached",
            Self::MinimumOrderNotMet { .. } => "minimum_order_not_met",
            Self::PerUserLimitReached => "per_user_limit_reached",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => f.write_str("This promo code is no longer active."),
            Self::NotYetValid => f.write_str("This promo code is not yet valid."),
            Self::Expired => f.write_str("This promo code has expired."),
            Self::UsageLimitReached => {
                f.write_str("This promo code has reached its usage limit.")
            }
            Self::MinimumOrderNotMet { minimum } => {
                write!(f, "Minimum order value of {minimum} required.")
            }
            Self::PerUserLimitReached => f.write_str(
                "You have already used this promo code the maximum number of times.",
            ),
        }
    }
}

/// Outcome of validating a promo code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromoValidation {
    /// The code may be applied.
    Valid,

    /// The code may not be applied.
    Invalid(InvalidReason),
}

impl PromoValidation {
    /// Whether the code may be applied.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// User-facing rejection message, if any.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason.to_string()),
        }
    }

    /// Convert into a `Result`, rejections becoming the error.
    ///
    /// # Errors
    ///
    /// Returns the [`InvalidReason`] when the code was rejected.
    pub fn into_result(self) -> Result<(), InvalidReason> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(reason) => Err(reason),
        }
    }
}

/// Validate `promo` for `user` (absent for guests) against `order_total`,
/// reading the wall clock once.
///
/// # Errors
///
/// See [`validate_at`].
pub fn validate(
    promo: &PromoCode<'_>,
    user: Option<Uuid>,
    order_total: &Money<'_, Currency>,
) -> Result<PromoValidation, PromoError> {
    validate_at(promo, user, order_total, Timestamp::now())
}

/// Validate `promo` as of `now`.
///
/// # Errors
///
/// - [`PromoError::NegativeOrderTotal`]: `order_total` is below zero.
/// - [`PromoError::CurrencyMismatch`]: `order_total` cannot be compared with
///   the code's amounts.
pub fn validate_at(
    promo: &PromoCode<'_>,
    user: Option<Uuid>,
    order_total: &Money<'_, Currency>,
    now: Timestamp,
) -> Result<PromoValidation, PromoError> {
    if is_negative(order_total) {
        return Err(PromoError::NegativeOrderTotal);
    }

    if !promo.accepts_currency(order_total) {
        return Err(PromoError::CurrencyMismatch);
    }

    Ok(first_failure(promo, user, order_total, now)
        .map_or(PromoValidation::Valid, PromoValidation::Invalid))
}

fn first_failure(
    promo: &PromoCode<'_>,
    user: Option<Uuid>,
    order_total: &Money<'_, Currency>,
    now: Timestamp,
) -> Option<InvalidReason> {
    if !promo.active {
        return Some(InvalidReason::Inactive);
    }

    if promo.window.not_yet_open(now) {
        return Some(InvalidReason::NotYetValid);
    }

    if promo.window.closed(now) {
        return Some(InvalidReason::Expired);
    }

    if promo.usage.exhausted() {
        return Some(InvalidReason::UsageLimitReached);
    }

    if let Some(minimum) = &promo.min_order_value
        && order_total.to_minor_units() < minimum.to_minor_units()
    {
        return Some(InvalidReason::MinimumOrderNotMet {
            minimum: display_amount(minimum),
        });
    }

    // Guests cannot be tracked, so they always pass the per-user check.
    if let Some(user) = user
        && promo
            .usage
            .user_exhausted(promo.redeemed_by.count_for(&user))
    {
        return Some(InvalidReason::PerUserLimitReached);
    }

    None
}
