//! Promo Codes

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    codes::PromoCodeName,
    money::{is_negative, same_currency},
    redemptions::RedemptionLog,
};

/// Errors raised while building a promo code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromoCodeError {
    /// Percentage outside `0..=100`.
    #[error("percentage must be between 0 and 100, got {0}")]
    PercentageOutOfRange(Decimal),

    /// Flat discounts must take something off.
    #[error("flat discount must be greater than zero")]
    NonPositiveFlatAmount,

    /// Caps and minimums cannot be negative.
    #[error("{0} cannot be negative")]
    NegativeAmount(&'static str),

    /// Amounts on one code must share a currency.
    #[error("{0} is not in the promo code's currency")]
    CurrencyMismatch(&'static str),

    /// `valid_from` is after `valid_until`.
    #[error("validity window starts after it ends")]
    InvertedWindow,

    /// Unrecognised discount type name.
    #[error("unknown discount type {0:?}")]
    UnknownDiscountKind(String),
}

/// How a promo code's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscountKind {
    /// `value` is percentage points of the order total.
    Percentage,

    /// `value` is a fixed currency amount.
    Flat,
}

impl DiscountKind {
    /// Stable lowercase name used in storage and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Flat => "flat",
        }
    }
}

impl FromStr for DiscountKind {
    type Err = PromoCodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "percentage" => Ok(Self::Percentage),
            "flat" => Ok(Self::Flat),
            _ => Err(PromoCodeError::UnknownDiscountKind(value.to_string())),
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The discount a promo code grants.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeDiscount<'a> {
    /// Percentage of the order total, optionally capped.
    Percentage {
        /// Percentage points, `0..=100`.
        points: Decimal,

        /// Largest discount this code may grant.
        max_discount: Option<Money<'a, Currency>>,
    },

    /// Fixed amount off, never more than the order total.
    Flat(Money<'a, Currency>),
}

impl<'a> CodeDiscount<'a> {
    /// Percentage discount.
    ///
    /// # Errors
    ///
    /// - [`PromoCodeError::PercentageOutOfRange`]: `points` is outside `0..=100`.
    /// - [`PromoCodeError::NegativeAmount`]: `max_discount` is negative.
    pub fn percentage(
        points: Decimal,
        max_discount: Option<Money<'a, Currency>>,
    ) -> Result<Self, PromoCodeError> {
        if points.is_sign_negative() || points > Decimal::ONE_HUNDRED {
            return Err(PromoCodeError::PercentageOutOfRange(points));
        }

        if max_discount.as_ref().is_some_and(is_negative) {
            return Err(PromoCodeError::NegativeAmount("max discount"));
        }

        Ok(Self::Percentage {
            points,
            max_discount,
        })
    }

    /// Flat discount.
    ///
    /// # Errors
    ///
    /// Returns [`PromoCodeError::NonPositiveFlatAmount`] unless `amount` is above zero.
    pub fn flat(amount: Money<'a, Currency>) -> Result<Self, PromoCodeError> {
        if amount.to_minor_units() <= 0 {
            return Err(PromoCodeError::NonPositiveFlatAmount);
        }

        Ok(Self::Flat(amount))
    }

    /// Which kind of discount this is.
    #[must_use]
    pub const fn kind(&self) -> DiscountKind {
        match self {
            Self::Percentage { .. } => DiscountKind::Percentage,
            Self::Flat(_) => DiscountKind::Flat,
        }
    }

    /// Currency of the amounts carried by this discount, if any.
    #[must_use]
    pub fn currency(&self) -> Option<&'a Currency> {
        match self {
            Self::Percentage { max_discount, .. } => max_discount.as_ref().map(|cap| cap.currency()),
            Self::Flat(amount) => Some(amount.currency()),
        }
    }
}

/// Inclusive activity window; missing bounds are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityWindow {
    valid_from: Option<Timestamp>,
    valid_until: Option<Timestamp>,
}

impl ActivityWindow {
    /// Window with no bounds.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            valid_from: None,
            valid_until: None,
        }
    }

    /// Window between two optional bounds.
    ///
    /// # Errors
    ///
    /// Returns [`PromoCodeError::InvertedWindow`] when both bounds are set and
    /// `valid_from` is after `valid_until`.
    pub fn new(
        valid_from: Option<Timestamp>,
        valid_until: Option<Timestamp>,
    ) -> Result<Self, PromoCodeError> {
        if let (Some(from), Some(until)) = (valid_from, valid_until)
            && from > until
        {
            return Err(PromoCodeError::InvertedWindow);
        }

        Ok(Self {
            valid_from,
            valid_until,
        })
    }

    /// First instant the code is valid.
    #[must_use]
    pub const fn valid_from(&self) -> Option<Timestamp> {
        self.valid_from
    }

    /// Last instant the code is valid.
    #[must_use]
    pub const fn valid_until(&self) -> Option<Timestamp> {
        self.valid_until
    }

    /// `now` is before the window opens.
    #[must_use]
    pub fn not_yet_open(&self, now: Timestamp) -> bool {
        self.valid_from.is_some_and(|from| now < from)
    }

    /// `now` is after the window closed.
    #[must_use]
    pub fn closed(&self, now: Timestamp) -> bool {
        self.valid_until.is_some_and(|until| now > until)
    }
}

/// Usage caps and the running redemption count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageLimits {
    /// Global redemption cap.
    pub usage_limit: Option<u32>,

    /// Redemptions committed so far.
    pub usage_count: u32,

    /// Per-user redemption cap.
    pub per_user_limit: Option<u32>,
}

impl UsageLimits {
    /// No caps, nothing redeemed.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            usage_limit: None,
            usage_count: 0,
            per_user_limit: None,
        }
    }

    /// Whether the global cap has been reached.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
    }

    /// Whether a user with `redeemed` prior uses has hit the per-user cap.
    #[must_use]
    pub fn user_exhausted(&self, redeemed: u32) -> bool {
        self.per_user_limit.is_some_and(|limit| redeemed >= limit)
    }
}

/// A promo code as seen by the engine: an immutable snapshot of the stored
/// record plus the redemption log consulted for per-user limits.
#[derive(Debug, Clone, PartialEq)]
pub struct PromoCode<'a> {
    /// Canonical code.
    pub code: PromoCodeName,

    /// What the code takes off.
    pub discount: CodeDiscount<'a>,

    /// Smallest order total the code applies to.
    pub min_order_value: Option<Money<'a, Currency>>,

    /// When the code may be used.
    pub window: ActivityWindow,

    /// Caps and running count.
    pub usage: UsageLimits,

    /// Who has redeemed the code.
    pub redeemed_by: RedemptionLog,

    /// Display text.
    pub description: String,

    /// Kill switch.
    pub active: bool,
}

impl<'a> PromoCode<'a> {
    /// Active code with no window, caps, minimum or description.
    #[must_use]
    pub fn new(code: PromoCodeName, discount: CodeDiscount<'a>) -> Self {
        Self {
            code,
            discount,
            min_order_value: None,
            window: ActivityWindow::unbounded(),
            usage: UsageLimits::unlimited(),
            redeemed_by: RedemptionLog::new(),
            description: String::new(),
            active: true,
        }
    }

    /// Require a minimum order total.
    ///
    /// # Errors
    ///
    /// - [`PromoCodeError::NegativeAmount`]: `minimum` is negative.
    /// - [`PromoCodeError::CurrencyMismatch`]: `minimum` is in a different
    ///   currency from the discount amounts.
    pub fn with_min_order_value(
        mut self,
        minimum: Money<'a, Currency>,
    ) -> Result<Self, PromoCodeError> {
        if is_negative(&minimum) {
            return Err(PromoCodeError::NegativeAmount("minimum order value"));
        }

        if self
            .discount
            .currency()
            .is_some_and(|currency| currency != minimum.currency())
        {
            return Err(PromoCodeError::CurrencyMismatch("minimum order value"));
        }

        self.min_order_value = Some(minimum);

        Ok(self)
    }

    /// Restrict the code to an activity window.
    #[must_use]
    pub fn with_window(mut self, window: ActivityWindow) -> Self {
        self.window = window;
        self
    }

    /// Set caps and the running count.
    #[must_use]
    pub fn with_usage(mut self, usage: UsageLimits) -> Self {
        self.usage = usage;
        self
    }

    /// Attach the redemption log.
    #[must_use]
    pub fn with_redemptions(mut self, redeemed_by: RedemptionLog) -> Self {
        self.redeemed_by = redeemed_by;
        self
    }

    /// Set the display text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Switch the code on or off.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Shorthand for `self.discount.kind()`.
    #[must_use]
    pub const fn kind(&self) -> DiscountKind {
        self.discount.kind()
    }

    /// Whether `amount` can be compared against this code's amounts.
    #[must_use]
    pub fn accepts_currency(&self, amount: &Money<'_, Currency>) -> bool {
        let discount_ok = self
            .discount
            .currency()
            .is_none_or(|currency| currency == amount.currency());

        let minimum_ok = self
            .min_order_value
            .as_ref()
            .is_none_or(|minimum| same_currency(minimum, amount));

        discount_ok && minimum_ok
    }
}
