//! Discounts
//!
//! Computes the money taken off an order by a promo code that has already
//! passed validation. Amounts are worked in the currency's minor units and
//! rounded half away from zero.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    money::{is_negative, same_currency},
    promo_codes::{CodeDiscount, PromoCode},
};

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Order totals cannot be negative.
    #[error("order total cannot be negative")]
    NegativeOrderTotal,

    /// The order total is in a different currency from the promo code.
    #[error("order total is not in the promo code's currency")]
    CurrencyMismatch,

    /// The promo code carries a percentage outside `0..=100`.
    #[error("percentage must be between 0 and 100, got {0}")]
    PercentageOutOfRange(Decimal),

    /// The promo code carries a negative amount.
    #[error("promo code amounts cannot be negative")]
    NegativeAmount,

    /// Percentage calculation could not be safely represented.
    #[error("percentage conversion overflowed")]
    PercentConversion,
}

/// Money taken off `order_total` by `promo`.
///
/// The result is never negative and never exceeds `order_total`. No validation
/// rules are re-checked here.
///
/// # Errors
///
/// - [`DiscountError::NegativeOrderTotal`]: `order_total` is below zero.
/// - [`DiscountError::CurrencyMismatch`]: `order_total` is in a different
///   currency from the code's amounts.
/// - [`DiscountError::PercentageOutOfRange`] / [`DiscountError::NegativeAmount`]:
///   the promo code was built around its constructors with malformed values.
/// - [`DiscountError::PercentConversion`]: the percentage could not be applied
///   without overflowing.
pub fn calculate_discount<'a>(
    promo: &PromoCode<'a>,
    order_total: &Money<'a, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    if is_negative(order_total) {
        return Err(DiscountError::NegativeOrderTotal);
    }

    let total_minor = order_total.to_minor_units();

    let discount_minor = match &promo.discount {
        CodeDiscount::Percentage {
            points,
            max_discount,
        } => {
            if points.is_sign_negative() || *points > Decimal::ONE_HUNDRED {
                return Err(DiscountError::PercentageOutOfRange(*points));
            }

            let raw = percent_of_minor(*points, total_minor)?;

            match max_discount {
                Some(cap) => raw.min(cap_minor(cap, order_total)?),
                None => raw,
            }
        }
        CodeDiscount::Flat(amount) => cap_minor(amount, order_total)?,
    };

    Ok(Money::from_minor(
        discount_minor.clamp(0, total_minor),
        order_total.currency(),
    ))
}

/// Order total left to pay after applying `promo`.
///
/// # Errors
///
/// Same as [`calculate_discount`].
pub fn discounted_total<'a>(
    promo: &PromoCode<'a>,
    order_total: &Money<'a, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let discount = calculate_discount(promo, order_total)?;

    Ok(Money::from_minor(
        order_total.to_minor_units() - discount.to_minor_units(),
        order_total.currency(),
    ))
}

/// Minor units of a promo code amount, checked against the order's currency.
fn cap_minor(
    amount: &Money<'_, Currency>,
    order_total: &Money<'_, Currency>,
) -> Result<i64, DiscountError> {
    if !same_currency(amount, order_total) {
        return Err(DiscountError::CurrencyMismatch);
    }

    if is_negative(amount) {
        return Err(DiscountError::NegativeAmount);
    }

    Ok(amount.to_minor_units())
}

/// `points` percent of `minor`, rounded to a whole minor unit.
fn percent_of_minor(points: Decimal, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    points
        .checked_mul(minor)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}
