//! Promo Codes Data

use chisel::{
    codes::PromoCodeName,
    promo_codes::{ActivityWindow, CodeDiscount, DiscountKind, PromoCode, UsageLimits},
    validation::InvalidReason,
};
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use uuid::Uuid;

use crate::domain::promo_codes::{
    PromoCodesServiceError,
    records::{PromoCodeRecord, PromoCodeUuid, RedemptionRecord, minor_money},
};

/// Discount Definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoDiscount {
    /// Whole percentage points off, optionally capped (minor units).
    Percentage {
        percentage: u16,
        max_discount: Option<u64>,
    },

    /// Fixed amount off (minor units).
    Flat { amount: u64 },
}

impl PromoDiscount {
    #[must_use]
    pub const fn kind(&self) -> DiscountKind {
        match self {
            Self::Percentage { .. } => DiscountKind::Percentage,
            Self::Flat { .. } => DiscountKind::Flat,
        }
    }

    /// Value column: percentage points or flat amount.
    #[must_use]
    pub fn value(&self) -> u64 {
        match self {
            Self::Percentage { percentage, .. } => u64::from(*percentage),
            Self::Flat { amount } => *amount,
        }
    }

    #[must_use]
    pub const fn max_discount(&self) -> Option<u64> {
        match self {
            Self::Percentage { max_discount, .. } => *max_discount,
            Self::Flat { .. } => None,
        }
    }
}

/// Editable promo code fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoCodeDetails {
    pub code: PromoCodeName,
    pub discount: PromoDiscount,
    pub min_order_value: Option<u64>,
    pub valid_from: Option<Timestamp>,
    pub valid_until: Option<Timestamp>,
    pub usage_limit: Option<u32>,
    pub per_user_limit: Option<u32>,
    pub description: String,
    pub active: bool,
}

impl PromoCodeDetails {
    /// Active code with no limits.
    #[must_use]
    pub fn new(code: PromoCodeName, discount: PromoDiscount) -> Self {
        Self {
            code,
            discount,
            min_order_value: None,
            valid_from: None,
            valid_until: None,
            usage_limit: None,
            per_user_limit: None,
            description: String::new(),
            active: true,
        }
    }

    /// Check the details build a well-formed promo code before they are stored.
    ///
    /// # Errors
    ///
    /// Returns the first invariant the details break.
    pub fn check(&self, currency: &'static Currency) -> Result<(), PromoCodesServiceError> {
        let discount = match self.discount {
            PromoDiscount::Percentage {
                percentage,
                max_discount,
            } => CodeDiscount::percentage(
                Decimal::from(percentage),
                max_discount
                    .map(|cap| minor_money(cap, currency))
                    .transpose()?,
            )?,
            PromoDiscount::Flat { amount } => CodeDiscount::flat(minor_money(amount, currency)?)?,
        };

        let promo = PromoCode::new(self.code.clone(), discount)
            .with_window(ActivityWindow::new(self.valid_from, self.valid_until)?)
            .with_usage(UsageLimits {
                usage_limit: self.usage_limit,
                usage_count: 0,
                per_user_limit: self.per_user_limit,
            });

        if let Some(minimum) = self.min_order_value {
            promo.with_min_order_value(minor_money(minimum, currency)?)?;
        }

        Ok(())
    }
}

/// New Promo Code Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPromoCode {
    pub uuid: PromoCodeUuid,
    pub details: PromoCodeDetails,
}

/// Promo Code Update Data
///
/// Replaces every editable field. Usage counters are left alone.
pub type PromoCodeUpdate = PromoCodeDetails;

/// A code that passed validation, with the discount it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPromo {
    pub promo_code: PromoCodeRecord,
    pub order_total: u64,
    pub discount: u64,
}

impl AppliedPromo {
    #[must_use]
    pub const fn total_after_discount(&self) -> u64 {
        self.order_total.saturating_sub(self.discount)
    }
}

/// Outcome of evaluating a code against an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromoEvaluation {
    Applied(AppliedPromo),
    Rejected(InvalidReason),
}

/// Redemption request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRedemption {
    pub code: PromoCodeName,
    pub user_uuid: Option<Uuid>,
    pub order_total: i64,
    pub order_reference: String,
}

/// Outcome of committing a redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionOutcome {
    Redeemed {
        redemption: RedemptionRecord,
        promo_code: PromoCodeRecord,
    },
    Rejected(InvalidReason),
}
