//! Promo Code Records

use chisel::{
    codes::PromoCodeName,
    promo_codes::{ActivityWindow, CodeDiscount, DiscountKind, PromoCode, UsageLimits},
    redemptions::RedemptionLog,
};
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use uuid::Uuid;

use crate::{domain::promo_codes::PromoCodesServiceError, uuids::TypedUuid};

/// Promo Code UUID
pub type PromoCodeUuid = TypedUuid<PromoCodeRecord>;

/// Redemption UUID
pub type RedemptionUuid = TypedUuid<RedemptionRecord>;

/// Promo Code Record
///
/// Amounts are minor units of the store currency. For percentage codes
/// `discount_value` holds whole percentage points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoCodeRecord {
    pub uuid: PromoCodeUuid,
    pub code: String,
    pub discount_type: DiscountKind,
    pub discount_value: u64,
    pub max_discount: Option<u64>,
    pub min_order_value: Option<u64>,
    pub valid_from: Option<Timestamp>,
    pub valid_until: Option<Timestamp>,
    pub usage_limit: Option<u32>,
    pub usage_count: u32,
    pub per_user_limit: Option<u32>,
    pub description: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl PromoCodeRecord {
    /// Engine view of this record, priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored values no longer satisfy the engine's
    /// invariants or do not fit in the currency's minor units.
    pub fn to_promo_code(
        &self,
        currency: &'static Currency,
        redeemed_by: RedemptionLog,
    ) -> Result<PromoCode<'static>, PromoCodesServiceError> {
        let discount = match self.discount_type {
            DiscountKind::Percentage => CodeDiscount::percentage(
                Decimal::from(self.discount_value),
                self.max_discount
                    .map(|cap| minor_money(cap, currency))
                    .transpose()?,
            )?,
            DiscountKind::Flat => CodeDiscount::flat(minor_money(self.discount_value, currency)?)?,
        };

        let mut promo = PromoCode::new(PromoCodeName::parse(&self.code)?, discount)
            .with_window(ActivityWindow::new(self.valid_from, self.valid_until)?)
            .with_usage(UsageLimits {
                usage_limit: self.usage_limit,
                usage_count: self.usage_count,
                per_user_limit: self.per_user_limit,
            })
            .with_redemptions(redeemed_by)
            .with_description(self.description.clone())
            .with_active(self.active);

        if let Some(minimum) = self.min_order_value {
            promo = promo.with_min_order_value(minor_money(minimum, currency)?)?;
        }

        Ok(promo)
    }
}

/// Redemption Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionRecord {
    pub uuid: RedemptionUuid,
    pub promo_code_uuid: PromoCodeUuid,
    pub user_uuid: Option<Uuid>,
    pub order_reference: String,
    pub order_total: u64,
    pub discount: u64,
    pub created_at: Timestamp,
}

/// Money from unsigned minor units.
///
/// # Errors
///
/// Returns an error when `minor` does not fit in an `i64`.
pub fn minor_money(
    minor: u64,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PromoCodesServiceError> {
    Ok(Money::from_minor(i64::try_from(minor)?, currency))
}
