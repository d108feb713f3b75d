//! Promo Code Response Payloads

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chisel_app::domain::promo_codes::{
    data::AppliedPromo,
    records::{PromoCodeRecord, RedemptionRecord},
};

/// Error body for customer-facing promo outcomes.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A code that applies to the submitted cart.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyPromoResponse {
    pub code: String,

    /// `percentage` or `flat`
    #[serde(rename = "type")]
    pub discount_type: String,

    /// Percentage points, or flat amount in minor units
    pub value: u64,

    /// Amount taken off the order, in minor units
    pub discount: u64,

    pub description: String,

    pub order_total: u64,

    pub total_after_discount: u64,

    /// ISO 4217 code of every amount above
    pub currency: String,
}

impl ApplyPromoResponse {
    pub(crate) fn new(applied: AppliedPromo, currency: &str) -> Self {
        let total_after_discount = applied.total_after_discount();

        Self {
            code: applied.promo_code.code,
            discount_type: applied.promo_code.discount_type.as_str().to_owned(),
            value: applied.promo_code.discount_value,
            discount: applied.discount,
            description: applied.promo_code.description,
            order_total: applied.order_total,
            total_after_discount,
            currency: currency.to_owned(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PromoCodeResponse {
    pub uuid: Uuid,
    pub code: String,
    #[serde(rename = "type")]
    pub discount_type: String,
    pub value: u64,
    pub max_discount: Option<u64>,
    pub min_order_value: Option<u64>,
    pub valid_from: Option<String>,
    pub valid_until: Option<String>,
    pub usage_limit: Option<u32>,
    pub usage_count: u32,
    pub per_user_limit: Option<u32>,
    pub description: String,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PromoCodeRecord> for PromoCodeResponse {
    fn from(record: PromoCodeRecord) -> Self {
        Self {
            uuid: record.uuid.into(),
            code: record.code,
            discount_type: record.discount_type.as_str().to_owned(),
            value: record.discount_value,
            max_discount: record.max_discount,
            min_order_value: record.min_order_value,
            valid_from: record.valid_from.as_ref().map(ToString::to_string),
            valid_until: record.valid_until.as_ref().map(ToString::to_string),
            usage_limit: record.usage_limit,
            usage_count: record.usage_count,
            per_user_limit: record.per_user_limit,
            description: record.description,
            active: record.active,
            created_at: record.created_at.to_string(),
            updated_at: record.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PromoCodesResponse {
    pub promo_codes: Vec<PromoCodeResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RedemptionResponse {
    pub uuid: Uuid,
    pub code: String,
    pub user_uuid: Option<Uuid>,
    pub order_reference: String,
    pub order_total: u64,
    pub discount: u64,
    pub usage_count: u32,
    pub created_at: String,
}

impl RedemptionResponse {
    pub(crate) fn new(redemption: RedemptionRecord, promo_code: PromoCodeRecord) -> Self {
        Self {
            uuid: redemption.uuid.into(),
            code: promo_code.code,
            user_uuid: redemption.user_uuid,
            order_reference: redemption.order_reference,
            order_total: redemption.order_total,
            discount: redemption.discount,
            usage_count: promo_code.usage_count,
            created_at: redemption.created_at.to_string(),
        }
    }
}
