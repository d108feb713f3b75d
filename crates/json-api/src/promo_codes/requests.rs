//! Promo Code Request Payloads

use chisel::{codes::PromoCodeName, promo_codes::DiscountKind};
use jiff::Timestamp;
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chisel_app::domain::promo_codes::data::{PromoCodeDetails, PromoDiscount};

use crate::extensions::*;

/// Promo code definition, shared by create and update.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PromoCodeRequest {
    /// Client-chosen identifier; generated when absent. Ignored on update.
    #[serde(default)]
    pub uuid: Option<Uuid>,

    /// Code customers type at checkout, matched case-insensitively
    pub code: String,

    /// `percentage` or `flat`
    #[serde(rename = "type")]
    pub discount_type: String,

    /// Percentage points, or flat amount in minor units
    pub value: u64,

    /// Cap on percentage discounts, in minor units
    #[serde(default)]
    pub max_discount: Option<u64>,

    /// Smallest qualifying order total, in minor units
    #[serde(default)]
    pub min_order_value: Option<u64>,

    /// RFC 3339 instant the code opens
    #[serde(default)]
    pub valid_from: Option<String>,

    /// RFC 3339 instant the code closes
    #[serde(default)]
    pub valid_until: Option<String>,

    /// Total redemptions allowed
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Redemptions allowed per signed-in customer
    #[serde(default)]
    pub per_user_limit: Option<u32>,

    #[serde(default)]
    pub description: String,

    /// Defaults to `true`
    #[serde(default)]
    pub active: Option<bool>,
}

impl TryFrom<PromoCodeRequest> for PromoCodeDetails {
    type Error = StatusError;

    fn try_from(request: PromoCodeRequest) -> Result<Self, Self::Error> {
        let code = PromoCodeName::parse(&request.code).or_400("Invalid promo code")?;

        let kind = request
            .discount_type
            .parse::<DiscountKind>()
            .or_400("type must be percentage or flat")?;

        let discount = match kind {
            DiscountKind::Percentage => PromoDiscount::Percentage {
                percentage: u16::try_from(request.value)
                    .or_400("percentage must be between 0 and 100")?,
                max_discount: request.max_discount,
            },
            DiscountKind::Flat if request.max_discount.is_some() => {
                return Err(
                    StatusError::bad_request().brief("max_discount only applies to percentages")
                );
            }
            DiscountKind::Flat => PromoDiscount::Flat {
                amount: request.value,
            },
        };

        Ok(PromoCodeDetails {
            code,
            discount,
            min_order_value: request.min_order_value,
            valid_from: parse_instant(request.valid_from.as_deref())?,
            valid_until: parse_instant(request.valid_until.as_deref())?,
            usage_limit: request.usage_limit,
            per_user_limit: request.per_user_limit,
            description: request.description.trim().to_owned(),
            active: request.active.unwrap_or(true),
        })
    }
}

fn parse_instant(raw: Option<&str>) -> Result<Option<Timestamp>, StatusError> {
    raw.map(str::parse::<Timestamp>)
        .transpose()
        .or_400("valid_from and valid_until must be RFC 3339 timestamps")
}

/// Promo code application request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyPromoRequest {
    pub code: String,

    /// Signed-in customer, if any. Guests skip per-customer limits.
    #[serde(default)]
    pub user_uuid: Option<Uuid>,

    /// Cart total in minor units
    pub order_total: i64,
}

/// Redemption request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RedeemPromoRequest {
    #[serde(default)]
    pub user_uuid: Option<Uuid>,

    /// Order total in minor units
    pub order_total: i64,

    /// Order the discount was applied to; one redemption per code and order
    pub order_reference: String,
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;
    use testresult::TestResult;

    use super::*;

    fn request(discount_type: &str, value: u64) -> PromoCodeRequest {
        PromoCodeRequest {
            uuid: None,
            code: " diwali ".to_string(),
            discount_type: discount_type.to_string(),
            value,
            max_discount: None,
            min_order_value: Some(100_000),
            valid_from: None,
            valid_until: Some("2026-11-30T23:59:59Z".to_string()),
            usage_limit: Some(500),
            per_user_limit: Some(1),
            description: "  Festival offer ".to_string(),
            active: None,
        }
    }

    #[test]
    fn percentage_request_becomes_details() -> TestResult {
        let mut request = request("percentage", 15);

        request.max_discount = Some(50_000);

        let details = PromoCodeDetails::try_from(request)?;

        assert_eq!(details.code.as_str(), "DIWALI");
        assert_eq!(
            details.discount,
            PromoDiscount::Percentage {
                percentage: 15,
                max_discount: Some(50_000)
            }
        );
        assert_eq!(details.valid_until, Some("2026-11-30T23:59:59Z".parse::<Timestamp>()?));
        assert_eq!(details.description, "Festival offer");
        assert!(details.active, "codes default to active");

        Ok(())
    }

    #[test]
    fn flat_request_becomes_details() -> TestResult {
        let details = PromoCodeDetails::try_from(request("FLAT", 25_000))?;

        assert_eq!(details.discount, PromoDiscount::Flat { amount: 25_000 });

        Ok(())
    }

    #[test]
    fn flat_with_cap_is_rejected() {
        let mut request = request("flat", 25_000);

        request.max_discount = Some(10);

        let result = PromoCodeDetails::try_from(request);

        assert_eq!(
            result.err().map(|e| e.code),
            Some(StatusCode::BAD_REQUEST)
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result = PromoCodeDetails::try_from(request("bogo", 1));

        assert_eq!(
            result.err().map(|e| e.brief),
            Some("type must be percentage or flat".to_string())
        );
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        let mut request = request("flat", 1);

        request.valid_from = Some("next tuesday".to_string());

        assert!(
            PromoCodeDetails::try_from(request).is_err(),
            "malformed timestamp accepted"
        );
    }

    #[test]
    fn huge_percentage_is_rejected() {
        assert!(
            PromoCodeDetails::try_from(request("percentage", 70_000)).is_err(),
            "percentage beyond u16 accepted"
        );
    }
}
