//! Redeem Promo Code Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use tracing::info;

use chisel::codes::PromoCodeName;
use chisel_app::domain::promo_codes::{
    PromoCodesServiceError,
    data::{NewRedemption, RedemptionOutcome},
};

use crate::{
    extensions::*,
    observability::record_promo_outcome,
    promo_codes::{
        errors::into_status_error,
        requests::RedeemPromoRequest,
        responses::{MessageResponse, RedemptionResponse},
    },
    state::State,
};

/// Redeem Promo Code Handler
///
/// Records that an order used a code. The code is revalidated and its usage
/// counter bumped in one transaction, so the last slot of a limited code is
/// handed out once.
#[endpoint(
    tags("admin"),
    summary = "Redeem Promo Code",
    security(("admin_session" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Redemption recorded", body = RedemptionResponse),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown code"),
        (status_code = StatusCode::CONFLICT, description = "Order already redeemed this code"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Code no longer applies", body = MessageResponse),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    code: PathParam<String>,
    json: JsonBody<RedeemPromoRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = Arc::clone(depot.obtain_or_500::<Arc<State>>()?);
    let request = json.into_inner();

    let code = PromoCodeName::parse(&code.into_inner())
        .map_err(|_invalid| StatusError::not_found().brief("Promo code not found"))?;

    let order_reference = request.order_reference.trim().to_owned();

    if order_reference.is_empty() {
        return Err(StatusError::bad_request().brief("order_reference is required"));
    }

    let outcome = state
        .app
        .promo_codes
        .redeem_promo_code(NewRedemption {
            code,
            user_uuid: request.user_uuid,
            order_total: request.order_total,
            order_reference,
        })
        .await
        .map_err(|error| match error {
            PromoCodesServiceError::AlreadyExists => {
                StatusError::conflict().brief("This order has already redeemed the promo code")
            }
            other => into_status_error(other),
        })?;

    match outcome {
        RedemptionOutcome::Redeemed {
            redemption,
            promo_code,
        } => {
            record_promo_outcome(depot, "redeemed");

            info!(
                code = %promo_code.code,
                order_reference = %redemption.order_reference,
                "recorded promo redemption"
            );

            res.status_code(StatusCode::CREATED)
                .render(Json(RedemptionResponse::new(redemption, promo_code)));
        }
        RedemptionOutcome::Rejected(reason) => {
            record_promo_outcome(depot, reason.as_str());

            res.status_code(StatusCode::UNPROCESSABLE_ENTITY)
                .render(Json(MessageResponse::new(reason.to_string())));
        }
    }

    Ok(())
}
