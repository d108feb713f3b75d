//! Update Promo Code Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use tracing::{field, info};
use uuid::Uuid;

use chisel_app::domain::promo_codes::data::PromoCodeUpdate;

use crate::{
    extensions::*,
    promo_codes::{
        errors::into_status_error, requests::PromoCodeRequest, responses::PromoCodeResponse,
    },
    state::State,
};

/// Update Promo Code Handler
///
/// Replaces the code's definition. Redemption counts are kept.
#[endpoint(
    tags("admin"),
    summary = "Update Promo Code",
    security(("admin_session" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promo code updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Promo code not found"),
        (status_code = StatusCode::CONFLICT, description = "Another promo code uses this code"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "promo_codes.update",
    skip(uuid, json, depot),
    fields(promo_code_uuid = field::Empty),
    err
)]
pub(crate) async fn handler(
    uuid: PathParam<Uuid>,
    json: JsonBody<PromoCodeRequest>,
    depot: &mut Depot,
) -> Result<Json<PromoCodeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let uuid = uuid.into_inner();

    tracing::Span::current().record("promo_code_uuid", field::display(uuid));

    let update = PromoCodeUpdate::try_from(json.into_inner())?;

    let record = state
        .app
        .promo_codes
        .update_promo_code(uuid.into(), update)
        .await
        .map_err(into_status_error)?;

    info!(code = %record.code, active = record.active, "updated promo code");

    Ok(Json(record.into()))
}
