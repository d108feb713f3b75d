//! Get Promo Code Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    promo_codes::{errors::into_status_error, responses::PromoCodeResponse},
    state::State,
};

/// Get Promo Code Handler
#[endpoint(
    tags("admin"),
    summary = "Get Promo Code",
    security(("admin_session" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promo code"),
        (status_code = StatusCode::NOT_FOUND, description = "Promo code not found"),
    ),
)]
pub(crate) async fn handler(
    uuid: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PromoCodeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let record = state
        .app
        .promo_codes
        .get_promo_code(uuid.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(record.into()))
}
