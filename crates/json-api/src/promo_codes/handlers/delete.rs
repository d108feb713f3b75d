//! Delete Promo Code Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, promo_codes::errors::into_status_error, state::State};

/// Delete Promo Code Handler
///
/// Soft-deletes the code; its redemptions are kept.
#[endpoint(
    tags("admin"),
    summary = "Delete Promo Code",
    security(("admin_session" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Promo code deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Promo code not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    uuid: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .promo_codes
        .delete_promo_code(uuid.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}
