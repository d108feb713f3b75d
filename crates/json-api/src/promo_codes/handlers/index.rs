//! Promo Code Index Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    promo_codes::{errors::into_status_error, responses::PromoCodesResponse},
    state::State,
};

/// Promo Code Index Handler
///
/// Returns every live promo code, ordered by code.
#[endpoint(
    tags("admin"),
    summary = "List Promo Codes",
    security(("admin_session" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<PromoCodesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let promo_codes = state
        .app
        .promo_codes
        .list_promo_codes()
        .await
        .map_err(into_status_error)?;

    Ok(Json(PromoCodesResponse {
        promo_codes: promo_codes.into_iter().map(Into::into).collect(),
    }))
}
