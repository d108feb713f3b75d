//! Toggle Helpful Vote Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{extensions::*, reviews::errors::into_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct HelpfulRequest {
    pub user_uuid: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct HelpfulResponse {
    /// Whether the user's vote is now counted
    pub helpful: bool,
    pub helpful_count: u64,
}

/// Toggle Helpful Vote Handler
///
/// Adds the user's helpful vote, or takes it back if already given.
#[endpoint(
    tags("reviews"),
    summary = "Toggle Helpful Vote",
    responses(
        (status_code = StatusCode::OK, description = "Vote toggled"),
        (status_code = StatusCode::NOT_FOUND, description = "Review not found"),
    ),
)]
pub(crate) async fn handler(
    review: PathParam<Uuid>,
    json: JsonBody<HelpfulRequest>,
    depot: &mut Depot,
) -> Result<Json<HelpfulResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let toggled = state
        .app
        .reviews
        .toggle_helpful(review.into_inner().into(), json.into_inner().user_uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Json(HelpfulResponse {
        helpful: toggled.helpful,
        helpful_count: toggled.helpful_count,
    }))
}
