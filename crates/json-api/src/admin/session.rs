//! Admin Login / Logout Handlers

use std::sync::Arc;

use salvo::{
    http::cookie::{Cookie, SameSite},
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{admin::ADMIN_COOKIE, extensions::*, state::State};

/// Admin Login Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginRequest {
    pub password: String,
}

/// Admin Login Handler
///
/// Sets the admin session cookie when the password matches.
#[endpoint(
    tags("admin"),
    summary = "Admin Login",
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Logged in"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Wrong password"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
pub(crate) async fn login(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    if !state.admin.accepts_password(&json.into_inner().password) {
        warn!("rejected admin login");

        return Err(StatusError::unauthorized().brief("Wrong password"));
    }

    res.add_cookie(
        Cookie::build((ADMIN_COOKIE, state.admin.digest().to_owned()))
            .path("/")
            .http_only(true)
            .secure(state.admin.secure_cookie())
            .same_site(SameSite::Strict)
            .build(),
    );

    info!("admin logged in");

    Ok(StatusCode::NO_CONTENT)
}

/// Admin Logout Handler
#[endpoint(
    tags("admin"),
    summary = "Admin Logout",
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Logged out"),
    ),
)]
pub(crate) async fn logout(res: &mut Response) -> StatusCode {
    let mut cookie = Cookie::build((ADMIN_COOKIE, "")).path("/").http_only(true).build();

    cookie.make_removal();

    res.add_cookie(cookie);

    StatusCode::NO_CONTENT
}
