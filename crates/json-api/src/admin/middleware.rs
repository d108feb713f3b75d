//! Admin session middleware.

use std::sync::Arc;

use salvo::prelude::*;

use crate::{admin::ADMIN_COOKIE, state::State};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(digest) = req.cookie(ADMIN_COOKIE).map(|cookie| cookie.value().to_owned()) else {
        res.render(StatusError::unauthorized().brief("Admin login required"));

        return;
    };

    let state = match depot.obtain::<Arc<State>>() {
        Ok(state) => state,
        Err(_error) => {
            res.render(StatusError::internal_server_error());

            return;
        }
    };

    if !state.admin.accepts_digest(&digest) {
        res.render(StatusError::unauthorized().brief("Admin session is not valid"));

        return;
    }

    ctrl.call_next(req, depot, res).await;
}
