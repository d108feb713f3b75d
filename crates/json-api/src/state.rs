//! State

use std::sync::Arc;

use chisel_app::context::AppContext;

use crate::admin::AdminCredentials;

#[derive(Clone, Debug)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    pub(crate) admin: AdminCredentials,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, admin: AdminCredentials) -> Self {
        Self { app, admin }
    }

    #[must_use]
    pub(crate) fn shared(app: AppContext, admin: AdminCredentials) -> Arc<Self> {
        Arc::new(Self::new(app, admin))
    }
}
