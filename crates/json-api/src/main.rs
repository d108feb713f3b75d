//! Chisel JSON API Server

use std::process::ExitCode;

use salvo::{
    oapi::{
        OpenApi,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
};
use tracing::{error, info};

use chisel_app::{context::AppContext, database};

use crate::{
    admin::{ADMIN_COOKIE, AdminCredentials},
    config::ServerConfig,
    observability::Observability,
    state::State,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod admin;
mod config;
mod extensions;
mod healthcheck;
mod observability;
mod promo_codes;
mod reviews;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// Chisel JSON API Server entry point
#[tokio::main]
pub async fn main() -> ExitCode {
    // Load configuration from .env and CLI arguments
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(config_error) => {
            #[expect(
                clippy::print_stderr,
                reason = "logging not initialized yet, must use eprintln for config errors"
            )]
            {
                eprintln!("Configuration error: {config_error}");
            }

            return ExitCode::FAILURE;
        }
    };

    let observability = match Observability::init(&config) {
        Ok(observability) => observability,
        Err(init_error) => {
            #[expect(
                clippy::print_stderr,
                reason = "the subscriber failed to start, so there is nowhere else to report it"
            )]
            {
                eprintln!("Observability error: {init_error}");
            }

            return ExitCode::FAILURE;
        }
    };

    let code = serve(config).await;

    database::close_shared_pool().await;
    observability.shutdown();

    code
}

async fn serve(config: ServerConfig) -> ExitCode {
    let addr = config.socket_addr();

    info!(
        database = %config.store.redacted_database_url(),
        currency = %config.store.currency,
        "connecting to store database"
    );

    let app = match AppContext::from_database_url(
        &config.store.database_url,
        &config.store.currency,
    )
    .await
    {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            return ExitCode::FAILURE;
        }
    };

    let admin = AdminCredentials::new(
        &config.admin.admin_password,
        config.admin.admin_cookie_secure,
    );

    let router = router::app_router(State::shared(app, admin));

    let router = if config.server.api_docs {
        with_api_docs(router)
    } else {
        router
    };

    let listener = match TcpListener::new(addr).try_bind().await {
        Ok(listener) => listener,
        Err(bind_error) => {
            error!("failed to bind {addr}: {bind_error}");

            return ExitCode::FAILURE;
        }
    };

    info!("Starting server on {addr}");

    let server = Server::new(listener);

    let handle = server.handle();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router).await;

    info!("server stopped");

    ExitCode::SUCCESS
}

fn with_api_docs(router: Router) -> Router {
    let doc = OpenApi::new("Chisel API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "admin_session",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(ADMIN_COOKIE))),
        )
        .merge_router(&router);

    router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"))
}
