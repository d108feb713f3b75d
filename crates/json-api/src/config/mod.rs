//! Server configuration module

use std::net::SocketAddr;

use clap::Parser;

use crate::config::{
    admin::AdminConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
    store::StoreConfig,
};

pub(crate) mod admin;
pub(crate) mod observability;
pub(crate) mod server;
pub(crate) mod store;

/// Chisel JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "chisel-json", about = "Chisel JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Back-office login settings.
    #[command(flatten)]
    pub admin: AdminConfig,

    /// Storefront database and currency settings.
    #[command(flatten)]
    pub store: StoreConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        self.server.socket_addr()
    }
}
