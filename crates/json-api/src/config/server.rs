//! Listener Config

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::{ArgAction, Args};

/// Port the storefront API listens on unless told otherwise.
pub(crate) const DEFAULT_PORT: u16 = 8640;

/// Where the API listens and whether it serves its own documentation.
#[derive(Debug, Args)]
pub struct ServerRuntimeConfig {
    /// IP address to listen on
    #[arg(
        short = 'H',
        long,
        env = "SERVER_HOST",
        default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    )]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Serve the OpenAPI document and Swagger UI at `/docs`
    #[arg(
        long,
        env = "SERVE_API_DOCS",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub api_docs: bool,
}

impl ServerRuntimeConfig {
    /// Address the listener binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
