//! Store Config

use clap::Args;

/// Where the storefront keeps its data and what it prices orders in.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// ISO 4217 code that order totals and promo amounts are priced in
    #[arg(long, env = "STORE_CURRENCY", default_value = "INR")]
    pub currency: String,
}

impl StoreConfig {
    /// The database URL with any credentials masked, for startup logs.
    pub fn redacted_database_url(&self) -> String {
        let Some((scheme, rest)) = self.database_url.split_once("://") else {
            return "<unparseable database url>".to_owned();
        };

        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));

        let (masked, host) = match authority.rsplit_once('@') {
            Some((_credentials, host)) => ("***@", host),
            None => ("", authority),
        };

        if path.is_empty() {
            format!("{scheme}://{masked}{host}")
        } else {
            format!("{scheme}://{masked}{host}/{path}")
        }
    }
}
