//! Admin Config

use clap::Args;

/// Back-office login settings.
#[derive(Debug, Args)]
pub struct AdminConfig {
    /// Password for the admin back-office
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: String,

    /// Mark the admin session cookie `Secure` (disable for plain-HTTP development)
    #[arg(
        long,
        env = "ADMIN_COOKIE_SECURE",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub admin_cookie_secure: bool,
}
