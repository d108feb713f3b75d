//! Admin back-office session.
//!
//! The back-office has a single shared password. A successful login stores
//! the password's SHA-256 digest in an `HttpOnly` cookie, which the
//! middleware compares against the configured digest on every `/admin`
//! request.

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub(crate) mod middleware;
pub(crate) mod session;

/// Name of the admin session cookie.
pub(crate) const ADMIN_COOKIE: &str = "chisel_admin";

/// Hex-encoded SHA-256 digest of `password`.
pub(crate) fn password_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Configured admin password, held only as a digest.
#[derive(Clone)]
pub(crate) struct AdminCredentials {
    digest: String,
    secure_cookie: bool,
}

impl AdminCredentials {
    pub(crate) fn new(password: &str, secure_cookie: bool) -> Self {
        Self {
            digest: password_digest(password),
            secure_cookie,
        }
    }

    pub(crate) fn digest(&self) -> &str {
        &self.digest
    }

    pub(crate) fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }

    pub(crate) fn accepts_password(&self, password: &str) -> bool {
        self.accepts_digest(&password_digest(password))
    }

    pub(crate) fn accepts_digest(&self, digest: &str) -> bool {
        self.digest.as_bytes().ct_eq(digest.as_bytes()).into()
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("secure_cookie", &self.secure_cookie)
            .finish_non_exhaustive()
    }
}
