//! App Context

use std::sync::Arc;

use rusty_money::iso::{self, Currency};
use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        promo_codes::{PgPromoCodesService, PromoCodesService},
        reviews::{PgReviewsService, ReviewsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("unknown store currency {0:?}")]
    UnknownCurrency(String),
}

#[derive(Clone)]
pub struct AppContext {
    pub promo_codes: Arc<dyn PromoCodesService>,
    pub reviews: Arc<dyn ReviewsService>,
    pub currency: &'static Currency,
}

impl AppContext {
    /// Build application context on the shared pool for `url`, pricing
    /// orders in the ISO 4217 `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error when the currency is unknown or establishing a
    /// database connection fails.
    pub async fn from_database_url(url: &str, currency: &str) -> Result<Self, AppInitError> {
        let currency = store_currency(currency)?;

        let pool = database::shared_pool(url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool);

        Ok(Self {
            promo_codes: Arc::new(PgPromoCodesService::new(db.clone(), currency)),
            reviews: Arc::new(PgReviewsService::new(db)),
            currency,
        })
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}

/// Resolve an ISO 4217 code such as `INR`.
///
/// # Errors
///
/// Returns [`AppInitError::UnknownCurrency`] for codes rusty-money does not know.
pub fn store_currency(code: &str) -> Result<&'static Currency, AppInitError> {
    iso::find(code.trim())
        .ok_or_else(|| AppInitError::UnknownCurrency(code.to_string()))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn resolves_known_currency() -> TestResult {
        assert_eq!(store_currency(" INR ")?, iso::INR);

        Ok(())
    }

    #[test]
    fn rejects_unknown_currency() {
        let result = store_currency("XXQ");

        assert!(
            matches!(result, Err(AppInitError::UnknownCurrency(ref code)) if code == "XXQ"),
            "expected UnknownCurrency, got {result:?}"
        );
    }
}
