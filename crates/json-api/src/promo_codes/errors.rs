//! Promo Code Errors

use salvo::http::StatusError;
use tracing::error;

use chisel_app::domain::promo_codes::PromoCodesServiceError;

pub(crate) fn into_status_error(error: PromoCodesServiceError) -> StatusError {
    match error {
        PromoCodesServiceError::AlreadyExists => {
            StatusError::conflict().brief("Promo code already exists")
        }
        PromoCodesServiceError::NotFound => StatusError::not_found().brief("Promo code not found"),
        PromoCodesServiceError::InvalidReference
        | PromoCodesServiceError::MissingRequiredData
        | PromoCodesServiceError::InvalidData
        | PromoCodesServiceError::AmountOutOfRange(_) => {
            StatusError::bad_request().brief("Invalid promo code payload")
        }
        PromoCodesServiceError::InvalidCode(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        PromoCodesServiceError::InvalidDefinition(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        PromoCodesServiceError::ContractViolation(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        PromoCodesServiceError::Discount(source) => {
            error!("failed to calculate promo discount: {source}");

            StatusError::internal_server_error()
        }
        PromoCodesServiceError::Sql(source) => {
            error!("promo code storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use chisel::{
        discounts::DiscountError, promo_codes::PromoCodeError, validation::PromoError,
    };
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn duplicates_conflict() {
        assert_eq!(
            into_status_error(PromoCodesServiceError::AlreadyExists).code,
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn contract_violations_are_bad_requests_with_reason() {
        let error = into_status_error(PromoCodesServiceError::ContractViolation(
            PromoError::NegativeOrderTotal,
        ));

        assert_eq!(error.code, StatusCode::BAD_REQUEST);
        assert_eq!(error.brief, "order total cannot be negative");
    }

    #[test]
    fn bad_definitions_are_bad_requests() {
        let error = into_status_error(PromoCodesServiceError::InvalidDefinition(
            PromoCodeError::InvertedWindow,
        ));

        assert_eq!(error.code, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn calculation_failures_hide_detail() {
        let error = into_status_error(PromoCodesServiceError::Discount(
            DiscountError::CurrencyMismatch,
        ));

        assert_eq!(error.code, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
