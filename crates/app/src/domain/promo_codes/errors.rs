//! Promo codes service errors.

use std::num::TryFromIntError;

use chisel::{
    codes::CodeNameError, discounts::DiscountError, promo_codes::PromoCodeError,
    validation::PromoError,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromoCodesServiceError {
    #[error("promo code already exists")]
    AlreadyExists,

    #[error("promo code not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error(transparent)]
    InvalidCode(#[from] CodeNameError),

    #[error(transparent)]
    InvalidDefinition(#[from] PromoCodeError),

    /// The caller broke the evaluation contract (negative or foreign-currency total).
    #[error(transparent)]
    ContractViolation(#[from] PromoError),

    #[error(transparent)]
    Discount(#[from] DiscountError),

    #[error("amount out of range")]
    AmountOutOfRange(#[from] TryFromIntError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PromoCodesServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
