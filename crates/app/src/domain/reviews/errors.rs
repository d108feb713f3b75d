//! Reviews service errors.

use std::num::TryFromIntError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewsServiceError {
    #[error("review already exists")]
    AlreadyExists,

    #[error("review not found")]
    NotFound,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("invalid data")]
    InvalidData,

    #[error("helpful vote count out of range")]
    CountOutOfRange(#[from] TryFromIntError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ReviewsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_count_conversion_is_reported() {
        let result: Result<u64, ReviewsServiceError> = u64::try_from(-1_i64).map_err(Into::into);

        assert!(
            matches!(result, Err(ReviewsServiceError::CountOutOfRange(_))),
            "expected CountOutOfRange, got {result:?}"
        );
    }
}
