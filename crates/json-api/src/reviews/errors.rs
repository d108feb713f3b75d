//! Review Errors

use salvo::http::StatusError;
use tracing::error;

use chisel_app::domain::reviews::ReviewsServiceError;

pub(crate) fn into_status_error(error: ReviewsServiceError) -> StatusError {
    match error {
        ReviewsServiceError::AlreadyExists => StatusError::conflict().brief("Review already exists"),
        ReviewsServiceError::NotFound => StatusError::not_found().brief("Review not found"),
        ReviewsServiceError::MissingRequiredData => {
            StatusError::bad_request().brief("author_name is required")
        }
        source @ ReviewsServiceError::InvalidRating(_) => {
            StatusError::bad_request().brief(source.to_string())
        }
        ReviewsServiceError::InvalidData => StatusError::bad_request().brief("Invalid review payload"),
        ReviewsServiceError::CountOutOfRange(source) => {
            error!("helpful vote count conversion failed: {source}");

            StatusError::internal_server_error()
        }
        ReviewsServiceError::Sql(source) => {
            error!("review storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
