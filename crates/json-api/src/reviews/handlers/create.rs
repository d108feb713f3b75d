//! Create Review Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chisel_app::domain::reviews::{data::NewReview, records::ReviewUuid};

use crate::{
    extensions::*,
    reviews::{errors::into_status_error, handlers::ReviewResponse},
    state::State,
};

/// Create Review Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateReviewRequest {
    pub author_name: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Create Review Handler
#[endpoint(
    tags("reviews"),
    summary = "Create Review",
    responses(
        (status_code = StatusCode::CREATED, description = "Review created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<CreateReviewRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ReviewResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let record = state
        .app
        .reviews
        .create_review(NewReview {
            uuid: ReviewUuid::new(),
            product_uuid: product.into_inner(),
            author_name: request.author_name,
            rating: request.rating,
            comment: request.comment,
        })
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(record.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use chisel_app::domain::reviews::{MockReviewsService, ReviewsServiceError};

    use crate::test_helpers::reviews_service;

    use super::{super::tests::make_review, *};

    fn make_service(reviews: MockReviewsService) -> Service {
        reviews_service(
            reviews,
            Router::with_path("products/{product}/reviews").post(handler),
        )
    }

    #[tokio::test]
    async fn test_create_review_returns_201() -> TestResult {
        let product = Uuid::now_v7();

        let mut reviews = MockReviewsService::new();

        reviews
            .expect_create_review()
            .once()
            .withf(move |new| new.product_uuid == product && new.rating == 5)
            .return_once(move |new| Ok(make_review(new.uuid, product)));

        let mut res = TestClient::post(format!("http://example.com/products/{product}/reviews"))
            .json(&json!({ "author_name": "Meera", "rating": 5, "comment": "Flawless." }))
            .send(&make_service(reviews))
            .await;

        let body: ReviewResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body.product_uuid, product);
        assert_eq!(body.helpful_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_bad_rating_returns_400() -> TestResult {
        let mut reviews = MockReviewsService::new();

        reviews
            .expect_create_review()
            .once()
            .return_once(|new| Err(ReviewsServiceError::InvalidRating(new.rating)));

        let res = TestClient::post(format!(
            "http://example.com/products/{}/reviews",
            Uuid::now_v7()
        ))
        .json(&json!({ "author_name": "Meera", "rating": 9 }))
        .send(&make_service(reviews))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
