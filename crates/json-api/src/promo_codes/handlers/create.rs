//! Create Promo Code Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use chisel_app::domain::promo_codes::{
    data::{NewPromoCode, PromoCodeDetails},
    records::PromoCodeUuid,
};

use crate::{
    extensions::*,
    promo_codes::{
        errors::into_status_error, requests::PromoCodeRequest, responses::PromoCodeResponse,
    },
    state::State,
};

/// Create Promo Code Handler
#[endpoint(
    tags("admin"),
    summary = "Create Promo Code",
    security(("admin_session" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Promo code created"),
        (status_code = StatusCode::CONFLICT, description = "Promo code already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<PromoCodeRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PromoCodeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();
    let uuid = request.uuid.map_or_else(PromoCodeUuid::new, PromoCodeUuid::from);
    let details = PromoCodeDetails::try_from(request)?;

    let record = state
        .app
        .promo_codes
        .create_promo_code(NewPromoCode { uuid, details })
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/admin/promo-codes/{}", record.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(record.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;
    use uuid::Uuid;

    use chisel_app::domain::promo_codes::{
        MockPromoCodesService, PromoCodesServiceError, data::PromoDiscount,
    };

    use crate::test_helpers::promo_codes_service;

    use super::{super::tests::make_promo_code, *};

    fn make_service(promo_codes: MockPromoCodesService) -> Service {
        promo_codes_service(promo_codes, Router::with_path("admin/promo-codes").post(handler))
    }

    #[tokio::test]
    async fn test_create_promo_code_success() -> TestResult {
        let uuid = PromoCodeUuid::new();
        let record = make_promo_code(uuid, "MARBLE10");

        let mut promo_codes = MockPromoCodesService::new();

        promo_codes
            .expect_create_promo_code()
            .once()
            .withf(move |new| {
                new.uuid == uuid
                    && new.details.code.as_str() == "MARBLE10"
                    && new.details.discount
                        == PromoDiscount::Percentage {
                            percentage: 10,
                            max_discount: Some(50_000),
                        }
            })
            .return_once(move |_| Ok(record));

        let mut res = TestClient::post("http://example.com/admin/promo-codes")
            .json(&json!({
                "uuid": uuid.into_uuid(),
                "code": "marble10",
                "type": "percentage",
                "value": 10,
                "max_discount": 50_000,
            }))
            .send(&make_service(promo_codes))
            .await;

        let body: PromoCodeResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/admin/promo-codes/{uuid}").as_str()));
        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.code, "MARBLE10");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_duplicate_returns_409() -> TestResult {
        let mut promo_codes = MockPromoCodesService::new();

        promo_codes
            .expect_create_promo_code()
            .once()
            .return_once(|_| Err(PromoCodesServiceError::AlreadyExists));

        let res = TestClient::post("http://example.com/admin/promo-codes")
            .json(&json!({ "code": "MARBLE10", "type": "flat", "value": 10_000 }))
            .send(&make_service(promo_codes))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_with_unknown_type_skips_service() -> TestResult {
        let mut promo_codes = MockPromoCodesService::new();

        promo_codes.expect_create_promo_code().never();

        let res = TestClient::post("http://example.com/admin/promo-codes")
            .json(&json!({ "uuid": Uuid::now_v7(), "code": "X", "type": "bogo", "value": 1 }))
            .send(&make_service(promo_codes))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
