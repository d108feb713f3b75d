//! Apply Promo Code Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};
use tracing::{Span, field};

use chisel::codes::PromoCodeName;
use chisel_app::domain::promo_codes::{PromoCodesServiceError, data::PromoEvaluation};

use crate::{
    extensions::*,
    observability::{observe_promo_evaluation, record_promo_outcome},
    promo_codes::{
        errors::into_status_error,
        requests::ApplyPromoRequest,
        responses::{ApplyPromoResponse, MessageResponse},
    },
    state::State,
};

const NOT_FOUND_MESSAGE: &str = "Invalid promo code.";

/// Apply Promo Code Handler
///
/// Checks a code against a cart total and prices the discount. Nothing is
/// recorded; redemptions happen when the order is placed.
#[endpoint(
    tags("promo-codes"),
    summary = "Apply Promo Code",
    responses(
        (status_code = StatusCode::OK, description = "Code applies", body = ApplyPromoResponse),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown code", body = MessageResponse),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Code does not apply", body = MessageResponse),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request", body = MessageResponse),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "promo_codes.apply",
    skip(json, depot, res),
    fields(code = field::Empty, order_total = field::Empty, outcome = field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<ApplyPromoRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = Arc::clone(depot.obtain_or_500::<Arc<State>>()?);
    let request = json.into_inner();
    let span = Span::current();

    span.record("code", field::display(&request.code));
    span.record("order_total", request.order_total);

    // A code that cannot be canonicalised cannot exist either.
    let Ok(code) = PromoCodeName::parse(&request.code) else {
        reply(depot, res, &span, "not_found", StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE);

        return Ok(());
    };

    let evaluation = state
        .app
        .promo_codes
        .evaluate_promo_code(code, request.user_uuid, request.order_total)
        .await;

    match evaluation {
        Ok(PromoEvaluation::Applied(applied)) => {
            observe(depot, &span, "applied");

            res.render(Json(ApplyPromoResponse::new(
                applied,
                state.app.currency.iso_alpha_code,
            )));
        }
        Ok(PromoEvaluation::Rejected(reason)) => {
            reply(
                depot,
                res,
                &span,
                reason.as_str(),
                StatusCode::UNPROCESSABLE_ENTITY,
                reason.to_string(),
            );
        }
        Err(PromoCodesServiceError::NotFound) => {
            reply(depot, res, &span, "not_found", StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE);
        }
        Err(PromoCodesServiceError::ContractViolation(source)) => {
            reply(
                depot,
                res,
                &span,
                "contract_violation",
                StatusCode::BAD_REQUEST,
                source.to_string(),
            );
        }
        Err(error) => return Err(into_status_error(error)),
    }

    Ok(())
}

fn observe(depot: &mut Depot, span: &Span, outcome: &'static str) {
    span.record("outcome", outcome);
    observe_promo_evaluation(outcome);
    record_promo_outcome(depot, outcome);
}

fn reply(
    depot: &mut Depot,
    res: &mut Response,
    span: &Span,
    outcome: &'static str,
    status: StatusCode,
    message: impl Into<String>,
) {
    observe(depot, span, outcome);

    res.status_code(status)
        .render(Json(MessageResponse::new(message)));
}

#[cfg(test)]
mod tests {
    use chisel::validation::{InvalidReason, PromoError};
    use salvo::{
        http::HeaderValue,
        test::{ResponseExt, TestClient},
    };
    use serde_json::{Value, json};
    use testresult::TestResult;
    use uuid::Uuid;

    use chisel_app::domain::promo_codes::{
        MockPromoCodesService, data::AppliedPromo, records::PromoCodeUuid,
    };

    use crate::{observability::promo_outcome, test_helpers::promo_codes_service};

    use super::{super::tests::make_promo_code, *};

    fn make_service(promo_codes: MockPromoCodesService) -> Service {
        promo_codes_service(
            promo_codes,
            Router::with_path("promo-codes/apply").post(handler),
        )
    }

    /// Copies the outcome the handler noted for request logging onto a header.
    #[handler]
    async fn expose_outcome(
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        ctrl.call_next(req, depot, res).await;

        if let Some(outcome) = promo_outcome(depot) {
            res.headers_mut()
                .insert("x-promo-outcome", HeaderValue::from_static(outcome));
        }
    }

    async fn apply(promo_codes: MockPromoCodesService, body: Value) -> (StatusCode, Value) {
        let mut res = TestClient::post("http://example.com/promo-codes/apply")
            .json(&body)
            .send(&make_service(promo_codes))
            .await;

        let status = res.status_code.unwrap_or(StatusCode::OK);
        let body = res.take_json::<Value>().await.unwrap_or_default();

        (status, body)
    }

    #[tokio::test]
    async fn test_applicable_code_returns_discount() -> TestResult {
        let user = Uuid::now_v7();
        let record = make_promo_code(PromoCodeUuid::new(), "MARBLE10");

        let mut promo_codes = MockPromoCodesService::new();

        promo_codes
            .expect_evaluate_promo_code()
            .once()
            .withf(move |code, u, total| {
                code.as_str() == "MARBLE10" && *u == Some(user) && *total == 1_000_000
            })
            .return_once(move |_, _, _| {
                Ok(PromoEvaluation::Applied(AppliedPromo {
                    promo_code: record,
                    order_total: 1_000_000,
                    discount: 50_000,
                }))
            });

        let (status, body) = apply(
            promo_codes,
            json!({ "code": " marble10 ", "user_uuid": user, "order_total": 1_000_000 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "code": "MARBLE10",
                "type": "percentage",
                "value": 10,
                "discount": 50_000,
                "description": "10% off marble inlay",
                "order_total": 1_000_000,
                "total_after_discount": 950_000,
                "currency": "INR",
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_code_returns_404_message() -> TestResult {
        let mut promo_codes = MockPromoCodesService::new();

        promo_codes
            .expect_evaluate_promo_code()
            .once()
            .return_once(|_, _, _| Err(PromoCodesServiceError::NotFound));

        let (status, body) =
            apply(promo_codes, json!({ "code": "NOPE", "order_total": 5_000 })).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Invalid promo code." }));

        Ok(())
    }

    #[tokio::test]
    async fn test_blank_code_is_not_found_without_lookup() -> TestResult {
        let mut promo_codes = MockPromoCodesService::new();

        promo_codes.expect_evaluate_promo_code().never();

        let (status, body) =
            apply(promo_codes, json!({ "code": "   ", "order_total": 5_000 })).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Invalid promo code." }));

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_code_returns_422_with_reason() -> TestResult {
        let reason = InvalidReason::MinimumOrderNotMet {
            minimum: "1000".to_string(),
        };

        let mut promo_codes = MockPromoCodesService::new();

        promo_codes
            .expect_evaluate_promo_code()
            .once()
            .return_once(move |_, _, _| Ok(PromoEvaluation::Rejected(reason)));

        let (status, body) =
            apply(promo_codes, json!({ "code": "BIGSPEND", "order_total": 5_000 })).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({ "message": "Minimum order value of 1000 required." })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_expired_code_message() -> TestResult {
        let mut promo_codes = MockPromoCodesService::new();

        promo_codes
            .expect_evaluate_promo_code()
            .once()
            .return_once(|_, _, _| Ok(PromoEvaluation::Rejected(InvalidReason::Expired)));

        let (status, body) =
            apply(promo_codes, json!({ "code": "SUMMER", "order_total": 5_000 })).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({ "message": "This promo code has expired." }));

        Ok(())
    }

    #[tokio::test]
    async fn test_negative_total_returns_400() -> TestResult {
        let mut promo_codes = MockPromoCodesService::new();

        promo_codes
            .expect_evaluate_promo_code()
            .once()
            .withf(|_, _, total| *total == -1)
            .return_once(|_, _, _| {
                Err(PromoCodesServiceError::ContractViolation(
                    PromoError::NegativeOrderTotal,
                ))
            });

        let (status, body) =
            apply(promo_codes, json!({ "code": "MARBLE10", "order_total": -1 })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "order total cannot be negative" }));

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_body_returns_400() -> TestResult {
        let mut promo_codes = MockPromoCodesService::new();

        promo_codes.expect_evaluate_promo_code().never();

        let res = TestClient::post("http://example.com/promo-codes/apply")
            .json(&json!({ "code": "MARBLE10", "order_total": "lots" }))
            .send(&make_service(promo_codes))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_outcome_is_left_for_request_logging() -> TestResult {
        let mut promo_codes = MockPromoCodesService::new();

        promo_codes
            .expect_evaluate_promo_code()
            .once()
            .return_once(|_, _, _| {
                Ok(PromoEvaluation::Rejected(InvalidReason::UsageLimitReached))
            });

        let service = promo_codes_service(
            promo_codes,
            Router::new()
                .hoop(expose_outcome)
                .push(Router::with_path("promo-codes/apply").post(handler)),
        );

        let res = TestClient::post("http://example.com/promo-codes/apply")
            .json(&json!({ "code": "LASTONE", "order_total": 5_000 }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(
            res.headers()
                .get("x-promo-outcome")
                .and_then(|value| value.to_str().ok()),
            Some(InvalidReason::UsageLimitReached.as_str())
        );

        Ok(())
    }
}
