//! App Router

use std::sync::Arc;

use salvo::{affix_state::inject, prelude::*, trailing_slash::remove_slash};

use crate::{admin, healthcheck, observability, promo_codes, reviews, state::State};

pub(crate) fn app_router(state: Arc<State>) -> Router {
    Router::new()
        .hoop(CatchPanic::new())
        .hoop(observability::request_logging)
        .hoop(remove_slash())
        .hoop(inject(state))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(Router::with_path("promo-codes/apply").post(promo_codes::apply::handler))
        .push(
            Router::with_path("products/{product}/reviews")
                .get(reviews::index::handler)
                .post(reviews::create::handler),
        )
        .push(Router::with_path("reviews/{review}/helpful").post(reviews::helpful::handler))
        .push(admin_router())
}

fn admin_router() -> Router {
    Router::with_path("admin")
        .push(
            Router::with_path("session")
                .post(admin::session::login)
                .delete(admin::session::logout),
        )
        .push(
            Router::with_path("promo-codes")
                .hoop(admin::middleware::handler)
                .get(promo_codes::index::handler)
                .post(promo_codes::create::handler)
                .push(
                    Router::with_path("{uuid}")
                        .get(promo_codes::get::handler)
                        .put(promo_codes::update::handler)
                        .delete(promo_codes::delete::handler),
                )
                .push(
                    Router::with_path("{code}/redemptions").post(promo_codes::redeem::handler),
                ),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{
        http::header::COOKIE,
        test::{ResponseExt, TestClient},
    };
    use serde_json::json;
    use testresult::TestResult;

    use chisel_app::domain::promo_codes::{MockPromoCodesService, PromoCodesServiceError};

    use crate::{
        admin::{ADMIN_COOKIE, password_digest},
        test_helpers::{TEST_ADMIN_PASSWORD, state_with_mocks, strict_reviews_mock, strict_state},
    };

    use super::*;

    fn admin_cookie() -> String {
        format!("{ADMIN_COOKIE}={}", password_digest(TEST_ADMIN_PASSWORD))
    }

    #[tokio::test]
    async fn test_admin_routes_require_session() {
        let service = Service::new(app_router(strict_state()));

        for (method, path) in [
            ("GET", "/admin/promo-codes"),
            ("POST", "/admin/promo-codes"),
            ("DELETE", "/admin/promo-codes/0195f4c6-59a4-7a3e-9c7e-0a1b2c3d4e5f"),
            ("POST", "/admin/promo-codes/MARBLE10/redemptions"),
        ] {
            let url = format!("http://example.com{path}");

            let request = match method {
                "GET" => TestClient::get(url),
                "DELETE" => TestClient::delete(url),
                _ => TestClient::post(url).json(&json!({})),
            };

            let res = request.send(&service).await;

            assert_eq!(
                res.status_code,
                Some(StatusCode::UNAUTHORIZED),
                "{method} {path} reachable without a session"
            );
        }
    }

    #[tokio::test]
    async fn test_admin_session_reaches_handlers() -> TestResult {
        let mut promo_codes = MockPromoCodesService::new();

        promo_codes
            .expect_list_promo_codes()
            .once()
            .return_once(|| Ok(Vec::new()));

        let service = Service::new(app_router(state_with_mocks(
            promo_codes,
            strict_reviews_mock(),
        )));

        let mut res = TestClient::get("http://example.com/admin/promo-codes")
            .add_header(COOKIE, admin_cookie(), true)
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            res.take_json::<serde_json::Value>().await?,
            json!({ "promo_codes": [] })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_apply_is_public_and_tags_request_id() -> TestResult {
        let mut promo_codes = MockPromoCodesService::new();

        promo_codes
            .expect_evaluate_promo_code()
            .once()
            .return_once(|_, _, _| Err(PromoCodesServiceError::NotFound));

        let service = Service::new(app_router(state_with_mocks(
            promo_codes,
            strict_reviews_mock(),
        )));

        let res = TestClient::post("http://example.com/promo-codes/apply")
            .add_header("x-request-id", "req-42", true)
            .json(&json!({ "code": "NOPE", "order_total": 1_000 }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
        assert_eq!(
            res.headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-42")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_healthcheck_and_metrics_are_public() {
        let service = Service::new(app_router(strict_state()));

        for path in ["/healthcheck", "/metrics"] {
            let res = TestClient::get(format!("http://example.com{path}"))
                .send(&service)
                .await;

            assert_eq!(res.status_code, Some(StatusCode::OK), "{path} not reachable");
        }
    }
}
