//! Request-level logging, request IDs, trace propagation, and the promo
//! evaluation outcome of each request.

mod request_ids;
mod spans;
mod trace_context;

use std::time::{Duration, Instant};

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::Instrument as _;
use tracing::{error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use super::{metrics, settings};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";
const PROMO_OUTCOME_DEPOT_KEY: &str = "promo_outcome";

/// Polled by load balancers and Prometheus, not customers.
const QUIET_PATHS: [&str; 2] = ["/metrics", "/healthcheck"];

/// Note how a promo code evaluation ended so the request log line and span
/// carry it.
pub(crate) fn record_promo_outcome(depot: &mut Depot, outcome: &'static str) {
    depot.insert(PROMO_OUTCOME_DEPOT_KEY, outcome);
}

/// Outcome noted by [`record_promo_outcome`], if any.
pub(crate) fn promo_outcome(depot: &Depot) -> Option<&'static str> {
    depot.get::<&'static str>(PROMO_OUTCOME_DEPOT_KEY).ok().copied()
}

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if QUIET_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());

    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let names = spans::request_span_name(&method, req.uri().path());
    let _in_flight_request = metrics::InFlightRequestGuard::track();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %names.otel_span_name,
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        route = %names.otel_path,
        remote_addr = %req.remote_addr(),
        promo.outcome = tracing::field::Empty,
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    if settings::trace_propagation_enabled()
        && let Some(parent) = trace_context::parent_from_headers(req.headers())
        && let Err(source) = span.set_parent(parent)
    {
        warn!("failed to set parent context on request span: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let completion = Completion {
        method: &method,
        route: &names.otel_path,
        request_id: &request_id,
        status: request_ids::response_status_or_ok(res.status_code),
        duration: started.elapsed(),
        promo_outcome: promo_outcome(depot),
    };

    metrics::observe_request(
        completion.method,
        completion.route,
        completion.status.as_u16(),
        completion.duration.as_secs_f64(),
    );

    span.record("status", completion.status.as_u16());
    span.record("duration_ms", completion.duration.as_millis());

    if let Some(outcome) = completion.promo_outcome {
        span.record("promo.outcome", outcome);
    }

    if settings::trace_propagation_enabled() {
        trace_context::write_to_headers(&span.context(), res.headers_mut());
    }

    span.in_scope(|| completion.log(settings::slow_request_threshold_ms()));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Routine,
    Rejected,
    Failed,
}

#[derive(Debug)]
struct Completion<'a> {
    method: &'a str,
    route: &'a str,
    request_id: &'a str,
    status: StatusCode,
    duration: Duration,
    promo_outcome: Option<&'static str>,
}

impl Completion<'_> {
    /// A customer typing an expired code is routine. Any other 4xx means a
    /// client is sending something we do not accept.
    fn severity(&self) -> Severity {
        if self.status.is_server_error() {
            Severity::Failed
        } else if self.status.is_client_error() && self.promo_outcome.is_none() {
            Severity::Rejected
        } else {
            Severity::Routine
        }
    }

    fn log(&self, slow_threshold_ms: u64) {
        let status = self.status.as_u16();
        let duration_ms = self.duration.as_millis();

        match self.severity() {
            Severity::Failed => error!(
                status,
                method = self.method,
                route = self.route,
                request_id = self.request_id,
                duration_ms,
                "request failed"
            ),
            Severity::Rejected => warn!(
                status,
                method = self.method,
                route = self.route,
                request_id = self.request_id,
                duration_ms,
                "request rejected"
            ),
            Severity::Routine => info!(
                status,
                duration_ms,
                promo_outcome = self.promo_outcome,
                "request completed"
            ),
        }

        if duration_ms > u128::from(slow_threshold_ms) {
            warn!(
                method = self.method,
                route = self.route,
                request_id = self.request_id,
                duration_ms,
                slow_threshold_ms,
                "slow request detected"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use super::*;

    fn completion(status: StatusCode, promo_outcome: Option<&'static str>) -> Completion<'static> {
        Completion {
            method: "POST",
            route: "/promo-codes/apply",
            request_id: "req-1",
            status,
            duration: Duration::from_millis(3),
            promo_outcome,
        }
    }

    #[test]
    fn promo_rejections_are_routine() {
        assert_eq!(
            completion(StatusCode::UNPROCESSABLE_ENTITY, Some("expired")).severity(),
            Severity::Routine
        );
        assert_eq!(
            completion(StatusCode::NOT_FOUND, Some("not_found")).severity(),
            Severity::Routine
        );
    }

    #[test]
    fn other_client_errors_are_rejections() {
        assert_eq!(
            completion(StatusCode::UNAUTHORIZED, None).severity(),
            Severity::Rejected
        );
    }

    #[test]
    fn server_errors_fail_even_with_an_outcome() {
        assert_eq!(
            completion(StatusCode::INTERNAL_SERVER_ERROR, Some("applied")).severity(),
            Severity::Failed
        );
    }

    #[test]
    fn recorded_outcome_is_read_back() {
        let mut depot = Depot::new();

        assert_eq!(promo_outcome(&depot), None);

        record_promo_outcome(&mut depot, "usage_limit_reached");

        assert_eq!(promo_outcome(&depot), Some("usage_limit_reached"));
    }

    #[handler]
    async fn rejecting_handler(depot: &mut Depot, res: &mut Response) {
        record_promo_outcome(depot, "expired");
        res.status_code(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[handler]
    async fn ok_handler(res: &mut Response) {
        res.render("ok");
    }

    fn service() -> Service {
        Service::new(
            Router::new()
                .hoop(request_logging)
                .push(Router::with_path("promo-codes/apply").post(rejecting_handler))
                .push(Router::with_path("healthcheck").get(ok_handler)),
        )
    }

    #[tokio::test]
    async fn customer_requests_get_a_request_id() {
        let res = TestClient::post("http://example.com/promo-codes/apply")
            .send(&service())
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(
            res.headers().contains_key(request_ids::REQUEST_ID_HEADER),
            "request id header missing"
        );
    }

    #[tokio::test]
    async fn quiet_paths_skip_request_tracking() -> TestResult {
        let mut res = TestClient::get("http://example.com/healthcheck")
            .send(&service())
            .await;

        assert_eq!(res.take_string().await?, "ok");
        assert!(
            !res.headers().contains_key(request_ids::REQUEST_ID_HEADER),
            "healthcheck was tracked"
        );

        Ok(())
    }
}
