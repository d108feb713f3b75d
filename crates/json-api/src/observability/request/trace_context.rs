//! W3C trace context on HTTP headers.
//!
//! An incoming `traceparent` becomes the parent of the request span, and the
//! request span's own context goes back out on the response so a checkout
//! failure reported by the storefront can be found in the trace backend.

use opentelemetry::{
    Context, global,
    propagation::{Extractor, Injector, TextMapPropagator},
    trace::TraceContextExt as _,
};
use salvo::http::{HeaderMap, HeaderName, HeaderValue};

pub(super) fn parent_from_headers(headers: &HeaderMap) -> Option<Context> {
    global::get_text_map_propagator(|propagator| extract_with(propagator, headers))
}

pub(super) fn write_to_headers(context: &Context, headers: &mut HeaderMap) {
    global::get_text_map_propagator(|propagator| inject_with(propagator, context, headers));
}

fn extract_with(propagator: &dyn TextMapPropagator, headers: &HeaderMap) -> Option<Context> {
    // A fresh base keeps requests without trace headers off the current span chain.
    let context = propagator.extract_with_context(&Context::new(), &HeaderReader(headers));

    let valid = context.span().span_context().is_valid();

    valid.then_some(context)
}

fn inject_with(propagator: &dyn TextMapPropagator, context: &Context, headers: &mut HeaderMap) {
    propagator.inject_context(context, &mut HeaderWriter(headers));
}

struct HeaderReader<'a>(&'a HeaderMap);

impl Extractor for HeaderReader<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

struct HeaderWriter<'a>(&'a mut HeaderMap);

impl Injector for HeaderWriter<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use testresult::TestResult;

    use super::*;

    const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    fn headers_with(traceparent: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("traceparent", HeaderValue::from_static(traceparent));

        headers
    }

    #[test]
    fn valid_traceparent_becomes_parent() -> TestResult {
        let context = extract_with(&TraceContextPropagator::new(), &headers_with(TRACEPARENT))
            .ok_or("no parent extracted")?;

        assert_eq!(
            context.span().span_context().trace_id().to_string(),
            "4bf92f3577b34da6a3ce929d0e0e4736"
        );

        Ok(())
    }

    #[test]
    fn missing_or_malformed_headers_give_no_parent() {
        let propagator = TraceContextPropagator::new();

        assert!(
            extract_with(&propagator, &HeaderMap::new()).is_none(),
            "parent invented without headers"
        );
        assert!(
            extract_with(&propagator, &headers_with("00-not-a-trace-01")).is_none(),
            "malformed traceparent accepted"
        );
    }

    #[test]
    fn context_is_written_back_as_traceparent() -> TestResult {
        let propagator = TraceContextPropagator::new();
        let context =
            extract_with(&propagator, &headers_with(TRACEPARENT)).ok_or("no parent extracted")?;

        let mut response_headers = HeaderMap::new();
        inject_with(&propagator, &context, &mut response_headers);

        assert_eq!(
            response_headers
                .get("traceparent")
                .and_then(|value| value.to_str().ok()),
            Some(TRACEPARENT)
        );

        Ok(())
    }

    #[test]
    fn empty_context_writes_nothing() {
        let mut response_headers = HeaderMap::new();

        inject_with(
            &TraceContextPropagator::new(),
            &Context::new(),
            &mut response_headers,
        );

        assert!(response_headers.is_empty(), "headers written for empty context");
    }
}
