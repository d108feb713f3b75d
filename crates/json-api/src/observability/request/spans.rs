//! HTTP span helpers.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) otel_path: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = route_template(path);
    let otel_span_name = format!("{method} {otel_path}");

    RequestSpanName {
        otel_path,
        otel_span_name,
    }
}

/// Replace identifiers in `path` with placeholders so span names and metric
/// labels stay low-cardinality. Promo codes only appear in paths directly
/// before `redemptions`.
fn route_template(path: &str) -> String {
    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    let mut template = String::new();

    for (index, segment) in segments.iter().enumerate() {
        template.push('/');

        let next = segments.get(index + 1).copied();

        if Uuid::parse_str(segment).is_ok() {
            template.push_str("{uuid}");
        } else if next == Some("redemptions") {
            template.push_str("{code}");
        } else {
            template.push_str(segment);
        }
    }

    if template.is_empty() {
        template.push('/');
    }

    template
}
