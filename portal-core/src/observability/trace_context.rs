//! Trace propagation for calls to the key portal backend.
//!
//! Outbound requests carry the W3C `traceparent`/`tracestate` pair of the
//! current span (https://www.w3.org/TR/trace-context/) plus a correlation id,
//! so backend logs line up with the portal's `portal_request` spans.

use opentelemetry::trace::{SpanContext, TraceContextExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub const TRACEPARENT_HEADER: HeaderName = HeaderName::from_static("traceparent");
pub const TRACESTATE_HEADER: HeaderName = HeaderName::from_static("tracestate");
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// `version-trace_id-span_id-flags`, version fixed at `00`.
fn traceparent(span_context: &SpanContext) -> String {
    format!(
        "00-{}-{}-{:02x}",
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    )
}

fn context_headers(span_context: &SpanContext) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if !span_context.is_valid() {
        return headers;
    }

    if let Ok(value) = HeaderValue::from_str(&traceparent(span_context)) {
        headers.insert(TRACEPARENT_HEADER, value);
    }

    let state = span_context.trace_state().header();
    if !state.is_empty()
        && let Ok(value) = HeaderValue::from_str(&state)
    {
        headers.insert(TRACESTATE_HEADER, value);
    }

    headers
}

/// Trace headers for the current span.
///
/// Empty when the span has no valid OpenTelemetry context, which is the case
/// whenever no OTLP layer is installed.
pub fn current_trace_headers() -> HeaderMap {
    let context = tracing::Span::current().context();
    let span = context.span();
    context_headers(span.span_context())
}

/// [`current_trace_headers`] plus `x-request-id`. An id that is not a valid
/// header value is dropped.
pub fn correlated_trace_headers(request_id: &str) -> HeaderMap {
    let mut headers = current_trace_headers();
    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    headers
}

/// A `reqwest` request whose trace headers are resolved when it is sent, so
/// they belong to the span active at send time.
pub struct TracedRequest {
    request: RequestBuilder,
}

impl TracedRequest {
    pub fn new(request: RequestBuilder) -> Self {
        Self { request }
    }

    fn map(self, f: impl FnOnce(RequestBuilder) -> RequestBuilder) -> Self {
        Self {
            request: f(self.request),
        }
    }

    pub fn headers(self, headers: HeaderMap) -> Self {
        self.map(|request| request.headers(headers))
    }

    pub fn query<T: serde::Serialize + ?Sized>(self, query: &T) -> Self {
        self.map(|request| request.query(query))
    }

    pub fn json<T: serde::Serialize + ?Sized>(self, body: &T) -> Self {
        self.map(|request| request.json(body))
    }

    pub async fn send(self) -> Result<Response, reqwest::Error> {
        self.request.headers(current_trace_headers()).send().await
    }

    pub async fn send_with_request_id(self, request_id: &str) -> Result<Response, reqwest::Error> {
        self.request
            .headers(correlated_trace_headers(request_id))
            .send()
            .await
    }
}

pub trait TracedClientExt {
    fn traced_request(&self, method: Method, url: &str) -> TracedRequest;

    fn traced_post(&self, url: &str) -> TracedRequest {
        self.traced_request(Method::POST, url)
    }
}

impl TracedClientExt for Client {
    fn traced_request(&self, method: Method, url: &str) -> TracedRequest {
        TracedRequest::new(self.request(method, url))
    }
}
