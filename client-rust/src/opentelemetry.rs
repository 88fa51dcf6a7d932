use opentelemetry::trace::Status;
use reqwest::{Method, StatusCode};
use std::time::Instant;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Span covering one dispatched exchange.
pub struct DispatchSpan {
    span: Span,
    start_time: Instant,
    status: Option<StatusCode>,
}

impl DispatchSpan {
    pub fn new(method: &Method, url: &str, target: &str) -> Self {
        let span = info_span!("dps_client.dispatch");
        span.set_attribute("http.request.method", method.to_string());
        span.set_attribute("url.full", url.to_string());
        span.set_attribute("dps_client.target", target.to_string());

        Self {
            span,
            start_time: Instant::now(),
            status: None,
        }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub async fn instrument_future<F>(&self, future: F) -> F::Output
    where
        F: std::future::Future,
    {
        future.instrument(self.span()).await
    }

    pub fn on_response(&mut self, status: StatusCode) {
        self.status = Some(status);
        if !status.is_success() {
            self.span
                .set_status(Status::error(format!("status {}", status.as_u16())));
        }
    }

    pub fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        if let Some(status) = self.status {
            self.span
                .set_attribute("http.response.status_code", i64::from(status.as_u16()));
        }
        self.span
            .set_attribute("dps_client.duration_seconds", self.start_time.elapsed().as_secs_f64());
    }
}
