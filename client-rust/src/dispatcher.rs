use crate::{
    config::ConfigStore,
    opentelemetry::DispatchSpan,
    transport::{HttpRequest, HttpResponse, Transport},
    types::is_present,
    ClientError, ClientResult, RequestOutcome, RequestSpec, ResponseBody,
};
use serde_json::Value;
use std::sync::Arc;

const GENERIC_FAILURE: &str = "Request failed";

/// Sends one exchange against the current base and normalizes whatever
/// comes back into a `RequestOutcome`. Performs no authentication.
#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<ConfigStore>,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(config: Arc<ConfigStore>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Resolve `target` against the current base. Never cached.
    #[must_use]
    pub fn resolve(&self, target: &str) -> String {
        resolve_url(&self.config.get_base(), target)
    }

    pub async fn dispatch(&self, target: &str, options: RequestSpec) -> RequestOutcome {
        self.try_dispatch(target, options).await.into()
    }

    async fn try_dispatch(&self, target: &str, options: RequestSpec) -> ClientResult<ResponseBody> {
        let url = self.resolve(target);
        let mut span = DispatchSpan::new(&options.method, &url, target);
        tracing::debug!(method = %options.method, %url, "dispatching request");

        let request = HttpRequest {
            method: options.method,
            url,
            headers: options.headers,
            body: options.body,
        };

        let result = match span.instrument_future(self.transport.send(request)).await {
            Ok(response) => {
                span.on_response(response.status);
                normalize(response)
            }
            Err(err) => {
                span.on_error(&err);
                Err(err)
            }
        };
        span.on_end();

        result
    }
}

fn resolve_url(base: &str, target: &str) -> String {
    if target.starts_with('/') {
        if let Some(stripped) = base.strip_suffix('/') {
            return format!("{stripped}{target}");
        }
    }
    format!("{base}{target}")
}

/// Shape the body by declared content kind and classify by status.
pub(crate) fn normalize(response: HttpResponse) -> ClientResult<ResponseBody> {
    let HttpResponse {
        status,
        content_type,
        body,
    } = response;

    let is_json = content_type
        .as_deref()
        .is_some_and(|content_type| content_type.contains("application/json"));

    let parsed = if body.is_empty() {
        None
    } else if is_json {
        let value: Value = serde_json::from_str(&body)
            .map_err(|err| ClientError::MalformedResponse(err.to_string()))?;
        Some(ResponseBody::Json(value))
    } else {
        Some(ResponseBody::Text(body))
    };

    if status.is_success() {
        return Ok(parsed.unwrap_or_else(|| ResponseBody::Text(String::new())));
    }

    Err(ClientError::Status {
        status,
        message: failure_message(parsed.as_ref()),
    })
}

/// Text verbatim, else a structured `detail`, else the whole body.
fn failure_message(body: Option<&ResponseBody>) -> String {
    let message = match body {
        None => String::new(),
        Some(ResponseBody::Text(text)) => text.clone(),
        Some(ResponseBody::Json(value)) => match value.get("detail") {
            Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
            Some(detail) if is_present(detail) => detail.to_string(),
            _ => match value {
                Value::String(text) => text.clone(),
                _ if is_present(value) => value.to_string(),
                _ => String::new(),
            },
        },
    };

    if message.is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        message
    }
}
