use crate::{ClientResult, RequestBody};
use reqwest::{header::HeaderMap, multipart, Client, Method, StatusCode};

/// A fully resolved outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

/// A completed exchange before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    /// The raw `content-type` header, if any.
    pub content_type: Option<String>,
    pub body: String,
}

/// Performs one HTTP exchange. Implementations must not retry.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse>;
}

/// Transport backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, url).headers(headers);
        builder = match body {
            None => builder,
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Form(pairs)) => builder.form(&pairs),
            Some(RequestBody::File(payload)) => {
                let part = multipart::Part::bytes(payload.bytes)
                    .file_name(payload.file_name)
                    .mime_str(&payload.mime_type)?;
                builder.multipart(multipart::Form::new().part("file", part))
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}
