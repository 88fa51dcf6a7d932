use crate::{ClientError, ClientResult};
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Method,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, path::Path};

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// A structured value serialized as JSON.
    Json(Value),
    /// URL-encoded form pairs, in order.
    Form(Vec<(String, String)>),
    /// A single file sent as `multipart/form-data` under the `file` field.
    File(FilePayload),
}

impl RequestBody {
    /// Render the form pairs the way they go over the wire.
    pub fn encoded_form(pairs: &[(String, String)]) -> ClientResult<String> {
        serde_urlencoded::to_string(pairs)
            .map_err(|err| ClientError::InvalidRequest(err.to_string()))
    }
}

/// A file selected for upload.
#[derive(Clone, PartialEq)]
pub struct FilePayload {
    pub file_name: String,
    /// Declared MIME type, e.g. `application/pdf`.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Load a file from disk, declaring its type from the extension.
    pub fn read(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ClientError::ValidationOmission(format!("Not a file: {}", path.display()))
            })?;

        Ok(Self {
            mime_type: mime_type_for(path).to_string(),
            file_name,
            bytes,
        })
    }
}

impl fmt::Debug for FilePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePayload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Guess a MIME type from a file extension. Unknown extensions are sent as
/// opaque bytes.
#[must_use]
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Describes one outbound exchange relative to the configured base.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    /// Header names are case-insensitive.
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl RequestSpec {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach `Authorization: Bearer <token>`.
    pub fn bearer(self, token: &str) -> ClientResult<Self> {
        let mut value = HeaderValue::try_from(format!("Bearer {token}")).map_err(|_| {
            ClientError::InvalidRequest("access token is not a valid header value".to_string())
        })?;
        value.set_sensitive(true);
        Ok(self.header(header::AUTHORIZATION, value))
    }

    /// Declare JSON content without attaching a body.
    #[must_use]
    pub fn json_content(self) -> Self {
        self.header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )
    }

    #[must_use]
    pub fn json(mut self, value: Value) -> Self {
        self = self.json_content();
        self.body = Some(RequestBody::Json(value));
        self
    }

    #[must_use]
    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self = self.header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        self.body = Some(RequestBody::Form(pairs));
        self
    }

    /// Attach a file. The multipart boundary header is set by the transport.
    #[must_use]
    pub fn file(mut self, payload: FilePayload) -> Self {
        self.body = Some(RequestBody::File(payload));
        self
    }
}

/// Body of a completed exchange, shaped by the declared content kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Pretty-printed JSON, or the text as-is.
    #[must_use]
    pub fn pretty(&self) -> String {
        match self {
            Self::Json(value) => pretty(value),
            Self::Text(text) => text.clone(),
        }
    }
}

pub(crate) fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Whether a body field carries something worth showing.
pub(crate) fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}

/// Normalized result of one exchange. Exactly one variant per exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RequestOutcome {
    Success { body: ResponseBody },
    Failure { message: String },
}

impl RequestOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn body(&self) -> Option<&ResponseBody> {
        match self {
            Self::Success { body } => Some(body),
            Self::Failure { .. } => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message } => Some(message),
        }
    }
}

impl From<ClientError> for RequestOutcome {
    fn from(error: ClientError) -> Self {
        Self::Failure {
            message: error.to_string(),
        }
    }
}

impl From<ClientResult<ResponseBody>> for RequestOutcome {
    fn from(result: ClientResult<ResponseBody>) -> Self {
        match result {
            Ok(body) => Self::Success { body },
            Err(error) => error.into(),
        }
    }
}

/// Tokens found in a response. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenSet {
    /// Pick up same-named string fields from a JSON response body.
    #[must_use]
    pub fn from_body(body: &ResponseBody) -> Self {
        let Some(value) = body.as_json() else {
            return Self::default();
        };
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
        Self {
            access_token: field("access_token"),
            refresh_token: field("refresh_token"),
        }
    }
}

/// One stored document as reported by the list-documents endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSummary {
    pub file_id: i64,
    pub collection_name: String,
    pub chunk_count: i64,
}

impl DocumentSummary {
    /// Project the `documents` array of a listing. Elements that do not fit
    /// the shape are skipped.
    #[must_use]
    pub fn from_listing(body: &ResponseBody) -> Vec<Self> {
        body.as_json()
            .and_then(|value| value.get("documents"))
            .and_then(Value::as_array)
            .map(|documents| {
                documents
                    .iter()
                    .filter_map(|doc| serde_json::from_value(doc.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// An immutable audit log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub label: String,
    pub detail: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}\n{}", self.timestamp, self.label, self.detail)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// The account email, sent as the OAuth2 `username` form field.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub document_id: i64,
    pub query: String,
}

/// Result of the list-documents workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentListing {
    pub outcome: RequestOutcome,
    /// Empty on failure.
    pub documents: Vec<DocumentSummary>,
}

/// Result of the chat workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub outcome: RequestOutcome,
    /// The `answer` field, or a placeholder when the response has none.
    /// `None` on failure.
    pub answer: Option<String>,
}
