use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// A bearer-authorized workflow was invoked without a stored access
    /// token. Raised before any network exchange.
    #[error("Missing access token. Login first.")]
    AuthenticationRequired,
    /// A caller-side precondition was not met (e.g. no file selected for
    /// upload). Never sent to the network.
    #[error("{0}")]
    ValidationOmission(String),
    /// The exchange completed with a non-2xx status. The message is derived
    /// from the response body.
    #[error("{message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    /// The request could not be sent or the response could not be read.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The response declared a content kind its body does not match.
    #[error("{0}")]
    MalformedResponse(String),
    /// The request could not be built from the given input (e.g. a token
    /// with characters that are not valid in a header).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
