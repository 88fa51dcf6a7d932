use std::{collections::VecDeque, sync::Mutex};

use reqwest::StatusCode;
use serde_json::Value;

use crate::{
    errors::{ClientError, ClientResult},
    transport::{HttpRequest, HttpResponse, Transport},
};

/// Scripted result for one `send` call.
/// It can either be a completed exchange or a transport fault.
pub enum MockResponse {
    Response(HttpResponse),
    Error(ClientError),
}

impl MockResponse {
    /// A JSON response with the given status.
    pub fn json(status: u16, body: &Value) -> Self {
        Self::Response(HttpResponse {
            status: status_code(status),
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
        })
    }

    /// A `text/plain` response with the given status.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::Response(HttpResponse {
            status: status_code(status),
            content_type: Some("text/plain; charset=utf-8".to_string()),
            body: body.into(),
        })
    }

    /// A response without a body or content type.
    pub fn empty(status: u16) -> Self {
        Self::Response(HttpResponse {
            status: status_code(status),
            content_type: None,
            body: String::new(),
        })
    }

    /// A transport fault.
    pub fn error(error: ClientError) -> Self {
        Self::Error(error)
    }
}

impl From<HttpResponse> for MockResponse {
    fn from(response: HttpResponse) -> Self {
        Self::Response(response)
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[derive(Default)]
struct MockTransportState {
    mocked_responses: VecDeque<MockResponse>,
    tracked_requests: Vec<HttpRequest>,
}

/// A mock transport for testing that tracks requests and yields predefined
/// responses in order.
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockTransportState>,
}

impl MockTransport {
    /// Construct a new mock transport instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue one or more mocked responses.
    pub fn enqueue_responses<I>(&self, responses: I) -> &Self
    where
        I: IntoIterator<Item = MockResponse>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_responses.extend(responses);
        drop(state);
        self
    }

    /// Convenience to enqueue a single mocked response.
    pub fn enqueue<R>(&self, response: R) -> &Self
    where
        R: Into<MockResponse>,
    {
        self.enqueue_responses(std::iter::once(response.into()))
    }

    /// Retrieve the tracked requests accumulated so far.
    pub fn tracked_requests(&self) -> Vec<HttpRequest> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_requests.clone()
    }

    /// Clear both tracked requests and enqueued responses.
    pub fn restore(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_responses.clear();
        state.tracked_requests.clear();
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.tracked_requests.push(request);

        let response = state.mocked_responses.pop_front().ok_or_else(|| {
            ClientError::MalformedResponse("no mocked responses available".into())
        })?;

        match response {
            MockResponse::Response(response) => Ok(response),
            MockResponse::Error(error) => Err(error),
        }
    }
}
