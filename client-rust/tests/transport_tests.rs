use axum::{
    extract::{Form, Multipart},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use dps_client::{
    storage::MemoryStore, transport::ReqwestTransport, ChatRequest, FilePayload, LoginRequest,
    ResponseBody, Session, SignupRequest,
};
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Arc};
use tokio::{net::TcpListener, sync::oneshot};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

struct StubServer {
    url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    fn url(&self) -> &str {
        &self.url
    }

    async fn stop(self) -> Result<(), BoxedError> {
        if let Some(tx) = self.shutdown {
            let _ = tx.send(());
        }

        self.handle
            .await
            .map_err(|err| format!("Failed to join stub API server task: {err}"))?;
        Ok(())
    }
}

async fn login(Form(form): Form<HashMap<String, String>>) -> Response {
    let username = form.get("username").map(String::as_str);
    let password = form.get("password").map(String::as_str);
    if username == Some("a@b.com") && password == Some("pw") {
        Json(json!({
            "access_token": "T1",
            "refresh_token": "R1",
            "token_type": "bearer"
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "invalid username or password" })),
        )
            .into_response()
    }
}

async fn chat(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some("Bearer T1") {
        return (StatusCode::UNAUTHORIZED, "missing bearer").into_response();
    }
    Json(json!({
        "answer": format!("doc {} says hi", body["document_id"]),
        "query": body["query"],
    }))
    .into_response()
}

async fn upload(mut multipart: Multipart) -> Response {
    let Ok(Some(field)) = multipart.next_field().await else {
        return (StatusCode::BAD_REQUEST, "no file").into_response();
    };
    let name = field.name().map(str::to_string);
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let size = field.bytes().await.map(|bytes| bytes.len()).unwrap_or_default();

    Json(json!({
        "field": name,
        "file_name": file_name,
        "content_type": content_type,
        "size": size,
    }))
    .into_response()
}

async fn show_documents() -> Response {
    (StatusCode::NOT_FOUND, "not found").into_response()
}

async fn signup() -> Response {
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

async fn start_stub_api_server() -> Result<StubServer, BoxedError> {
    let app = Router::new()
        .route("/login", post(login))
        .route("/chat", post(chat))
        .route("/uploadFile", post(upload))
        .route("/ShowDocuments", post(show_documents))
        .route("/Signup", post(signup));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let url = format!("http://{addr}");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        if let Err(err) = server.await {
            eprintln!("API stub server error: {err}");
        }
    });

    Ok(StubServer {
        url,
        shutdown: Some(shutdown_tx),
        handle,
    })
}

fn session_for(base: &str) -> Session {
    Session::new(
        Arc::new(MemoryStore::new()),
        Arc::new(ReqwestTransport::default()),
        base,
    )
}

#[tokio::test]
async fn workflows_round_trip_over_http() -> Result<(), BoxedError> {
    let stub = start_stub_api_server().await?;
    let session = session_for(stub.url());

    let login = session
        .login(LoginRequest {
            username: "a@b.com".to_string(),
            password: "pw".to_string(),
        })
        .await;
    assert!(login.is_success(), "login failed: {login:?}");
    assert_eq!(session.tokens().access_token.as_deref(), Some("T1"));
    assert_eq!(session.tokens().refresh_token.as_deref(), Some("R1"));

    let reply = session
        .chat(ChatRequest {
            document_id: 5,
            query: "hello".to_string(),
        })
        .await;
    assert_eq!(reply.answer.as_deref(), Some("doc 5 says hi"));

    let upload = session
        .upload(Some(FilePayload::new(
            "notes.txt",
            "text/plain",
            b"hello world".to_vec(),
        )))
        .await;
    assert_eq!(
        upload.body(),
        Some(&ResponseBody::Json(json!({
            "field": "file",
            "file_name": "notes.txt",
            "content_type": "text/plain",
            "size": 11,
        })))
    );

    stub.stop().await?;
    Ok(())
}

#[tokio::test]
async fn failures_are_normalized_over_http() -> Result<(), BoxedError> {
    let stub = start_stub_api_server().await?;
    let session = session_for(stub.url());

    let login = session
        .login(LoginRequest {
            username: "a@b.com".to_string(),
            password: "nope".to_string(),
        })
        .await;
    assert_eq!(login.message(), Some("invalid username or password"));

    session.credentials().apply_tokens(&dps_client::TokenSet {
        access_token: Some("T1".to_string()),
        refresh_token: None,
    });
    let listing = session.list_documents().await;
    assert_eq!(listing.outcome.message(), Some("not found"));

    let signup = session
        .signup(SignupRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await;
    assert_eq!(signup.message(), Some("Request failed"));

    stub.stop().await?;
    Ok(())
}

#[tokio::test]
async fn unreachable_host_is_a_failure() -> Result<(), BoxedError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let session = session_for(&format!("http://{addr}"));
    let outcome = session.refresh().await;

    assert!(!outcome.is_success());
    assert!(!outcome.message().unwrap_or_default().is_empty());
    assert_eq!(session.log_entries().len(), 1);
    Ok(())
}
