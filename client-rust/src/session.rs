use crate::{
    audit_log::AuditLog,
    config::ConfigStore,
    credentials::{CredentialStore, Credentials},
    dispatcher::Dispatcher,
    storage::KeyValueStore,
    transport::Transport,
    types::{is_present, pretty},
    ChatReply, ChatRequest, ClientError, ClientResult, DocumentListing, DocumentSummary,
    FilePayload, LogEntry, LoginRequest, RequestBody, RequestOutcome, RequestSpec, SignupRequest,
    TokenSet,
};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

pub const NO_ANSWER_PLACEHOLDER: &str = "No answer returned.";
pub const NO_FILE_SELECTED: &str = "Select a file to upload.";

/// The user-triggerable request/response cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Workflow {
    Signup,
    Login,
    Refresh,
    Logout,
    Upload,
    ListDocuments,
    Chat,
}

impl Workflow {
    #[must_use]
    pub fn target(self) -> &'static str {
        match self {
            Self::Signup => "/Signup",
            Self::Login => "/login",
            Self::Refresh => "/refresh",
            Self::Logout => "/logout",
            Self::Upload => "/uploadFile",
            Self::ListDocuments => "/ShowDocuments",
            Self::Chat => "/chat",
        }
    }

    /// Audit log label, e.g. `POST /login`.
    #[must_use]
    pub fn label(self) -> String {
        format!("POST {}", self.target())
    }

    #[must_use]
    pub fn requires_auth(self) -> bool {
        matches!(
            self,
            Self::Logout | Self::Upload | Self::ListDocuments | Self::Chat
        )
    }

    /// What to show while the exchange is in flight.
    #[must_use]
    pub fn pending_text(self) -> &'static str {
        match self {
            Self::Upload => "Uploading...",
            Self::ListDocuments => "Loading...",
            Self::Chat => "Asking...",
            Self::Signup | Self::Login | Self::Refresh | Self::Logout => "Sending...",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkflowState {
    #[default]
    Idle,
    Sending,
    Succeeded,
    Failed,
}

/// Configuration, credentials, audit log and dispatcher for one console
/// session. Every workflow catches its own errors and reports them as a
/// `RequestOutcome::Failure`.
pub struct Session {
    config: Arc<ConfigStore>,
    credentials: Arc<CredentialStore>,
    audit_log: Arc<AuditLog>,
    dispatcher: Dispatcher,
    states: Mutex<HashMap<Workflow, WorkflowState>>,
}

impl Session {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
        default_base: &str,
    ) -> Self {
        let config = Arc::new(ConfigStore::load(store.clone(), default_base));
        let credentials = Arc::new(CredentialStore::load(store));
        let dispatcher = Dispatcher::new(config.clone(), transport);

        Self {
            config,
            credentials,
            audit_log: Arc::new(AuditLog::new()),
            dispatcher,
            states: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    #[must_use]
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit_log
    }

    #[must_use]
    pub fn base(&self) -> String {
        self.config.get_base()
    }

    /// Store a new base (blank keeps the current one) and log the change.
    pub fn set_base(&self, candidate: &str) -> String {
        let base = self.config.set_base(candidate);
        self.audit_log.record("API base updated", base.clone());
        base
    }

    #[must_use]
    pub fn tokens(&self) -> Credentials {
        self.credentials.snapshot()
    }

    /// Forget both tokens. Never called by a workflow.
    pub fn clear_credentials(&self) {
        self.credentials.clear();
    }

    #[must_use]
    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.audit_log.entries()
    }

    pub fn clear_log(&self) {
        self.audit_log.clear();
    }

    #[must_use]
    pub fn state(&self, workflow: Workflow) -> WorkflowState {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&workflow)
            .copied()
            .unwrap_or_default()
    }

    fn set_state(&self, workflow: Workflow, state: WorkflowState) {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(workflow, state);
    }

    /// Drive one workflow through `Sending` to its terminal state, turning
    /// any local error into a failure outcome.
    async fn run<F>(&self, workflow: Workflow, exchange: F) -> RequestOutcome
    where
        F: Future<Output = ClientResult<RequestOutcome>>,
    {
        self.set_state(workflow, WorkflowState::Sending);

        let outcome = exchange.await.unwrap_or_else(|err| {
            tracing::warn!(workflow = ?workflow, "workflow rejected before dispatch: {err}");
            err.into()
        });

        self.set_state(
            workflow,
            if outcome.is_success() {
                WorkflowState::Succeeded
            } else {
                WorkflowState::Failed
            },
        );
        outcome
    }

    async fn send_json(
        &self,
        workflow: Workflow,
        spec: RequestSpec,
        payload: Value,
    ) -> RequestOutcome {
        self.audit_log.record(workflow.label(), pretty(&payload));
        self.dispatcher
            .dispatch(workflow.target(), spec.json(payload))
            .await
    }

    fn apply_tokens_from(&self, outcome: &RequestOutcome) {
        if let Some(body) = outcome.body() {
            self.credentials.apply_tokens(&TokenSet::from_body(body));
        }
    }

    fn stored_refresh_token(&self) -> String {
        self.credentials
            .get_refresh()
            .map(|token| token.trim().to_string())
            .unwrap_or_default()
    }

    pub async fn signup(&self, request: SignupRequest) -> RequestOutcome {
        self.run(Workflow::Signup, async {
            let payload = json!({
                "name": request.name.trim(),
                "email": request.email.trim(),
                "password": request.password.trim(),
            });
            Ok(self
                .send_json(Workflow::Signup, RequestSpec::post(), payload)
                .await)
        })
        .await
    }

    pub async fn login(&self, request: LoginRequest) -> RequestOutcome {
        self.run(Workflow::Login, async {
            let pairs = vec![
                ("username".to_string(), request.username.trim().to_string()),
                ("password".to_string(), request.password.trim().to_string()),
            ];
            let detail = RequestBody::encoded_form(&pairs)?;
            self.audit_log.record(Workflow::Login.label(), detail);

            let outcome = self
                .dispatcher
                .dispatch(Workflow::Login.target(), RequestSpec::post().form(pairs))
                .await;
            self.apply_tokens_from(&outcome);
            Ok(outcome)
        })
        .await
    }

    pub async fn refresh(&self) -> RequestOutcome {
        self.run(Workflow::Refresh, async {
            let payload = json!({ "refresh_token": self.stored_refresh_token() });
            let outcome = self
                .send_json(Workflow::Refresh, RequestSpec::post(), payload)
                .await;
            self.apply_tokens_from(&outcome);
            Ok(outcome)
        })
        .await
    }

    /// Tokens are kept after a successful logout.
    pub async fn logout(&self) -> RequestOutcome {
        self.run(Workflow::Logout, async {
            let token = self.credentials.require_access()?;
            let payload = json!({ "refresh_token": self.stored_refresh_token() });
            Ok(self
                .send_json(Workflow::Logout, RequestSpec::post().bearer(&token)?, payload)
                .await)
        })
        .await
    }

    pub async fn upload(&self, file: Option<FilePayload>) -> RequestOutcome {
        self.run(Workflow::Upload, async {
            let file =
                file.ok_or_else(|| ClientError::ValidationOmission(NO_FILE_SELECTED.to_string()))?;
            let token = self.credentials.require_access()?;

            self.audit_log.record(
                Workflow::Upload.label(),
                format!("file={} ({})", file.file_name, file.mime_type),
            );
            Ok(self
                .dispatcher
                .dispatch(
                    Workflow::Upload.target(),
                    RequestSpec::post().bearer(&token)?.file(file),
                )
                .await)
        })
        .await
    }

    pub async fn list_documents(&self) -> DocumentListing {
        let outcome = self
            .run(Workflow::ListDocuments, async {
                let token = self.credentials.require_access()?;
                self.audit_log
                    .record(Workflow::ListDocuments.label(), "Bearer auth");
                Ok(self
                    .dispatcher
                    .dispatch(
                        Workflow::ListDocuments.target(),
                        RequestSpec::post().json_content().bearer(&token)?,
                    )
                    .await)
            })
            .await;

        let documents = outcome
            .body()
            .map(DocumentSummary::from_listing)
            .unwrap_or_default();
        DocumentListing { outcome, documents }
    }

    pub async fn chat(&self, request: ChatRequest) -> ChatReply {
        let outcome = self
            .run(Workflow::Chat, async {
                let token = self.credentials.require_access()?;
                let payload = json!({
                    "document_id": request.document_id,
                    "query": request.query.trim(),
                });
                Ok(self
                    .send_json(Workflow::Chat, RequestSpec::post().bearer(&token)?, payload)
                    .await)
            })
            .await;

        let answer = outcome.body().map(|body| {
            match body.as_json().and_then(|value| value.get("answer")) {
                Some(Value::String(answer)) if !answer.is_empty() => answer.clone(),
                Some(answer) if is_present(answer) => answer.to_string(),
                _ => NO_ANSWER_PLACEHOLDER.to_string(),
            }
        });
        ChatReply { outcome, answer }
    }
}
