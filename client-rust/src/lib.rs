mod audit_log;
mod config;
mod credentials;
mod dispatcher;
mod errors;
mod opentelemetry;
mod session;
pub mod storage;
pub mod transport;
mod types;

pub mod dps_client_test;

pub use audit_log::AuditLog;
pub use config::{ConfigStore, DEFAULT_API_BASE};
pub use credentials::{CredentialStore, Credentials};
pub use dispatcher::Dispatcher;
pub use errors::*;
pub use session::{Session, Workflow, WorkflowState, NO_ANSWER_PLACEHOLDER, NO_FILE_SELECTED};
pub use types::*;
