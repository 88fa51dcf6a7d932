use crate::{
    command::{split_line, ConsoleCommand, ConsoleLine},
    render,
};
use clap::Parser;
use dps_client::{ChatRequest, FilePayload, LoginRequest, RequestOutcome, Session, SignupRequest};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const PROMPT: &str = "dps> ";

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue(String),
    Quit,
}

/// Turns console commands into session workflows and renders the results.
pub struct Console {
    session: Arc<Session>,
}

impl Console {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Parse and run one line. Parse errors are rendered, never returned.
    pub async fn execute_line(&self, line: &str) -> Step {
        match parse_line(line) {
            Ok(Some(command)) => self.execute(command).await,
            Ok(None) => Step::Continue(String::new()),
            Err(message) => Step::Continue(message),
        }
    }

    pub async fn execute(&self, command: ConsoleCommand) -> Step {
        let session = &self.session;
        let output = match command {
            ConsoleCommand::Base { url: None } => session.base(),
            ConsoleCommand::Base { url: Some(url) } => {
                format!("API base: {}", session.set_base(&url))
            }
            ConsoleCommand::Signup {
                name,
                email,
                password,
            } => render::render_outcome(
                &session
                    .signup(SignupRequest {
                        name,
                        email,
                        password,
                    })
                    .await,
            ),
            ConsoleCommand::Login { username, password } => render::render_outcome(
                &session.login(LoginRequest { username, password }).await,
            ),
            ConsoleCommand::Refresh => render::render_outcome(&session.refresh().await),
            ConsoleCommand::Logout => render::render_outcome(&session.logout().await),
            ConsoleCommand::Upload { path } => {
                let outcome = match path.map(FilePayload::read).transpose() {
                    Ok(file) => session.upload(file).await,
                    Err(err) => RequestOutcome::from(err),
                };
                render::render_outcome(&outcome)
            }
            ConsoleCommand::Docs => render::render_listing(&session.list_documents().await),
            ConsoleCommand::Chat { document_id, query } => render::render_chat(
                &session
                    .chat(ChatRequest {
                        document_id,
                        query: query.join(" "),
                    })
                    .await,
            ),
            ConsoleCommand::Tokens => render::render_tokens(&session.tokens()),
            ConsoleCommand::Log => render::render_log(&session.log_entries()),
            ConsoleCommand::ClearLog => {
                session.clear_log();
                "Log cleared.".to_string()
            }
            ConsoleCommand::Forget => {
                session.clear_credentials();
                "Tokens cleared.".to_string()
            }
            ConsoleCommand::Quit => return Step::Quit,
        };
        Step::Continue(output)
    }

    /// Read commands until EOF or `quit`, printing each result.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        loop {
            writer.write_all(PROMPT.as_bytes()).await?;
            writer.flush().await?;

            let Some(line) = lines.next_line().await? else {
                writer.write_all(b"\n").await?;
                break;
            };

            let step = match parse_line(&line) {
                Ok(Some(command)) => {
                    if let Some(workflow) = command.workflow() {
                        writer
                            .write_all(format!("{}\n", workflow.pending_text()).as_bytes())
                            .await?;
                        writer.flush().await?;
                    }
                    self.execute(command).await
                }
                Ok(None) => continue,
                Err(message) => Step::Continue(message),
            };

            match step {
                Step::Quit => break,
                Step::Continue(output) => {
                    writer.write_all(output.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                }
            }
        }
        writer.flush().await
    }
}

/// `Ok(None)` for a blank line, `Err` with clap's rendered message for
/// anything that does not parse.
fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let words = split_line(line).map_err(|err| format!("error: {err}"))?;
    if words.is_empty() {
        return Ok(None);
    }
    ConsoleLine::try_parse_from(words)
        .map(|parsed| Some(parsed.command))
        .map_err(|err| err.render().to_string().trim_end().to_string())
}
