use clap::{Parser, Subcommand};
use dps_client::Workflow;
use std::path::PathBuf;

/// One console line.
#[derive(Debug, Parser)]
#[command(name = "dps", no_binary_name = true, disable_version_flag = true)]
pub struct ConsoleLine {
    #[command(subcommand)]
    pub command: ConsoleCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ConsoleCommand {
    /// Show the API base URL, or set it when URL is given
    Base { url: Option<String> },
    /// Register a new account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in and store the returned tokens
    Login {
        /// Account email
        #[arg(long, alias = "email")]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Exchange the stored refresh token for fresh tokens
    Refresh,
    /// Revoke the stored refresh token
    Logout,
    /// Upload a document (.pdf, .docx, .txt)
    Upload { path: Option<PathBuf> },
    /// List uploaded documents
    #[command(alias = "show-documents")]
    Docs,
    /// Ask a question about an uploaded document
    Chat {
        document_id: i64,
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show the stored tokens
    Tokens,
    /// Show the request log, newest first
    Log,
    /// Clear the request log
    ClearLog,
    /// Forget the stored tokens
    Forget,
    /// Leave the console
    #[command(alias = "exit")]
    Quit,
}

impl ConsoleCommand {
    /// The workflow this command triggers, if any.
    #[must_use]
    pub fn workflow(&self) -> Option<Workflow> {
        match self {
            Self::Signup { .. } => Some(Workflow::Signup),
            Self::Login { .. } => Some(Workflow::Login),
            Self::Refresh => Some(Workflow::Refresh),
            Self::Logout => Some(Workflow::Logout),
            Self::Upload { .. } => Some(Workflow::Upload),
            Self::Docs => Some(Workflow::ListDocuments),
            Self::Chat { .. } => Some(Workflow::Chat),
            Self::Base { .. }
            | Self::Tokens
            | Self::Log
            | Self::ClearLog
            | Self::Forget
            | Self::Quit => None,
        }
    }
}

/// Split a line on whitespace, keeping single- or double-quoted runs
/// together.
pub fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_word = true;
            }
            None if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(ch);
                in_word = true;
            }
        }
    }

    if let Some(open) = quote {
        return Err(format!("unterminated {open} quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
