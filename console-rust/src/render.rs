use dps_client::{ChatReply, Credentials, DocumentListing, DocumentSummary, LogEntry, RequestOutcome};

/// Raw body on success, the message on failure.
#[must_use]
pub fn render_outcome(outcome: &RequestOutcome) -> String {
    match outcome {
        RequestOutcome::Success { body } => body.pretty(),
        RequestOutcome::Failure { message } => message.clone(),
    }
}

#[must_use]
pub fn render_documents(documents: &[DocumentSummary]) -> String {
    documents
        .iter()
        .map(|doc| {
            format!(
                "Document #{}\n  Collection: {}\n  Chunks: {}",
                doc.file_id, doc.collection_name, doc.chunk_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn render_listing(listing: &DocumentListing) -> String {
    let raw = render_outcome(&listing.outcome);
    if listing.documents.is_empty() {
        raw
    } else {
        format!("{raw}\n\n{}", render_documents(&listing.documents))
    }
}

#[must_use]
pub fn render_chat(reply: &ChatReply) -> String {
    let raw = render_outcome(&reply.outcome);
    match &reply.answer {
        Some(answer) => format!("{raw}\n\nAnswer: {answer}"),
        None => raw,
    }
}

#[must_use]
pub fn render_log(entries: &[LogEntry]) -> String {
    if entries.is_empty() {
        return "(log is empty)".to_string();
    }
    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[must_use]
pub fn render_tokens(credentials: &Credentials) -> String {
    let show = |token: &Option<String>| token.clone().unwrap_or_else(|| "(none)".to_string());
    format!(
        "access_token: {}\nrefresh_token: {}",
        show(&credentials.access_token),
        show(&credentials.refresh_token)
    )
}
