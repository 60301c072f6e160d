use std::{fmt::Debug, future::Future};

use serde::Deserialize;

pub trait Summarizer {
    /// Article text beyond this many characters is cut before prompting
    const MAX_CONTENT_CHARS: usize = 3_000;

    type Error: Debug + Send;

    fn summarize(
        &self,
        title: &str,
        content: &str,
    ) -> impl Future<Output = Result<SummaryResponse, Self::Error>> + Send;
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Cuts `content` to `max_chars` characters, marking the cut with an ellipsis
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &content[..byte_idx]),
        None => content.to_string(),
    }
}
