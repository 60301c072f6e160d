use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use newscast::{Summarizer, SummaryResponse};

/// Summarizes every article as `"Summary of <title>."` unless told to fail
#[derive(Clone, Default)]
pub struct MockSummarizer {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_titles: HashSet<String>,
    pub fail_all: Option<String>,
    pub blank: bool,
    pub replies: HashMap<String, String>,
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_all: Some(msg.to_string()),
            ..Self::default()
        }
    }

    /// Fails only for the given titles
    pub fn failing_for(titles: &[&str]) -> Self {
        Self {
            fail_titles: titles.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Succeeds with a whitespace-only summary
    pub fn blank() -> Self {
        Self {
            blank: true,
            ..Self::default()
        }
    }

    /// Replies to `title` with `summary` instead of the default
    pub fn with_reply(mut self, title: &str, summary: &str) -> Self {
        self.replies.insert(title.to_string(), summary.to_string());
        self
    }

    pub fn summary_for(title: &str) -> String {
        format!("Summary of {title}.")
    }
}

impl Summarizer for MockSummarizer {
    type Error = anyhow::Error;

    async fn summarize(&self, title: &str, _content: &str) -> Result<SummaryResponse, Self::Error> {
        self.calls.lock().unwrap().push(title.to_string());

        if let Some(ref msg) = self.fail_all {
            return Err(anyhow::anyhow!("{}", msg));
        }
        if self.fail_titles.contains(title) {
            return Err(anyhow::anyhow!("summarizer refused {title}"));
        }

        let summary = if self.blank {
            "   ".to_string()
        } else if let Some(reply) = self.replies.get(title) {
            reply.clone()
        } else {
            Self::summary_for(title)
        };
        Ok(SummaryResponse { summary })
    }
}
