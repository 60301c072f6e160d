//! # Script
//!
//! Turns an ordered list of summarized articles into the text the avatar reads.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use itertools::Itertools;

use crate::types::SummarizedArticle;

/// How article summaries are framed in the composed script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ScriptStyle {
    /// One paragraph per article with broadcast transitions
    #[default]
    Verbose,
    /// A single line, each summary cut to its first two sentences
    Terse,
}

impl ScriptStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptStyle::Verbose => "verbose",
            ScriptStyle::Terse => "terse",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptComposer {
    style: ScriptStyle,
}

impl ScriptComposer {
    const MIDDLE_TRANSITIONS: [&str; 4] = ["Next,", "In other news,", "Also today,", "Meanwhile,"];
    const CLOSING: &str = "That's all for now. Stay informed and have a great day.";
    const WORDS_PER_MINUTE: usize = 150;

    pub fn new(style: ScriptStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> ScriptStyle {
        self.style
    }

    /// Composes a script dated today (UTC)
    pub fn compose(&self, articles: &[SummarizedArticle]) -> String {
        self.compose_on(articles, Utc::now().date_naive())
    }

    #[tracing::instrument(skip(self, articles), fields(style = self.style.as_str(), count = articles.len()))]
    pub fn compose_on(&self, articles: &[SummarizedArticle], date: NaiveDate) -> String {
        if articles.is_empty() {
            return String::new();
        }

        let opening = Self::opening(date);
        let script = match self.style {
            ScriptStyle::Verbose => {
                let headlines = articles
                    .iter()
                    .enumerate()
                    .map(|(idx, article)| Self::frame(idx, articles.len(), article.summary.trim()))
                    .join("\n\n");
                format!("{opening}\n\n{headlines}\n\n{}", Self::CLOSING)
            }
            ScriptStyle::Terse => {
                let headlines = articles
                    .iter()
                    .map(|article| first_two_sentences(&article.summary))
                    .join(" ");
                format!("{opening} {headlines} {}", Self::CLOSING)
            }
        };

        let word_count = script.split_whitespace().count();
        tracing::info!(
            word_count,
            seconds = estimate_reading_time(&script).as_secs(),
            "Generated script"
        );

        script
    }

    fn opening(date: NaiveDate) -> String {
        format!(
            "Good day. Here are today's top stories for {}.",
            date.format("%B %d, %Y")
        )
    }

    fn frame(idx: usize, total: usize, summary: &str) -> String {
        if idx == 0 {
            format!("In our lead story, {summary}")
        } else if idx == total - 1 {
            format!("And finally, {summary}")
        } else {
            let transition =
                Self::MIDDLE_TRANSITIONS[(idx - 1).min(Self::MIDDLE_TRANSITIONS.len() - 1)];
            format!("{transition} {summary}")
        }
    }
}

/// Whether `summary` holds any text besides periods and whitespace
pub fn has_sentence_content(summary: &str) -> bool {
    summary.split('.').any(|s| !s.trim().is_empty())
}

/// Keeps the first two period-terminated sentences of `summary`.
///
/// A summary with no sentence text is returned trimmed, never dropped.
pub fn first_two_sentences(summary: &str) -> String {
    let kept = summary
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(2)
        .join(". ");

    if kept.is_empty() {
        summary.trim().to_string()
    } else {
        format!("{kept}.")
    }
}

/// Speaking time at a typical broadcast pace
pub fn estimate_reading_time(script: &str) -> Duration {
    let words = script.split_whitespace().count();
    Duration::from_secs((words * 60 / ScriptComposer::WORDS_PER_MINUTE) as u64)
}
