use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scraped news article, as extracted from its page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub url: String,
    pub scraped_at: DateTime<Utc>,
}

impl Article {
    pub const MIN_TITLE_CHARS: usize = 10;
    pub const MIN_CONTENT_CHARS: usize = 200;

    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            url: url.into(),
            scraped_at: Utc::now(),
        }
    }

    /// Minimum quality bar for an article to enter the pipeline
    pub fn is_valid(&self) -> bool {
        if self.title.trim().chars().count() < Self::MIN_TITLE_CHARS {
            tracing::debug!(url = %self.url, "Article rejected: title too short");
            return false;
        }
        if self.content.trim().chars().count() < Self::MIN_CONTENT_CHARS {
            tracing::debug!(url = %self.url, "Article rejected: content too short");
            return false;
        }
        if self.url.trim().is_empty() {
            tracing::debug!("Article rejected: no URL");
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizedArticle {
    pub title: String,
    pub url: String,
    pub summary: String,
}

impl SummarizedArticle {
    pub fn from_article(article: &Article, summary: impl Into<String>) -> Self {
        Self {
            title: article.title.clone(),
            url: article.url.clone(),
            summary: summary.into(),
        }
    }
}

/// The output of one successful pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub articles: Vec<SummarizedArticle>,
    pub script: String,
    pub video_url: String,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, content_len: usize, url: &str) -> Article {
        Article::new(title, "x".repeat(content_len), url)
    }

    #[test]
    fn test_valid_article() {
        assert!(article("A long enough title", 200, "https://example.com/a").is_valid());
    }

    #[test]
    fn test_short_title_is_rejected() {
        assert!(!article("Too short", 500, "https://example.com/a").is_valid());
    }

    #[test]
    fn test_short_content_is_rejected() {
        assert!(!article("A long enough title", 199, "https://example.com/a").is_valid());
    }

    #[test]
    fn test_missing_url_is_rejected() {
        assert!(!article("A long enough title", 500, "  ").is_valid());
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let title = "ééééééééé é";
        assert!(article(title, 200, "https://example.com/a").is_valid());
        assert!(!article("éééé", 200, "https://example.com/a").is_valid());
    }
}
