use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::llm::summarizer::{truncate_content, Summarizer, SummaryResponse};

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenAIError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Invalid OpenAI API key")]
    Auth,
    #[error("OpenAI rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("No content in completion response")]
    EmptyCompletion,
}

impl OpenAIClient {
    const SYSTEM_PROMPT: &str = include_str!("./prompts/system_0.txt");
    const USER_PROMPT: &str = include_str!("./prompts/user_0.txt");
    const TEMPERATURE: f32 = 0.3;
    const MAX_TOKENS: u32 = 150;

    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://api.openai.com/v1".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Fills the prompt template in one pass, so placeholders inside the
    /// article text are left alone
    fn user_prompt(title: &str, content: &str) -> String {
        match Self::USER_PROMPT.split_once("{content}") {
            Some((head, tail)) => format!(
                "{}{content}{}",
                head.replace("{title}", title),
                tail.replace("{title}", title)
            ),
            None => Self::USER_PROMPT.replace("{title}", title),
        }
    }

    pub async fn send_completion_request(
        &self,
        user_content: impl Into<String>,
    ) -> Result<CompletionResponse, OpenAIError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": Self::SYSTEM_PROMPT.trim()
                },
                {
                    "role": "user",
                    "content": user_content.into()
                }
            ],
            "temperature": Self::TEMPERATURE,
            "max_tokens": Self::MAX_TOKENS
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => {
                tracing::error!("OpenAI authentication failed. Check API key.");
                return Err(OpenAIError::Auth);
            }
            StatusCode::TOO_MANY_REQUESTS => {
                tracing::error!("OpenAI rate limit exceeded");
                return Err(OpenAIError::RateLimited);
            }
            status if !status.is_success() => {
                let message = resp.text().await.unwrap_or_default();
                return Err(OpenAIError::Api {
                    status: status.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        Ok(resp.json::<CompletionResponse>().await?)
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: CompletionMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: Option<String>,
}

impl Summarizer for OpenAIClient {
    type Error = OpenAIError;

    #[tracing::instrument(skip(self, content), fields(model = %self.model))]
    async fn summarize(&self, title: &str, content: &str) -> Result<SummaryResponse, Self::Error> {
        let prompt = Self::user_prompt(title, &truncate_content(content, Self::MAX_CONTENT_CHARS));

        let response = self
            .send_completion_request(prompt)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize article"))?;

        let summary = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(OpenAIError::EmptyCompletion)?
            .to_string();

        tracing::info!(chars = summary.len(), "Generated summary");
        Ok(SummaryResponse { summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_embeds_title_and_content() {
        let prompt = OpenAIClient::user_prompt("Budget passes", "The house voted.");
        assert!(prompt.starts_with("Title: Budget passes\n\nArticle Content:\nThe house voted.\n"));
        assert!(prompt.contains("3-4 sentences"));
    }

    #[test]
    fn test_user_prompt_leaves_placeholders_in_article_text() {
        let prompt = OpenAIClient::user_prompt("Why {content} matters", "Body about {title}.");
        assert!(prompt.starts_with(
            "Title: Why {content} matters\n\nArticle Content:\nBody about {title}.\n"
        ));
        assert_eq!(prompt.matches("Body about").count(), 1);
    }

    #[test]
    fn test_completion_response_deserializes() {
        let json = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": " A summary. "},
                "finish_reason": "stop"
            }]
        }"#;

        let resp: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.choices[0].message.content.as_deref(), Some(" A summary. "));
    }
}
