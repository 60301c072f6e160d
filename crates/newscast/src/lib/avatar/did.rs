use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    avatar::{AvatarError, AvatarRenderer, RenderJob, RenderStatus},
    config::Config,
};

/// D-ID "talks" API client
#[derive(Clone)]
pub struct DidClient {
    client: Client,
    api_key: String,
    base_url: String,
    presenter_id: String,
    voice_id: String,
}

#[derive(Debug, Deserialize)]
struct TalkResponse {
    id: Option<String>,
    status: Option<String>,
    result_url: Option<String>,
    error: Option<TalkError>,
}

#[derive(Debug, Deserialize)]
struct TalkError {
    kind: Option<String>,
    description: Option<String>,
}

impl DidClient {
    const PRESENTER_IMAGE_BASE: &str = "https://create-images-results.d-id.com/DefaultPresenters";
    const TTS_PROVIDER: &str = "microsoft";

    pub fn new(
        api_key: impl Into<String>,
        presenter_id: impl Into<String>,
        voice_id: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.d-id.com".into(),
            presenter_id: presenter_id.into(),
            voice_id: voice_id.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AvatarError> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self::new(&config.did_key, &config.presenter_id, &config.voice_id)
            .with_base_url(&config.did_base_url)
            .with_client(client))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn talk_url(&self, talk_id: &str) -> String {
        format!("{}/talks/{talk_id}", self.base_url)
    }

    fn talk_request(&self, script: &str) -> serde_json::Value {
        serde_json::json!({
            "script": {
                "type": "text",
                "input": script,
                "provider": {
                    "type": Self::TTS_PROVIDER,
                    "voice_id": self.voice_id
                }
            },
            "config": {
                "fluent": true,
                "pad_audio": 0.0,
                "stitch": true
            },
            "source_url": format!("{}/{}/image.jpeg", Self::PRESENTER_IMAGE_BASE, self.presenter_id)
        })
    }
}

impl AvatarRenderer for DidClient {
    #[tracing::instrument(skip_all)]
    async fn submit(&self, script: &str) -> Result<String, AvatarError> {
        tracing::info!("Creating talk with D-ID API");

        let resp = self
            .client
            .post(format!("{}/talks", self.base_url))
            .header("Authorization", format!("Basic {}", self.api_key))
            .json(&self.talk_request(script))
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "D-ID API request failed"))
            .map_err(|e| AvatarError::Submission(e.to_string()))?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => return Err(AvatarError::Auth),
            status if !status.is_success() => {
                let message = resp.text().await.unwrap_or_default();
                return Err(AvatarError::Submission(format!("{status} - {message}")));
            }
            _ => {}
        }

        let body = resp
            .text()
            .await
            .map_err(|e| AvatarError::Submission(e.to_string()))?;
        let talk: TalkResponse = serde_json::from_str(&body)
            .map_err(|e| AvatarError::Protocol(format!("Malformed talk response: {e}")))?;

        let talk_id = talk
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AvatarError::Protocol("No talk ID returned from D-ID API".into()))?;

        tracing::info!(talk_id = %talk_id, "Talk created");
        Ok(talk_id)
    }

    async fn poll(&self, job_id: &str) -> Result<RenderJob, AvatarError> {
        let talk = self
            .client
            .get(self.talk_url(job_id))
            .header("Authorization", format!("Basic {}", self.api_key))
            .send()
            .await?
            .error_for_status()?
            .json::<TalkResponse>()
            .await?;

        let status = RenderStatus::from(talk.status.as_deref().unwrap_or("unknown"));
        let error_detail = talk
            .error
            .and_then(|e| e.description.or(e.kind));

        Ok(RenderJob {
            job_id: job_id.to_string(),
            status,
            result_url: talk.result_url,
            error_detail,
        })
    }

    async fn delete(&self, job_id: &str) -> bool {
        let result = self
            .client
            .delete(self.talk_url(job_id))
            .header("Authorization", format!("Basic {}", self.api_key))
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        match result {
            Ok(_) => {
                tracing::info!(job_id, "Deleted video");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, job_id, "Error deleting video");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_talk_request_payload() {
        let client = DidClient::new("key", "amy-jcwCkr1grs", "en-US-JennyNeural");
        let payload = client.talk_request("Good day.");

        assert_eq!(payload["script"]["type"], "text");
        assert_eq!(payload["script"]["input"], "Good day.");
        assert_eq!(payload["script"]["provider"]["type"], "microsoft");
        assert_eq!(payload["script"]["provider"]["voice_id"], "en-US-JennyNeural");
        assert_eq!(payload["config"]["fluent"], true);
        assert_eq!(payload["config"]["pad_audio"], 0.0);
        assert_eq!(payload["config"]["stitch"], true);
        assert_eq!(
            payload["source_url"],
            "https://create-images-results.d-id.com/DefaultPresenters/amy-jcwCkr1grs/image.jpeg"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_ignored() {
        let client = DidClient::new("key", "p", "v").with_base_url("http://localhost:9000/");
        assert_eq!(client.talk_url("tlk_1"), "http://localhost:9000/talks/tlk_1");
    }
}
