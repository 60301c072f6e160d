//! # Avatar rendering
//!
//! A render is a long-running remote job: the script is submitted once, which
//! yields a job id, and the job is then polled on a fixed interval until the
//! provider reports a terminal status or the local wait budget runs out.
//!
//! ```text
//! Created -> Started* -> Done | Error        (remote)
//!                     \-> TimedOut           (local, polling abandoned)
//! ```

pub mod did;

use std::{fmt, future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("Avatar provider rejected the credentials. Check API key.")]
    Auth,
    #[error("Failed to submit render: {0}")]
    Submission(String),
    #[error("Unexpected provider response: {0}")]
    Protocol(String),
    #[error("Video generation failed: {detail}")]
    Render { detail: String },
    #[error("Video generation exceeded {}s timeout", .max_wait.as_secs())]
    Timeout { max_wait: Duration },
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RenderStatus {
    Created,
    Started,
    Done,
    Error,
    Unknown(String),
}

impl RenderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RenderStatus::Done | RenderStatus::Error)
    }
}

impl From<&str> for RenderStatus {
    fn from(value: &str) -> Self {
        match value {
            "created" => RenderStatus::Created,
            "started" => RenderStatus::Started,
            "done" => RenderStatus::Done,
            "error" => RenderStatus::Error,
            other => RenderStatus::Unknown(other.to_string()),
        }
    }
}

impl From<String> for RenderStatus {
    fn from(value: String) -> Self {
        RenderStatus::from(value.as_str())
    }
}

impl From<RenderStatus> for String {
    fn from(value: RenderStatus) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStatus::Created => f.write_str("created"),
            RenderStatus::Started => f.write_str("started"),
            RenderStatus::Done => f.write_str("done"),
            RenderStatus::Error => f.write_str("error"),
            RenderStatus::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Snapshot of a remote render job as last reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderJob {
    pub job_id: String,
    pub status: RenderStatus,
    pub result_url: Option<String>,
    pub error_detail: Option<String>,
}

impl RenderJob {
    pub fn new(job_id: impl Into<String>, status: RenderStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
            result_url: None,
            error_detail: None,
        }
    }
}

/// Polling cadence and overall budget for waiting on a render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderWait {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl Default for RenderWait {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(300),
        }
    }
}

/// A talking-avatar video provider
pub trait AvatarRenderer {
    /// Submits `script` for rendering and returns the provider's job id
    fn submit(&self, script: &str) -> impl Future<Output = Result<String, AvatarError>> + Send;

    /// Fetches the current state of a job. Has no side effect on the job.
    fn poll(&self, job_id: &str) -> impl Future<Output = Result<RenderJob, AvatarError>> + Send;

    /// Asks the provider to discard a job; `false` if it could not be deleted
    fn delete(&self, job_id: &str) -> impl Future<Output = bool> + Send;
}

/// Polls `job_id` until it reaches a terminal status, returning the video URL.
///
/// Transport failures while polling are treated as transient and retried on
/// the same interval; only the overall `max_wait` budget bounds them.
#[tracing::instrument(skip(renderer), fields(max_wait = wait.max_wait.as_secs()))]
pub async fn wait_until_terminal<R>(
    renderer: &R,
    job_id: &str,
    wait: RenderWait,
) -> Result<String, AvatarError>
where
    R: AvatarRenderer,
{
    let started = Instant::now();
    tracing::info!("Waiting for video generation");

    loop {
        let elapsed = started.elapsed();
        if elapsed > wait.max_wait {
            tracing::error!(elapsed = elapsed.as_secs(), "Gave up waiting for video");
            return Err(AvatarError::Timeout {
                max_wait: wait.max_wait,
            });
        }

        match renderer.poll(job_id).await {
            Ok(job) => {
                tracing::info!(status = %job.status, elapsed = elapsed.as_secs(), "Video status");

                match job.status {
                    RenderStatus::Done => {
                        return job
                            .result_url
                            .filter(|url| !url.trim().is_empty())
                            .ok_or_else(|| {
                                AvatarError::Protocol("No video URL in completed response".into())
                            });
                    }
                    RenderStatus::Error => {
                        return Err(AvatarError::Render {
                            detail: job.error_detail.unwrap_or_else(|| "Unknown error".into()),
                        });
                    }
                    RenderStatus::Created | RenderStatus::Started => {}
                    RenderStatus::Unknown(ref status) => {
                        tracing::warn!(status = %status, "Unknown video status");
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = ?e, "Error checking video status");
            }
        }

        tokio::time::sleep(wait.poll_interval).await;
    }
}

/// Submits `script` and waits for the finished video
pub async fn render<R>(renderer: &R, script: &str, wait: RenderWait) -> Result<String, AvatarError>
where
    R: AvatarRenderer,
{
    let job_id = renderer.submit(script).await?;
    wait_until_terminal(renderer, &job_id, wait).await
}
