use std::sync::{Arc, Mutex};

use newscast::{AvatarError, AvatarRenderer, RenderJob, RenderStatus};

pub const JOB_ID: &str = "tlk_mock";

#[derive(Debug, Clone)]
pub enum PollStep {
    Status(RenderStatus),
    Done(String),
    Failed(String),
    TransportError,
}

/// Replays a scripted sequence of poll results; the last step repeats forever
#[derive(Clone)]
pub struct MockRenderer {
    pub steps: Vec<PollStep>,
    pub submitted: Arc<Mutex<Vec<String>>>,
    pub polls: Arc<Mutex<usize>>,
    pub deleted: Arc<Mutex<Vec<String>>>,
    pub reject_submit: bool,
}

impl MockRenderer {
    pub fn new(steps: Vec<PollStep>) -> Self {
        Self {
            steps,
            submitted: Arc::new(Mutex::new(Vec::new())),
            polls: Arc::new(Mutex::new(0)),
            deleted: Arc::new(Mutex::new(Vec::new())),
            reject_submit: false,
        }
    }

    /// created -> started -> done(url)
    pub fn done(url: &str) -> Self {
        Self::new(vec![
            PollStep::Status(RenderStatus::Created),
            PollStep::Status(RenderStatus::Started),
            PollStep::Done(url.to_string()),
        ])
    }

    /// started -> error(detail)
    pub fn errored(detail: &str) -> Self {
        Self::new(vec![
            PollStep::Status(RenderStatus::Started),
            PollStep::Failed(detail.to_string()),
        ])
    }

    /// Never leaves `started`
    pub fn stuck() -> Self {
        Self::new(vec![PollStep::Status(RenderStatus::Started)])
    }

    pub fn rejecting_submit() -> Self {
        Self {
            reject_submit: true,
            ..Self::stuck()
        }
    }

    pub fn poll_count(&self) -> usize {
        *self.polls.lock().unwrap()
    }
}

impl AvatarRenderer for MockRenderer {
    async fn submit(&self, script: &str) -> Result<String, AvatarError> {
        self.submitted.lock().unwrap().push(script.to_string());
        if self.reject_submit {
            return Err(AvatarError::Submission("400 Bad Request - invalid script".into()));
        }
        Ok(JOB_ID.to_string())
    }

    async fn poll(&self, job_id: &str) -> Result<RenderJob, AvatarError> {
        let step = {
            let mut polls = self.polls.lock().unwrap();
            let idx = (*polls).min(self.steps.len().saturating_sub(1));
            *polls += 1;
            self.steps.get(idx).cloned()
        };

        match step {
            Some(PollStep::Status(status)) => Ok(RenderJob::new(job_id, status)),
            Some(PollStep::Done(url)) => Ok(RenderJob {
                result_url: Some(url),
                ..RenderJob::new(job_id, RenderStatus::Done)
            }),
            Some(PollStep::Failed(detail)) => Ok(RenderJob {
                error_detail: Some(detail),
                ..RenderJob::new(job_id, RenderStatus::Error)
            }),
            Some(PollStep::TransportError) | None => {
                Err(AvatarError::Protocol("connection reset by peer".into()))
            }
        }
    }

    async fn delete(&self, job_id: &str) -> bool {
        self.deleted.lock().unwrap().push(job_id.to_string());
        true
    }
}
