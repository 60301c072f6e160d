use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::{
    error::{PipelineError, Stage},
    types::PipelineRun,
};

pub type ProgressStream = UnboundedReceiverStream<ProgressEvent>;

/// One update from a run in progressive mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Progress {
        progress: u8,
        message: String,
    },
    Complete {
        progress: u8,
        message: String,
        run: PipelineRun,
    },
    Error {
        progress: u8,
        stage: Stage,
        message: String,
    },
}

impl ProgressEvent {
    pub fn progress(&self) -> u8 {
        match self {
            ProgressEvent::Progress { progress, .. }
            | ProgressEvent::Complete { progress, .. }
            | ProgressEvent::Error { progress, .. } => *progress,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressEvent::Progress { .. })
    }
}

/// Emits ordered progress events for a single run.
///
/// Progress never goes backwards and never exceeds 100. The terminal
/// `complete`/`error` event consumes the reporter, so at most one is sent.
#[derive(Debug)]
pub struct Progress {
    tx: Option<UnboundedSender<ProgressEvent>>,
    last: u8,
    stage: Stage,
}

impl Progress {
    /// A reporter that discards every event (blocking mode)
    pub fn silent() -> Self {
        Self {
            tx: None,
            last: 0,
            stage: Stage::Scrape,
        }
    }

    pub fn channel() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let progress = Self {
            tx: Some(tx),
            last: 0,
            stage: Stage::Scrape,
        };
        (progress, rx)
    }

    #[cfg(test)]
    pub fn last(&self) -> u8 {
        self.last
    }

    /// Stage the run is currently in
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn enter(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub fn report(&mut self, progress: u8, message: impl Into<String>) {
        let progress = self.advance(progress);
        let message = message.into();
        tracing::debug!(progress, %message, "Progress");
        self.emit(ProgressEvent::Progress { progress, message });
    }

    pub fn complete(mut self, run: PipelineRun) {
        let progress = self.advance(100);
        self.emit(ProgressEvent::Complete {
            progress,
            message: "News video generated".into(),
            run,
        });
    }

    pub fn fail(mut self, err: &PipelineError) {
        let progress = self.last;
        self.emit(ProgressEvent::Error {
            progress,
            stage: err.stage,
            message: err.to_string(),
        });
    }

    fn advance(&mut self, progress: u8) -> u8 {
        self.last = progress.clamp(self.last, 100);
        self.last
    }

    fn emit(&mut self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                // consumer went away; the run carries on without it
                tracing::debug!("Progress consumer disconnected");
                self.tx = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(mut rx: UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_progress_never_goes_backwards() {
        let (mut progress, rx) = Progress::channel();
        progress.report(30, "a");
        progress.report(10, "b");
        progress.report(250, "c");
        progress.fail(&PipelineError::msg(Stage::Render, "boom"));

        let values = drain(rx).iter().map(ProgressEvent::progress).collect::<Vec<_>>();
        assert_eq!(values, vec![30, 30, 100, 100]);
    }

    #[test]
    fn test_error_event_carries_stage_and_message() {
        let (progress, rx) = Progress::channel();
        progress.fail(&PipelineError::msg(Stage::Scrape, "no articles"));

        let events = drain(rx);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_terminal());
        assert_eq!(
            events[0],
            ProgressEvent::Error {
                progress: 0,
                stage: Stage::Scrape,
                message: "scrape stage failed: no articles".into(),
            }
        );
    }

    #[test]
    fn test_dropped_consumer_does_not_panic() {
        let (mut progress, rx) = Progress::channel();
        drop(rx);
        progress.report(10, "nobody listening");
        progress.report(20, "still nobody");
        assert_eq!(progress.last(), 20);
    }

    #[test]
    fn test_entered_stage_is_tracked() {
        let mut progress = Progress::silent();
        assert_eq!(progress.stage(), Stage::Scrape);

        progress.enter(Stage::Render);
        assert_eq!(progress.stage(), Stage::Render);
    }

    #[test]
    fn test_event_json_shape() {
        let event = ProgressEvent::Progress {
            progress: 5,
            message: "Searching news sources".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["progress"], 5);
    }
}
