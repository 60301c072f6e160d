use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline stage a run-level failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scrape,
    Summarize,
    Script,
    Render,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Scrape => "scrape",
            Stage::Summarize => "summarize",
            Stage::Script => "script",
            Stage::Render => "render",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {cause:#}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub cause: anyhow::Error,
}

impl PipelineError {
    pub fn new(stage: Stage, cause: impl Into<anyhow::Error>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }

    pub fn msg(stage: Stage, message: impl fmt::Display) -> Self {
        Self {
            stage,
            cause: anyhow::anyhow!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_stage_and_cause() {
        let err = PipelineError::msg(Stage::Summarize, "no article could be summarized");
        assert_eq!(
            err.to_string(),
            "summarize stage failed: no article could be summarized"
        );
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Stage::Render).unwrap(), "\"render\"");
    }
}
