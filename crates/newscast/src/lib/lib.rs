pub mod avatar;
pub mod config;
mod error;
mod llm;
pub mod news;
mod processor;
pub mod script;
pub mod tracing;
pub mod types;

pub use avatar::{did::DidClient, AvatarError, AvatarRenderer, RenderJob, RenderStatus, RenderWait};
pub use config::Config;
pub use error::{PipelineError, Stage};
pub use llm::openai;
pub use llm::summarizer::{Summarizer, SummaryResponse};
pub use news::{scraper::NewsScraper, ArticleSource};
pub use processor::{
    builder::NewscastProcessorBuilder,
    progress::{ProgressEvent, ProgressStream},
    NewscastProcessor,
};
pub use script::{ScriptComposer, ScriptStyle};
