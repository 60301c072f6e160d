pub mod builder;
pub mod progress;

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use anyhow::Context;
use chrono::Utc;
use futures::FutureExt;

use crate::{
    avatar::{did::DidClient, wait_until_terminal, AvatarRenderer, RenderWait},
    config::Config,
    error::{PipelineError, Stage},
    news::{scraper::NewsScraper, ArticleSource},
    openai::OpenAIClient,
    processor::{
        builder::NewscastProcessorBuilder,
        progress::{Progress, ProgressStream},
    },
    script::{estimate_reading_time, has_sentence_content, ScriptComposer},
    types::{Article, PipelineRun, SummarizedArticle},
    Summarizer,
};

/// Drives one news video run: gather, summarize, compose, render.
///
/// Holds no per-run state, so a single processor can serve concurrent runs.
#[derive(Debug)]
pub struct NewscastProcessor<A, S, R>
where
    A: ArticleSource + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
    R: AvatarRenderer + Send + Sync + 'static,
{
    article_source: A,
    summarizer: S,
    renderer: R,
    composer: ScriptComposer,
    render_wait: RenderWait,
}

impl<A, S, R> NewscastProcessor<A, S, R>
where
    A: ArticleSource + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
    R: AvatarRenderer + Send + Sync + 'static,
{
    pub fn new(
        article_source: A,
        summarizer: S,
        renderer: R,
        composer: ScriptComposer,
        render_wait: RenderWait,
    ) -> Self {
        NewscastProcessor {
            article_source,
            summarizer,
            renderer,
            composer,
            render_wait,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn article_source(&self) -> &A {
        &self.article_source
    }

    pub fn summarizer(&self) -> &S {
        &self.summarizer
    }

    /// Runs the whole pipeline and returns once the video is ready
    pub async fn run(&self, target_article_count: usize) -> Result<PipelineRun, PipelineError> {
        self.execute(target_article_count, &mut Progress::silent())
            .await
    }

    /// Runs the pipeline on a background task, streaming progress as it goes.
    ///
    /// The stream ends after exactly one `complete` or `error` event, even when
    /// a collaborator panics. Dropping it does not cancel the run.
    pub fn run_with_progress(self: Arc<Self>, target_article_count: usize) -> ProgressStream {
        let (mut progress, rx) = Progress::channel();

        tokio::spawn(async move {
            let outcome = AssertUnwindSafe(self.execute(target_article_count, &mut progress))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(run)) => progress.complete(run),
                Ok(Err(e)) => progress.fail(&e),
                Err(panic) => {
                    let stage = progress.stage();
                    let reason = panic_message(panic.as_ref());
                    tracing::error!(%stage, %reason, "Pipeline run panicked");
                    progress.fail(&PipelineError::msg(stage, format!("run panicked: {reason}")));
                }
            }
        });

        ProgressStream::new(rx)
    }

    #[tracing::instrument(skip(self, progress))]
    async fn execute(
        &self,
        target_article_count: usize,
        progress: &mut Progress,
    ) -> Result<PipelineRun, PipelineError> {
        let articles = self
            .gather_articles(target_article_count, progress)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Pipeline failed"))?;

        let summarized = self
            .summarize_articles(&articles, progress)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Pipeline failed"))?;

        let script = self
            .compose_script(&summarized, progress)
            .inspect_err(|e| tracing::error!(error = %e, "Pipeline failed"))?;

        let video_url = self
            .render_video(&script, progress)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Pipeline failed"))?;

        tracing::info!(articles = summarized.len(), %video_url, "News video generated");

        Ok(PipelineRun {
            articles: summarized,
            script,
            video_url,
            generated_at: Utc::now(),
        })
    }

    #[tracing::instrument(skip(self, progress))]
    async fn gather_articles(
        &self,
        target: usize,
        progress: &mut Progress,
    ) -> Result<Vec<Article>, PipelineError> {
        progress.enter(Stage::Scrape);
        progress.report(5, format!("Searching news sources for {target} articles"));

        let articles = self
            .article_source
            .gather(target)
            .await
            .map_err(|e| {
                PipelineError::msg(Stage::Scrape, format!("Failed to gather articles: {e:?}"))
            })?;

        if articles.is_empty() {
            return Err(PipelineError::msg(
                Stage::Scrape,
                "No articles found from any news source",
            ));
        }

        progress.report(20, format!("Found {} articles", articles.len()));
        Ok(articles)
    }

    /// Summarizes in source order. A failed article is logged and left out.
    #[tracing::instrument(skip_all, fields(count = articles.len()))]
    async fn summarize_articles(
        &self,
        articles: &[Article],
        progress: &mut Progress,
    ) -> Result<Vec<SummarizedArticle>, PipelineError> {
        progress.enter(Stage::Summarize);
        let total = articles.len();
        let mut summarized = Vec::with_capacity(total);

        for (idx, article) in articles.iter().enumerate() {
            let position = idx + 1;

            match self.summarizer.summarize(&article.title, &article.content).await {
                Ok(resp) if has_sentence_content(&resp.summary) => {
                    summarized.push(SummarizedArticle::from_article(article, resp.summary));
                    progress.report(
                        Self::summary_progress(position, total),
                        format!("Summarized article {position}/{total}: {}", article.title),
                    );
                }
                Ok(_) => {
                    tracing::warn!(title = %article.title, "Summary has no sentences, skipping article");
                    progress.report(
                        Self::summary_progress(position, total),
                        format!("Skipped article {position}/{total}: {}", article.title),
                    );
                }
                Err(e) => {
                    tracing::warn!(error = ?e, title = %article.title, "Failed to summarize article");
                    progress.report(
                        Self::summary_progress(position, total),
                        format!("Skipped article {position}/{total}: {}", article.title),
                    );
                }
            }
        }

        if summarized.is_empty() {
            return Err(PipelineError::msg(
                Stage::Summarize,
                "Failed to summarize any articles",
            ));
        }

        tracing::info!(summarized = summarized.len(), total, "Summarized articles");
        Ok(summarized)
    }

    fn compose_script(
        &self,
        summarized: &[SummarizedArticle],
        progress: &mut Progress,
    ) -> Result<String, PipelineError> {
        progress.enter(Stage::Script);
        let script = self.composer.compose(summarized);
        if script.trim().is_empty() {
            return Err(PipelineError::msg(Stage::Script, "Generated script is empty"));
        }

        let words = script.split_whitespace().count();
        progress.report(
            65,
            format!(
                "Script ready: {words} words, about {}s of narration",
                estimate_reading_time(&script).as_secs()
            ),
        );
        Ok(script)
    }

    #[tracing::instrument(skip_all)]
    async fn render_video(
        &self,
        script: &str,
        progress: &mut Progress,
    ) -> Result<String, PipelineError> {
        progress.enter(Stage::Render);
        let job_id = self
            .renderer
            .submit(script)
            .await
            .map_err(|e| PipelineError::new(Stage::Render, e))?;
        progress.report(70, format!("Video render submitted: {job_id}"));

        let video_url = wait_until_terminal(&self.renderer, &job_id, self.render_wait)
            .await
            .map_err(|e| PipelineError::new(Stage::Render, e))?;
        progress.report(95, "Video render complete");

        Ok(video_url)
    }

    /// Spreads the summarize step over the 20..=60 range
    fn summary_progress(position: usize, total: usize) -> u8 {
        let span = 40 * position / total.max(1);
        (20 + span.min(40)) as u8
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

impl NewscastProcessor<NewsScraper, OpenAIClient, DidClient> {
    /// Wires the production providers from a validated [`Config`]
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let scraper = NewsScraper::from_config(config).context("Failed to build news scraper")?;
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build OpenAI http client")?;
        let openai =
            OpenAIClient::new(&config.openai_key, &config.openai_model).with_client(http_client);
        let did = DidClient::from_config(config).context("Failed to build D-ID client")?;

        Ok(NewscastProcessorBuilder::new()
            .article_source(scraper)
            .summarizer(openai)
            .renderer(did)
            .script_style(config.script_style)
            .render_wait(config.render_wait())
            .build())
    }
}
