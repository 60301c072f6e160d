use std::{ops::Deref, time::Duration};

use url::Url;

use crate::{
    config::Config,
    news::{discover_links, extract::extract_article, ArticleSource, HeadlineLinkFilter, LinkFilter, ScrapeError},
    types::Article,
};

/// Scrapes articles straight from news site front pages
pub struct NewsScraper<F = HeadlineLinkFilter> {
    client: reqwest::Client,
    sources: Vec<String>,
    link_filter: F,
    max_links_per_source: usize,
    fetch_delay: Duration,
}

impl<F> Deref for NewsScraper<F> {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl NewsScraper {
    const MAX_LINKS_PER_SOURCE: usize = 10;
    const FETCH_DELAY: Duration = Duration::from_millis(500);

    pub fn new(client: reqwest::Client, sources: Vec<String>) -> Self {
        Self {
            client,
            sources,
            link_filter: HeadlineLinkFilter,
            max_links_per_source: Self::MAX_LINKS_PER_SOURCE,
            fetch_delay: Self::FETCH_DELAY,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout())
            .build()?;

        let sources = config
            .news_sources
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Ok(Self::new(client, sources))
    }
}

impl<F> NewsScraper<F> {
    pub fn with_link_filter<F2: LinkFilter>(self, link_filter: F2) -> NewsScraper<F2> {
        NewsScraper {
            client: self.client,
            sources: self.sources,
            link_filter,
            max_links_per_source: self.max_links_per_source,
            fetch_delay: self.fetch_delay,
        }
    }

    pub fn with_max_links(mut self, max_links_per_source: usize) -> Self {
        self.max_links_per_source = max_links_per_source;
        self
    }

    /// Pause between consecutive article fetches
    pub fn with_fetch_delay(mut self, fetch_delay: Duration) -> Self {
        self.fetch_delay = fetch_delay;
        self
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        let html = self
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(html)
    }

    /// Fetches and extracts one article without validating it
    #[tracing::instrument(skip(self))]
    pub async fn fetch_article(&self, url: &str) -> Result<Article, ScrapeError> {
        let html = self.fetch_html(url).await?;
        extract_article(&html, url)
    }

    /// Scrapes a single article, rejecting it if it is too thin to summarize
    pub async fn scrape_single(&self, url: &str) -> Result<Article, ScrapeError> {
        tracing::info!(url, "Scraping single article");
        let article = self.fetch_article(url).await?;

        if article.is_valid() {
            Ok(article)
        } else {
            Err(ScrapeError::LowQuality(url.to_string()))
        }
    }
}

impl<F: LinkFilter> NewsScraper<F> {
    /// Loads a source's front page and collects its candidate article links
    #[tracing::instrument(skip(self))]
    pub async fn article_links(&self, source_url: &str) -> Result<Vec<String>, ScrapeError> {
        let base = Url::parse(source_url)?;
        let html = self.fetch_html(source_url).await?;

        let links = discover_links(&html, &base, &self.link_filter, self.max_links_per_source);
        tracing::info!(count = links.len(), source_url, "Found potential article links");

        Ok(links)
    }
}

impl<F: LinkFilter + Send + Sync> ArticleSource for NewsScraper<F> {
    type Error = ScrapeError;

    #[tracing::instrument(skip(self), fields(sources = self.sources.len()))]
    async fn gather(&self, target: usize) -> Result<Vec<Article>, Self::Error> {
        let mut articles: Vec<Article> = Vec::new();
        let mut sources_tried = 0;

        for source_url in &self.sources {
            if articles.len() >= target {
                break;
            }

            sources_tried += 1;
            tracing::info!(
                source_url = %source_url,
                attempt = sources_tried,
                total = self.sources.len(),
                "Trying news source"
            );

            let links = match self.article_links(source_url).await {
                Ok(links) => links,
                Err(e) => {
                    tracing::warn!(error = ?e, source_url = %source_url, "Failed to scrape news source");
                    continue;
                }
            };

            for link in links {
                if articles.len() >= target {
                    break;
                }

                match self.fetch_article(&link).await {
                    Ok(article) if article.is_valid() => {
                        tracing::info!(title = %article.title, url = %link, "Scraped article");
                        articles.push(article);
                    }
                    Ok(_) => tracing::debug!(url = %link, "Skipping article below quality bar"),
                    Err(e) => tracing::warn!(error = ?e, url = %link, "Failed to extract article"),
                }

                if !self.fetch_delay.is_zero() {
                    tokio::time::sleep(self.fetch_delay).await;
                }
            }
        }

        tracing::info!(
            count = articles.len(),
            sources_tried,
            "Finished gathering articles"
        );
        Ok(articles)
    }
}
