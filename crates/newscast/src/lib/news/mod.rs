pub mod extract;
pub mod scraper;

use std::{fmt::Debug, future::Future, sync::LazyLock};

use itertools::Itertools;
use regex::Regex;
use url::Url;

use crate::types::Article;

static YEAR_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/20\d{2}").unwrap());

/// Anything that can hand the pipeline a batch of fresh articles
pub trait ArticleSource {
    type Error: Debug + Send;

    /// Gathers at most `target` valid articles, in discovery order
    fn gather(&self, target: usize) -> impl Future<Output = Result<Vec<Article>, Self::Error>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to extract article from {url}: {reason}")]
    Extraction { url: String, reason: String },
    #[error("Article at {0} does not meet minimum quality requirements")]
    LowQuality(String),
}

/// Decides whether a link found on a source page points at an article
pub trait LinkFilter {
    fn is_candidate(&self, link: &Url) -> bool;
}

impl<F: Fn(&Url) -> bool> LinkFilter for F {
    fn is_candidate(&self, link: &Url) -> bool {
        self(link)
    }
}

/// Best-effort URL heuristics shared by most news sites
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlineLinkFilter;

impl LinkFilter for HeadlineLinkFilter {
    fn is_candidate(&self, link: &Url) -> bool {
        if !matches!(link.scheme(), "http" | "https") {
            return false;
        }

        let href = link.as_str();
        let lowered = href.to_lowercase();

        lowered.contains("article")
            || lowered.contains("news")
            || href.contains("/story/")
            || YEAR_SEGMENT_RE.is_match(link.path())
    }
}

/// Collects candidate article links from a source page.
///
/// Relative links are resolved against `base`, fragments are dropped and
/// duplicates removed; discovery order is preserved. The source page itself is
/// never returned.
pub fn discover_links(
    html: &str,
    base: &Url,
    filter: &impl LinkFilter,
    max_links: usize,
) -> Vec<String> {
    let document = ::scraper::Html::parse_document(html);
    let Ok(anchors) = ::scraper::Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&anchors)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| {
            !href.is_empty()
                && !href.starts_with('#')
                && !href.starts_with("javascript:")
                && !href.starts_with("mailto:")
        })
        .filter_map(|href| base.join(href).ok())
        .map(|mut link| {
            link.set_fragment(None);
            link
        })
        .filter(|link| link != base && filter.is_candidate(link))
        .map(String::from)
        .unique()
        .take(max_links)
        .collect()
}
