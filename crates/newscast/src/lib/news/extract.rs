//! # Article extraction
//!
//! Pulls a headline and readable body text out of an article page. This is a
//! heuristic: it favours `og:title` and the paragraphs inside `<article>`, and
//! falls back to the whole document when a page has no such markup.

use std::sync::LazyLock;

use ::scraper::{ElementRef, Html, Selector};
use itertools::Itertools;
use regex::Regex;

use super::ScrapeError;
use crate::types::Article;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Extracts an [`Article`] from the html served at `url`.
///
/// The article is not validated here; see [`Article::is_valid`].
pub fn extract_article(html: &str, url: &str) -> Result<Article, ScrapeError> {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_default();
    let content = extract_body(&document);

    if title.is_empty() && content.is_empty() {
        return Err(ScrapeError::Extraction {
            url: url.to_string(),
            reason: "page has no headline or paragraphs".into(),
        });
    }

    Ok(Article::new(title, content, url))
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css)
        .inspect_err(|e| tracing::error!(error = ?e, css, "Invalid selector"))
        .ok()
}

fn element_text(element: ElementRef<'_>) -> String {
    let text = element.text().collect::<String>();
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

fn extract_title(document: &Html) -> Option<String> {
    let og_title = selector(r#"meta[property="og:title"]"#).and_then(|s| {
        document
            .select(&s)
            .filter_map(|meta| meta.value().attr("content"))
            .map(|content| WHITESPACE_RE.replace_all(content.trim(), " ").into_owned())
            .find(|t| !t.is_empty())
    });

    og_title
        .or_else(|| first_text(document, "h1"))
        .or_else(|| first_text(document, "title"))
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let s = selector(css)?;
    document
        .select(&s)
        .map(element_text)
        .find(|t| !t.is_empty())
}

fn paragraphs(document: &Html, css: &str) -> Vec<String> {
    let Some(s) = selector(css) else {
        return Vec::new();
    };
    document
        .select(&s)
        .map(element_text)
        .filter(|p| !p.is_empty())
        .collect()
}

fn extract_body(document: &Html) -> String {
    let mut body = paragraphs(document, "article p");
    if body.is_empty() {
        body = paragraphs(document, "p");
    }
    body.into_iter().join("\n\n")
}
