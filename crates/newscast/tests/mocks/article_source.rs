use std::sync::{Arc, Mutex};

use newscast::{types::Article, ArticleSource};

/// A valid article whose title and url are derived from `n`
pub fn article(n: usize) -> Article {
    Article::new(
        format!("Headline number {n}"),
        format!("Story {n} body. ").repeat(20),
        format!("https://news.example/article/{n}"),
    )
}

#[derive(Clone)]
pub struct MockArticleSource {
    pub articles: Vec<Article>,
    pub calls: Arc<Mutex<Vec<usize>>>,
    pub fail_with: Option<String>,
    pub panic_with: Option<String>,
}

impl MockArticleSource {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
            panic_with: None,
        }
    }

    pub fn with_articles(count: usize) -> Self {
        Self::new((1..=count).map(article).collect())
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::empty()
        }
    }

    /// Panics inside `gather`
    pub fn panicking(msg: &str) -> Self {
        Self {
            panic_with: Some(msg.to_string()),
            ..Self::empty()
        }
    }
}

impl ArticleSource for MockArticleSource {
    type Error = anyhow::Error;

    async fn gather(&self, target: usize) -> Result<Vec<Article>, Self::Error> {
        self.calls.lock().unwrap().push(target);
        if let Some(ref msg) = self.panic_with {
            panic!("{msg}");
        }
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.articles.iter().take(target).cloned().collect())
    }
}
