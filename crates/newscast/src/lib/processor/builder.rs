use crate::{
    avatar::{AvatarRenderer, RenderWait},
    news::ArticleSource,
    script::{ScriptComposer, ScriptStyle},
    NewscastProcessor, Summarizer,
};

pub struct NewscastProcessorBuilder<A = (), S = (), R = ()> {
    article_source: A,
    summarizer: S,
    renderer: R,
    script_style: ScriptStyle,
    render_wait: RenderWait,
}

impl NewscastProcessorBuilder {
    pub fn new() -> Self {
        Self {
            article_source: (),
            summarizer: (),
            renderer: (),
            script_style: ScriptStyle::default(),
            render_wait: RenderWait::default(),
        }
    }
}

impl Default for NewscastProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, S, R> NewscastProcessorBuilder<A, S, R> {
    pub fn article_source<A2: ArticleSource + Send + Sync + 'static>(
        self,
        article_source: A2,
    ) -> NewscastProcessorBuilder<A2, S, R> {
        NewscastProcessorBuilder {
            article_source,
            summarizer: self.summarizer,
            renderer: self.renderer,
            script_style: self.script_style,
            render_wait: self.render_wait,
        }
    }

    pub fn summarizer<S2: Summarizer + Send + Sync + 'static>(
        self,
        summarizer: S2,
    ) -> NewscastProcessorBuilder<A, S2, R> {
        NewscastProcessorBuilder {
            article_source: self.article_source,
            summarizer,
            renderer: self.renderer,
            script_style: self.script_style,
            render_wait: self.render_wait,
        }
    }

    pub fn renderer<R2: AvatarRenderer + Send + Sync + 'static>(
        self,
        renderer: R2,
    ) -> NewscastProcessorBuilder<A, S, R2> {
        NewscastProcessorBuilder {
            article_source: self.article_source,
            summarizer: self.summarizer,
            renderer,
            script_style: self.script_style,
            render_wait: self.render_wait,
        }
    }

    pub fn script_style(mut self, script_style: ScriptStyle) -> Self {
        self.script_style = script_style;
        self
    }

    pub fn render_wait(mut self, render_wait: RenderWait) -> Self {
        self.render_wait = render_wait;
        self
    }
}

impl<A, S, R> NewscastProcessorBuilder<A, S, R>
where
    A: ArticleSource + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
    R: AvatarRenderer + Send + Sync + 'static,
{
    pub fn build(self) -> NewscastProcessor<A, S, R> {
        NewscastProcessor::new(
            self.article_source,
            self.summarizer,
            self.renderer,
            ScriptComposer::new(self.script_style),
            self.render_wait,
        )
    }
}
