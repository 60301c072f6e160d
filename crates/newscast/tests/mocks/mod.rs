#![allow(dead_code)]

pub mod article_source;
pub mod renderer;
pub mod summarizer;
