//! sitesearch: a site crawler with a lemma index and ranked search

pub mod app;
pub mod commands;
pub mod config;
pub mod crawl;
pub mod error;
pub mod index;
pub mod indexing;
pub mod lemma;
pub mod meta;
pub mod morph;
pub mod parse;
pub mod progress;
pub mod search;
pub mod server;

pub use app::App;
pub use error::{Error, Result};
