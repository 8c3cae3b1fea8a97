use std::sync::Arc;
use tokio::sync::mpsc;

use super::activity::NetworkActivity;
use super::request::{Loaded, RequestSlot};
use super::ApiEndpoint;
use crate::models::{Article, ArticleResponse};

/// Fetches the articles of a single source.
///
/// `load` returns the generation of the new request; the completion arrives
/// later as a [`Loaded`] message carrying the same generation. Only the most
/// recent generation is current.
pub trait ArticleLoader {
    fn load(&mut self, source_id: &str) -> u64;
    fn is_current(&self, generation: u64) -> bool;
}

/// [`ArticleLoader`] backed by the `/articles` endpoint.
pub struct NewsLoader {
    endpoint: Arc<ApiEndpoint>,
    slot: RequestSlot<Article>,
}

impl NewsLoader {
    pub fn new(
        client: reqwest::Client,
        endpoint: Arc<ApiEndpoint>,
        activity: Arc<dyn NetworkActivity>,
        completions: mpsc::UnboundedSender<Loaded<Article>>,
    ) -> Self {
        let timeout = endpoint.timeout();
        Self {
            endpoint,
            slot: RequestSlot::new(client, activity, completions, timeout),
        }
    }

    pub fn generation(&self) -> u64 {
        self.slot.generation()
    }
}

impl ArticleLoader for NewsLoader {
    fn load(&mut self, source_id: &str) -> u64 {
        let url = self.endpoint.articles_url(source_id);
        self.slot
            .issue(url, format!("articles:{source_id}"), parse_articles)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.slot.is_current(generation)
    }
}

fn parse_articles(bytes: &[u8]) -> Option<Vec<Article>> {
    ArticleResponse::parse(bytes).map(|response| response.articles)
}
