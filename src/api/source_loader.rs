use std::sync::Arc;
use tokio::sync::mpsc;

use super::activity::NetworkActivity;
use super::request::{Loaded, RequestSlot};
use super::ApiEndpoint;
use crate::models::{Country, Language, Source, SourceCategory, SourceResponse};

/// Optional filters for the source catalogue. `None` means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceFilter {
    pub category: Option<SourceCategory>,
    pub language: Option<Language>,
    pub country: Option<Country>,
}

/// Fetches the source catalogue; same generation contract as
/// [`ArticleLoader`](super::ArticleLoader).
pub trait SourceLoading {
    fn load(&mut self, filter: SourceFilter) -> u64;
    fn is_current(&self, generation: u64) -> bool;
}

pub struct SourceLoader {
    endpoint: Arc<ApiEndpoint>,
    slot: RequestSlot<Source>,
}

impl SourceLoader {
    pub fn new(
        client: reqwest::Client,
        endpoint: Arc<ApiEndpoint>,
        activity: Arc<dyn NetworkActivity>,
        completions: mpsc::UnboundedSender<Loaded<Source>>,
    ) -> Self {
        let timeout = endpoint.timeout();
        Self {
            endpoint,
            slot: RequestSlot::new(client, activity, completions, timeout),
        }
    }
}

impl SourceLoading for SourceLoader {
    fn load(&mut self, filter: SourceFilter) -> u64 {
        let url = self.endpoint.sources_url(&filter);
        let label = format!("sources:{}", url.query().unwrap_or("all"));
        self.slot.issue(url, label, parse_sources)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.slot.is_current(generation)
    }
}

fn parse_sources(bytes: &[u8]) -> Option<Vec<Source>> {
    SourceResponse::parse(bytes).map(|response| response.sources)
}
