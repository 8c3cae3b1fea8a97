//! HTTP access to the news API.
//!
//! - [`NewsLoader`] fetches the articles of one source at a time
//! - [`SourceLoader`] fetches the filtered source catalogue
//! - [`NetworkActivityListener`] counts in-flight requests for the UI
//!
//! Both loaders follow the same contract: a new request aborts the previous
//! one, every request is tagged with a generation number, and completions are
//! sent as [`Loaded`] messages over an mpsc channel that the UI event loop
//! drains. Failures never reach the caller as errors; they are logged and
//! delivered as an empty list.

mod activity;
mod news_loader;
mod request;
mod source_loader;

pub use activity::{ActivityGuard, NetworkActivity, NetworkActivityListener};
pub use news_loader::{ArticleLoader, NewsLoader};
pub use request::{FetchError, Loaded};
pub use source_loader::{SourceFilter, SourceLoader, SourceLoading};

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Public newsapi.org v1 endpoint.
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("Invalid API base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("API base URL cannot carry a path: {0}")]
    NotABase(String),
}

/// Where and how to reach the API.
///
/// The key is kept as a [`SecretString`] so it never shows up in `Debug`
/// output or logs.
#[derive(Debug)]
pub struct ApiEndpoint {
    base_url: Url,
    api_key: Option<SecretString>,
    timeout: Duration,
}

impl ApiEndpoint {
    pub fn new(base_url: &str, api_key: Option<SecretString>) -> Result<Self, EndpointError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(EndpointError::NotABase(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            api_key,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `{base}/articles?apiKey={key}&source={id}`
    pub fn articles_url(&self, source_id: &str) -> Url {
        let mut url = self.endpoint("articles");
        {
            let mut query = url.query_pairs_mut();
            if let Some(key) = &self.api_key {
                query.append_pair("apiKey", key.expose_secret());
            }
            query.append_pair("source", source_id);
        }
        url
    }

    /// `{base}/sources[?category=..&language=..&country=..]`
    ///
    /// Only the filters that are set appear in the query.
    pub fn sources_url(&self, filter: &SourceFilter) -> Url {
        let mut url = self.endpoint("sources");
        let params: Vec<(&str, &str)> = [
            ("category", filter.category.map(|c| c.as_str())),
            ("language", filter.language.map(|l| l.as_str())),
            ("country", filter.country.map(|c| c.as_str())),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect();

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        url
    }

    fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Country, Language, SourceCategory};

    fn endpoint() -> ApiEndpoint {
        ApiEndpoint::new(DEFAULT_BASE_URL, Some(SecretString::from("k3y".to_string()))).unwrap()
    }

    #[test]
    fn test_articles_url() {
        let url = endpoint().articles_url("the-next-web");
        assert_eq!(
            url.as_str(),
            "https://newsapi.org/v1/articles?apiKey=k3y&source=the-next-web"
        );
    }

    #[test]
    fn test_articles_url_encodes_source() {
        let url = endpoint().articles_url("a&b=c d");
        let pairs: Vec<_> = url.query_pairs().collect();
        assert_eq!(pairs[1].1, "a&b=c d");
        assert!(!url.as_str().contains("a&b=c"));
    }

    #[test]
    fn test_articles_url_without_key() {
        let endpoint = ApiEndpoint::new("http://localhost:9000/v1/", None).unwrap();
        assert_eq!(
            endpoint.articles_url("bbc").as_str(),
            "http://localhost:9000/v1/articles?source=bbc"
        );
    }

    #[test]
    fn test_sources_url_without_filters() {
        let url = endpoint().sources_url(&SourceFilter::default());
        assert_eq!(url.as_str(), "https://newsapi.org/v1/sources");
    }

    #[test]
    fn test_sources_url_with_filters_in_order() {
        let filter = SourceFilter {
            category: Some(SourceCategory::ScienceAndNature),
            language: Some(Language::De),
            country: Some(Country::In),
        };
        let url = endpoint().sources_url(&filter);
        assert_eq!(
            url.as_str(),
            "https://newsapi.org/v1/sources?category=science-and-nature&language=de&country=in"
        );

        let only_country = SourceFilter {
            country: Some(Country::Us),
            ..SourceFilter::default()
        };
        assert_eq!(
            endpoint().sources_url(&only_country).as_str(),
            "https://newsapi.org/v1/sources?country=us"
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", endpoint());
        assert!(!debug.contains("k3y"));
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(matches!(
            ApiEndpoint::new("mailto:news@example.com", None),
            Err(EndpointError::NotABase(_))
        ));
        assert!(ApiEndpoint::new("not a url", None).is_err());
    }
}
