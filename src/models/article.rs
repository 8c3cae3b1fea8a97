use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::hash::{Hash, Hasher};

use super::{ResponseStatus, SortType};

/// Timestamp layout used by the API for `publishedAt` (chrono syntax).
pub const PUBLISHED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A single news article as delivered by the API.
///
/// Identity is `(published_at, title, url)`: two records that only differ in
/// author, description or image are the same article. This matters for the
/// favorites list, which is persisted independently of the fetched copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub author: String,
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(rename = "urlToImage")]
    pub image_url: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
}

impl Article {
    /// Build an article from one JSON object.
    ///
    /// Returns `None` unless all six fields are present and are strings.
    pub fn from_json(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Encode back into the API's JSON shape.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "author": self.author,
            "title": self.title,
            "description": self.description,
            "url": self.url,
            "urlToImage": self.image_url,
            "publishedAt": self.published_at,
        })
    }
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.published_at == other.published_at
            && self.title == other.title
            && self.url == other.url
    }
}

impl Eq for Article {}

impl Hash for Article {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.published_at.hash(state);
        self.title.hash(state);
        self.url.hash(state);
    }
}

/// Envelope returned by the `/articles` endpoint.
#[derive(Debug, Clone)]
pub struct ArticleResponse {
    pub status: ResponseStatus,
    pub source: String,
    pub sort_by: SortType,
    pub articles: Vec<Article>,
}

#[derive(Deserialize)]
struct RawArticleResponse {
    status: ResponseStatus,
    source: String,
    #[serde(rename = "sortBy")]
    sort_by: SortType,
    articles: Vec<Map<String, Value>>,
}

impl ArticleResponse {
    /// Parse a response body.
    ///
    /// The envelope is all-or-nothing: a wrong type, a missing key or an
    /// unknown `status`/`sortBy` yields `None`. Inside a valid envelope,
    /// malformed article objects are skipped and the rest are kept.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let raw: RawArticleResponse = serde_json::from_slice(bytes).ok()?;
        let articles = raw
            .articles
            .into_iter()
            .filter_map(|obj| Article::from_json(&Value::Object(obj)))
            .collect();

        Some(Self {
            status: raw.status,
            source: raw.source,
            sort_by: raw.sort_by,
            articles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article_json() -> Value {
        json!({
            "author": "author1",
            "title": "title1",
            "description": "desc1",
            "url": "https://example.com/1",
            "urlToImage": "https://example.com/1.png",
            "publishedAt": "2017-05-20T18:00:56Z"
        })
    }

    #[test]
    fn test_from_json_valid() {
        let article = Article::from_json(&article_json()).unwrap();
        assert_eq!(article.author, "author1");
        assert_eq!(article.description, "desc1");
        assert_eq!(article.image_url, "https://example.com/1.png");
        assert_eq!(article.published_at, "2017-05-20T18:00:56Z");
    }

    #[test]
    fn test_from_json_missing_field() {
        for key in ["author", "title", "description", "url", "urlToImage", "publishedAt"] {
            let mut value = article_json();
            value.as_object_mut().unwrap().remove(key);
            assert!(Article::from_json(&value).is_none(), "missing {key} must fail");
        }
    }

    #[test]
    fn test_from_json_wrong_type() {
        let mut value = article_json();
        value["author"] = json!(42);
        assert!(Article::from_json(&value).is_none());

        let mut value = article_json();
        value["title"] = Value::Null;
        assert!(Article::from_json(&value).is_none());
    }

    #[test]
    fn test_from_json_not_an_object() {
        assert!(Article::from_json(&json!(["author"])).is_none());
        assert!(Article::from_json(&json!("text")).is_none());
    }

    #[test]
    fn test_to_json_matches_api_shape() {
        let article = Article::from_json(&article_json()).unwrap();
        assert_eq!(article.to_json(), article_json());
    }

    #[test]
    fn test_equality_ignores_author_and_description() {
        let a = Article::from_json(&article_json()).unwrap();
        let mut b = a.clone();
        b.author = "someone else".into();
        b.description = "rewritten".into();
        b.image_url = String::new();
        assert_eq!(a, b);

        let mut c = a.clone();
        c.url = "https://example.com/2".into();
        assert_ne!(a, c);
    }

    #[test]
    fn test_response_parse() {
        let body = json!({
            "status": "ok",
            "source": "the-next-web",
            "sortBy": "latest",
            "articles": [article_json(), {"title": "broken"}]
        });
        let response = ArticleResponse::parse(body.to_string().as_bytes()).unwrap();
        assert_eq!(response.status, ResponseStatus::Ok);
        assert_eq!(response.source, "the-next-web");
        assert_eq!(response.sort_by, SortType::Latest);
        assert_eq!(response.articles.len(), 1);
    }

    #[test]
    fn test_response_rejects_bad_envelope() {
        let cases = [
            json!({"source": "s", "sortBy": "top", "articles": []}),
            json!({"status": "fine", "source": "s", "sortBy": "top", "articles": []}),
            json!({"status": "ok", "source": "s", "sortBy": "newest", "articles": []}),
            json!({"status": "ok", "source": 1, "sortBy": "top", "articles": []}),
            json!({"status": "ok", "source": "s", "sortBy": "top", "articles": {}}),
            json!({"status": "ok", "source": "s", "sortBy": "top", "articles": [1, 2]}),
        ];
        for body in cases {
            assert!(
                ArticleResponse::parse(body.to_string().as_bytes()).is_none(),
                "accepted {body}"
            );
        }
    }

    #[test]
    fn test_response_rejects_non_json() {
        assert!(ArticleResponse::parse(b"<html>").is_none());
        assert!(ArticleResponse::parse(b"").is_none());
        assert!(ArticleResponse::parse(b"[]").is_none());
    }
}
