//! HTTP page fetching

use crate::config::CrawlConfig;
use crate::error::{Error, Result};
use crate::parse::is_html_content_type;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, REFERER};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Result of one fetch; HTTP error statuses are data, not errors
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub content_type: Option<String>,
    /// Body text, read only for successful HTML responses
    pub body: String,
}

impl FetchedPage {
    /// Whether the response is an indexable HTML page
    pub fn is_indexable(&self) -> bool {
        self.status == StatusCode::OK.as_u16() && is_html_content_type(self.content_type.as_deref())
    }
}

/// HTTP client configured for polite crawling
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if !config.referrer.is_empty() {
            let referrer = HeaderValue::from_str(&config.referrer)
                .map_err(|e| Error::Config(format!("Invalid crawl.referrer: {}", e)))?;
            headers.insert(REFERER, referrer);
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| Error::Crawl(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch a URL; transport failures are errors, HTTP statuses are not
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        debug!("Fetching: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let mut page = FetchedPage {
            status,
            content_type,
            body: String::new(),
        };
        if page.is_indexable() {
            page.body = response.text().await?;
        }

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> CrawlConfig {
        CrawlConfig {
            user_agent: "sitesearch-test".to_string(),
            referrer: "https://ref.test".to_string(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_html_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", "sitesearch-test"))
            .and(header("referer", "https://ref.test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<p>hello</p>".as_bytes().to_vec(), "text/html; charset=utf-8"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        let page = fetcher.fetch(&url).await.unwrap();

        assert_eq!(page.status, 200);
        assert!(page.is_indexable());
        assert_eq!(page.body, "<p>hello</p>");
    }

    #[tokio::test]
    async fn test_error_status_and_non_html_are_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"a": 1})))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();

        let missing = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let page = fetcher.fetch(&missing).await.unwrap();
        assert_eq!(page.status, 404);
        assert!(!page.is_indexable());
        assert!(page.body.is_empty());

        let data = Url::parse(&format!("{}/data", server.uri())).unwrap();
        let page = fetcher.fetch(&data).await.unwrap();
        assert_eq!(page.status, 200);
        assert!(!page.is_indexable());
    }

    #[tokio::test]
    async fn test_transport_failure_is_error() {
        let fetcher = Fetcher::new(&test_config()).unwrap();
        let url = Url::parse("http://127.0.0.1:1/unreachable").unwrap();
        assert!(fetcher.fetch(&url).await.is_err());
    }
}
