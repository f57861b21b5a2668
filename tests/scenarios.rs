//! End-to-end scenarios over the HTTP API

use serde_json::Value;
use sitesearch::config::{Config, SiteConfig};
use sitesearch::meta::MetaDb;
use sitesearch::server::build_router;
use sitesearch::App;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        )
        .into_bytes(),
        "text/html; charset=utf-8",
    )
}

async fn mount(server: &MockServer, at: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn site_server() -> MockServer {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            "Home",
            r#"<p>Кошка живёт в саду</p>
               <a href="/about">About</a>
               <a href="/docs/">Docs</a>
               <a href="/logo.png">Logo</a>
               <a href="https://elsewhere.test/page">Elsewhere</a>"#,
        ),
    )
    .await;
    mount(
        &server,
        "/about",
        html("About", r#"<p>Кошки и собаки живут дружно</p><a href="/">Home</a>"#),
    )
    .await;
    mount(
        &server,
        "/docs",
        html("Docs", "<p>Rust documentation for cargo users</p>"),
    )
    .await;
    server
}

struct Harness {
    base: String,
    db: MetaDb,
    client: reqwest::Client,
    _tmp: TempDir,
}

impl Harness {
    async fn start(site_urls: &[String]) -> Self {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.crawl.delay_min_ms = 0;
        config.crawl.delay_max_ms = 0;
        config.crawl.timeout_secs = 5;
        config.crawl.workers = Some(2);
        config.sites = site_urls
            .iter()
            .enumerate()
            .map(|(i, url)| SiteConfig {
                name: format!("Site {}", i),
                url: url.clone(),
            })
            .collect();

        let app = App::build(config).await.unwrap();
        let db = app.db.clone();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(app)).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            db,
            client: reqwest::Client::new(),
            _tmp: tmp,
        }
    }

    fn url(&self, endpoint: &str, params: &[(&str, &str)]) -> Url {
        Url::parse_with_params(&format!("{}{}", self.base, endpoint), params).unwrap()
    }

    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> (u16, Value) {
        let response = self
            .client
            .get(self.url(endpoint, params))
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    async fn post(&self, endpoint: &str, params: &[(&str, &str)]) -> (u16, Value) {
        let response = self
            .client
            .post(self.url(endpoint, params))
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    async fn wait_until_idle(&self) -> Value {
        for _ in 0..200 {
            let (_, body) = self.get("/api/statistics", &[]).await;
            if body["statistics"]["total"]["indexing"] == Value::Bool(false) {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("indexing did not finish in time");
    }
}

#[tokio::test]
async fn full_indexing_then_search() {
    let server = site_server().await;
    let api = Harness::start(&[server.uri()]).await;

    let (status, body) = api.get("/api/statistics", &[]).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], true);
    assert_eq!(body["statistics"]["total"]["sites"], 1);
    assert_eq!(body["statistics"]["detailed"][0]["status"], "NOT_INDEXED");
    assert_eq!(body["statistics"]["detailed"][0]["pages"], 0);

    let (status, body) = api.get("/api/startIndexing", &[]).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], true);

    let body = api.wait_until_idle().await;
    let detail = &body["statistics"]["detailed"][0];
    assert_eq!(detail["status"], "INDEXED");
    assert_eq!(detail["pages"], 3);
    assert!(detail["lemmas"].as_u64().unwrap() > 0);
    assert!(detail["error"].is_null());
    assert!(detail["statusTimeEpochMillis"].as_i64().unwrap() > 0);
    assert_eq!(body["statistics"]["total"]["pages"], 3);

    let (status, body) = api.get("/api/search", &[("query", "кошка")]).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], true);
    assert_eq!(body["count"], 2);

    let (_, body) = api.get("/api/search", &[("query", "кошки собаки")]).await;
    assert_eq!(body["count"], 1);
    let hit = &body["data"][0];
    assert_eq!(hit["uri"], "/about");
    assert_eq!(hit["title"], "About");
    assert_eq!(hit["site"], server.uri().as_str());
    assert_eq!(hit["siteName"], "Site 0");
    assert_eq!(hit["relevance"], 1.0);
    assert!(hit["snippet"].as_str().unwrap().contains("<b>собаки</b>"));

    let (_, body) = api
        .get(
            "/api/search",
            &[("query", "кошка"), ("offset", "1"), ("limit", "5")],
        )
        .await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = api
        .get("/api/search", &[("query", "cargo"), ("site", &server.uri())])
        .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["uri"], "/docs");

    let (status, body) = api
        .get(
            "/api/search",
            &[("query", "cargo"), ("site", "https://unknown.test")],
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["result"], false);

    let page = format!("{}/docs", server.uri());
    let (status, body) = api.post("/api/indexPage", &[("url", &page)]).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], true);

    let (_, body) = api.get("/api/search", &[("query", "cargo")]).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn rejected_requests() {
    let server = site_server().await;
    let api = Harness::start(&[server.uri()]).await;

    let (status, body) = api.get("/api/stopIndexing", &[]).await;
    assert_eq!(status, 400);
    assert_eq!(body["result"], false);
    assert_eq!(body["error"], "Indexing is not running");

    let (status, body) = api.get("/api/search", &[("query", "  ")]).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Empty search query");

    let (status, _) = api.get("/api/search", &[]).await;
    assert_eq!(status, 400);

    let (status, body) = api.get("/api/search", &[("query", "и на 42")]).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "The query contains no meaningful words");

    let (status, _) = api.post("/api/indexPage", &[]).await;
    assert_eq!(status, 400);

    let (status, _) = api
        .post("/api/indexPage", &[("url", "https://elsewhere.test/page")])
        .await;
    assert_eq!(status, 400);

    let page = format!("{}/about", server.uri());
    let (status, body) = api.post("/api/indexPage", &[("url", &page)]).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("not been indexed"));

    let image = format!("{}/logo.png", server.uri());
    let (status, _) = api.post("/api/indexPage", &[("url", &image)]).await;
    assert_eq!(status, 400);

    assert!(api.db.list_sites().await.unwrap().is_empty());
    let (_, body) = api.get("/api/statistics", &[]).await;
    assert_eq!(body["statistics"]["total"]["pages"], 0);
    assert_eq!(body["statistics"]["total"]["lemmas"], 0);
    assert_eq!(body["statistics"]["detailed"][0]["status"], "NOT_INDEXED");
}

#[tokio::test]
async fn stop_interrupts_running_indexing() {
    let slow = MockServer::start().await;
    mount(
        &slow,
        "/",
        html("Slow", r#"<p>slow page</p><a href="/next">Next</a>"#)
            .set_delay(Duration::from_millis(1000)),
    )
    .await;
    let api = Harness::start(&[slow.uri()]).await;

    let (status, _) = api.get("/api/startIndexing", &[]).await;
    assert_eq!(status, 200);

    let (status, body) = api.get("/api/startIndexing", &[]).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Indexing is already running");

    let (status, body) = api.get("/api/search", &[("query", "slow")]).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("in progress"));

    let page = format!("{}/next", slow.uri());
    let (status, _) = api.post("/api/indexPage", &[("url", &page)]).await;
    assert_eq!(status, 400);
    for site in api.db.list_sites().await.unwrap() {
        assert!(api.db.get_page(site.id, "/next").await.unwrap().is_none());
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    let (status, body) = api.get("/api/stopIndexing", &[]).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], true);

    let body = api.wait_until_idle().await;
    let detail = &body["statistics"]["detailed"][0];
    assert_eq!(detail["status"], "FAILED");
    assert_eq!(detail["error"], "Indexing stopped by user");
    assert_eq!(detail["pages"], 1);
}
