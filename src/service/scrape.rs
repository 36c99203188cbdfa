//! URL scraping: fetch a page and reduce it to title + body text.
//!
//! No content-area detection is attempted. Navigation, footers, and inline
//! script text all end up in `text`; the prompts downstream are tolerant of
//! that noise.

use super::PageScraper;
use crate::error::{LinkpostError, Service};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// What a scrape yields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub title: String,
    pub text: String,
}

impl ScrapedPage {
    /// Title and body joined the way the acquirer consumes them.
    pub fn into_content(self) -> String {
        format!("{}\n\n{}", self.title, self.text)
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Reduce an HTML document to its first `<title>` and collapsed `<body>` text.
pub fn parse_page(html: &str) -> ScrapedPage {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    let body = document
        .select(&BODY)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    ScrapedPage {
        title: title.trim().to_string(),
        text: collapse_whitespace(&body),
    }
}

fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input, " ").trim().to_string()
}

/// Plain GET-and-parse scraper.
#[derive(Debug, Clone)]
pub struct HttpScraper {
    client: reqwest::Client,
}

impl HttpScraper {
    pub fn new(timeout: Duration) -> Result<Self, LinkpostError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LinkpostError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageScraper for HttpScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, LinkpostError> {
        if !is_url(url) {
            return Err(LinkpostError::upstream(
                Service::Scrape,
                None,
                format!("'{url}' is not an HTTP/HTTPS URL"),
            ));
        }
        info!("Scraping: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            LinkpostError::upstream(Service::Scrape, None, format!("failed to fetch '{url}': {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LinkpostError::upstream(
                Service::Scrape,
                Some(status.as_u16()),
                format!("failed to fetch '{url}'"),
            ));
        }

        let html = response.text().await.map_err(|e| {
            LinkpostError::upstream(
                Service::Scrape,
                Some(status.as_u16()),
                format!("failed to read body of '{url}': {e}"),
            )
        })?;

        let page = parse_page(&html);
        debug!("Scraped '{}': {} chars of text", page.title, page.text.len());
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head><title> Lilly opens TuneLab </title></head>
<body>
  <nav>Home | News</nav>
  <article><h1>TuneLab</h1>
    <p>Lilly   processed 10 million
       compounds.</p>
  </article>
</body></html>"#;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/a"));
        assert!(is_url("http://example.com/a"));
        assert!(!is_url("example.com"));
        assert!(!is_url(""));
    }

    #[test]
    fn parse_page_collapses_whitespace() {
        let page = parse_page(PAGE);
        assert_eq!(page.title, "Lilly opens TuneLab");
        assert!(page.text.contains("Lilly processed 10 million compounds."));
        assert!(!page.text.contains("  "));
        assert!(!page.text.contains('\n'));
    }

    #[test]
    fn parse_page_keeps_boilerplate() {
        let page = parse_page(PAGE);
        assert!(page.text.starts_with("Home | News"));
    }

    #[test]
    fn into_content_joins_title_and_text() {
        let page = ScrapedPage {
            title: "T".into(),
            text: "body".into(),
        };
        assert_eq!(page.into_content(), "T\n\nbody");
    }

    #[tokio::test]
    async fn scrape_fetches_and_parses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let scraper = HttpScraper::new(Duration::from_secs(5)).unwrap();
        let page = scraper
            .scrape(&format!("{}/article", server.uri()))
            .await
            .unwrap();
        assert_eq!(page.title, "Lilly opens TuneLab");
    }

    #[tokio::test]
    async fn scrape_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let scraper = HttpScraper::new(Duration::from_secs(5)).unwrap();
        let err = scraper.scrape(&server.uri()).await.unwrap_err();
        assert!(matches!(
            err,
            LinkpostError::Upstream {
                service: Service::Scrape,
                status: Some(404),
                ..
            }
        ));
    }
}
