//! Page content extraction
//!
//! Pulls the readable part of a page (first `<article>`, else `<main>`,
//! else `<body>`) and converts it to Markdown-ish text for the editor.

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use std::path::Path;

use crate::errors::PromptError;

/// Wrap width for the text conversion
const TEXT_WIDTH: usize = 100;

/// Largest page body read
const MAX_PAGE_BYTES: usize = 2_000_000;

/// Extracted page
#[derive(Debug, Clone)]
pub struct Extracted {
    pub source: String,
    pub title: Option<String>,
    pub content: String,
}

impl Extracted {
    /// Editor document: title heading followed by the content
    pub fn document(&self) -> String {
        match &self.title {
            Some(title) => format!("# {}\n\n{}", title, self.content),
            None => self.content.clone(),
        }
    }
}

/// Extract from a URL or a local file
pub async fn extract(source: &str) -> Result<Extracted> {
    let (raw, is_html) = if source.starts_with("http://") || source.starts_with("https://") {
        fetch(source, MAX_PAGE_BYTES).await?
    } else {
        let path = Path::new(source);
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", source))?;
        let by_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
        let is_html = by_extension || raw.trim_start().starts_with('<');
        (raw, is_html)
    };

    let extracted = if is_html {
        extract_html(source, &raw)?
    } else {
        Extracted {
            source: source.to_string(),
            title: None,
            content: raw.trim().to_string(),
        }
    };

    if extracted.content.is_empty() {
        return Err(PromptError::EmptyExtraction(source.to_string()).into());
    }

    tracing::info!(
        "Extracted {} characters from {}",
        extracted.content.chars().count(),
        source
    );
    Ok(extracted)
}

/// GET `url`, reading at most `limit` bytes of the body
async fn fetch(url: &str, limit: usize) -> Result<(String, bool)> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent(format!("promptpad/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")?;

    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Fetching {} failed: {}", url, response.status());
    }

    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(true, |ct| ct.contains("html"));

    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .with_context(|| format!("Failed to read body of {}", url))?
    {
        let room = limit - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            tracing::debug!("Body of {} cut at {} bytes", url, limit);
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok((decode_body(body), is_html))
}

/// UTF-8 text of a body, dropping a character split by the byte limit
fn decode_body(mut body: Vec<u8>) -> String {
    if let Err(e) = std::str::from_utf8(&body) {
        if e.error_len().is_none() {
            body.truncate(e.valid_up_to());
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// Convert an HTML page into an [`Extracted`] document
pub fn extract_html(source: &str, html: &str) -> Result<Extracted> {
    let document = Html::parse_document(html);

    let fragment = ["article", "main", "body"]
        .iter()
        .filter_map(|tag| Selector::parse(tag).ok())
        .find_map(|selector| document.select(&selector).next().map(|el| el.html()))
        .unwrap_or_else(|| html.to_string());

    let text = html2text::from_read(fragment.as_bytes(), TEXT_WIDTH)
        .map_err(|e| anyhow::anyhow!("Failed to convert {} to text: {}", source, e))?;

    Ok(Extracted {
        source: source.to_string(),
        title: page_title(&document),
        content: collapse_blank_lines(&text),
    })
}

fn page_title(document: &Html) -> Option<String> {
    ["title", "h1"].iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        let text = document
            .select(&selector)
            .next()?
            .text()
            .collect::<String>();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!text.is_empty()).then_some(text)
    })
}

/// At most one blank line between paragraphs
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank = false;
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            if !blank && !out.is_empty() {
                out.push('\n');
            }
            blank = true;
        } else {
            blank = false;
            out.push_str(line);
            out.push('\n');
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_prefers_article() {
        let html = r#"<html><head><title> News  Page </title></head><body>
            <nav>Home | Share</nav>
            <article><h2>Story</h2><p>First paragraph.</p><p>Second paragraph.</p></article>
            </body></html>"#;

        let page = extract_html("test", html).unwrap();
        assert_eq!(page.title.as_deref(), Some("News Page"));
        assert!(page.content.contains("First paragraph."));
        assert!(page.content.contains("Second paragraph."));
        assert!(!page.content.contains("Home | Share"));
        assert!(page.document().starts_with("# News Page\n\n"));
    }

    #[test]
    fn test_falls_back_to_body_and_h1() {
        let html = "<html><body><h1>Heading</h1><p>Body text</p></body></html>";
        let page = extract_html("test", html).unwrap();
        assert_eq!(page.title.as_deref(), Some("Heading"));
        assert!(page.content.contains("Body text"));
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb  \n\n"), "a\n\nb");
        assert_eq!(collapse_blank_lines("\n\nx"), "x");
    }

    #[tokio::test]
    async fn test_extract_plain_file() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        writeln!(file, "  Some *markdown* content  ").unwrap();

        let page = extract(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(page.content, "Some *markdown* content");
        assert_eq!(page.title, None);
    }

    #[tokio::test]
    async fn test_extract_html_file() {
        let mut file = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
        write!(file, "<html><body><main><p>Main text</p></main></body></html>").unwrap();

        let page = extract(file.path().to_str().unwrap()).await.unwrap();
        assert!(page.content.contains("Main text"));
    }

    #[tokio::test]
    async fn test_empty_extraction_is_error() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let err = extract(file.path().to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("Nothing extracted"));
    }

    #[tokio::test]
    async fn test_extract_url() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    "<html><head><title>Remote</title></head><body><p>Fetched</p></body></html>",
                    "text/html",
                ),
            )
            .mount(&server)
            .await;

        let page = extract(&format!("{}/page", server.uri())).await.unwrap();
        assert_eq!(page.title.as_deref(), Some("Remote"));
        assert!(page.content.contains("Fetched"));
    }

    #[tokio::test]
    async fn test_fetch_stops_at_limit() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/huge"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("x".repeat(100_000), "text/plain"))
            .mount(&server)
            .await;

        let (body, is_html) = fetch(&format!("{}/huge", server.uri()), 64).await.unwrap();
        assert_eq!(body, "x".repeat(64));
        assert!(!is_html);
    }

    #[test]
    fn test_decode_body_drops_split_character() {
        let mut bytes = "héllo".as_bytes().to_vec();
        bytes.truncate(2);
        assert_eq!(decode_body(bytes), "h");
        assert_eq!(decode_body(b"ok \xff".to_vec()), "ok \u{fffd}");
    }
}
