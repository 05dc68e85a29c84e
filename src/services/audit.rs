//! Page auditor over plain HTTP.
//!
//! Fetches the page and a few well-known files, extracts on-page facts with
//! regular expressions, and scores three sections (technical, on-page,
//! schema). The overall score is the mean of the section scores.
//!
//! A page that cannot be fetched is not an error: the failure is recorded in
//! `crawl_error` and the checks run against empty content.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use url::Url;

use super::{
    AuditIssue, AuditResult, AuditSection, JsonMap, PageSummary, SeoAuditor, ServiceError,
    ServiceResult, Severity,
};
use crate::util::normalize_url;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; seo-agents/0.1; +https://schema.org)";
const MAX_TITLE_CHARS: usize = 60;

pub struct HttpSeoAuditor {
    client: Client,
}

impl HttpSeoAuditor {
    pub fn new(timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// GET `url`, returning the final URL and body.
    async fn fetch_page(&self, url: &Url) -> Result<(Url, String), reqwest::Error> {
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        let final_url = response.url().clone();
        let body = response.text().await?;
        Ok((final_url, body))
    }

    /// Body of `origin/path` when it answers 200.
    async fn probe(&self, origin: &Url, path: &str) -> Option<String> {
        let target = origin.join(path).ok()?;
        match self.client.get(target).send().await {
            Ok(response) if response.status() == StatusCode::OK => response.text().await.ok(),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(path, error = %e, "Probe failed");
                None
            }
        }
    }

    async fn technical_checks(&self, page: &Url) -> AuditSection {
        let (robots, sitemap, llms) = tokio::join!(
            self.probe(page, "/robots.txt"),
            self.probe(page, "/sitemap.xml"),
            self.probe(page, "/llms.txt"),
        );
        technical_section(
            page.scheme() == "https",
            robots.as_deref(),
            sitemap.is_some(),
            llms.is_some(),
        )
    }
}

#[async_trait]
impl SeoAuditor for HttpSeoAuditor {
    async fn full_audit(&self, url: &str) -> ServiceResult<AuditResult> {
        let target =
            normalize_url(url).map_err(|e| ServiceError::InvalidUrl(url.to_string(), e))?;

        tracing::info!(url = %target, "Starting audit");

        let (final_url, html, crawl_error) = match self.fetch_page(&target).await {
            Ok((final_url, html)) => (final_url, html, None),
            Err(e) => {
                tracing::warn!(url = %target, error = %e, "Page fetch failed, auditing empty content");
                (target.clone(), String::new(), Some(e.to_string()))
            }
        };

        let facts = PageFacts::parse(&html);
        let technical = self.technical_checks(&final_url).await;
        let on_page = on_page_section(&facts, &final_url);
        let schema = schema_section(&facts);

        let overall_score =
            (technical.score as f64 + on_page.score as f64 + schema.score as f64) / 3.0;
        let issues = [&technical, &on_page, &schema]
            .iter()
            .flat_map(|section| section.issues.iter().cloned())
            .collect();

        Ok(AuditResult {
            url: url.to_string(),
            overall_score,
            issues,
            summary: PageSummary {
                title: facts.title.clone(),
                meta_description: facts.meta_description.clone(),
                h1_count: facts.h1_tags.len(),
                links: facts.links,
                images: facts.images,
                has_schema: facts.has_json_ld,
                final_url: final_url.to_string(),
            },
            technical_seo: technical,
            on_page_seo: on_page,
            schema_markup: schema,
            pages_crawled: if crawl_error.is_some() { 0 } else { 1 },
            crawl_error,
        })
    }
}

/// SEO-relevant facts extracted from one HTML document.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct PageFacts {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_tags: Vec<String>,
    pub links: usize,
    pub images: usize,
    pub has_json_ld: bool,
}

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern is valid"))
}

impl PageFacts {
    pub(crate) fn parse(html: &str) -> Self {
        static TITLE: OnceLock<Regex> = OnceLock::new();
        static META: OnceLock<Regex> = OnceLock::new();
        static H1: OnceLock<Regex> = OnceLock::new();
        static SCRIPTS: OnceLock<Regex> = OnceLock::new();
        static ANCHOR: OnceLock<Regex> = OnceLock::new();
        static IMG: OnceLock<Regex> = OnceLock::new();

        let title = cached(&TITLE, r"(?is)<title[^>]*>(.*?)</title>")
            .captures(html)
            .map(|c| collapse_text(&c[1]))
            .filter(|t| !t.is_empty());

        let meta_description = cached(&META, r"(?is)<meta\b[^>]*>")
            .find_iter(html)
            .map(|m| m.as_str())
            .filter(|tag| {
                attribute(tag, "name").is_some_and(|n| n.eq_ignore_ascii_case("description"))
                    || attribute(tag, "property")
                        .is_some_and(|p| p.eq_ignore_ascii_case("og:description"))
            })
            .find_map(|tag| attribute(tag, "content"))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let h1_tags = cached(&H1, r"(?is)<h1\b[^>]*>(.*?)</h1>")
            .captures_iter(html)
            .map(|c| collapse_text(&c[1]))
            .collect();

        let visible = cached(&SCRIPTS, r"(?is)<script\b.*?</script>|<style\b.*?</style>")
            .replace_all(html, "");
        let links = cached(&ANCHOR, r"(?i)<a\b").find_iter(&visible).count();
        let images = cached(&IMG, r"(?i)<img\b").find_iter(&visible).count();

        Self {
            title,
            meta_description,
            h1_tags,
            links,
            images,
            has_json_ld: html.contains("application/ld+json"),
        }
    }
}

/// Value of `name="..."` (or single-quoted) inside one tag.
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    static ATTR: OnceLock<Regex> = OnceLock::new();
    cached(&ATTR, r#"([A-Za-z_:][-\w:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .captures_iter(tag)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|m| m.as_str())
}

/// Strip nested tags and collapse whitespace.
fn collapse_text(fragment: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let stripped = cached(&TAG, r"(?s)<[^>]+>").replace_all(fragment, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn scored_section(score: i32, issues: Vec<AuditIssue>) -> AuditSection {
    AuditSection {
        score: score.clamp(0, 100) as u8,
        issues,
        extra: JsonMap::new(),
    }
}

pub(crate) fn technical_section(
    is_https: bool,
    robots: Option<&str>,
    sitemap_found: bool,
    llms_found: bool,
) -> AuditSection {
    let mut score = 100;
    let mut issues = Vec::new();

    if robots.is_none() {
        issues.push(
            AuditIssue::new(
                Severity::Warning,
                "technical",
                "Missing robots.txt",
                "No robots.txt found at the site root",
            )
            .with_recommendation("Create a robots.txt file to guide crawlers."),
        );
        score -= 10;
    }

    let sitemap_in_robots = robots.is_some_and(|r| r.to_lowercase().contains("sitemap:"));
    if !sitemap_found && !sitemap_in_robots {
        issues.push(
            AuditIssue::new(
                Severity::Warning,
                "technical",
                "Missing XML Sitemap",
                "No sitemap.xml found and no Sitemap: directives in robots.txt",
            )
            .with_recommendation(
                "Generate an XML sitemap and submit it to Google Search Console to help indexing.",
            ),
        );
        score -= 10;
    }

    if !llms_found {
        issues.push(
            AuditIssue::new(
                Severity::Warning,
                "ai_discovery",
                "Missing llms.txt (AI Discovery)",
                "No llms.txt found at the site root",
            )
            .with_recommendation("Create a llms.txt file to improve AI discovery."),
        );
        score -= 10;
    }

    if !is_https {
        issues.push(
            AuditIssue::new(
                Severity::Critical,
                "technical",
                "Not using HTTPS",
                "Site not secured with SSL",
            )
            .with_recommendation(
                "Install an SSL certificate to secure user data and improve search rankings.",
            )
            .with_fix("Force HTTPS redirection in your web server config."),
        );
        score -= 20;
    }

    let ai_discovery = if llms_found { "configured" } else { "incomplete" };
    let mut section = scored_section(score, issues);
    section
        .extra
        .insert("ai_discovery_status".to_string(), ai_discovery.into());
    section
}

pub(crate) fn on_page_section(facts: &PageFacts, url: &Url) -> AuditSection {
    let mut score = 100;
    let mut issues = Vec::new();

    match &facts.title {
        None => {
            let slug = url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|s| !s.is_empty())
                .unwrap_or("Home");
            issues.push(
                AuditIssue::new(Severity::Critical, "on_page", "Missing title tag", "Page has no title")
                    .with_recommendation(
                        "Add a descriptive <title> tag within the <head> section of your HTML.",
                    )
                    .with_fix(format!("<title>{} | Site Name</title>", slug)),
            );
            score -= 20;
        }
        Some(title) if title.chars().count() > MAX_TITLE_CHARS => {
            let chars = title.chars().count();
            let shortened: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
            issues.push(
                AuditIssue::new(
                    Severity::Warning,
                    "on_page",
                    "Title too long",
                    format!("Title is {} chars (max {})", chars, MAX_TITLE_CHARS),
                )
                .with_recommendation(
                    "Shorten your title to under 60 characters to ensure it displays correctly in SERPs.",
                )
                .with_fix(format!("<title>{}...</title>", shortened)),
            );
            score -= 5;
        }
        Some(_) => {}
    }

    if facts.meta_description.is_none() {
        issues.push(
            AuditIssue::new(
                Severity::Critical,
                "on_page",
                "Missing meta description",
                "Page has no meta description",
            )
            .with_recommendation(
                "Add a <meta name='description'> tag to provide a summary of your page for search results.",
            ),
        );
        score -= 15;
    }

    match facts.h1_tags.len() {
        0 => {
            issues.push(
                AuditIssue::new(Severity::Warning, "on_page", "Missing H1 tag", "Page has no H1 heading")
                    .with_recommendation("Use exactly one <h1> tag to define the main topic of your page.")
                    .with_fix(format!(
                        "<h1>{}</h1>",
                        facts.title.as_deref().unwrap_or("Page Title")
                    )),
            );
            score -= 10;
        }
        1 => {}
        n => {
            issues.push(
                AuditIssue::new(
                    Severity::Info,
                    "on_page",
                    "Multiple H1 tags",
                    format!("Found {} H1 tags", n),
                )
                .with_recommendation(
                    "Consolidate multiple <h1> tags into one, or change secondary ones to <h2> tags.",
                ),
            );
            score -= 5;
        }
    }

    let mut section = scored_section(score, issues);
    if let Some(title) = &facts.title {
        section.extra.insert("title".to_string(), title.clone().into());
    }
    if let Some(meta) = &facts.meta_description {
        section
            .extra
            .insert("meta_description".to_string(), meta.clone().into());
    }
    section
}

pub(crate) fn schema_section(facts: &PageFacts) -> AuditSection {
    let mut score = 100;
    let mut issues = Vec::new();

    if !facts.has_json_ld {
        issues.push(
            AuditIssue::new(
                Severity::Warning,
                "schema",
                "No JSON-LD schema",
                "Consider adding structured data",
            )
            .with_recommendation(
                "Implement JSON-LD structured data to help search engines understand your content better.",
            ),
        );
        score -= 15;
    }

    let mut section = scored_section(score, issues);
    section
        .extra
        .insert("has_schema".to_string(), facts.has_json_ld.into());
    section
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
        <title>  Rust   SEO Guide </title>
        <meta content="All about Rust SEO." name="Description">
        <script type="application/ld+json">{"@type":"Article"}</script>
        <script>var a = "<a href='x'>";</script>
    </head><body>
        <h1>Rust <em>SEO</em></h1>
        <a href="/a">A</a><a href="/b">B</a>
        <img src="x.png"><IMG src="y.png">
    </body></html>"#;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_attribute_matches_whole_names() {
        let tag = r#"<meta data-name="x" NAME='description' content="Fast pages">"#;
        assert_eq!(attribute(tag, "name"), Some("description"));
        assert_eq!(attribute(tag, "content"), Some("Fast pages"));
        assert_eq!(attribute(tag, "property"), None);
    }

    #[test]
    fn test_parse_page_facts() {
        let facts = PageFacts::parse(PAGE);
        assert_eq!(facts.title.as_deref(), Some("Rust SEO Guide"));
        assert_eq!(facts.meta_description.as_deref(), Some("All about Rust SEO."));
        assert_eq!(facts.h1_tags, vec!["Rust SEO".to_string()]);
        assert_eq!(facts.links, 2);
        assert_eq!(facts.images, 2);
        assert!(facts.has_json_ld);
    }

    #[test]
    fn test_parse_empty_page() {
        let facts = PageFacts::parse("");
        assert_eq!(facts, PageFacts::default());
    }

    #[test]
    fn test_og_description_fallback() {
        let facts = PageFacts::parse(r#"<meta property='og:description' content='From OG'>"#);
        assert_eq!(facts.meta_description.as_deref(), Some("From OG"));
    }

    #[test]
    fn test_on_page_clean() {
        let facts = PageFacts::parse(PAGE);
        let section = on_page_section(&facts, &url("https://example.com/"));
        assert_eq!(section.score, 100);
        assert!(section.issues.is_empty());
    }

    #[test]
    fn test_on_page_empty_content() {
        let section = on_page_section(&PageFacts::default(), &url("https://example.com/"));
        assert_eq!(section.score, 100 - 20 - 15 - 10);
        let critical = section
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count();
        assert_eq!(critical, 2);
        assert_eq!(section.issues[0].fix.as_deref(), Some("<title>Home | Site Name</title>"));
    }

    #[test]
    fn test_long_title_and_multiple_h1() {
        let facts = PageFacts {
            title: Some("x".repeat(61)),
            meta_description: Some("desc".to_string()),
            h1_tags: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        };
        let section = on_page_section(&facts, &url("https://example.com/post"));
        assert_eq!(section.score, 90);
        assert_eq!(section.issues[0].severity, Severity::Warning);
        assert_eq!(section.issues[1].severity, Severity::Info);
    }

    #[test]
    fn test_technical_section() {
        let all_good = technical_section(true, Some("User-agent: *"), true, true);
        assert_eq!(all_good.score, 100);
        assert!(all_good.issues.is_empty());

        let sitemap_via_robots =
            technical_section(true, Some("Sitemap: https://e.com/s.xml"), false, true);
        assert!(sitemap_via_robots.issues.is_empty());

        let insecure = technical_section(false, None, false, false);
        assert_eq!(insecure.score, 50);
        assert_eq!(insecure.issues.len(), 4);
        assert_eq!(insecure.issues[3].severity, Severity::Critical);
        assert_eq!(insecure.extra["ai_discovery_status"], "incomplete");
    }

    #[test]
    fn test_schema_section() {
        assert_eq!(schema_section(&PageFacts::default()).score, 85);
        let facts = PageFacts {
            has_json_ld: true,
            ..Default::default()
        };
        assert!(schema_section(&facts).issues.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_is_an_error() {
        let auditor = HttpSeoAuditor::new(Duration::from_secs(1)).unwrap();
        let result = auditor.full_audit("http://[::1").await;
        assert!(matches!(result, Err(ServiceError::InvalidUrl(..))));
    }
}
