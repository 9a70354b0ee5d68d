//! scrape command: Selector-based extraction
//!
//! Job board URLs get the job listing schema and have their details split into
//! condition sections. Anything else gets the generic page summary. A custom
//! schema file replaces both.

use crate::error::ExtractError;
use crate::extract::{extract_html, ExtractedRecord};
use crate::fetch::{parse_url, FetchArgs, Fetcher};
use crate::normalize::{generic_page_record, job_record, GenericPageRecord, JobRecord};
use crate::output::{emit, OutputArgs, FAILURE_MESSAGE};
use crate::schema::Schema;
use crate::sections::{markers_in_order, split_sections};
use crate::sites::{generic_schema, job_board_schema, route, Route, JOB_CONDITION_MARKERS};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Args)]
pub struct ScrapeArgs {
    /// URL of the page to scrape
    #[arg(value_parser = parse_url)]
    pub url: String,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub fetch: FetchArgs,

    /// YAML schema to apply instead of the built-in ones
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,
}

/// Raw fields from a custom schema, tagged with the page URL
#[derive(Debug, Serialize)]
pub struct CustomRecord {
    pub url: String,
    #[serde(flatten)]
    pub fields: ExtractedRecord,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ScrapeOutput {
    Job(JobRecord),
    Page(GenericPageRecord),
    Custom(CustomRecord),
}

/// Job listing from the job board's HTML
pub fn extract_job(html: &str, url: &str) -> Result<JobRecord, ExtractError> {
    let raw = extract_html(html, &job_board_schema())?;

    let details = raw.text("details").unwrap_or_default();
    if !markers_in_order(details, JOB_CONDITION_MARKERS) {
        warn!(url, "condition markers out of order, sections may be mis-bounded");
    }
    let conditions = split_sections(details, JOB_CONDITION_MARKERS);

    Ok(job_record(&raw, conditions, url))
}

pub fn extract_generic(html: &str, url: &str) -> Result<GenericPageRecord, ExtractError> {
    let raw = extract_html(html, &generic_schema())?;
    Ok(generic_page_record(&raw, url))
}

/// Extract from already-fetched HTML, picking the path from the URL
pub fn scrape_html(html: &str, url: &str) -> Result<ScrapeOutput, ExtractError> {
    match route(url) {
        Route::JobBoard => extract_job(html, url).map(ScrapeOutput::Job),
        Route::Generic => extract_generic(html, url).map(ScrapeOutput::Page),
    }
}

/// Fetch and extract one page. Failures are logged and give `None`.
pub async fn scrape_url(fetcher: &Fetcher, url: &str, schema: Option<&Schema>) -> Option<ScrapeOutput> {
    let html = match fetcher.fetch(url).await {
        Ok(html) => html,
        Err(e) => {
            error!(url, error = %e, "fetch failed");
            return None;
        }
    };

    let result = match schema {
        Some(schema) => extract_html(&html, schema).map(|fields| {
            ScrapeOutput::Custom(CustomRecord {
                url: url.to_string(),
                fields,
            })
        }),
        None => {
            info!(url, path = %route(url), "extracting");
            scrape_html(&html, url)
        }
    };

    match result {
        Ok(output) => Some(output),
        Err(e) => {
            error!(url, error = %e, "extraction failed");
            None
        }
    }
}

/// Run the scrape command
pub async fn run_scrape(args: ScrapeArgs) -> Result<()> {
    let schema = match &args.schema {
        Some(path) => Some(Schema::load(path).await?),
        None => None,
    };
    let fetcher = Fetcher::new(&args.fetch.config())?;

    match scrape_url(&fetcher, &args.url, schema.as_ref()).await {
        Some(output) => emit(&output, &args.output).await,
        None => {
            eprintln!("{}", FAILURE_MESSAGE);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use crate::schema::FieldSpec;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const JOB_URL: &str = "https://sokudan.work/projects/42";

    const JOB_HTML: &str = r#"
        <html><body>
            <p class="text-xs text-sokudan-date-in-card-grey">公開日 ：2024/05/01</p>
            <h1>
                Engineer
            </h1>
            <div>
                <span class="inline-block rounded-md">バックエンド</span>
                <span class="inline-block rounded-md px-2">求人ID 42</span>
                <span class="inline-block rounded-md">インフラ</span>
            </div>
            <div>
                <span class="inline-block rounded-full">フルリモート</span>
                <span class="inline-block rounded-full"> </span>
                <span class="inline-block rounded-full">副業OK</span>
                <span class="inline-block rounded-full bg-red">急募</span>
            </div>
            <div class="grid">
                <div><p class="label">稼働時間</p><p>週3日〜</p></div>
                <div><p class="label">報酬</p><p>月40万円〜</p></div>
                <div><p class="label">エリア</p><p>東京都
渋谷区</p></div>
            </div>
            <div>
                <p>必須スキル</p>
                <span>Rust</span>
                <span>PostgreSQL</span>
            </div>
            <section>
                <h2>案件詳細</h2>
                <div class="other">ignored</div>
                <div class="whitespace-pre-line">
サービス開発をお任せします。
【必須条件】5年以上の開発経験
【歓迎条件】Python
【想定報酬】月40万円〜
                </div>
            </section>
        </body></html>
    "#;

    #[test]
    fn test_extract_job() {
        let job = extract_job(JOB_HTML, JOB_URL).unwrap();
        assert_eq!(job.title, "Engineer");
        assert_eq!(job.job_type, vec!["バックエンド", "インフラ"]);
        assert_eq!(job.required_hours, "週3日〜");
        assert_eq!(job.salary, "月40万円〜");
        assert_eq!(job.area, "東京都 渋谷区");
        assert_eq!(job.required_skills, vec!["Rust", "PostgreSQL"]);
        assert!(job.details.starts_with("サービス開発をお任せします。"));
        assert_eq!(
            job.features,
            Some(vec!["フルリモート".to_string(), "副業OK".to_string()])
        );
        assert_eq!(job.publish_date.as_deref(), Some("2024/05/01"));
        assert_eq!(job.url, JOB_URL);
    }

    #[test]
    fn test_extract_job_conditions() {
        let job = extract_job(JOB_HTML, JOB_URL).unwrap();
        let required = &job.conditions["required"];
        assert!(required.starts_with("【必須条件】"));
        assert!(!required.contains("【歓迎条件】"));
        assert_eq!(required, "【必須条件】5年以上の開発経験");
        assert_eq!(job.conditions["preferred"], "【歓迎条件】Python");
        assert_eq!(job.conditions["expected_salary"], "【想定報酬】月40万円〜");
        assert_eq!(job.conditions.len(), 3);
    }

    #[test]
    fn test_extract_job_from_sparse_page() {
        let job = extract_job("<html><body><h1>Only a title</h1></body></html>", JOB_URL).unwrap();
        assert_eq!(job.title, "Only a title");
        assert_eq!(job.salary, "");
        assert!(job.conditions.is_empty());
        assert_eq!(job.publish_date, None);
    }

    #[test]
    fn test_extract_generic() {
        let html = r#"
            <html>
            <head>
                <title> Example Domain </title>
                <meta name="description" content="An example page">
            </head>
            <body>
                <h2>Details</h2>
                <h1>Welcome</h1>
                <p>First paragraph.</p>
                <p>   </p>
                <p>Second <a href="/more">More info</a></p>
                <a href="/empty"></a>
            </body>
            </html>
        "#;
        let page = extract_generic(html, "https://example.com").unwrap();
        assert_eq!(page.title, "Example Domain");
        assert_eq!(page.meta_description, "An example page");
        assert_eq!(page.headings.len(), 2);
        assert_eq!(page.headings[0].level, 1);
        assert_eq!(page.headings[0].text, "Welcome");
        assert_eq!(page.paragraphs, vec!["First paragraph.", "Second More info"]);
        assert_eq!(page.links.len(), 2);
        assert_eq!(page.links[0].text, "More info");
        assert_eq!(page.links[0].href, "/more");
        assert_eq!(page.links[1].text, "");
        assert_eq!(page.links[1].href, "/empty");
    }

    #[test]
    fn test_extract_generic_keeps_icon_links() {
        let html = r#"<a href="/home"><img src="logo.png"></a><a href="/next">Next</a><a name="top">Top</a>"#;
        let page = extract_generic(html, "https://example.com").unwrap();
        let hrefs: Vec<&str> = page.links.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/home", "/next"]);
        assert_eq!(page.links[0].text, "");
    }

    #[test]
    fn test_scrape_html_dispatch() {
        let html = "<html><head><title>T</title></head><body><h1>Engineer</h1></body></html>";
        assert!(matches!(scrape_html(html, JOB_URL).unwrap(), ScrapeOutput::Job(_)));
        assert!(matches!(
            scrape_html(html, "https://example.com").unwrap(),
            ScrapeOutput::Page(_)
        ));
    }

    #[tokio::test]
    async fn test_scrape_url_server_error_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();
        assert!(scrape_url(&fetcher, &server.uri(), None).await.is_none());
    }

    #[tokio::test]
    async fn test_scrape_url_custom_schema() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<ul><li>a</li><li>b</li></ul><h1>Top</h1>"),
            )
            .mount(&server)
            .await;

        let schema = Schema::new()
            .field("heading", FieldSpec::css("h1"))
            .field("items", FieldSpec::css("li").multiple());
        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();
        let output = scrape_url(&fetcher, &server.uri(), Some(&schema))
            .await
            .unwrap();

        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["heading"], "Top");
        assert_eq!(value["items"], serde_json::json!(["a", "b"]));
        assert_eq!(value["url"], server.uri());
    }

    #[tokio::test]
    async fn test_scrape_url_invalid_custom_selector_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>x</p>"))
            .mount(&server)
            .await;

        let schema = Schema::new().field("bad", FieldSpec::css("p[[["));
        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();
        assert!(scrape_url(&fetcher, &server.uri(), Some(&schema)).await.is_none());
    }
}
