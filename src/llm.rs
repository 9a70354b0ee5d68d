//! llm command: Extract a job listing with a chat-completion model
//!
//! The page is reduced to plain text, cut to a character budget, and sent with
//! a description of the listing fields. The model answers with a JSON object.

use crate::error::{ConfigError, LlmError, ParseError};
use crate::fetch::{parse_url, FetchArgs, Fetcher};
use crate::output::{emit, OutputArgs, FAILURE_MESSAGE};
use crate::text::{page_text, truncate_chars};
use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{debug, error, info};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MAX_CHARS: usize = 16_000;

/// Listing fields and what the model should put in them
const LISTING_FIELDS: &[(&str, &str)] = &[
    ("title", "listing title"),
    ("description", "listing description"),
    ("payment_method_type", "how the work is paid (hourly, monthly, ...)"),
    ("weekly_min_working_hour", "minimum working days or hours per week (number)"),
    ("weekly_max_working_hour", "maximum working days or hours per week (number)"),
    ("monthly_min_working_hour", "minimum working hours per month (number)"),
    ("monthly_max_working_hour", "maximum working hours per month (number)"),
    ("hourly_min_unit_price", "lower bound of the hourly rate (number)"),
    ("hourly_max_unit_price", "upper bound of the hourly rate (number)"),
    ("monthly_min_unit_price", "lower bound of the monthly rate (number)"),
    ("monthly_max_unit_price", "upper bound of the monthly rate (number)"),
    ("working_day_type", "number of working days"),
    ("working_style_type", "work style (fully remote, on-site, ...)"),
    ("prefecture", "prefecture"),
    ("application_default_message", "question an applicant must answer"),
];

#[derive(Args)]
pub struct LlmArgs {
    /// URL of the listing page
    #[arg(value_parser = parse_url)]
    pub url: String,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Also save the fetched HTML to this file
    #[arg(short, long, value_name = "PATH")]
    pub save_html: Option<PathBuf>,

    /// API key for the completion endpoint
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Max characters of page text sent to the model
    #[arg(long, default_value_t = DEFAULT_MAX_CHARS)]
    pub max_chars: usize,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub max_chars: usize,
}

impl LlmConfig {
    /// Fails when no usable API key was supplied
    pub fn new(api_key: Option<String>, model: &str, api_base: &str) -> Result<Self, ConfigError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey(API_KEY_ENV))?;
        Ok(Self {
            api_key,
            model: model.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            max_chars: DEFAULT_MAX_CHARS,
        })
    }
}

/// One chat completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f32,
    pub json_mode: bool,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            config,
        })
    }

    /// Send one request and return the reply text
    pub async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.user,
                },
            ],
            temperature: request.temperature,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let url = format!("{}/chat/completions", self.config.api_base);
        debug!(%url, model = %self.config.model, "sending completion request");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        let reply: ChatResponse = serde_json::from_str(&body).map_err(ParseError::Json)?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::Parse(ParseError::MissingContent))
    }

    /// Ask the model for the listing fields of a page. `url` is added to the
    /// returned object.
    pub async fn extract_listing(&self, html: &str, url: &str) -> Result<Map<String, Value>, LlmError> {
        let text = page_text(html);
        let text = truncate_chars(&text, self.config.max_chars);
        let system = system_prompt();
        let user = user_prompt(url, text);

        let reply = self
            .complete(&CompletionRequest {
                system: &system,
                user: &user,
                temperature: 0.0,
                json_mode: true,
            })
            .await?;

        let mut record = parse_reply(&reply)?;
        record.insert("url".to_string(), Value::String(url.to_string()));
        Ok(record)
    }
}

fn system_prompt() -> String {
    let fields: Vec<String> = LISTING_FIELDS
        .iter()
        .map(|(name, description)| format!("- {}: {}", name, description))
        .collect();

    format!(
        "You extract job listing information from web pages.\n\
         Read the page text and return a JSON object that follows the given schema.\n\n\
         The page may contain:\n{}\n\n\
         Take numbers out of the text where the field asks for one. For example \
         \"週3〜5日\" gives weekly_min_working_hour 3 and weekly_max_working_hour 5, and \
         \"時給3000円〜5000円\" gives hourly_min_unit_price 3000 and hourly_max_unit_price 5000.\n\
         Return only the fields you find. Numeric fields are numbers, or null when absent.",
        fields.join("\n")
    )
}

fn user_prompt(url: &str, page_text: &str) -> String {
    let schema: Map<String, Value> = LISTING_FIELDS
        .iter()
        .map(|(name, description)| (name.to_string(), Value::String(description.to_string())))
        .collect();
    let schema = serde_json::to_string_pretty(&schema).unwrap_or_default();

    format!(
        "URL: {}\n\nExtract the listing from this page text and shape it with the JSON schema:\n\n{}\n\nJSON schema:\n{}",
        url, page_text, schema
    )
}

/// Parse the model's reply as a JSON object, tolerating a markdown code fence
pub fn parse_reply(reply: &str) -> Result<Map<String, Value>, ParseError> {
    let cleaned = reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    match serde_json::from_str::<Value>(cleaned)? {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NotAnObject),
    }
}

/// Run the extraction, turning any failure into `{"error": ..., "url": ...}`
pub async fn extract_or_error(client: &LlmClient, html: &str, url: &str) -> Value {
    match client.extract_listing(html, url).await {
        Ok(record) => Value::Object(record),
        Err(e) => {
            error!(url, error = %e, "LLM extraction failed");
            serde_json::json!({ "error": e.to_string(), "url": url })
        }
    }
}

/// Run the llm command
pub async fn run_llm(args: LlmArgs) -> Result<()> {
    let mut config = LlmConfig::new(args.api_key.clone(), &args.model, &args.api_base)?;
    config.max_chars = args.max_chars;
    let client = LlmClient::new(config)?;
    let fetcher = Fetcher::new(&args.fetch.config())?;

    let html = match fetcher.fetch(&args.url).await {
        Ok(html) => html,
        Err(e) => {
            error!(url = %args.url, error = %e, "fetch failed");
            eprintln!("{}", FAILURE_MESSAGE);
            std::process::exit(1);
        }
    };

    if let Some(path) = &args.save_html {
        tokio::fs::write(path, &html)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "saved HTML");
        eprintln!("HTMLを {} に保存しました。", path.display());
    }

    let record = extract_or_error(&client, &html, &args.url).await;
    emit(&record, &args.output).await
}
