//! Error types for fetching, extraction, schema loading and the LLM path

use std::path::PathBuf;
use thiserror::Error;

/// Network or HTTP status failure while fetching a page
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
}

/// A schema could not be applied to a document
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// The model's reply could not be turned into a record
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("response has no message content")]
    MissingContent,
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response is JSON but not an object")]
    NotAnObject,
}

/// Failure talking to the completion endpoint
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Missing credentials or an unusable schema file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable '{0}' is not set")]
    MissingApiKey(&'static str),
    #[error("failed to read schema {path}: {source}")]
    ReadSchema {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse schema: {0}")]
    ParseSchema(#[from] serde_yaml::Error),
    #[error("field '{0}' needs a selector or a label")]
    InvalidField(String),
}
