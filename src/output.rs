//! JSON output to stdout or a file

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Printed to stderr when a page yields no result
pub const FAILURE_MESSAGE: &str = "スクレイピングに失敗しました。";

#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Write JSON to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(short, long)]
    pub pretty: bool,
}

/// Serialize without ASCII escaping; two-space indent when `pretty`
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

pub async fn emit<T: Serialize>(value: &T, args: &OutputArgs) -> Result<()> {
    let json = to_json(value, args.pretty)?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("結果を {} に保存しました。", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
