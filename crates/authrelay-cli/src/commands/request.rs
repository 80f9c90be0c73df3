//! Generic request commands (`get`, `post`, `put`, `patch`, `delete`).

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use tracing::debug;

use authrelay::{Method, RequestOptions};

use crate::output;
use crate::session::{CliSession, storage};

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Endpoint path, relative to the base URL, or an absolute URL
    pub endpoint: String,

    /// Extra header as `Name: value` (repeatable); overrides defaults
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Do not refresh the token if the server answers 401
    #[arg(long)]
    pub no_refresh: bool,
}

#[derive(Args, Debug)]
pub struct BodyArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// JSON request body
    #[arg(long)]
    pub data: Option<String>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in `{raw}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

pub async fn run(method: Method, args: RequestArgs, data: Option<String>) -> Result<()> {
    let body = data
        .as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("--data is not valid JSON")?;

    let session = CliSession::open(super::require_session()?)?;

    let mut options = RequestOptions::new();
    for (name, value) in args.headers {
        options = options.header(name, value);
    }
    if args.no_refresh {
        options = options.skip_refresh();
    }

    debug!(%method, endpoint = %args.endpoint, "Dispatching");
    let result = session
        .client()
        .send::<Value>(method, &args.endpoint, body.as_ref(), options)
        .await;

    storage::persist(&session).context("Failed to save session")?;
    let response = result.with_context(|| format!("{method} {} failed", args.endpoint))?;

    match response.data {
        Some(data) => output::json_pretty(&data)?,
        None => output::status("No content"),
    }

    Ok(())
}
