//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use authrelay::BaseUrl;

use crate::output;
use crate::session::storage::{self, StoredSession};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Bearer token sent with every request
    #[arg(long)]
    pub access_token: String,

    /// Token exchanged for a new access token on 401
    #[arg(long)]
    pub refresh_token: Option<String>,

    /// API base URL
    #[arg(long, env = "AUTHRELAY_BASE_URL")]
    pub base_url: String,

    /// Token refresh endpoint, relative to the base URL
    #[arg(long, default_value = "/auth/refresh")]
    pub refresh_path: String,
}

pub async fn run(args: LoginArgs) -> Result<()> {
    let base_url = BaseUrl::new(&args.base_url).context("Invalid base URL")?;

    let stored = StoredSession {
        base_url: base_url.to_string(),
        refresh_path: args.refresh_path,
        access_token: args.access_token,
        refresh_token: args.refresh_token,
    };

    storage::save_session(&stored).context("Failed to save session")?;

    output::success("Session saved");
    println!();
    output::field("Base URL", &stored.base_url);
    output::field("Refresh endpoint", &base_url.endpoint_url(&stored.refresh_path));

    Ok(())
}
