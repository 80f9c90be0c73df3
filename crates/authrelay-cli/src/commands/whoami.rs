//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use authrelay::BaseUrl;

use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(_args: WhoamiArgs) -> Result<()> {
    let stored = super::require_session()?;
    let base_url = BaseUrl::new(&stored.base_url).context("Invalid base URL in session")?;

    output::field("Base URL", base_url.as_str());
    output::field("Refresh endpoint", &base_url.endpoint_url(&stored.refresh_path));
    output::field(
        "Refresh token",
        if stored.refresh_token.is_some() {
            "present"
        } else {
            "none"
        },
    );

    Ok(())
}
