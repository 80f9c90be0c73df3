//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::{CliSession, storage};

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(_args: RefreshTokenArgs) -> Result<()> {
    let session = CliSession::open(super::require_session()?)?;

    output::status("Refreshing session...");

    let result = session.client().coordinator().ensure_fresh_token().await;

    // A failed refresh signs the session out; persist either way.
    storage::persist(&session).context("Failed to save refreshed session")?;
    result.context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    Ok(())
}
