//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs) -> Result<()> {
    if storage::clear_session().context("Failed to clear session")? {
        output::success("Logged out");
    } else {
        output::status("No active session");
    }
    Ok(())
}
