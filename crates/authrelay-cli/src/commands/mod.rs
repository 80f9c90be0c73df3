//! Subcommand implementations.

mod login;
mod logout;
mod refresh_token;
mod request;
mod whoami;

use anyhow::{Context, Result};
use clap::Subcommand;

use authrelay::Method;

use crate::session::storage::{self, StoredSession};

pub use request::{BodyArgs, RequestArgs};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store an access/refresh token pair for later requests
    Login(login::LoginArgs),

    /// Display the active session
    Whoami(whoami::WhoamiArgs),

    /// Exchange the refresh token for a new access token
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Delete the stored session
    Logout(logout::LogoutArgs),

    /// Send a GET request
    Get(RequestArgs),

    /// Send a DELETE request
    Delete(RequestArgs),

    /// Send a POST request
    Post(BodyArgs),

    /// Send a PUT request
    Put(BodyArgs),

    /// Send a PATCH request
    Patch(BodyArgs),
}

pub async fn handle(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Login(args) => login::run(args).await,
        Commands::Whoami(args) => whoami::run(args).await,
        Commands::RefreshToken(args) => refresh_token::run(args).await,
        Commands::Logout(args) => logout::run(args).await,
        Commands::Get(args) => request::run(Method::Get, args, None).await,
        Commands::Delete(args) => request::run(Method::Delete, args, None).await,
        Commands::Post(args) => request::run(Method::Post, args.request, args.data).await,
        Commands::Put(args) => request::run(Method::Put, args.request, args.data).await,
        Commands::Patch(args) => request::run(Method::Patch, args.request, args.data).await,
    }
}

fn require_session() -> Result<StoredSession> {
    storage::load_session()
        .context("Failed to load session")?
        .context("No active session. Run 'authrelay login' first.")
}
