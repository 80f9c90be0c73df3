//! The persisted CLI session and the client built from it.

pub mod storage;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

use authrelay::{
    AccessToken, ApiClient, BaseUrl, ClientConfig, CredentialProvider, HttpCredentials, Navigator,
    RefreshToken, SessionTokens,
};

use crate::output;
use storage::StoredSession;

const LOGIN_HINT: &str = "Session expired. Run 'authrelay login' to sign in again.";

/// Navigator for a terminal: "redirecting" means telling the user to log in.
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    redirected: AtomicBool,
}

impl TerminalNavigator {
    pub fn redirected(&self) -> bool {
        self.redirected.load(Ordering::SeqCst)
    }
}

impl Navigator for TerminalNavigator {
    fn redirect_to_login(&self) {
        if !self.redirected.swap(true, Ordering::SeqCst) {
            output::error(LOGIN_HINT);
        }
    }
}

/// A stored session wired into an [`ApiClient`].
#[derive(Debug)]
pub struct CliSession {
    base_url: BaseUrl,
    refresh_path: String,
    credentials: Arc<HttpCredentials>,
    navigator: Arc<TerminalNavigator>,
    client: ApiClient,
}

impl CliSession {
    pub fn open(stored: StoredSession) -> Result<Self> {
        let base_url = BaseUrl::new(&stored.base_url).context("Invalid base URL in session")?;
        let config = ClientConfig::new(base_url.clone())
            .with_user_agent(concat!("authrelay-cli/", env!("AUTHRELAY_VERSION")));

        let credentials = Arc::new(
            HttpCredentials::new(
                base_url.endpoint_url(&stored.refresh_path),
                Some(AccessToken::new(stored.access_token)),
                stored.refresh_token.map(RefreshToken::new),
            )
            .context("Failed to build HTTP client")?,
        );
        let navigator = Arc::new(TerminalNavigator::default());

        let client = ApiClient::builder()
            .config(config)
            .credentials(credentials.clone())
            .navigator(navigator.clone())
            .build()
            .context("Failed to build API client")?;

        Ok(Self {
            base_url,
            refresh_path: stored.refresh_path,
            credentials,
            navigator,
            client,
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// True once a failed refresh has cleared the credentials.
    pub fn is_signed_out(&self) -> bool {
        self.navigator.redirected() || self.credentials.access_token().is_none()
    }

    /// The session as it should be written back, or `None` if signed out.
    pub fn to_stored(&self) -> Option<StoredSession> {
        if self.is_signed_out() {
            return None;
        }
        let SessionTokens {
            access_token,
            refresh_token,
        } = self.credentials.tokens();

        Some(StoredSession {
            base_url: self.base_url.to_string(),
            refresh_path: self.refresh_path.clone(),
            access_token: access_token?.as_str().to_string(),
            refresh_token: refresh_token.map(|t| t.as_str().to_string()),
        })
    }
}
