//! Collaborator traits consumed by the request orchestrator.

mod credentials;
mod navigator;
mod transport;

pub use credentials::CredentialProvider;
pub use navigator::Navigator;
pub use transport::Transport;
