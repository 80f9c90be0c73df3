//! Login navigation trait.

/// Receives the signal that the session is gone and the user must log in again.
pub trait Navigator: Send + Sync {
    /// Send the user to the login screen.
    ///
    /// Implementations must be a no-op when the user is already there.
    fn redirect_to_login(&self);
}
