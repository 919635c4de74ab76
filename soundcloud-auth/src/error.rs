use std::io;

use soundcloud_api::ApiError;
use thiserror::Error;

use crate::authenticator::AuthenticatorKind;

/// Everything that can stop a login before a token is issued.
///
/// A well-formed token response carrying an `error` field is not an
/// `AuthError`; it comes back as an
/// [`AuthenticationResponse`](crate::AuthenticationResponse).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no authenticators were configured")]
    NoAuthenticators,

    #[error("none of the configured authenticators could be prepared")]
    NoAuthenticatorAvailable,

    #[error("Authentication Failed: Network was not connected.")]
    NetworkUnavailable,

    #[error("no authenticator is active; call begin_authentication first")]
    NoActiveAuthenticator,

    #[error("a {0} authenticator is already active for this session")]
    SessionActive(AuthenticatorKind),

    /// The callback did not match the redirect URI or carried no code.
    /// Callers usually treat this as the user cancelling.
    #[error("Authentication parameter map was null.")]
    MissingParameters,

    #[error("The authentication response was null.")]
    EmptyResponse,

    #[error("the owning view was destroyed")]
    OwnerGone,

    #[error("authenticator was released before it became ready")]
    ReadinessDropped,

    #[error("tab service disconnected before it became ready")]
    Disconnected,

    #[error("failed to launch {kind} authenticator: {reason}")]
    LaunchFailed {
        kind: AuthenticatorKind,
        reason: String,
    },

    #[error("token exchange failed: {0}")]
    Exchange(#[from] ApiError),

    #[error("timed out waiting for the redirect")]
    CallbackTimeout,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AuthError {
    /// True when the flow ended without the user granting access.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, AuthError::MissingParameters | AuthError::OwnerGone)
    }
}
