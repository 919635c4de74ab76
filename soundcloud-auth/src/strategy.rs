//! Picks an authenticator, launches it and exchanges the redirect it yields.

use std::fmt;
use std::sync::Arc;

use soundcloud_api::SoundCloudApi;

use crate::authenticator::Authenticator;
use crate::authenticator::AuthenticatorKind;
use crate::authenticator::GrantParameters;
use crate::authenticator::SoundCloudAuthenticator;
use crate::error::AuthError;
use crate::readiness;
use crate::readiness::OwnerHandle;
use crate::readiness::ReadySignal;
use crate::token::AuthenticationResponse;
use crate::token::TokenExchange;

/// Reports whether the device currently has a network connection.
pub trait ConnectivityProbe: Send + Sync {
    fn is_connected(&self) -> bool;
}

/// Receives the failure when the network gate rejects a login.
pub type NetworkFailureListener = Box<dyn Fn(&AuthError) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyState {
    Idle,
    Preparing,
    Active(AuthenticatorKind),
    Failed,
}

/// Drives one login session.
///
/// Authenticators are tried in the order they were added; the first whose
/// `prepare` succeeds stays active for the rest of the session.
pub struct AuthenticationStrategy {
    authenticators: Vec<SoundCloudAuthenticator>,
    active: Option<usize>,
    state: StrategyState,
    connectivity: Option<Arc<dyn ConnectivityProbe>>,
    on_network_failure: Option<NetworkFailureListener>,
    exchange: TokenExchange,
    owner: OwnerHandle,
}

pub struct AuthenticationStrategyBuilder {
    api: Arc<SoundCloudApi>,
    authenticators: Vec<SoundCloudAuthenticator>,
    connectivity: Option<Arc<dyn ConnectivityProbe>>,
    on_network_failure: Option<NetworkFailureListener>,
    owner: Option<OwnerHandle>,
}

impl AuthenticationStrategyBuilder {
    pub fn add_authenticator(mut self, authenticator: impl Into<SoundCloudAuthenticator>) -> Self {
        self.authenticators.push(authenticator.into());
        self
    }

    pub fn add_authenticators<I>(mut self, authenticators: I) -> Self
    where
        I: IntoIterator<Item = SoundCloudAuthenticator>,
    {
        self.authenticators.extend(authenticators);
        self
    }

    /// Refuse to start a login while `probe` reports no connection.
    pub fn require_network(mut self, probe: Arc<dyn ConnectivityProbe>) -> Self {
        self.connectivity = Some(probe);
        self
    }

    pub fn on_network_failure(mut self, listener: NetworkFailureListener) -> Self {
        self.on_network_failure = Some(listener);
        self
    }

    /// Shares liveness with the host's login screen.
    pub fn owner(mut self, owner: OwnerHandle) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn build(self) -> AuthenticationStrategy {
        AuthenticationStrategy {
            authenticators: self.authenticators,
            active: None,
            state: StrategyState::Idle,
            connectivity: self.connectivity,
            on_network_failure: self.on_network_failure,
            exchange: TokenExchange::new(self.api),
            owner: self.owner.unwrap_or_default(),
        }
    }
}

/// A selected authenticator that may still be connecting.
#[derive(Debug)]
pub struct PendingAuthentication {
    kind: AuthenticatorKind,
    signal: ReadySignal,
    owner: OwnerHandle,
}

impl PendingAuthentication {
    pub fn kind(&self) -> AuthenticatorKind {
        self.kind
    }

    /// Resolves once the authenticator can be launched.
    pub async fn ready(self) -> Result<AuthenticatorKind, AuthError> {
        let kind = self.signal.wait().await?;
        if !self.owner.is_alive() {
            return Err(AuthError::OwnerGone);
        }
        Ok(kind)
    }

    /// Non-blocking variant of [`ready`](Self::ready).
    pub fn try_ready(&mut self) -> Option<Result<AuthenticatorKind, AuthError>> {
        let result = self.signal.try_ready()?;
        if result.is_ok() && !self.owner.is_alive() {
            return Some(Err(AuthError::OwnerGone));
        }
        Some(result)
    }
}

impl AuthenticationStrategy {
    pub fn builder(api: Arc<SoundCloudApi>) -> AuthenticationStrategyBuilder {
        AuthenticationStrategyBuilder {
            api,
            authenticators: Vec::new(),
            connectivity: None,
            on_network_failure: None,
            owner: None,
        }
    }

    pub fn state(&self) -> StrategyState {
        self.state
    }

    pub fn owner(&self) -> &OwnerHandle {
        &self.owner
    }

    pub fn api(&self) -> &Arc<SoundCloudApi> {
        self.exchange.api()
    }

    pub fn authenticators(&self) -> &[SoundCloudAuthenticator] {
        &self.authenticators
    }

    pub fn active(&self) -> Option<&SoundCloudAuthenticator> {
        self.active.and_then(|i| self.authenticators.get(i))
    }

    pub fn active_mut(&mut self) -> Option<&mut SoundCloudAuthenticator> {
        self.active.and_then(|i| self.authenticators.get_mut(i))
    }

    /// Runs the network gate, then prepares authenticators in order until
    /// one succeeds.
    pub fn begin_authentication(&mut self) -> Result<PendingAuthentication, AuthError> {
        if !self.owner.is_alive() {
            return Err(AuthError::OwnerGone);
        }
        if let Some(active) = self.active() {
            return Err(AuthError::SessionActive(active.kind()));
        }
        if self.authenticators.is_empty() {
            self.state = StrategyState::Failed;
            return Err(AuthError::NoAuthenticators);
        }
        if let Some(probe) = &self.connectivity {
            if !probe.is_connected() {
                let err = AuthError::NetworkUnavailable;
                match &self.on_network_failure {
                    Some(listener) => listener(&err),
                    None => tracing::error!("{err}"),
                }
                self.state = StrategyState::Failed;
                return Err(err);
            }
        }

        self.state = StrategyState::Preparing;
        for (index, authenticator) in self.authenticators.iter_mut().enumerate() {
            let kind = authenticator.kind();
            let (notifier, signal) = readiness::channel();

            if authenticator.prepare(notifier) {
                tracing::debug!(%kind, "authenticator selected");
                self.active = Some(index);
                self.state = StrategyState::Active(kind);
                return Ok(PendingAuthentication {
                    kind,
                    signal,
                    owner: self.owner.clone(),
                });
            }
            tracing::warn!(%kind, "authenticator unavailable, trying next");
        }

        self.state = StrategyState::Failed;
        Err(AuthError::NoAuthenticatorAvailable)
    }

    /// Opens the active authenticator's login page.
    pub fn launch(&mut self) -> Result<(), AuthError> {
        if !self.owner.is_alive() {
            return Err(AuthError::OwnerGone);
        }
        self.active_mut()
            .ok_or(AuthError::NoActiveAuthenticator)?
            .launch()
    }

    /// Whether `data` is a redirect the active authenticator recognises.
    pub fn can_authenticate(&self, data: Option<&str>) -> bool {
        self.active()
            .is_some_and(|authenticator| authenticator.can_handle(data))
    }

    /// Grant parameters for `data`; `None` means the flow was cancelled.
    pub fn grant_parameters(
        &self,
        data: Option<&str>,
        client_secret: &str,
    ) -> Option<GrantParameters> {
        self.active()?
            .config()
            .grant_parameters(data, client_secret)
    }

    /// Exchanges the code in `data` for a token.
    ///
    /// Fails with [`AuthError::MissingParameters`] without any request when
    /// `data` is not a handled redirect with a code.
    pub async fn get_token(
        &self,
        data: Option<&str>,
        client_secret: &str,
    ) -> Result<AuthenticationResponse, AuthError> {
        if self.active.is_none() {
            return Err(AuthError::NoActiveAuthenticator);
        }
        let params = self
            .grant_parameters(data, client_secret)
            .ok_or(AuthError::MissingParameters)?;

        self.exchange.exchange(&params).await
    }

    /// Marks the owner gone and releases every authenticator.
    pub fn release(&mut self) {
        self.owner.destroy();
        for authenticator in &mut self.authenticators {
            authenticator.release();
        }
    }
}

impl Drop for AuthenticationStrategy {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for AuthenticationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationStrategy")
            .field("authenticators", &self.authenticators)
            .field("state", &self.state)
            .field("requires_network", &self.connectivity.is_some())
            .finish()
    }
}
