//! OAuth login for SoundCloud.
//!
//! An [`AuthenticationStrategy`] holds an ordered list of
//! [`SoundCloudAuthenticator`]s. `begin_authentication` picks the first one
//! that can run on this device, `launch` opens the connect page, and the
//! redirect that comes back is handed to `get_token`.
//!
//! ```rust,ignore
//! let mut strategy = AuthenticationStrategy::builder(api)
//!     .add_authenticator(CustomTabsAuthenticator::new(config.clone(), tabs))
//!     .add_authenticator(BrowserAuthenticator::new(config, browser))
//!     .build();
//!
//! strategy.begin_authentication()?.ready().await?;
//! strategy.launch()?;
//! // ... later, with the redirect URL:
//! let response = strategy.get_token(Some(&redirect), &client_secret).await?;
//! ```

pub mod authenticator;
mod error;
mod loopback;
pub mod readiness;
mod strategy;
mod token;

pub use authenticator::AuthConfig;
pub use authenticator::Authenticator;
pub use authenticator::AuthenticatorKind;
pub use authenticator::BrowserAuthenticator;
pub use authenticator::CustomTabsAuthenticator;
pub use authenticator::GrantParameters;
pub use authenticator::GrantType;
pub use authenticator::RedirectMatching;
pub use authenticator::SoundCloudAuthenticator;
pub use authenticator::SystemBrowser;
pub use authenticator::WebViewAuthenticator;
pub use error::AuthError;
pub use loopback::LoopbackRedirect;
pub use readiness::OwnerHandle;
pub use strategy::AuthenticationStrategy;
pub use strategy::AuthenticationStrategyBuilder;
pub use strategy::ConnectivityProbe;
pub use strategy::NetworkFailureListener;
pub use strategy::PendingAuthentication;
pub use strategy::StrategyState;
pub use token::AuthenticationResponse;
pub use token::ResponseType;
pub use token::TOKEN_PATH;
pub use token::TokenExchange;
pub use token::TokenOutcome;
