use std::io;
use std::sync::Arc;

use url::Url;

use super::AuthConfig;
use super::Authenticator;
use super::AuthenticatorKind;
use crate::error::AuthError;
use crate::readiness::ReadyNotifier;

/// Request code the web view result is delivered under.
pub const DEFAULT_REQUEST_CODE: i32 = 1001;

/// What the embedded login screen is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebViewRequest {
    pub auth_url: Option<String>,
    pub redirect_uri: Option<String>,
    pub request_code: i32,
}

/// Presents an embedded web view for a [`WebViewRequest`].
///
/// The host drives a [`WebViewSession`] from its page callbacks and hands
/// the resulting redirect back to the strategy.
pub trait WebViewHost: Send + Sync {
    fn present(&self, request: WebViewRequest) -> io::Result<()>;
}

/// Logs in through an in-app web view.
pub struct WebViewAuthenticator {
    config: AuthConfig,
    host: Arc<dyn WebViewHost>,
    request_code: i32,
}

impl WebViewAuthenticator {
    pub fn new(config: AuthConfig, host: Arc<dyn WebViewHost>) -> Self {
        Self {
            config,
            host,
            request_code: DEFAULT_REQUEST_CODE,
        }
    }

    pub fn with_request_code(mut self, request_code: i32) -> Self {
        self.request_code = request_code;
        self
    }

    pub fn request_code(&self) -> i32 {
        self.request_code
    }
}

impl Authenticator for WebViewAuthenticator {
    fn kind(&self) -> AuthenticatorKind {
        AuthenticatorKind::WebView
    }

    fn config(&self) -> &AuthConfig {
        &self.config
    }

    // A web view is always available.
    fn prepare(&mut self, ready: ReadyNotifier) -> bool {
        ready.notify(self.kind());
        true
    }

    fn launch(&mut self) -> Result<(), AuthError> {
        let request = WebViewRequest {
            auth_url: Some(self.config.login_url()),
            redirect_uri: Some(self.config.redirect_uri.clone()),
            request_code: self.request_code,
        };
        self.host
            .present(request)
            .map_err(|err| AuthError::LaunchFailed {
                kind: AuthenticatorKind::WebView,
                reason: err.to_string(),
            })
    }
}

/// How an embedded login ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebViewOutcome {
    /// Redirect carried a code; `redirect` is the full URL.
    Completed { redirect: String },
    /// Redirect without a code, or the screen was started without a URL.
    Cancelled { redirect: Option<String> },
}

/// Page-load state of one embedded login.
#[derive(Debug)]
pub struct WebViewSession {
    redirect_uri: String,
    outcome: Option<WebViewOutcome>,
}

impl WebViewSession {
    /// Starts a session. Returns the URL to load, or a cancellation when the
    /// request lacks the login URL or redirect URI.
    pub fn start(request: &WebViewRequest) -> Result<(Self, String), WebViewOutcome> {
        match (&request.auth_url, &request.redirect_uri) {
            (Some(auth_url), Some(redirect_uri)) => Ok((
                Self {
                    redirect_uri: redirect_uri.clone(),
                    outcome: None,
                },
                auth_url.clone(),
            )),
            _ => Err(WebViewOutcome::Cancelled { redirect: None }),
        }
    }

    /// Feeds a finished page load. Ends the session when `url` is the
    /// redirect; any other page keeps loading.
    pub fn on_page_finished(&mut self, url: &str) -> Option<&WebViewOutcome> {
        if self.outcome.is_some() || !url.starts_with(&self.redirect_uri) {
            return None;
        }

        let outcome = if has_code(url) {
            WebViewOutcome::Completed {
                redirect: url.to_string(),
            }
        } else {
            WebViewOutcome::Cancelled {
                redirect: Some(url.to_string()),
            }
        };
        tracing::debug!(?outcome, "web view reached redirect");
        self.outcome = Some(outcome);
        self.outcome.as_ref()
    }

    pub fn outcome(&self) -> Option<&WebViewOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }
}

fn has_code(url: &str) -> bool {
    Url::parse(url)
        .map(|url| url.query_pairs().any(|(key, _)| key == "code"))
        .unwrap_or(false)
}
