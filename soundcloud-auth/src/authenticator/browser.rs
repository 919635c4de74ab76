use std::io;
use std::sync::Arc;

use super::AuthConfig;
use super::Authenticator;
use super::AuthenticatorKind;
use super::LaunchRequest;
use crate::error::AuthError;
use crate::readiness::ReadyNotifier;

/// Browser targeted when the device reports no default.
pub const FALLBACK_BROWSER_PACKAGE: &str = "com.android.chrome";

/// The host operations the browser authenticator needs.
pub trait BrowserPlatform: Send + Sync {
    /// Package of the user's default browser, if one is set.
    fn default_browser_package(&self) -> Option<String>;

    fn is_package_installed(&self, package: &str) -> bool;

    /// Whether any installed app can open `url`.
    fn can_open(&self, url: &str) -> bool;

    /// Package of the app starting the login, used as referrer.
    fn host_package(&self) -> Option<String> {
        None
    }

    fn open(&self, request: &LaunchRequest) -> io::Result<()>;
}

/// Opens the login page in the system browser.
pub struct BrowserAuthenticator {
    config: AuthConfig,
    platform: Arc<dyn BrowserPlatform>,
    browser_package: Option<String>,
}

impl BrowserAuthenticator {
    pub fn new(config: AuthConfig, platform: Arc<dyn BrowserPlatform>) -> Self {
        let browser_package = resolve_browser_package(platform.as_ref());
        Self {
            config,
            platform,
            browser_package,
        }
    }

    /// The browser the login will be opened in; `None` means any.
    pub fn browser_package(&self) -> Option<&str> {
        self.browser_package.as_deref()
    }
}

fn resolve_browser_package(platform: &dyn BrowserPlatform) -> Option<String> {
    if let Some(package) = platform.default_browser_package() {
        return Some(package);
    }
    platform
        .is_package_installed(FALLBACK_BROWSER_PACKAGE)
        .then(|| FALLBACK_BROWSER_PACKAGE.to_string())
}

impl Authenticator for BrowserAuthenticator {
    fn kind(&self) -> AuthenticatorKind {
        AuthenticatorKind::Browser
    }

    fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn prepare(&mut self, ready: ReadyNotifier) -> bool {
        let available = self.platform.can_open(&self.config.login_url());
        if available {
            ready.notify(self.kind());
        }
        available
    }

    fn launch(&mut self) -> Result<(), AuthError> {
        let request = LaunchRequest::new(self.config.login_url())
            .with_package(self.browser_package.clone())
            .with_referrer_from(self.platform.host_package());

        match self.platform.open(&request) {
            Ok(()) => Ok(()),
            Err(err) if request.package.is_some() => {
                tracing::warn!(
                    package = request.package.as_deref(),
                    "browser refused login url, retrying unqualified: {err}"
                );
                let unqualified = LaunchRequest {
                    package: None,
                    ..request
                };
                self.platform
                    .open(&unqualified)
                    .map_err(|err| launch_failed(self.kind(), err))
            }
            Err(err) => Err(launch_failed(self.kind(), err)),
        }
    }
}

fn launch_failed(kind: AuthenticatorKind, err: io::Error) -> AuthError {
    AuthError::LaunchFailed {
        kind,
        reason: err.to_string(),
    }
}

/// Desktop browser via the `webbrowser` crate. Packages do not apply.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserPlatform for SystemBrowser {
    fn default_browser_package(&self) -> Option<String> {
        None
    }

    fn is_package_installed(&self, _package: &str) -> bool {
        false
    }

    fn can_open(&self, _url: &str) -> bool {
        webbrowser::Browser::is_available()
    }

    fn open(&self, request: &LaunchRequest) -> io::Result<()> {
        webbrowser::open(&request.url)
    }
}
