//! Authenticator variants and the configuration they share.
//!
//! Each variant knows how to open the SoundCloud connect page in one kind of
//! surface and how to recognise the redirect that comes back.

mod browser;
mod custom_tabs;
mod web_view;

use std::fmt;

use serde::Serialize;
use url::Url;

use crate::error::AuthError;
use crate::readiness::ReadyNotifier;

pub use browser::BrowserAuthenticator;
pub use browser::BrowserPlatform;
pub use browser::FALLBACK_BROWSER_PACKAGE;
pub use browser::SystemBrowser;
pub use custom_tabs::CustomTabsAuthenticator;
pub use custom_tabs::NavigationEvent;
pub use custom_tabs::TabAppearance;
pub use custom_tabs::TabNavigationObserver;
pub use custom_tabs::TabSession;
pub use custom_tabs::TabsClient;
pub use custom_tabs::TabsPlatform;
pub use custom_tabs::TabsServiceConnection;
pub use web_view::WebViewAuthenticator;
pub use web_view::WebViewHost;
pub use web_view::WebViewOutcome;
pub use web_view::WebViewRequest;
pub use web_view::WebViewSession;

/// SoundCloud's authorization page.
pub const CONNECT_URL: &str = "https://www.soundcloud.com/connect";

const RESPONSE_TYPE: &str = "code";
const SCOPE: &str = "non-expiring";
const DISPLAY: &str = "popup";
// Fixed value; the redirect is not checked against it.
const STATE: &str = "asdf";

/// How a callback is matched against the configured redirect URI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RedirectMatching {
    /// Accept any callback that contains the redirect URI as a substring.
    #[default]
    Contains,
    /// Require scheme, host, port and path to equal the redirect URI's.
    Exact,
}

/// Client registration shared by every authenticator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub redirect_matching: RedirectMatching,
}

impl AuthConfig {
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            redirect_matching: RedirectMatching::default(),
        }
    }

    pub fn with_redirect_matching(mut self, matching: RedirectMatching) -> Self {
        self.redirect_matching = matching;
        self
    }

    /// The connect URL. Values are concatenated as configured, not
    /// percent-encoded.
    pub fn login_url(&self) -> String {
        format!(
            "{CONNECT_URL}?client_id={}&redirect_uri={}&response_type={RESPONSE_TYPE}\
             &scope={SCOPE}&display={DISPLAY}&state={STATE}",
            self.client_id, self.redirect_uri
        )
    }

    /// Whether `data` is a redirect back to this client.
    pub fn can_handle(&self, data: Option<&str>) -> bool {
        let Some(data) = data else {
            return false;
        };
        match self.redirect_matching {
            RedirectMatching::Contains => data.contains(&self.redirect_uri),
            RedirectMatching::Exact => same_endpoint(data, &self.redirect_uri),
        }
    }

    /// The `code` query parameter of a handled redirect.
    pub fn extract_code(&self, data: Option<&str>) -> Option<String> {
        if !self.can_handle(data) {
            return None;
        }
        let url = Url::parse(data?).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned())
    }

    /// Grant parameters for exchanging the code in `data`, or `None` when
    /// the redirect is not ours or carries no code.
    pub fn grant_parameters(
        &self,
        data: Option<&str>,
        client_secret: &str,
    ) -> Option<GrantParameters> {
        let code = self.extract_code(data)?;
        Some(GrantParameters::authorization_code(
            &self.client_id,
            client_secret,
            code,
            &self.redirect_uri,
        ))
    }
}

fn same_endpoint(data: &str, redirect_uri: &str) -> bool {
    match (Url::parse(data), Url::parse(redirect_uri)) {
        (Ok(a), Ok(b)) => {
            a.scheme() == b.scheme()
                && a.host_str() == b.host_str()
                && a.port_or_known_default() == b.port_or_known_default()
                && a.path() == b.path()
        }
        _ => false,
    }
}

/// OAuth grant types understood by the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantType {
    AuthorizationCode,
    RefreshToken,
    Password,
    ClientCredentials,
    OAuth1Token,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::RefreshToken => "refresh_token",
            GrantType::Password => "password",
            GrantType::ClientCredentials => "client_credentials",
            GrantType::OAuth1Token => "oauth1_token",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GrantType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Form body of a token request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantParameters {
    pub client_id: String,
    pub client_secret: String,
    pub code: String,
    pub grant_type: GrantType,
    pub redirect_uri: String,
}

impl GrantParameters {
    pub fn authorization_code(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        code: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            code: code.into(),
            grant_type: GrantType::AuthorizationCode,
            redirect_uri: redirect_uri.into(),
        }
    }

    /// The five form fields, keyed by wire name.
    pub fn to_map(&self) -> Vec<(&'static str, String)> {
        vec![
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
            ("code", self.code.clone()),
            ("grant_type", self.grant_type.as_str().to_string()),
            ("redirect_uri", self.redirect_uri.clone()),
        ]
    }
}

/// Which kind of surface an authenticator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthenticatorKind {
    Browser,
    WebView,
    CustomTabs,
}

impl fmt::Display for AuthenticatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthenticatorKind::Browser => "browser",
            AuthenticatorKind::WebView => "web view",
            AuthenticatorKind::CustomTabs => "custom tabs",
        })
    }
}

/// What the platform is asked to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub url: String,
    /// Restrict the open to this app, if set.
    pub package: Option<String>,
    /// `android-app://<package>` of the app starting the login.
    pub referrer: Option<String>,
}

impl LaunchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            package: None,
            referrer: None,
        }
    }

    pub fn with_package(mut self, package: Option<String>) -> Self {
        self.package = package;
        self
    }

    pub fn with_referrer_from(mut self, host_package: Option<String>) -> Self {
        self.referrer = host_package.map(|pkg| format!("android-app://{pkg}"));
        self
    }
}

/// Common behaviour of every login surface.
pub trait Authenticator: Send {
    fn kind(&self) -> AuthenticatorKind;

    fn config(&self) -> &AuthConfig;

    /// Readies the surface. Returns `false` if it cannot be used here; when
    /// `true`, `ready` fires now or once the surface finishes connecting.
    fn prepare(&mut self, ready: ReadyNotifier) -> bool;

    /// Opens the login page.
    fn launch(&mut self) -> Result<(), AuthError>;

    fn can_handle(&self, data: Option<&str>) -> bool {
        self.config().can_handle(data)
    }

    fn extract_code(&self, data: Option<&str>) -> Option<String> {
        self.config().extract_code(data)
    }

    /// Drops any platform resource taken in `prepare`. Safe to call twice.
    fn release(&mut self) {}
}

/// The closed set of supported authenticators.
pub enum SoundCloudAuthenticator {
    Browser(BrowserAuthenticator),
    WebView(WebViewAuthenticator),
    CustomTabs(CustomTabsAuthenticator),
}

impl SoundCloudAuthenticator {
    fn inner(&self) -> &dyn Authenticator {
        match self {
            SoundCloudAuthenticator::Browser(a) => a,
            SoundCloudAuthenticator::WebView(a) => a,
            SoundCloudAuthenticator::CustomTabs(a) => a,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Authenticator {
        match self {
            SoundCloudAuthenticator::Browser(a) => a,
            SoundCloudAuthenticator::WebView(a) => a,
            SoundCloudAuthenticator::CustomTabs(a) => a,
        }
    }

    pub fn as_custom_tabs_mut(&mut self) -> Option<&mut CustomTabsAuthenticator> {
        match self {
            SoundCloudAuthenticator::CustomTabs(a) => Some(a),
            _ => None,
        }
    }
}

impl Authenticator for SoundCloudAuthenticator {
    fn kind(&self) -> AuthenticatorKind {
        self.inner().kind()
    }

    fn config(&self) -> &AuthConfig {
        self.inner().config()
    }

    fn prepare(&mut self, ready: ReadyNotifier) -> bool {
        self.inner_mut().prepare(ready)
    }

    fn launch(&mut self) -> Result<(), AuthError> {
        self.inner_mut().launch()
    }

    fn can_handle(&self, data: Option<&str>) -> bool {
        self.inner().can_handle(data)
    }

    fn extract_code(&self, data: Option<&str>) -> Option<String> {
        self.inner().extract_code(data)
    }

    fn release(&mut self) {
        self.inner_mut().release();
    }
}

impl fmt::Debug for SoundCloudAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundCloudAuthenticator")
            .field("kind", &self.kind())
            .field("redirect_uri", &self.config().redirect_uri)
            .finish()
    }
}

impl From<BrowserAuthenticator> for SoundCloudAuthenticator {
    fn from(value: BrowserAuthenticator) -> Self {
        SoundCloudAuthenticator::Browser(value)
    }
}

impl From<WebViewAuthenticator> for SoundCloudAuthenticator {
    fn from(value: WebViewAuthenticator) -> Self {
        SoundCloudAuthenticator::WebView(value)
    }
}

impl From<CustomTabsAuthenticator> for SoundCloudAuthenticator {
    fn from(value: CustomTabsAuthenticator) -> Self {
        SoundCloudAuthenticator::CustomTabs(value)
    }
}
