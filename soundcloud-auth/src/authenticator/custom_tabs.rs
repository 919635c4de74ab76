//! Login through a Custom Tabs provider.
//!
//! `prepare` binds the provider's service. Once connected the connection
//! warms the provider up, opens a session, pre-fetches the login URL and only
//! then reports ready.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use super::AuthConfig;
use super::Authenticator;
use super::AuthenticatorKind;
use super::LaunchRequest;
use crate::error::AuthError;
use crate::readiness::ReadyNotifier;

/// Navigation callbacks reported by a tab session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEvent {
    Started,
    Finished,
    Failed,
    Aborted,
    TabShown,
    TabHidden,
}

pub trait TabNavigationObserver: Send + Sync {
    fn on_navigation_event(&self, event: NavigationEvent);
}

/// Opaque handle to a provider session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSession {
    pub id: String,
}

/// The connected provider.
pub trait TabsClient {
    fn warmup(&self) -> bool;

    fn new_session(&self, observer: Option<Arc<dyn TabNavigationObserver>>) -> Option<TabSession>;

    /// Hints that `url` will be opened in `session` soon.
    fn may_launch_url(&self, session: &TabSession, url: &str) -> bool;
}

/// Host operations the tabs authenticator needs.
pub trait TabsPlatform: Send + Sync {
    /// Package of an installed Custom Tabs provider.
    fn provider_package(&self) -> Option<String>;

    /// Binds the provider's service. The platform later calls
    /// `on_service_connected` / `on_service_disconnected` on `connection`.
    fn bind(&self, package: &str, connection: TabsServiceConnection) -> bool;

    fn unbind(&self, package: &str);

    fn host_package(&self) -> Option<String> {
        None
    }

    fn launch(&self, request: &LaunchRequest, appearance: &TabAppearance) -> io::Result<()>;
}

/// Look of the launched tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabAppearance {
    pub session: Option<TabSession>,
    /// ARGB.
    pub toolbar_color: Option<u32>,
    pub show_title: bool,
    pub hide_url_bar_on_scroll: bool,
}

impl TabAppearance {
    pub fn new(session: Option<TabSession>) -> Self {
        Self {
            session,
            ..Default::default()
        }
    }

    pub fn toolbar_color(mut self, argb: u32) -> Self {
        self.toolbar_color = Some(argb);
        self
    }

    pub fn show_title(mut self, show: bool) -> Self {
        self.show_title = show;
        self
    }

    pub fn hide_url_bar_on_scroll(mut self, hide: bool) -> Self {
        self.hide_url_bar_on_scroll = hide;
        self
    }
}

#[derive(Debug, Default)]
struct ConnectionState {
    connected: bool,
    session: Option<TabSession>,
}

/// Service connection handed to [`TabsPlatform::bind`].
#[derive(Clone)]
pub struct TabsServiceConnection {
    state: Arc<Mutex<ConnectionState>>,
    ready: ReadyNotifier,
    login_url: String,
    observer: Option<Arc<dyn TabNavigationObserver>>,
}

impl TabsServiceConnection {
    fn new(
        ready: ReadyNotifier,
        login_url: String,
        observer: Option<Arc<dyn TabNavigationObserver>>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(ConnectionState::default())),
            ready,
            login_url,
            observer,
        }
    }

    pub fn on_service_connected(&self, client: &dyn TabsClient) {
        client.warmup();
        let session = client.new_session(self.observer.clone());
        if let Some(session) = &session {
            client.may_launch_url(session, &self.login_url);
        }
        {
            let mut state = self.lock();
            state.connected = true;
            state.session = session;
        }
        tracing::debug!("custom tabs service connected");
        self.ready.notify(AuthenticatorKind::CustomTabs);
    }

    pub fn on_service_disconnected(&self) {
        {
            let mut state = self.lock();
            state.connected = false;
            state.session = None;
        }
        tracing::debug!("custom tabs service disconnected");
        self.ready.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    pub fn session(&self) -> Option<TabSession> {
        self.lock().session.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for TabsServiceConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabsServiceConnection")
            .field("connected", &self.is_connected())
            .field("session", &self.session())
            .finish()
    }
}

pub struct CustomTabsAuthenticator {
    config: AuthConfig,
    platform: Arc<dyn TabsPlatform>,
    provider_package: Option<String>,
    observer: Option<Arc<dyn TabNavigationObserver>>,
    connection: Option<TabsServiceConnection>,
    bound: bool,
    appearance: Option<TabAppearance>,
}

impl CustomTabsAuthenticator {
    pub fn new(config: AuthConfig, platform: Arc<dyn TabsPlatform>) -> Self {
        let provider_package = platform.provider_package();
        Self {
            config,
            platform,
            provider_package,
            observer: None,
            connection: None,
            bound: false,
            appearance: None,
        }
    }

    pub fn with_navigation_observer(mut self, observer: Arc<dyn TabNavigationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Default appearance bound to the current session, for customising.
    pub fn new_appearance(&self) -> TabAppearance {
        TabAppearance::new(self.session())
    }

    pub fn set_appearance(&mut self, appearance: TabAppearance) {
        self.appearance = Some(appearance);
    }

    pub fn session(&self) -> Option<TabSession> {
        self.connection.as_ref().and_then(TabsServiceConnection::session)
    }

    pub fn is_connected(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(TabsServiceConnection::is_connected)
    }
}

impl Authenticator for CustomTabsAuthenticator {
    fn kind(&self) -> AuthenticatorKind {
        AuthenticatorKind::CustomTabs
    }

    fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn prepare(&mut self, ready: ReadyNotifier) -> bool {
        let connection =
            TabsServiceConnection::new(ready, self.config.login_url(), self.observer.clone());
        self.connection = Some(connection.clone());

        let Some(package) = self.provider_package.as_deref() else {
            tracing::debug!("no custom tabs provider installed");
            return false;
        };
        self.bound = self.platform.bind(package, connection);
        self.bound
    }

    fn launch(&mut self) -> Result<(), AuthError> {
        let Some(package) = self.provider_package.clone() else {
            return Err(AuthError::LaunchFailed {
                kind: self.kind(),
                reason: "no custom tabs provider installed".to_string(),
            });
        };

        let appearance = match &self.appearance {
            Some(appearance) => appearance.clone(),
            None => self.new_appearance(),
        };
        let request = LaunchRequest::new(self.config.login_url())
            .with_package(Some(package))
            .with_referrer_from(self.platform.host_package());

        self.platform
            .launch(&request, &appearance)
            .map_err(|err| AuthError::LaunchFailed {
                kind: AuthenticatorKind::CustomTabs,
                reason: err.to_string(),
            })
    }

    fn release(&mut self) {
        if self.bound {
            if let Some(package) = self.provider_package.as_deref() {
                self.platform.unbind(package);
            }
        }
        self.bound = false;
        self.connection = None;
    }
}
