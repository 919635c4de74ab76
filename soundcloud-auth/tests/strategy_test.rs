use std::io;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use pretty_assertions::assert_eq;
use soundcloud_api::SoundCloudApi;
use soundcloud_auth::AuthConfig;
use soundcloud_auth::AuthError;
use soundcloud_auth::AuthenticationStrategy;
use soundcloud_auth::Authenticator;
use soundcloud_auth::AuthenticatorKind;
use soundcloud_auth::BrowserAuthenticator;
use soundcloud_auth::ConnectivityProbe;
use soundcloud_auth::CustomTabsAuthenticator;
use soundcloud_auth::OwnerHandle;
use soundcloud_auth::ResponseType;
use soundcloud_auth::StrategyState;
use soundcloud_auth::WebViewAuthenticator;
use soundcloud_auth::authenticator::BrowserPlatform;
use soundcloud_auth::authenticator::LaunchRequest;
use soundcloud_auth::authenticator::TabAppearance;
use soundcloud_auth::authenticator::TabSession;
use soundcloud_auth::authenticator::TabsClient;
use soundcloud_auth::authenticator::TabsPlatform;
use soundcloud_auth::authenticator::TabsServiceConnection;
use soundcloud_auth::authenticator::WebViewHost;
use soundcloud_auth::authenticator::WebViewRequest;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_string;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

const REDIRECT: &str = "myapp://cb";

fn config() -> AuthConfig {
    AuthConfig::new("test-client", REDIRECT)
}

fn api() -> Arc<SoundCloudApi> {
    Arc::new(SoundCloudApi::new("test-client").unwrap())
}

#[derive(Default)]
struct FakeBrowser {
    can_open: bool,
    probes: AtomicUsize,
    opened: Mutex<Vec<LaunchRequest>>,
}

impl BrowserPlatform for FakeBrowser {
    fn default_browser_package(&self) -> Option<String> {
        None
    }

    fn is_package_installed(&self, _package: &str) -> bool {
        false
    }

    fn can_open(&self, _url: &str) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.can_open
    }

    fn open(&self, request: &LaunchRequest) -> io::Result<()> {
        self.opened.lock().unwrap().push(request.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakeTabs {
    bind_ok: bool,
    binds: AtomicUsize,
    unbinds: AtomicUsize,
    connection: Mutex<Option<TabsServiceConnection>>,
}

impl TabsPlatform for FakeTabs {
    fn provider_package(&self) -> Option<String> {
        Some("com.android.chrome".to_string())
    }

    fn bind(&self, _package: &str, connection: TabsServiceConnection) -> bool {
        self.binds.fetch_add(1, Ordering::SeqCst);
        *self.connection.lock().unwrap() = Some(connection);
        self.bind_ok
    }

    fn unbind(&self, _package: &str) {
        self.unbinds.fetch_add(1, Ordering::SeqCst);
    }

    fn launch(&self, _request: &LaunchRequest, _appearance: &TabAppearance) -> io::Result<()> {
        Ok(())
    }
}

struct ReadyClient;

impl TabsClient for ReadyClient {
    fn warmup(&self) -> bool {
        true
    }

    fn new_session(
        &self,
        _observer: Option<Arc<dyn soundcloud_auth::authenticator::TabNavigationObserver>>,
    ) -> Option<TabSession> {
        Some(TabSession {
            id: "session".to_string(),
        })
    }

    fn may_launch_url(&self, _session: &TabSession, _url: &str) -> bool {
        true
    }
}

struct NoopHost;

impl WebViewHost for NoopHost {
    fn present(&self, _request: WebViewRequest) -> io::Result<()> {
        Ok(())
    }
}

struct Offline;

impl ConnectivityProbe for Offline {
    fn is_connected(&self) -> bool {
        false
    }
}

fn browser(can_open: bool) -> Arc<FakeBrowser> {
    Arc::new(FakeBrowser {
        can_open,
        ..Default::default()
    })
}

fn tabs(bind_ok: bool) -> Arc<FakeTabs> {
    Arc::new(FakeTabs {
        bind_ok,
        ..Default::default()
    })
}

#[tokio::test]
async fn falls_through_to_the_first_preparable_authenticator() {
    let tabs = tabs(false);
    let browser = browser(true);
    let mut strategy = AuthenticationStrategy::builder(api())
        .add_authenticator(CustomTabsAuthenticator::new(config(), tabs.clone()))
        .add_authenticator(BrowserAuthenticator::new(config(), browser.clone()))
        .add_authenticator(WebViewAuthenticator::new(config(), Arc::new(NoopHost)))
        .build();

    let pending = strategy.begin_authentication().unwrap();
    assert_eq!(pending.kind(), AuthenticatorKind::Browser);
    assert_eq!(pending.ready().await.unwrap(), AuthenticatorKind::Browser);

    assert_eq!(tabs.binds.load(Ordering::SeqCst), 1);
    assert_eq!(browser.probes.load(Ordering::SeqCst), 1);
    assert_eq!(strategy.state(), StrategyState::Active(AuthenticatorKind::Browser));

    strategy.launch().unwrap();
    let opened = browser.opened.lock().unwrap();
    assert_eq!(opened.len(), 1);
    assert!(
        opened[0]
            .url
            .starts_with("https://www.soundcloud.com/connect?client_id=test-client")
    );
}

#[tokio::test]
async fn later_authenticators_are_not_prepared_once_one_succeeds() {
    let tabs = tabs(true);
    let browser = browser(true);
    let mut strategy = AuthenticationStrategy::builder(api())
        .add_authenticator(CustomTabsAuthenticator::new(config(), tabs.clone()))
        .add_authenticator(BrowserAuthenticator::new(config(), browser.clone()))
        .build();

    let pending = strategy.begin_authentication().unwrap();
    assert_eq!(pending.kind(), AuthenticatorKind::CustomTabs);
    assert_eq!(browser.probes.load(Ordering::SeqCst), 0);

    let connection = tabs.connection.lock().unwrap().clone().unwrap();
    connection.on_service_connected(&ReadyClient);
    assert_eq!(pending.ready().await.unwrap(), AuthenticatorKind::CustomTabs);

    let err = strategy.begin_authentication().unwrap_err();
    assert!(matches!(err, AuthError::SessionActive(AuthenticatorKind::CustomTabs)));

    strategy.release();
    strategy.release();
    assert_eq!(tabs.unbinds.load(Ordering::SeqCst), 1);
}

#[test]
fn network_gate_runs_before_any_prepare() {
    let browser = browser(true);
    let reported = Arc::new(AtomicBool::new(false));
    let flag = reported.clone();

    let mut strategy = AuthenticationStrategy::builder(api())
        .add_authenticator(BrowserAuthenticator::new(config(), browser.clone()))
        .require_network(Arc::new(Offline))
        .on_network_failure(Box::new(move |err: &AuthError| {
            assert_eq!(err.to_string(), "Authentication Failed: Network was not connected.");
            flag.store(true, Ordering::SeqCst);
        }))
        .build();

    let err = strategy.begin_authentication().unwrap_err();

    assert!(matches!(err, AuthError::NetworkUnavailable));
    assert!(reported.load(Ordering::SeqCst));
    assert_eq!(browser.probes.load(Ordering::SeqCst), 0);
    assert_eq!(strategy.state(), StrategyState::Failed);
    assert!(strategy.active().is_none());
}

#[test]
fn nothing_preparable_leaves_no_active_authenticator() {
    let mut strategy = AuthenticationStrategy::builder(api())
        .add_authenticator(CustomTabsAuthenticator::new(config(), tabs(false)))
        .add_authenticator(BrowserAuthenticator::new(config(), browser(false)))
        .build();

    let err = strategy.begin_authentication().unwrap_err();
    assert!(matches!(err, AuthError::NoAuthenticatorAvailable));
    assert!(!strategy.can_authenticate(Some("myapp://cb?code=abc123")));
    assert!(matches!(strategy.launch(), Err(AuthError::NoActiveAuthenticator)));

    let mut empty = AuthenticationStrategy::builder(api()).build();
    assert!(matches!(
        empty.begin_authentication(),
        Err(AuthError::NoAuthenticators)
    ));
}

#[tokio::test]
async fn destroyed_owner_suppresses_readiness() {
    let owner = OwnerHandle::new();
    let tabs = tabs(true);
    let mut strategy = AuthenticationStrategy::builder(api())
        .add_authenticator(CustomTabsAuthenticator::new(config(), tabs.clone()))
        .owner(owner.clone())
        .build();

    let pending = strategy.begin_authentication().unwrap();
    owner.destroy();
    let connection = tabs.connection.lock().unwrap().clone().unwrap();
    connection.on_service_connected(&ReadyClient);

    let err = pending.ready().await.unwrap_err();
    assert!(err.is_cancellation());
}

#[test]
fn can_authenticate_follows_the_active_redirect() {
    let mut strategy = AuthenticationStrategy::builder(api())
        .add_authenticator(BrowserAuthenticator::new(config(), browser(true)))
        .build();
    assert!(!strategy.can_authenticate(Some("myapp://cb?code=abc123")));

    strategy.begin_authentication().unwrap();
    assert!(strategy.can_authenticate(Some("myapp://cb?code=abc123")));
    assert!(strategy.can_authenticate(Some("myapp://cb?error=access_denied")));
    assert!(!strategy.can_authenticate(Some("otherapp://cb?code=abc123")));
    assert!(!strategy.can_authenticate(None));
    assert_eq!(
        strategy.active().map(Authenticator::kind),
        Some(AuthenticatorKind::Browser)
    );
}

fn strategy_against(server: &MockServer) -> AuthenticationStrategy {
    strategy_at(server.uri())
}

fn strategy_at(base_url: String) -> AuthenticationStrategy {
    let api = SoundCloudApi::builder("test-client")
        .base_url(base_url)
        .build()
        .unwrap();
    let mut strategy = AuthenticationStrategy::builder(Arc::new(api))
        .add_authenticator(BrowserAuthenticator::new(config(), browser(true)))
        .build();
    strategy.begin_authentication().unwrap();
    strategy
}

#[tokio::test]
async fn get_token_posts_the_grant_form() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(query_param("client_id", "test-client"))
        .and(body_string(
            "client_id=test-client&client_secret=shh&code=abc123\
             &grant_type=authorization_code&redirect_uri=myapp%3A%2F%2Fcb",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok",
            "scope": "non-expiring"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = strategy_against(&server)
        .get_token(Some("myapp://cb?code=abc123"), "shh")
        .await
        .unwrap();

    assert_eq!(response.response_type(), ResponseType::Token);
    assert_eq!(response.access_token.as_deref(), Some("tok"));
}

#[tokio::test]
async fn oauth_error_body_is_a_response_not_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"error": "invalid_grant"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = strategy_against(&server)
        .get_token(Some("myapp://cb?code=stale"), "shh")
        .await
        .unwrap();

    assert_eq!(response.response_type(), ResponseType::Error);
    assert_eq!(response.error.as_deref(), Some("invalid_grant"));
}

#[tokio::test]
async fn missing_code_fails_without_a_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let strategy = strategy_against(&server);

    let err = strategy
        .get_token(Some("myapp://cb?error=access_denied"), "shh")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Authentication parameter map was null.");

    let err = strategy.get_token(None, "shh").await.unwrap_err();
    assert!(matches!(err, AuthError::MissingParameters));
}

#[tokio::test]
async fn null_body_is_an_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let err = strategy_against(&server)
        .get_token(Some("myapp://cb?code=abc123"), "shh")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "The authentication response was null.");
}

#[tokio::test]
async fn token_endpoint_outage_is_an_exchange_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_string("<html><body>Service Unavailable</body></html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = strategy_against(&server)
        .get_token(Some("myapp://cb?code=abc123"), "shh")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Exchange(_)), "{err:?}");
    assert!(!err.is_cancellation());
}

#[tokio::test]
async fn unreachable_token_endpoint_is_an_exchange_error() {
    let err = strategy_at("http://127.0.0.1:1".to_string())
        .get_token(Some("myapp://cb?code=abc123"), "shh")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Exchange(_)), "{err:?}");
    assert!(!err.is_cancellation());
}

#[test]
fn releasing_unprepared_authenticators_is_a_no_op() {
    let tabs = tabs(true);
    let mut strategy = AuthenticationStrategy::builder(api())
        .add_authenticator(CustomTabsAuthenticator::new(config(), tabs.clone()))
        .add_authenticator(WebViewAuthenticator::new(config(), Arc::new(NoopHost)))
        .add_authenticator(BrowserAuthenticator::new(config(), browser(true)))
        .build();

    strategy.release();
    drop(strategy);

    assert_eq!(tabs.binds.load(Ordering::SeqCst), 0);
    assert_eq!(tabs.unbinds.load(Ordering::SeqCst), 0);
}
