//! Desktop login: system browser plus a loopback redirect listener.

use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use soundcloud_api::SoundCloudApi;
use soundcloud_auth::AuthConfig;
use soundcloud_auth::AuthenticationStrategy;
use soundcloud_auth::BrowserAuthenticator;
use soundcloud_auth::ConnectivityProbe;
use soundcloud_auth::LoopbackRedirect;
use soundcloud_auth::SystemBrowser;
use soundcloud_auth::TokenOutcome;
use url::Url;

use crate::config::Config;
use crate::token_store::StoredToken;
use crate::token_store::TokenStore;

/// Treats the network as up when the API host resolves.
#[derive(Debug)]
pub struct DnsProbe {
    host: String,
}

impl DnsProbe {
    pub fn for_url(url: &str) -> Option<Self> {
        let host = Url::parse(url).ok()?.host_str()?.to_string();
        Some(Self { host })
    }
}

impl ConnectivityProbe for DnsProbe {
    fn is_connected(&self) -> bool {
        (self.host.as_str(), 443)
            .to_socket_addrs()
            .map(|mut addrs| addrs.next().is_some())
            .unwrap_or(false)
    }
}

/// Host, port and path of a loopback redirect URI.
pub fn loopback_target(redirect_uri: &str) -> Result<(String, u16, String)> {
    let url = Url::parse(redirect_uri)
        .with_context(|| format!("redirect uri is not a URL: {redirect_uri}"))?;
    let host = match url.host_str() {
        Some(host @ ("127.0.0.1" | "localhost")) if url.scheme() == "http" => host.to_string(),
        _ => bail!("redirect uri must be http://127.0.0.1:<port>/<path> for CLI login"),
    };
    let port = url
        .port()
        .context("redirect uri needs an explicit port for CLI login")?;
    Ok((host, port, url.path().to_string()))
}

pub fn build_api(config: &Config) -> Result<Arc<SoundCloudApi>> {
    let api = SoundCloudApi::builder(config.client_id()?)
        .base_url(config.api_base_url.clone())
        .timeout(Duration::from_secs(30))
        .build()?;
    Ok(Arc::new(api))
}

pub async fn run_login(config: &Config, timeout: Duration) -> Result<StoredToken> {
    let api = build_api(config)?;
    let client_secret = config.client_secret()?.to_string();
    let (host, port, path) = loopback_target(&config.redirect_uri)?;

    let loopback = LoopbackRedirect::bind(&host, port, &path)
        .with_context(|| format!("failed to listen on port {port}"))?;
    let auth_config = AuthConfig::new(config.client_id()?, config.redirect_uri.clone())
        .with_redirect_matching(config.redirect_matching);

    let mut builder = AuthenticationStrategy::builder(api).add_authenticator(
        BrowserAuthenticator::new(auth_config.clone(), Arc::new(SystemBrowser)),
    );
    if config.require_network {
        if let Some(probe) = DnsProbe::for_url(&config.api_base_url) {
            builder = builder.require_network(Arc::new(probe));
        }
    }
    let mut strategy = builder.build();

    strategy.begin_authentication()?.ready().await?;

    eprintln!("Opening SoundCloud login in your browser:\n  {}", auth_config.login_url());
    if let Err(err) = strategy.launch() {
        tracing::warn!("{err}");
        eprintln!("Could not open a browser; visit the URL above to continue.");
    }

    let redirect = tokio::task::spawn_blocking(move || loopback.wait_for_callback(timeout))
        .await
        .context("redirect listener panicked")??;
    tracing::debug!(%redirect, "received redirect");

    if !strategy.can_authenticate(Some(&redirect)) {
        bail!("unexpected redirect: {redirect}");
    }

    let response = match strategy.get_token(Some(&redirect), &client_secret).await {
        Ok(response) => response,
        Err(err) if err.is_cancellation() => bail!("login cancelled"),
        Err(err) => return Err(err.into()),
    };
    let refresh_token = response.refresh_token.clone();

    match response.into_outcome() {
        TokenOutcome::Token {
            access_token,
            scope,
        } => {
            let token = StoredToken {
                access_token,
                scope,
                refresh_token,
            };
            TokenStore::in_home(&config.home).save(&token)?;
            Ok(token)
        }
        TokenOutcome::Rejected(error) => bail!("SoundCloud rejected the login: {error}"),
        TokenOutcome::Unknown => bail!("token endpoint returned neither a token nor an error"),
    }
}
