//! HTTP client with the SoundCloud request interceptor.

use std::sync::PoisonError;
use std::sync::RwLock;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ApiError;
use crate::error::ApiResult;

/// Base URL of the SoundCloud REST API.
pub const DEFAULT_API_ENDPOINT: &str = "https://api.soundcloud.com/";

const DEFAULT_USER_AGENT: &str = concat!("soundcloud-api-rs/", env!("CARGO_PKG_VERSION"));

/// Explicitly owned SoundCloud API client.
///
/// Construct one per application and share it behind an `Arc`; the token can
/// be set after login without rebuilding the client.
#[derive(Debug)]
pub struct SoundCloudApi {
    http: reqwest::Client,
    base_url: Url,
    client_id: String,
    token: RwLock<Option<String>>,
}

/// Builder for [`SoundCloudApi`].
#[derive(Debug, Clone)]
pub struct SoundCloudApiBuilder {
    client_id: String,
    base_url: String,
    timeout: Option<Duration>,
    user_agent: String,
}

impl SoundCloudApiBuilder {
    fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            base_url: DEFAULT_API_ENDPOINT.to_string(),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Overrides the API host, e.g. to point at a mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidConfig`] for an empty client id, and
    /// [`ApiError::Url`] if the base URL does not parse.
    pub fn build(self) -> ApiResult<SoundCloudApi> {
        if self.client_id.trim().is_empty() {
            return Err(ApiError::InvalidConfig("client_id must not be empty".to_string()));
        }

        // `Url::join` drops the last path segment unless the base ends with '/'.
        let mut base = self.base_url;
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let mut http = reqwest::Client::builder().user_agent(self.user_agent);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        Ok(SoundCloudApi {
            http: http.build()?,
            base_url,
            client_id: self.client_id,
            token: RwLock::new(None),
        })
    }
}

impl SoundCloudApi {
    /// Creates a client against the public API host.
    pub fn new(client_id: impl Into<String>) -> ApiResult<Self> {
        Self::builder(client_id).build()
    }

    pub fn builder(client_id: impl Into<String>) -> SoundCloudApiBuilder {
        SoundCloudApiBuilder::new(client_id)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sets the OAuth token attached to every subsequent request.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Resolves `path` against the base URL and runs the interceptor on it.
    pub fn request_url(&self, path: &str) -> ApiResult<Url> {
        self.request_url_with(path, std::iter::empty::<(&str, &str)>())
    }

    /// Like [`request_url`](Self::request_url) with extra query parameters,
    /// which precede the interceptor's `client_id` / `oauth_token`.
    pub fn request_url_with<I, K, V>(&self, path: &str, query: I) -> ApiResult<Url>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut url = self.base_url.join(path.trim_start_matches('/'))?;
        url.query_pairs_mut().extend_pairs(query);
        self.intercept(&mut url);
        Ok(url)
    }

    fn intercept(&self, url: &mut Url) {
        let token = self.token();
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("client_id", &self.client_id);
        if let Some(token) = token.as_deref() {
            pairs.append_pair("oauth_token", token);
        }
    }

    /// GETs `path` and decodes the JSON body.
    pub async fn get_json<T, I, K, V>(&self, path: &str, query: I) -> ApiResult<T>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let url = self.request_url_with(path, query)?;
        tracing::debug!(path, "GET");

        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    /// POSTs `fields` form-urlencoded to `path` and decodes the JSON body.
    pub async fn post_form<T, F>(&self, path: &str, fields: &F) -> ApiResult<T>
    where
        T: DeserializeOwned,
        F: Serialize + ?Sized,
    {
        let url = self.request_url(path)?;
        tracing::debug!(path, "POST form");

        let response = self.http.post(url).form(fields).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized(body));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_of(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn client_id_is_attached_without_token() {
        let api = SoundCloudApi::new("abc").unwrap();
        let url = api.request_url("tracks/42").unwrap();

        assert_eq!(url.path(), "/tracks/42");
        assert_eq!(query_of(&url), vec![pair("client_id", "abc")]);
    }

    #[test]
    fn token_is_attached_once_set() {
        let api = SoundCloudApi::new("abc").unwrap();
        api.set_token("tok");
        let url = api.request_url_with("/tracks", [("q", "lofi")]).unwrap();

        assert_eq!(
            query_of(&url),
            vec![
                pair("q", "lofi"),
                pair("client_id", "abc"),
                pair("oauth_token", "tok"),
            ]
        );

        api.clear_token();
        assert!(!api.is_authenticated());
    }

    #[test]
    fn base_url_without_trailing_slash_keeps_its_path() {
        let api = SoundCloudApi::builder("abc")
            .base_url("http://127.0.0.1:9999/mock")
            .build()
            .unwrap();
        let url = api.request_url("oauth2/token").unwrap();

        assert_eq!(url.path(), "/mock/oauth2/token");
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let err = SoundCloudApi::new("  ").unwrap_err();
        assert!(matches!(err, ApiError::InvalidConfig(_)));
    }
}
