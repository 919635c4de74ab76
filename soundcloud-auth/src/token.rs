//! Code-for-token exchange against `oauth2/token`.

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use soundcloud_api::ApiError;
use soundcloud_api::SoundCloudApi;

use crate::authenticator::GrantParameters;
use crate::error::AuthError;

pub const TOKEN_PATH: &str = "oauth2/token";

/// Body of a token endpoint reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationResponse {
    pub access_token: Option<String>,
    pub scope: Option<String>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    Token,
    Error,
    Unknown,
}

/// A response sorted into what the caller should do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    Token {
        access_token: String,
        scope: Option<String>,
    },
    Rejected(String),
    Unknown,
}

impl AuthenticationResponse {
    /// `Token` wins when both a token and an error are present.
    pub fn response_type(&self) -> ResponseType {
        if self.access_token.is_some() {
            ResponseType::Token
        } else if self.error.is_some() {
            ResponseType::Error
        } else {
            ResponseType::Unknown
        }
    }

    pub fn into_outcome(self) -> TokenOutcome {
        match (self.access_token, self.error) {
            (Some(access_token), _) => TokenOutcome::Token {
                access_token,
                scope: self.scope,
            },
            (None, Some(error)) => TokenOutcome::Rejected(error),
            (None, None) => TokenOutcome::Unknown,
        }
    }
}

/// Posts grant parameters to the token endpoint.
#[derive(Debug, Clone)]
pub struct TokenExchange {
    api: Arc<SoundCloudApi>,
}

impl TokenExchange {
    pub fn new(api: Arc<SoundCloudApi>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &Arc<SoundCloudApi> {
        &self.api
    }

    /// Sends one request. An OAuth error body comes back as `Ok` with
    /// `error` set, whatever the HTTP status.
    pub async fn exchange(
        &self,
        params: &GrantParameters,
    ) -> Result<AuthenticationResponse, AuthError> {
        tracing::debug!(grant_type = %params.grant_type, "requesting token");

        match self
            .api
            .post_form::<Option<AuthenticationResponse>, _>(TOKEN_PATH, params)
            .await
        {
            Ok(Some(response)) => Ok(response),
            Ok(None) => Err(AuthError::EmptyResponse),
            Err(err) => {
                let rejected = match &err {
                    ApiError::Status { body, .. } | ApiError::Unauthorized(body) => {
                        oauth_error(body)
                    }
                    _ => None,
                };
                rejected.ok_or_else(|| AuthError::from(err))
            }
        }
    }
}

fn oauth_error(body: &str) -> Option<AuthenticationResponse> {
    serde_json::from_str::<AuthenticationResponse>(body)
        .ok()
        .filter(|response| response.error.is_some())
}
