//! HTTP client for the remote auth authority
//!
//! - `POST {base}/login {username, password}` answers `{user, token, msg}` or `{msg}`
//! - `POST {base}/register {username, email, password}` answers `{msg}`
//!
//! Replies are decoded into tagged enums. Transport failures and
//! unrecognised bodies fall back to a generic message. No retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    AuthAuthority, AuthError, Credentials, Identity, Registration, Session, LOGIN_FAILED,
    REGISTRATION_FAILED,
};
use crate::error::Result;

/// Login reply. Success also carries a `msg`, which is ignored.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoginReply {
    Success { user: Identity, token: String },
    Failure { msg: String },
}

#[derive(Debug, Deserialize)]
struct MessageReply {
    msg: String,
}

pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthAuthority for AuthClient {
    async fn login(&self, credentials: &Credentials) -> std::result::Result<Session, AuthError> {
        let url = self.endpoint("login");
        debug!("POST {} as {}", url, credentials.username);

        let response = match self.client.post(&url).json(credentials).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Login request failed: {}", e);
                return Err(AuthError::new(LOGIN_FAILED));
            }
        };

        let status = response.status();
        let reply = response.json::<LoginReply>().await.ok();

        match (status.is_success(), reply) {
            (true, Some(LoginReply::Success { user, token })) => Ok(Session { user, token }),
            (_, Some(LoginReply::Failure { msg })) => {
                debug!("Login rejected ({}): {}", status, msg);
                Err(AuthError::new(msg))
            }
            _ => {
                warn!("Unexpected login reply with status {}", status);
                Err(AuthError::new(LOGIN_FAILED))
            }
        }
    }

    async fn register(&self, registration: &Registration) -> std::result::Result<String, AuthError> {
        let url = self.endpoint("register");
        debug!("POST {} for {}", url, registration.username);

        let response = match self.client.post(&url).json(registration).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Registration request failed: {}", e);
                return Err(AuthError::new(REGISTRATION_FAILED));
            }
        };

        let status = response.status();
        match response.json::<MessageReply>().await {
            Ok(reply) if status.is_success() => Ok(reply.msg),
            Ok(reply) => Err(AuthError::new(reply.msg)),
            Err(e) => {
                warn!("Unreadable registration reply with status {}: {}", status, e);
                Err(AuthError::new(REGISTRATION_FAILED))
            }
        }
    }
}
