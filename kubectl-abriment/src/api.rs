//! The Abriment backend: exchange credentials for a session token, then
//! trade the token for a kubeconfig bundle.

use std::{fmt, io::Read as _};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

use crate::settings::Settings;

const USER_AGENT: &str = concat!("kubectl-abriment/", env!("CARGO_PKG_VERSION"));

/// Bundles are small; anything bigger than this is not a kubeconfig.
const MAX_BUNDLE_BYTES: u64 = 4 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered and said no
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Network or other HTTP error
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The backend answered with something we could not read
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Password { username: String, password: String },
    /// An unscoped token issued by the dashboard
    Token(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
            Credentials::Token(_) => f.write_str("Token(<redacted>)"),
        }
    }
}

#[derive(Serialize, Debug, PartialEq, Eq)]
struct LoginBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    unscoped_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
}

impl<'a> LoginBody<'a> {
    fn new(credentials: &'a Credentials, project: Option<&'a str>) -> Self {
        let project = project.filter(|p| !p.is_empty());
        match credentials {
            Credentials::Password { username, password } => Self {
                unscoped_token: None,
                username: Some(username),
                password: Some(password),
                project,
            },
            Credentials::Token(token) => Self {
                unscoped_token: Some(token),
                username: None,
                password: None,
                project,
            },
        }
    }
}

/// Every backend response is wrapped in one of these.
#[derive(Deserialize, Debug)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    status_code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: JsonValue,
}

#[derive(Deserialize, Debug)]
struct LoginData {
    token: TokenData,
    #[serde(default)]
    user: Option<Named>,
    #[serde(default)]
    project: Option<Named>,
}

#[derive(Deserialize, Debug)]
struct TokenData {
    id: String,
    #[serde(default)]
    expires: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Named {
    name: String,
}

#[derive(Clone)]
pub struct Session {
    pub token: String,
    pub expires: Option<String>,
    pub user: Option<String>,
    pub project: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("expires", &self.expires)
            .field("user", &self.user)
            .field("project", &self.project)
            .finish()
    }
}

fn session_from(envelope: Envelope, url: &str) -> Result<Session, ApiError> {
    if !envelope.success {
        return Err(ApiError::Rejected {
            status: envelope.status_code,
            message: non_empty(envelope.message, "login was rejected"),
        });
    }

    let data: LoginData = serde_json::from_value(envelope.data).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    Ok(Session {
        token: data.token.id,
        expires: data.token.expires,
        user: data.user.map(|u| u.name),
        project: data.project.map(|p| p.name),
    })
}

/// Best effort at the backend's own explanation of a failed request.
fn rejection(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<Envelope>(body)
        .ok()
        .map(|envelope| envelope.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("backend returned HTTP {status}"));
    ApiError::Rejected { status, message }
}

fn non_empty(message: String, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

pub struct Client {
    agent: ureq::Agent,
    login_endpoint: String,
    config_endpoint: String,
}

impl Client {
    pub fn new(settings: &Settings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(settings.timeout())
            .user_agent(USER_AGENT)
            .build();

        Self {
            agent,
            login_endpoint: settings.login_endpoint.clone(),
            config_endpoint: settings.config_endpoint.clone(),
        }
    }

    /// Exchange credentials for a session.
    pub fn login(
        &self,
        credentials: &Credentials,
        project: Option<&str>,
    ) -> Result<Session, ApiError> {
        let url = &self.login_endpoint;
        debug!(%url, ?credentials, "logging in");

        let response = self
            .agent
            .post(url)
            .send_json(LoginBody::new(credentials, project));

        // The backend reports failures inside the envelope, sometimes with a 4xx.
        let response = match response {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(e) => {
                return Err(ApiError::Transport {
                    url: url.clone(),
                    reason: e.to_string(),
                })
            }
        };

        let envelope: Envelope = response.into_json().map_err(|e| ApiError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        let session = session_from(envelope, url)?;
        debug!(?session, "logged in");
        Ok(session)
    }

    /// Download the kubeconfig bundle for a session token.
    pub fn fetch_bundle(&self, token: &str) -> Result<Vec<u8>, ApiError> {
        let url = &self.config_endpoint;
        debug!(%url, "fetching kubeconfig bundle");

        let response = self.agent.get(url).set("X-Auth-Token", token).call();

        match response {
            Ok(resp) if resp.status() == 200 => {
                let mut bundle = Vec::new();
                resp.into_reader()
                    .take(MAX_BUNDLE_BYTES)
                    .read_to_end(&mut bundle)
                    .map_err(|e| ApiError::Decode {
                        url: url.clone(),
                        reason: e.to_string(),
                    })?;
                debug!(bytes = bundle.len(), "received kubeconfig bundle");
                Ok(bundle)
            }
            Ok(resp) | Err(ureq::Error::Status(_, resp)) => {
                let status = resp.status();
                let body = resp.into_string().unwrap_or_default();
                Err(rejection(status, &body))
            }
            Err(e) => Err(ApiError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            }),
        }
    }
}
