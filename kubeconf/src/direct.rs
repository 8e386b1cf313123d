//! The kubeconfig document exactly as it appears on disk.
//!
//! Entries are lists of `{name, <spec>}` pairs here; [`crate::clean`] turns
//! them into maps keyed by name. Every spec keeps the fields it does not
//! model in `other`, so entries written by other tools survive a rewrite.

use std::{collections::BTreeMap, fmt, path::PathBuf};

use serde::*;
use serde_yaml::Value as YamlValue;

/// Fields a spec does not model, kept verbatim.
pub type Extra = BTreeMap<String, YamlValue>;

// region: Context
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ContextSpec {
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<YamlValue>,
    #[serde(flatten)]
    pub other: Extra,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Context {
    pub name: String,
    pub context: ContextSpec,
}
// endregion

// region: Cluster
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterSpec {
    #[serde(default)]
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure_skip_tls_verify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<YamlValue>,
    #[serde(flatten)]
    pub other: Extra,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Cluster {
    pub name: String,
    pub cluster: ClusterSpec,
}
// endregion

// region: User
#[derive(Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct UserSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "tokenFile", skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_certificate: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_certificate_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec: Option<YamlValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_provider: Option<YamlValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<YamlValue>,
    #[serde(flatten)]
    pub other: Extra,
}

impl UserSpec {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }
}

struct Redacted<'a>(&'a Option<String>);

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Some(<redacted>)"),
            None => f.write_str("None"),
        }
    }
}

// Secrets stay out of Debug output, which ends up in logs.
impl fmt::Debug for UserSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSpec")
            .field("token", &Redacted(&self.token))
            .field("token_file", &self.token_file)
            .field("client_certificate", &self.client_certificate)
            .field("client_certificate_data", &self.client_certificate_data)
            .field("client_key", &self.client_key)
            .field("client_key_data", &Redacted(&self.client_key_data))
            .field("username", &self.username)
            .field("password", &Redacted(&self.password))
            .field("exec", &self.exec)
            .field("auth_provider", &self.auth_provider)
            .field("extensions", &self.extensions)
            .field("other", &self.other.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct User {
    pub name: String,
    pub user: UserSpec,
}
// endregion

// region: Common
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    #[default]
    #[serde(rename = "v1")]
    V1,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    #[default]
    Config,
}

/// `clusters: null` is what kubectl writes for an empty list.
fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct KubeConfig {
    #[serde(default)]
    pub kind: Kind,
    #[serde(rename = "apiVersion", default)]
    pub api_version: ApiVersion,
    #[serde(default, deserialize_with = "nullable_list")]
    pub clusters: Vec<Cluster>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub contexts: Vec<Context>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub users: Vec<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<YamlValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<YamlValue>,
    #[serde(flatten)]
    pub other: Extra,
}
// endregion
