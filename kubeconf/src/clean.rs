use std::collections::BTreeMap;

use serde_yaml::Value as YamlValue;
use tracing::warn;

use crate::direct::{self, Extra};
pub use crate::direct::{Cluster, ClusterSpec, Context, ContextSpec, Kind, User, UserSpec};
use crate::error::ParseError;

/// A kubeconfig with its entries keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    pub clusters: BTreeMap<String, ClusterSpec>,
    pub contexts: BTreeMap<String, ContextSpec>,
    pub auth_infos: BTreeMap<String, UserSpec>,
    pub current_context: Option<String>,
    pub preferences: Option<YamlValue>,
    pub extensions: Option<YamlValue>,
    pub other: Extra,
}

fn keyed<T>(kind: &str, entries: impl IntoIterator<Item = (String, T)>) -> BTreeMap<String, T> {
    let mut map = BTreeMap::new();
    for (name, spec) in entries {
        if map.insert(name.clone(), spec).is_some() {
            warn!("duplicate {kind} {name:?} in kubeconfig, keeping the last one");
        }
    }
    map
}

impl From<direct::KubeConfig> for ConfigDocument {
    fn from(kc: direct::KubeConfig) -> Self {
        Self {
            current_context: kc.current_context,
            preferences: kc.preferences,
            extensions: kc.extensions,
            other: kc.other,
            clusters: keyed(
                "cluster",
                kc.clusters.into_iter().map(|cls| (cls.name, cls.cluster)),
            ),
            contexts: keyed(
                "context",
                kc.contexts.into_iter().map(|ctx| (ctx.name, ctx.context)),
            ),
            auth_infos: keyed(
                "user",
                kc.users.into_iter().map(|usr| (usr.name, usr.user)),
            ),
        }
    }
}

impl From<ConfigDocument> for direct::KubeConfig {
    fn from(doc: ConfigDocument) -> Self {
        direct::KubeConfig {
            kind: Kind::Config,
            api_version: direct::ApiVersion::V1,
            preferences: doc.preferences,
            current_context: doc.current_context,
            extensions: doc.extensions,
            other: doc.other,

            clusters: doc
                .clusters
                .into_iter()
                .map(|(name, cluster)| Cluster { name, cluster })
                .collect(),
            contexts: doc
                .contexts
                .into_iter()
                .map(|(name, context)| Context { name, context })
                .collect(),
            users: doc
                .auth_infos
                .into_iter()
                .map(|(name, user)| User { name, user })
                .collect(),
        }
    }
}

/// Decode a kubeconfig document. Blank input is an empty document.
pub fn parse(bytes: &[u8]) -> Result<ConfigDocument, ParseError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ConfigDocument::default());
    }
    let kc: direct::KubeConfig = serde_yaml::from_slice(bytes)?;
    Ok(kc.into())
}

pub fn render(doc: &ConfigDocument) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&direct::KubeConfig::from(doc.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_an_empty_document() {
        assert_eq!(parse(b"").unwrap(), ConfigDocument::default());
        assert_eq!(parse(b" \n\t\n").unwrap(), ConfigDocument::default());
    }

    #[test]
    fn rejects_documents_that_are_not_kubeconfigs() {
        assert!(parse(b"clusters: [oops").is_err());
        assert!(parse(b"- just\n- a\n- list\n").is_err());
        assert!(parse(b"clusters:\n- cluster: {server: x}\n").is_err());
    }

    #[test]
    fn entries_are_keyed_by_name() {
        let doc = parse(
            br#"
clusters:
- name: a
  cluster: {server: "https://a"}
- name: b
  cluster: {server: "https://b"}
contexts:
- name: a
  context: {cluster: a, user: alice, namespace: dev}
users:
- name: alice
  user: {token: t0k3n}
current-context: a
"#,
        )
        .unwrap();

        assert_eq!(doc.clusters["b"].server, "https://b");
        assert_eq!(doc.contexts["a"].namespace.as_deref(), Some("dev"));
        assert_eq!(doc.auth_infos["alice"].token.as_deref(), Some("t0k3n"));
        assert_eq!(doc.current_context.as_deref(), Some("a"));
    }

    #[test]
    fn duplicate_names_keep_the_last_entry() {
        let doc = parse(
            br#"
clusters:
- name: a
  cluster: {server: "https://old"}
- name: a
  cluster: {server: "https://new"}
"#,
        )
        .unwrap();

        assert_eq!(doc.clusters.len(), 1);
        assert_eq!(doc.clusters["a"].server, "https://new");
    }

    #[test]
    fn rendered_document_parses_back_unchanged() {
        let mut doc = ConfigDocument {
            current_context: Some("ctx".into()),
            preferences: Some(YamlValue::Mapping(Default::default())),
            ..ConfigDocument::default()
        };
        doc.clusters.insert(
            "c".into(),
            ClusterSpec {
                server: "https://c:6443".into(),
                insecure_skip_tls_verify: Some(true),
                ..ClusterSpec::default()
            },
        );
        doc.contexts.insert(
            "ctx".into(),
            ContextSpec {
                cluster: "c".into(),
                user: "u".into(),
                ..ContextSpec::default()
            },
        );
        doc.auth_infos.insert("u".into(), UserSpec::with_token("abc"));

        let text = render(&doc).unwrap();
        assert!(text.contains("apiVersion: v1"));
        assert!(text.contains("kind: Config"));
        assert_eq!(parse(text.as_bytes()).unwrap(), doc);
    }
}
