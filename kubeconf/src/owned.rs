//! The three entries this tool creates, replaces and removes.
//!
//! The names must match the ones the credential provider uses in the
//! bundles it hands out. No other key is ever touched.

pub const OWNED_CLUSTER_NAME: &str = "abriment-cluster";
pub const OWNED_CONTEXT_NAME: &str = "abriment-context";
pub const OWNED_IDENTITY_NAME: &str = "abriment-user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnedEntry {
    Cluster,
    Context,
    User,
}

impl OwnedEntry {
    pub const ALL: [OwnedEntry; 3] = [OwnedEntry::Cluster, OwnedEntry::Context, OwnedEntry::User];

    pub fn name(self) -> &'static str {
        match self {
            OwnedEntry::Cluster => OWNED_CLUSTER_NAME,
            OwnedEntry::Context => OWNED_CONTEXT_NAME,
            OwnedEntry::User => OWNED_IDENTITY_NAME,
        }
    }

    /// What kubectl calls this kind of entry.
    pub fn kind(self) -> &'static str {
        match self {
            OwnedEntry::Cluster => "cluster",
            OwnedEntry::Context => "context",
            OwnedEntry::User => "user",
        }
    }
}
