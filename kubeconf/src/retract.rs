use tracing::debug;

use crate::clean::ConfigDocument;
use crate::owned::OwnedEntry;

#[derive(Debug, Clone, PartialEq)]
pub struct Retraction {
    pub document: ConfigDocument,
    /// Owned entries that were present and are now gone.
    pub removed: Vec<OwnedEntry>,
}

/// Remove the owned entries from `existing`, leaving everything else alone.
///
/// The current context is not touched even if it named the removed context.
pub fn retract(mut existing: ConfigDocument) -> Retraction {
    let removed = OwnedEntry::ALL
        .into_iter()
        .filter(|&entry| {
            let name = entry.name();
            match entry {
                OwnedEntry::Cluster => existing.clusters.remove(name).is_some(),
                OwnedEntry::Context => existing.contexts.remove(name).is_some(),
                OwnedEntry::User => existing.auth_infos.remove(name).is_some(),
            }
        })
        .collect::<Vec<_>>();
    debug!(?removed, "retracted owned entries");

    Retraction {
        document: existing,
        removed,
    }
}
