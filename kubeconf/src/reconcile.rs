//! Merging a freshly fetched credential bundle into an existing kubeconfig.

use std::collections::{btree_map::Entry, BTreeMap};

use tracing::debug;

use crate::clean::ConfigDocument;
use crate::error::IncompleteBundle;
use crate::owned::OwnedEntry;

/// What to do with an owned entry that is already in the kubeconfig.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Replace it. Tokens expire, so every login refreshes them.
    #[default]
    Overwrite,
    /// Leave it alone and only add owned entries that are absent.
    PreserveExisting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryChange {
    /// The entry did not exist before.
    Created,
    /// An older entry was overwritten.
    Replaced,
    /// The same entry was already there.
    Unchanged,
    /// An older entry was left in place because of [`MergePolicy::PreserveExisting`].
    Kept,
    /// The bundle had no such entry, so nothing was done.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Changes {
    pub cluster: EntryChange,
    pub context: EntryChange,
    pub user: EntryChange,
}

impl Changes {
    pub fn get(&self, entry: OwnedEntry) -> EntryChange {
        match entry {
            OwnedEntry::Cluster => self.cluster,
            OwnedEntry::Context => self.context,
            OwnedEntry::User => self.user,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (OwnedEntry, EntryChange)> + '_ {
        OwnedEntry::ALL
            .into_iter()
            .map(move |entry| (entry, self.get(entry)))
    }

    pub fn missing(&self) -> Vec<OwnedEntry> {
        self.iter()
            .filter(|(_, change)| *change == EntryChange::Missing)
            .map(|(entry, _)| entry)
            .collect()
    }

    /// Fails when the bundle did not provide every owned entry.
    pub fn ensure_complete(&self) -> Result<(), IncompleteBundle> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(IncompleteBundle { missing })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub document: ConfigDocument,
    pub changes: Changes,
}

impl Reconciliation {
    pub fn ensure_complete(&self) -> Result<(), IncompleteBundle> {
        self.changes.ensure_complete()
    }
}

fn merge_entry<V: PartialEq>(
    target: &mut BTreeMap<String, V>,
    source: &mut BTreeMap<String, V>,
    name: &str,
    policy: MergePolicy,
) -> EntryChange {
    let Some(fresh) = source.remove(name) else {
        return EntryChange::Missing;
    };

    match target.entry(name.to_owned()) {
        Entry::Vacant(slot) => {
            slot.insert(fresh);
            EntryChange::Created
        }
        Entry::Occupied(_) if policy == MergePolicy::PreserveExisting => EntryChange::Kept,
        Entry::Occupied(slot) if *slot.get() == fresh => EntryChange::Unchanged,
        Entry::Occupied(mut slot) => {
            slot.insert(fresh);
            EntryChange::Replaced
        }
    }
}

fn presence<V>(map: &BTreeMap<String, V>, entry: OwnedEntry) -> EntryChange {
    if map.contains_key(entry.name()) {
        EntryChange::Created
    } else {
        EntryChange::Missing
    }
}

/// Combine the owned entries of `incoming` with `existing`.
///
/// Without an existing document the result is `incoming` as it is. With
/// one, only the three owned keys are written; every other entry and the
/// current context stay exactly as they were. An owned entry the bundle
/// lacks is skipped and reported as [`EntryChange::Missing`].
pub fn reconcile(
    existing: Option<ConfigDocument>,
    mut incoming: ConfigDocument,
    policy: MergePolicy,
) -> Reconciliation {
    let Some(mut doc) = existing else {
        let changes = Changes {
            cluster: presence(&incoming.clusters, OwnedEntry::Cluster),
            context: presence(&incoming.contexts, OwnedEntry::Context),
            user: presence(&incoming.auth_infos, OwnedEntry::User),
        };
        debug!(?changes, "no existing kubeconfig, using the bundle as is");
        return Reconciliation {
            document: incoming,
            changes,
        };
    };

    let changes = Changes {
        cluster: merge_entry(
            &mut doc.clusters,
            &mut incoming.clusters,
            OwnedEntry::Cluster.name(),
            policy,
        ),
        context: merge_entry(
            &mut doc.contexts,
            &mut incoming.contexts,
            OwnedEntry::Context.name(),
            policy,
        ),
        user: merge_entry(
            &mut doc.auth_infos,
            &mut incoming.auth_infos,
            OwnedEntry::User.name(),
            policy,
        ),
    };
    debug!(?changes, ?policy, "merged bundle into existing kubeconfig");

    Reconciliation {
        document: doc,
        changes,
    }
}
