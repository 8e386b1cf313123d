//! Login and logout as whole operations on a kubeconfig file.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::clean::{parse, ConfigDocument};
use crate::error::{Error, Result};
use crate::owned::OwnedEntry;
use crate::persist::{backup, persist, Mode, Persisted};
use crate::reconcile::{reconcile, Changes, MergePolicy};
use crate::retract::retract;
use crate::store::load;

#[derive(Debug, Clone, Copy)]
pub struct ApplyOptions {
    pub policy: MergePolicy,
    pub mode: Mode,
    /// Copy the current file aside before replacing it.
    pub backup: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            policy: MergePolicy::Overwrite,
            mode: Mode::Write,
            backup: false,
        }
    }
}

#[derive(Debug)]
pub struct Applied {
    pub changes: Changes,
    /// The document as it was before, if there was a file.
    pub previous: Option<ConfigDocument>,
    pub persisted: Persisted,
    pub backup: Option<PathBuf>,
}

/// Merge a credential bundle into the kubeconfig at `path`.
///
/// Nothing is written unless the bundle carries all three owned entries.
pub fn apply_bundle(path: &Path, bundle: &[u8], options: &ApplyOptions) -> Result<Applied> {
    let incoming = parse(bundle).map_err(Error::Bundle)?;
    let previous = load(path)?;

    let reconciliation = reconcile(previous.clone(), incoming, options.policy);
    reconciliation.ensure_complete()?;

    let backup_path = match options.mode {
        Mode::Write if options.backup => backup(path)?,
        _ => None,
    };
    let persisted = persist(&reconciliation.document, path, options.mode)?;

    Ok(Applied {
        changes: reconciliation.changes,
        previous,
        persisted,
        backup: backup_path,
    })
}

#[derive(Debug)]
pub enum Retracted {
    /// There is no kubeconfig, so there was nothing to remove.
    NoFile,
    Done {
        removed: Vec<OwnedEntry>,
        previous: ConfigDocument,
        /// `None` when nothing was removed and the file was left as is.
        persisted: Option<Persisted>,
    },
}

/// Remove the owned entries from the kubeconfig at `path`.
pub fn retract_file(path: &Path, mode: Mode) -> Result<Retracted> {
    let Some(previous) = load(path)? else {
        debug!(path = %path.display(), "nothing to retract");
        return Ok(Retracted::NoFile);
    };

    let retraction = retract(previous.clone());
    let persisted = match (mode, retraction.removed.is_empty()) {
        (Mode::Write, true) => None,
        _ => Some(persist(&retraction.document, path, mode)?),
    };

    Ok(Retracted::Done {
        removed: retraction.removed,
        previous,
        persisted,
    })
}
