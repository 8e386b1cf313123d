//! Error types for kubeconfig handling

use std::{io, path::PathBuf};

use crate::owned::OwnedEntry;

/// Result type for the end-to-end operations in [`crate::ops`]
pub type Result<T> = std::result::Result<T, Error>;

/// The bytes are not a well-formed kubeconfig document.
#[derive(Debug, thiserror::Error)]
#[error("malformed kubeconfig: {0}")]
pub struct ParseError(#[from] pub serde_yaml::Error);

/// An existing kubeconfig could not be read or understood.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to serialize kubeconfig: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to back up {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("could not determine home directory")]
    NoHome,
}

/// The credential bundle lacks one or more owned entries.
#[derive(Debug, thiserror::Error)]
#[error("credential bundle is missing {}", describe(.missing))]
pub struct IncompleteBundle {
    pub missing: Vec<OwnedEntry>,
}

fn describe(missing: &[OwnedEntry]) -> String {
    missing
        .iter()
        .map(|entry| format!("{} {:?}", entry.kind(), entry.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid credential bundle: {0}")]
    Bundle(#[source] ParseError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Incomplete(#[from] IncompleteBundle),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Path(#[from] PathError),
}
