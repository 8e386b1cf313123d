//! Locating the kubeconfig file.

use std::{
    env,
    ffi::OsStr,
    path::{is_separator, Path, PathBuf},
};

use crate::error::PathError;

pub const KUBECONFIG_ENV: &str = "KUBECONFIG";
pub const KUBECONFIG_FILE_NAME: &str = "config";

pub fn kube_dir(home: &Path) -> PathBuf {
    home.join(".kube")
}

fn names_directory(path: &Path) -> bool {
    path.as_os_str()
        .to_string_lossy()
        .chars()
        .last()
        .map_or(false, is_separator)
        || path.is_dir()
}

/// Pick the kubeconfig path.
///
/// An override (usually `$KUBECONFIG`) wins; of a path list only the first
/// entry is used. An override naming a directory gets `config` appended.
/// Otherwise the file lives at `<home>/.kube/config`.
pub fn resolve(override_path: Option<&OsStr>, home: Option<&Path>) -> Result<PathBuf, PathError> {
    let first = override_path
        .and_then(|paths| env::split_paths(paths).find(|p| !p.as_os_str().is_empty()));

    match first {
        Some(path) if names_directory(&path) => Ok(path.join(KUBECONFIG_FILE_NAME)),
        Some(path) => Ok(path),
        None => home
            .map(|home| kube_dir(home).join(KUBECONFIG_FILE_NAME))
            .ok_or(PathError::NoHome),
    }
}

/// [`resolve`] against the real home directory.
pub fn resolve_default(override_path: Option<&OsStr>) -> Result<PathBuf, PathError> {
    resolve(override_path, dirs::home_dir().as_deref())
}
