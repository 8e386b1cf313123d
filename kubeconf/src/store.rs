use std::{fs, io, path::Path};

use tracing::debug;

use crate::clean::{parse, ConfigDocument};
use crate::error::LoadError;

/// Read the kubeconfig at `path`, or `None` if there is no file yet.
pub fn load(path: &Path) -> Result<Option<ConfigDocument>, LoadError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no kubeconfig yet");
            return Ok(None);
        }
        Err(source) => {
            return Err(LoadError::Read {
                path: path.to_owned(),
                source,
            })
        }
    };

    let doc = parse(&bytes).map_err(|source| LoadError::Parse {
        path: path.to_owned(),
        source,
    })?;
    debug!(
        path = %path.display(),
        clusters = doc.clusters.len(),
        contexts = doc.contexts.len(),
        users = doc.auth_infos.len(),
        "loaded kubeconfig"
    );
    Ok(Some(doc))
}
