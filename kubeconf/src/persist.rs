//! Writing a kubeconfig back to disk.
//!
//! A write goes to a temporary file beside the target which is renamed over
//! it once complete, so a failed write leaves the previous file untouched.

use std::{
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use chrono::Local;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::clean::{render, ConfigDocument};
use crate::error::PersistError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Replace the file on disk.
    Write,
    /// Only render the document.
    Preview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persisted {
    Written { path: PathBuf },
    Preview(String),
}

const MAX_SYMLINKS: usize = 40;
const MAX_BACKUPS: usize = 100;

/// Follow a symlinked kubeconfig so the rename replaces its target, even
/// when that target does not exist yet.
fn write_target(path: &Path) -> Result<PathBuf, PersistError> {
    let mut target = path.to_owned();
    for _ in 0..MAX_SYMLINKS {
        match fs::read_link(&target) {
            Ok(next) => target = parent_dir(&target).join(next),
            Err(_) => return Ok(target),
        }
    }
    Err(PersistError::Write {
        path: path.to_owned(),
        source: io::Error::new(io::ErrorKind::Other, "too many levels of symbolic links"),
    })
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.is_dir() {
        return Ok(());
    }
    debug!(path = %dir.display(), "creating kubeconfig directory");

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir).map_err(|source| PersistError::CreateDir {
        path: dir.to_owned(),
        source,
    })
}

fn write_atomic(target: &Path, contents: &str) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(parent_dir(target))?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;

    // New temp files are 0600; a replaced file keeps whatever it had.
    if let Ok(meta) = fs::metadata(target) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }

    tmp.persist(target).map_err(|err| err.error)?;
    Ok(())
}

/// Render `doc` and, in [`Mode::Write`], replace the file at `path` with it.
pub fn persist(doc: &ConfigDocument, path: &Path, mode: Mode) -> Result<Persisted, PersistError> {
    let rendered = render(doc).map_err(PersistError::Serialize)?;

    match mode {
        Mode::Preview => Ok(Persisted::Preview(rendered)),
        Mode::Write => {
            let target = write_target(path)?;
            ensure_dir(parent_dir(&target))?;
            write_atomic(&target, &rendered).map_err(|source| PersistError::Write {
                path: target.clone(),
                source,
            })?;
            info!(path = %target.display(), "wrote kubeconfig");
            Ok(Persisted::Written { path: target })
        }
    }
}

/// Copy `from` into a file that must not exist yet.
fn copy_new(from: &Path, to: &Path) -> io::Result<()> {
    let mut source = fs::File::open(from)?;
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut dest = options.open(to)?;
    io::copy(&mut source, &mut dest)?;
    dest.set_permissions(source.metadata()?.permissions())?;
    dest.sync_all()
}

/// Copy the file at `path` to `<name>_<timestamp>` next to it. An earlier
/// backup with the same name is never overwritten; a `.N` suffix is added
/// instead.
pub fn backup(path: &Path) -> Result<Option<PathBuf>, PersistError> {
    if !path.exists() {
        return Ok(None);
    }

    let now = Local::now().format("%Y%m%dT%H%M%S");
    let mut base = path.file_name().unwrap_or_default().to_os_string();
    base.push(format!("_{now}"));

    for attempt in 0..MAX_BACKUPS {
        let mut name = base.clone();
        if attempt > 0 {
            name.push(format!(".{attempt}"));
        }
        let backup_path = path.with_file_name(name);

        match copy_new(path, &backup_path) {
            Ok(()) => {
                info!(path = %backup_path.display(), "backed up kubeconfig");
                return Ok(Some(backup_path));
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(source) => {
                return Err(PersistError::Backup {
                    path: path.to_owned(),
                    source,
                })
            }
        }
    }

    Err(PersistError::Backup {
        path: path.to_owned(),
        source: io::Error::new(io::ErrorKind::AlreadyExists, "no free backup name left"),
    })
}
