use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

pub const LOCK_FILE: &str = ".writer.lock";

/// Advisory lock on an output root, held for the duration of a run.
///
/// Contention is reported but never blocks: a second run still proceeds,
/// it just cannot trust that the newest output directory is its own.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    file: Option<File>,
}

impl RunLock {
    pub fn acquire(output_root: &Path) -> Self {
        let path = output_root.join(LOCK_FILE);
        let file = match OpenOptions::new().create(true).truncate(false).write(true).open(&path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not open run lock");
                return Self { path, file: None };
            }
        };

        match file.try_lock_exclusive() {
            Ok(()) => Self { path, file: Some(file) },
            Err(_) => {
                tracing::warn!(
                    path = %path.display(),
                    "another generation run is using this output folder; output discovery may pick up its directory"
                );
                Self { path, file: None }
            }
        }
    }

    /// Whether this run holds the lock exclusively.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take()
            && let Err(e) = FileExt::unlock(&file)
        {
            tracing::debug!(path = %self.path.display(), error = %e, "failed to release run lock");
        }
    }
}
