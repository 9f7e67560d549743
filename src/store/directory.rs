//! Unpacked resources on disk
//!
//! The root plays the role of a classpath root: a key such as
//! `/META-INF/resources/webjars/x/1.0/x.js` is looked up at
//! `<root>/META-INF/resources/webjars/x/1.0/x.js`.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::{ResourceReader, ResourceStore, StoreError};

pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref();
        let canonical = root
            .canonicalize()
            .map_err(|source| StoreError::Inaccessible {
                path: root.to_path_buf(),
                source,
            })?;
        if !canonical.is_dir() {
            return Err(StoreError::NotADirectory(canonical));
        }
        Ok(Self { root: canonical })
    }

    /// Map a key onto a path under the root, or `None` if it could escape it
    fn locate(&self, key: &str) -> Option<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl ResourceStore for DirectoryStore {
    fn open(&self, key: &str) -> io::Result<Option<ResourceReader>> {
        let Some(path) = self.locate(key) else {
            tracing::warn!(key, "rejected resource key outside the resource root");
            return Ok(None);
        };

        // Any lookup failure (missing entry, a file used as a directory) means absent
        let Ok(canonical) = path.canonicalize() else {
            return Ok(None);
        };
        if !canonical.starts_with(&self.root) {
            tracing::warn!(
                key,
                resolved = %canonical.display(),
                "symlink escapes the resource root"
            );
            return Ok(None);
        }
        if !canonical.is_file() {
            return Ok(None);
        }

        let file = File::open(&canonical)?;
        Ok(Some(Box::new(file)))
    }

    fn describe(&self) -> String {
        format!("directory ({})", self.root.display())
    }
}
