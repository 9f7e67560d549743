//! Packaged resource stores
//!
//! A store is the read-only set of bundled assets, addressed by resource key
//! (e.g. `/META-INF/resources/webjars/jquery/3.6.0/jquery.min.js`).
//! Stores are immutable once built and shared across request threads.

mod directory;
mod embedded;
mod memory;

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{ResourceSource, ResourcesConfig};

pub use directory::DirectoryStore;
pub use embedded::{EmbeddedStore, WebjarAssets};
pub use memory::MemoryStore;

/// Byte stream handed out by a store; dropping it releases the resource
pub type ResourceReader = Box<dyn Read + Send>;

/// Read-only lookup of packaged resources by key
pub trait ResourceStore: Send + Sync {
    /// Open the resource identified by `key`.
    ///
    /// Returns `Ok(None)` when no such resource exists. Errors are reserved
    /// for resources that exist but cannot be opened.
    fn open(&self, key: &str) -> io::Result<Option<ResourceReader>>;

    /// Short human-readable description used in startup logs
    fn describe(&self) -> String;
}

/// Errors raised while building a store from configuration
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resources.directory must be set when resources.source = \"directory\"")]
    MissingDirectory,

    #[error("resource directory '{path}' is not accessible: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("resource directory '{0}' is not a directory")]
    NotADirectory(PathBuf),
}

/// Build the store selected by configuration
pub fn from_config(config: &ResourcesConfig) -> Result<Arc<dyn ResourceStore>, StoreError> {
    match config.source {
        ResourceSource::Embedded => Ok(Arc::new(EmbeddedStore::<WebjarAssets>::new())),
        ResourceSource::Directory => {
            let dir = config
                .directory
                .as_deref()
                .ok_or(StoreError::MissingDirectory)?;
            Ok(Arc::new(DirectoryStore::new(dir)?))
        }
    }
}
