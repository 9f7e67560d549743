//! In-memory store for embedders and tests

use std::collections::HashMap;
use std::io::{self, Cursor};

use hyper::body::Bytes;

use super::{ResourceReader, ResourceStore};

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    files: HashMap<String, Bytes>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource under its full key
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.files.insert(key.into(), data.into());
        self
    }
}

impl ResourceStore for MemoryStore {
    fn open(&self, key: &str) -> io::Result<Option<ResourceReader>> {
        // Bytes clones share the buffer
        Ok(self
            .files
            .get(key)
            .map(|data| Box::new(Cursor::new(data.clone())) as ResourceReader))
    }

    fn describe(&self) -> String {
        format!("memory ({} files)", self.files.len())
    }
}
