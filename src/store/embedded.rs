//! Assets compiled into the binary with `rust-embed`

use std::io::{self, Cursor};
use std::marker::PhantomData;

use rust_embed::RustEmbed;

use super::{ResourceReader, ResourceStore};

/// Webjars shipped with the server.
///
/// The folder mirrors a classpath root, so
/// `assets/META-INF/resources/webjars/demo/1.0.0/demo.js` is served under the
/// key `/META-INF/resources/webjars/demo/1.0.0/demo.js`.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct WebjarAssets;

/// Store backed by any `RustEmbed` asset folder
pub struct EmbeddedStore<E> {
    _assets: PhantomData<fn() -> E>,
}

impl<E: RustEmbed> EmbeddedStore<E> {
    pub const fn new() -> Self {
        Self {
            _assets: PhantomData,
        }
    }
}

impl<E: RustEmbed> Default for EmbeddedStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RustEmbed> ResourceStore for EmbeddedStore<E> {
    fn open(&self, key: &str) -> io::Result<Option<ResourceReader>> {
        // Embedded paths are relative to the asset folder
        let relative = key.trim_start_matches('/');
        Ok(E::get(relative).map(|file| Box::new(Cursor::new(file.data)) as ResourceReader))
    }

    fn describe(&self) -> String {
        format!("embedded ({} files)", E::iter().count())
    }
}
