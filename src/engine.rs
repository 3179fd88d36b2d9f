//! Converter engine source.
//!
//! The engine is an opaque script (showdown) inlined verbatim into every
//! document. It is read from the config directory; when the file is missing it
//! is downloaded once and written there so later loads stay local.

use crate::config;
use crate::diagnostics::Diagnostics;
use crate::fetch::ResourceFetcher;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DIAG_SOURCE: &str = "engine";

/// Local file name of the engine inside the config directory.
pub const ENGINE_FILE_NAME: &str = "showdown.min.js";

/// Where the engine is downloaded from when the local copy is missing.
pub const ENGINE_URL: &str = "https://cdnjs.cloudflare.com/ajax/libs/showdown/2.1.0/showdown.min.js";

/// Default local path of the engine source.
pub fn engine_path() -> PathBuf {
    config::config_dir().join(ENGINE_FILE_NAME)
}

/// Loaded engine source, shared cheaply between documents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConverterEngine {
    source: Arc<str>,
}

impl ConverterEngine {
    pub fn from_source(source: impl Into<Arc<str>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Read the engine from `path`, repairing a missing file from [`ENGINE_URL`].
    pub fn load(path: &Path, fetcher: &dyn ResourceFetcher, diagnostics: &mut Diagnostics) -> Self {
        Self::load_from(path, ENGINE_URL, fetcher, diagnostics)
    }

    /// Like [`ConverterEngine::load`] with an explicit repair URL.
    ///
    /// Never fails: if both the local read and the repair fetch fail the
    /// source is empty and the document's own error region reports the
    /// missing converter at display time.
    pub fn load_from(
        path: &Path,
        repair_url: &str,
        fetcher: &dyn ResourceFetcher,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        match std::fs::read_to_string(path) {
            Ok(source) => return Self::from_source(source),
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                diagnostics.warn(
                    DIAG_SOURCE,
                    format!("Could not read converter engine {}: {e}", path.display()),
                );
                return Self::default();
            }
            Err(_) => {}
        }

        let source = match fetcher.fetch_text(repair_url) {
            Ok(source) => source,
            Err(e) => {
                diagnostics.warn(
                    DIAG_SOURCE,
                    format!("Converter engine missing and download from {repair_url} failed: {e}"),
                );
                return Self::default();
            }
        };

        if let Err(e) = store(path, &source) {
            diagnostics.warn(
                DIAG_SOURCE,
                format!("Could not save converter engine to {}: {e}", path.display()),
            );
        } else {
            diagnostics.info(
                DIAG_SOURCE,
                format!("Downloaded converter engine to {}", path.display()),
            );
        }

        Self::from_source(source)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

fn store(path: &Path, source: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, source)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
