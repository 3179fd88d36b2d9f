//! Delivery of an assembled document to the host.

use crate::error::{PanelError, PanelResult};
use crate::host::{DocumentSource, HostWidget};
use std::path::{Path, PathBuf};

/// File written inside the working directory in file-backed mode.
pub const DOCUMENT_FILE_NAME: &str = "markdown-panel.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderMode {
    /// Document text assigned directly. Relative image paths cannot resolve.
    Inline,
    /// Document written to disk and loaded by path so relative images resolve.
    FileBacked { working_directory: PathBuf },
}

impl RenderMode {
    pub fn select(enable_images: bool, working_directory: &Path) -> Self {
        if enable_images {
            RenderMode::FileBacked {
                working_directory: working_directory.to_path_buf(),
            }
        } else {
            RenderMode::Inline
        }
    }
}

pub fn document_path(working_directory: &Path) -> PathBuf {
    working_directory.join(DOCUMENT_FILE_NAME)
}

/// Hand `document` to the host using `mode`.
///
/// In file-backed mode the source is cleared and laid out before the path is
/// set again; reassigning an unchanged path would not reload the file.
pub fn deliver(host: &dyn HostWidget, document: &str, mode: &RenderMode) -> PanelResult<()> {
    match mode {
        RenderMode::Inline => {
            host.set_document_source(DocumentSource::Markup(document.to_string()));
        }
        RenderMode::FileBacked { working_directory } => {
            let path = document_path(working_directory);
            std::fs::write(&path, document).map_err(|source| PanelError::DocumentWrite {
                path: path.clone(),
                source,
            })?;
            host.set_document_source(DocumentSource::Empty);
            host.force_layout();
            host.set_document_source(DocumentSource::File(path));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
