//! Filesystem layout for generated artifacts.
//!
//! One application namespace owns one of two layouts. In flat mode every
//! artifact of a kind shares a single aggregate file at the top of the app
//! directory; in sharded mode each model gets its own file under a dedicated
//! subdirectory, with an `__init__.py` aggregator re-exporting the symbols.
//! The mode is probed once per namespace per run and never re-probed while
//! that namespace is being processed.

use crate::error::{Error, Result};
use log::debug;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// How a namespace's generated artifacts are arranged on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// All artifacts of a kind appended to one aggregate file
    Flat,
    /// One file per model under a dedicated subdirectory
    Sharded,
}

/// Path derivations for one application namespace under the project root.
pub struct AppLayout {
    app_dir: PathBuf,
}

impl AppLayout {
    /// Creates the layout for `app` under `project_root`.
    pub fn new(project_root: &Path, app: &str) -> Self {
        Self {
            app_dir: project_root.join(app),
        }
    }

    /// The application directory itself.
    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    /// Flat-mode aggregate serializer file: `<app>/auto_serializers.py`.
    pub fn flat_serializers(&self) -> PathBuf {
        self.app_dir.join("auto_serializers.py")
    }

    /// Flat-mode aggregate viewset file: `<app>/auto_views.py`.
    pub fn flat_views(&self) -> PathBuf {
        self.app_dir.join("auto_views.py")
    }

    /// Flat-mode aggregate URL file: `<app>/auto_urls.py`.
    pub fn flat_urls(&self) -> PathBuf {
        self.app_dir.join("auto_urls.py")
    }

    /// Sharded-mode serializer directory: `<app>/auto_serializers/`.
    pub fn serializer_dir(&self) -> PathBuf {
        self.app_dir.join("auto_serializers")
    }

    /// Sharded-mode viewset directory: `<app>/auto_views/`.
    pub fn views_dir(&self) -> PathBuf {
        self.app_dir.join("auto_views")
    }

    /// Sharded-mode URL directory: `<app>/auto_urls/`.
    pub fn urls_dir(&self) -> PathBuf {
        self.app_dir.join("auto_urls")
    }

    /// Per-model serializer file, e.g. `<app>/auto_serializers/order_auto_serializer.py`.
    pub fn sharded_serializer(&self, stem: &str) -> PathBuf {
        self.serializer_dir()
            .join(format!("{}_auto_serializer.py", stem))
    }

    /// Per-model viewset file, e.g. `<app>/auto_views/order_auto_view.py`.
    pub fn sharded_view(&self, stem: &str) -> PathBuf {
        self.views_dir().join(format!("{}_auto_view.py", stem))
    }

    /// Sharded-mode URL file: `<app>/auto_urls/auto_urls.py`.
    pub fn sharded_urls(&self) -> PathBuf {
        self.urls_dir().join("auto_urls.py")
    }

    /// Selects the serializer layout for this namespace.
    ///
    /// Flat if the aggregate serializer file already exists (left by a prior
    /// run or seeded by hand), sharded otherwise.
    pub fn serializer_mode(&self) -> Mode {
        let mode = if self.flat_serializers().is_file() {
            Mode::Flat
        } else {
            Mode::Sharded
        };
        debug!(
            "Serializer layout for {}: {:?}",
            self.app_dir.display(),
            mode
        );
        mode
    }

    /// Selects the viewset layout for this namespace.
    ///
    /// Viewsets follow the serializers: a flat aggregate serializer file
    /// means viewsets are appended to its sibling `auto_views.py`.
    pub fn view_mode(&self) -> Mode {
        let mode = if self.flat_serializers().is_file() {
            Mode::Flat
        } else {
            Mode::Sharded
        };
        debug!("Viewset layout for {}: {:?}", self.app_dir.display(), mode);
        mode
    }
}

/// Per-namespace generation state for one run.
///
/// Carries the mode resolved at the start of the namespace's processing and
/// the one-shot preamble flag, replacing cross-call mutable state. A context
/// never outlives its namespace.
pub struct AppContext {
    mode: Mode,
    preamble_pending: bool,
}

impl AppContext {
    /// Creates a context with the resolved mode; the preamble is still owed.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            preamble_pending: true,
        }
    }

    /// The layout mode locked in for this namespace.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns `true` on the first call only. The caller attaches the shared
    /// preamble to exactly that append.
    pub fn take_preamble(&mut self) -> bool {
        std::mem::replace(&mut self.preamble_pending, false)
    }
}

/// Appends a block to `path`, creating the file and parent directories as
/// needed.
///
/// When `preamble` is given it is written ahead of the block, but only if the
/// file is still empty. An aggregate file that already carries content from a
/// previous run keeps its existing preamble and just accumulates blocks.
///
/// # Errors
///
/// Returns [`Error::Io`] with the offending path on any filesystem failure.
pub fn append_block(path: &Path, preamble: Option<&str>, block: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;

    if let Some(preamble) = preamble {
        let len = file.metadata().map_err(|e| Error::io(path, e))?.len();
        if len == 0 {
            debug!("Writing preamble to {}", path.display());
            file.write_all(preamble.as_bytes())
                .map_err(|e| Error::io(path, e))?;
        }
    }

    file.write_all(block.as_bytes())
        .map_err(|e| Error::io(path, e))?;

    Ok(())
}

/// Writes `content` to `path`, replacing any previous content and creating
/// parent directories as needed.
///
/// # Errors
///
/// Returns [`Error::Io`] with the offending path on any filesystem failure.
pub fn overwrite(path: &Path, content: &str) -> Result<()> {
    debug!("Writing {} bytes to {}", content.len(), path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    fs::write(path, content).map_err(|e| Error::io(path, e))?;

    Ok(())
}
