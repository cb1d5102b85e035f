use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use scribe_core::ScribeError;

/// Read/write access to named text documents.
pub trait DocumentStore: Send + Sync {
    /// Return the document's content, or `Ok(None)` if it does not exist.
    ///
    /// Any other failure is [`ScribeError::DocumentRead`].
    fn read(&self, document: &Path) -> Result<Option<String>, ScribeError>;

    /// Replace the document's content, creating it if needed.
    ///
    /// Failures are [`ScribeError::DocumentWrite`].
    fn write(&self, document: &Path, content: &str) -> Result<(), ScribeError>;
}

/// Documents stored as files below a root directory.
///
/// Relative document paths resolve against the root; absolute paths are used
/// as given.
///
/// # Examples
///
/// ```
/// use scribe_sync::store::{DocumentStore, FsDocumentStore};
/// use std::path::Path;
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = FsDocumentStore::new(dir.path());
/// assert_eq!(store.read(Path::new("AGENTS.md")).unwrap(), None);
///
/// store.write(Path::new("AGENTS.md"), "# Agents\n").unwrap();
/// assert_eq!(
///     store.read(Path::new("AGENTS.md")).unwrap().as_deref(),
///     Some("# Agents\n"),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, document: &Path) -> PathBuf {
        self.root.join(document)
    }
}

impl DocumentStore for FsDocumentStore {
    fn read(&self, document: &Path) -> Result<Option<String>, ScribeError> {
        let path = self.resolve(document);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ScribeError::DocumentRead {
                path,
                message: e.to_string(),
            }),
        }
    }

    fn write(&self, document: &Path, content: &str) -> Result<(), ScribeError> {
        let path = self.resolve(document);
        let write_err = |e: std::io::Error| ScribeError::DocumentWrite {
            path: path.clone(),
            message: e.to_string(),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(&path, content).map_err(write_err)
    }
}
