//! Per-parse state passed explicitly through nested loads.

use std::path::{Path, PathBuf};

/// Where a document is being parsed from.
///
/// A context is immutable. Loading an included file derives a child context
/// whose base directory is that file's directory, so relative pathnames in
/// the included file resolve against it rather than against the top-level
/// document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadContext {
    base_dir: PathBuf,
    file: Option<PathBuf>,
    /// Canonical paths of the files being loaded, outermost first.
    ancestors: Vec<PathBuf>,
    /// Included files between the top-level document and this one.
    depth: usize,
}

impl LoadContext {
    /// Context for a document that is not backed by a file.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            file: None,
            ancestors: Vec::new(),
            depth: 0,
        }
    }

    /// Context for a document read from stdin or a string: relative
    /// pathnames resolve against the process working directory.
    pub fn working_dir() -> Self {
        Self::default()
    }

    /// Context for a top-level document read from `path`.
    ///
    /// `canonical` is recorded so that the file cannot include itself.
    pub fn for_file(path: &Path, canonical: PathBuf) -> Self {
        Self {
            base_dir: parent_dir(path),
            file: Some(path.to_path_buf()),
            ancestors: vec![canonical],
            depth: 0,
        }
    }

    /// Child context for parsing the file at `path`.
    pub(crate) fn enter(&self, path: &Path, canonical: PathBuf) -> Self {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(canonical);
        Self {
            base_dir: parent_dir(path),
            file: Some(path.to_path_buf()),
            ancestors,
            depth: self.depth + 1,
        }
    }

    /// Directory relative pathnames resolve against. Empty means the
    /// working directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File currently being parsed, if any.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Canonical paths of the files being loaded, outermost first.
    pub fn ancestors(&self) -> &[PathBuf] {
        &self.ancestors
    }

    /// Include nesting of this document; the top-level document is 0
    /// whether or not it was read from a file.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
