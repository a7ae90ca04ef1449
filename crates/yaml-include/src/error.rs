//! Error types for loading documents and resolving include directives.

use crate::encoding::Encoding;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use yaml_rust2::scanner::Marker;

/// Result type alias for yaml-include operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Where a directive appeared in its source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// File containing the directive, `None` for documents loaded from a string
    pub file: Option<PathBuf>,

    /// Line number (1-based)
    pub line: usize,

    /// Column number (1-based, in characters)
    pub col: usize,
}

impl Location {
    /// Create a Location from a yaml-rust2 marker.
    pub fn from_marker(marker: &Marker, file: Option<&Path>) -> Self {
        Self {
            file: file.map(Path::to_path_buf),
            line: marker.line(),
            col: marker.col() + 1, // yaml-rust2 columns are 0-based
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file.display(), self.line, self.col),
            None => write!(f, "<string>:{}:{}", self.line, self.col),
        }
    }
}

/// Errors that can occur while loading a document or resolving a directive.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The directive argument has the wrong shape or an unknown option.
    #[error("invalid include directive: {message}")]
    Directive { message: String },

    /// A literal (non-wildcard) pathname does not name an existing file.
    #[error("included file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Reading an included file failed.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file's bytes are not valid in the requested encoding.
    #[error("{} is not valid {encoding} text", path.display())]
    Decode { path: PathBuf, encoding: Encoding },

    /// The wildcard pathname is not a valid glob pattern.
    #[error("invalid include pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Syntax error in a YAML or TOML document.
    #[error("parse error in {}: {message}", describe_file(file.as_deref()))]
    Parse {
        message: String,
        file: Option<PathBuf>,
    },

    /// A file includes itself, directly or through other files.
    #[error("include cycle: {}", describe_chain(chain))]
    Cycle { chain: Vec<PathBuf> },

    /// Includes are nested deeper than the configured limit.
    #[error("include nesting too deep (max depth: {max_depth}) at {}", path.display())]
    DepthExceeded { max_depth: usize, path: PathBuf },

    /// A directive failed; `source` carries the underlying error.
    #[error("include directive at {location} failed")]
    AtDirective {
        location: Location,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn directive(message: impl Into<String>) -> Self {
        Error::Directive {
            message: message.into(),
        }
    }

    /// Map an I/O failure on `path`, keeping missing files distinct.
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Error::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// The innermost error, looking through directive locations.
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::AtDirective { source, .. } = current {
            current = source;
        }
        current
    }

    /// Directive locations from the outermost document inwards.
    pub fn include_trace(&self) -> Vec<&Location> {
        let mut trace = Vec::new();
        let mut current = self;
        while let Error::AtDirective { location, source } = current {
            trace.push(location);
            current = source;
        }
        trace
    }
}

fn describe_file(file: Option<&Path>) -> String {
    file.map_or_else(|| "<string>".to_owned(), |f| f.display().to_string())
}

fn describe_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        Error::Parse {
            message: err.to_string(),
            file: None,
        }
    }
}
