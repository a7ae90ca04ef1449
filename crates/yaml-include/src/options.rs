//! Configuration for the include constructor.

use crate::encoding::Encoding;
use std::path::PathBuf;

/// Tag bound to the include directive unless overridden.
pub const DEFAULT_TAG: &str = "!include";

/// Default limit on nested includes.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options for [`IncludeConstructor`](crate::IncludeConstructor).
///
/// ```rust
/// use yaml_include::{IncludeOptions, Encoding};
///
/// let options = IncludeOptions {
///     tag: "!import".to_owned(),
///     encoding: Encoding::Latin1,
///     ..Default::default()
/// };
/// assert_eq!(options.max_depth, 64);
/// ```
#[derive(Debug, Clone)]
pub struct IncludeOptions {
    /// Tag the directive is registered under (default: `!include`).
    pub tag: String,

    /// Encoding used when a directive does not name one (default: UTF-8).
    pub encoding: Encoding,

    /// Fixed directory for relative pathnames.
    ///
    /// When `None`, relative pathnames resolve against the directory of the
    /// file containing the directive (or the working directory for documents
    /// loaded from a string).
    pub base_dir: Option<PathBuf>,

    /// Maximum include nesting (default: 64).
    ///
    /// Resolution fails with `Error::DepthExceeded` beyond this depth.
    pub max_depth: usize,
}

impl Default for IncludeOptions {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_owned(),
            encoding: Encoding::default(),
            base_dir: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
