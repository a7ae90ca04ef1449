//! # yaml-include
//!
//! A YAML loader with an `!include` directive that splices other files into
//! the document being parsed.
//!
//! The directive takes a pathname, optionally with wildcards, and is replaced
//! by the fully parsed contents of the named file(s). Included files may
//! contain directives of their own; their relative pathnames resolve against
//! the including file's directory.
//!
//! ```yaml
//! settings: !include conf/settings.yaml            # one file, spliced as-is
//! plugins: !include plugins/*.yaml                 # a list, one entry per match
//! all: !include [plugins/**/*.yaml, true]          # recursive wildcard
//! latin: !include {pathname: old.yaml, encoding: latin-1}
//! ```
//!
//! ## Design
//!
//! - [`Loader`] builds `yaml_rust2::Yaml` trees from parser events and hands
//!   tagged nodes to the [`Constructor`] registered for the tag.
//! - [`IncludeConstructor`] is that constructor for `!include`: it decodes the
//!   directive argument ([`directive`]) and resolves it ([`resolver`]).
//! - All per-parse state travels in a [`LoadContext`]; a `Loader` is never
//!   mutated while parsing and can be shared across threads.
//!
//! ## Example
//!
//! ```rust,no_run
//! use yaml_include::LoadContext;
//!
//! let loader = yaml_include::loader();
//! let doc = loader.load_file("site.yaml").unwrap();
//! println!("{:?}", doc["settings"]);
//!
//! // Relative to the working directory
//! let doc = loader
//!     .load_str("!include conf/settings.yaml", &LoadContext::working_dir())
//!     .unwrap();
//! ```

mod context;
mod convert;
pub mod directive;
mod encoding;
mod error;
mod include;
mod loader;
mod options;
mod reader;
pub mod resolver;

pub use context::LoadContext;
pub use convert::yaml_to_json;
pub use directive::{DirectiveArgument, IncludeSpec, interpret};
pub use encoding::Encoding;
pub use error::{Error, Location, Result};
pub use include::{IncludeConstructor, loader, loader_with_options};
pub use loader::{Constructor, Loader};
pub use options::{DEFAULT_MAX_DEPTH, DEFAULT_TAG, IncludeOptions};
pub use reader::Reader;
pub use resolver::resolve;
