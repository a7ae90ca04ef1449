//! Resolution of an include spec to the value that replaces the directive.
//!
//! A pathname without wildcard characters names exactly one file, which must
//! exist; the directive is replaced by that file's value. A pathname with
//! wildcards is expanded with `glob` and the directive is replaced by the
//! list of the matched files' values, which may be empty.

use crate::context::LoadContext;
use crate::directive::IncludeSpec;
use crate::error::{Error, Result};
use crate::loader::Loader;
use crate::options::IncludeOptions;
use crate::reader::Reader;
use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use yaml_rust2::Yaml;

/// Glob metacharacters that select the wildcard branch.
const WILDCARD_CHARS: [char; 3] = ['*', '?', '['];

/// Whether `pathname` contains glob metacharacters.
pub fn has_wildcards(pathname: &str) -> bool {
    pathname.contains(WILDCARD_CHARS)
}

/// Resolve `spec` to the value that replaces its directive.
///
/// Relative pathnames resolve against `options.base_dir` when set, otherwise
/// against the context's base directory. Each matched file is parsed with
/// `loader` in a child context, so directives inside it resolve relative to
/// its own directory.
///
/// # Errors
///
/// - `Error::NotFound` if a literal pathname does not exist
/// - `Error::Pattern` for an invalid wildcard pattern
/// - `Error::Io`, `Error::Decode` or `Error::Parse` for a matched file
/// - `Error::Cycle` or `Error::DepthExceeded` for runaway nesting
pub fn resolve(
    spec: &IncludeSpec,
    options: &IncludeOptions,
    context: &LoadContext,
    loader: &Loader,
) -> Result<Yaml> {
    let base_dir = options.base_dir.as_deref().unwrap_or(context.base_dir());

    if !has_wildcards(&spec.pathname) {
        let path = base_dir.join(&spec.pathname);
        debug!(path = %path.display(), "including file");
        return load_included(&path, spec, options, context, loader);
    }

    let matched = expand(base_dir, &spec.pathname, spec.recursive)?;
    debug!(
        pattern = %spec.pathname,
        base_dir = %base_dir.display(),
        matches = matched.len(),
        "including files"
    );

    matched
        .iter()
        .map(|path| load_included(path, spec, options, context, loader))
        .collect::<Result<Vec<_>>>()
        .map(Yaml::Array)
}

/// Expand a wildcard pathname into the matched files.
///
/// Without `recursive`, `**` matches a single directory level like `*`.
/// Wildcards do not match names starting with a dot, and matched
/// directories are skipped.
pub fn expand(base_dir: &Path, pathname: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let pathname = collapse_double_star(pathname, recursive);

    // The base directory is literal even if its name contains metacharacters
    let pattern = if Path::new(&pathname).is_absolute() {
        pathname
    } else {
        let base = Pattern::escape(&base_dir.to_string_lossy());
        Path::new(&base).join(&pathname).to_string_lossy().into_owned()
    };

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let entries = glob::glob_with(&pattern, options).map_err(|source| Error::Pattern {
        pattern: pattern.clone(),
        source,
    })?;

    let mut matched = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| {
            let path = err.path().to_path_buf();
            Error::from_io(&path, err.into())
        })?;
        if path.is_dir() {
            trace!(path = %path.display(), "skipping directory match");
            continue;
        }
        matched.push(path);
    }
    Ok(matched)
}

/// Rewrite `**` that cannot recurse as `*`.
///
/// Only a `**` forming a whole path component recurses, and only when
/// `recursive` is set. Any other run of stars matches like `*`.
fn collapse_double_star(pathname: &str, recursive: bool) -> String {
    pathname
        .split('/')
        .map(|component| {
            if recursive && component == "**" {
                return component.to_owned();
            }
            let mut component = component.to_owned();
            while component.contains("**") {
                component = component.replace("**", "*");
            }
            component
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Read, decode and parse one included file.
fn load_included(
    path: &Path,
    spec: &IncludeSpec,
    options: &IncludeOptions,
    context: &LoadContext,
    loader: &Loader,
) -> Result<Yaml> {
    let canonical = fs::canonicalize(path).map_err(|err| Error::from_io(path, err))?;

    if context.ancestors().contains(&canonical) {
        let mut chain = context.ancestors().to_vec();
        chain.push(canonical);
        return Err(Error::Cycle { chain });
    }
    if context.depth() >= options.max_depth {
        return Err(Error::DepthExceeded {
            max_depth: options.max_depth,
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).map_err(|err| Error::from_io(path, err))?;
    let text = spec.encoding.decode(&bytes).ok_or_else(|| Error::Decode {
        path: path.to_path_buf(),
        encoding: spec.encoding,
    })?;

    let reader = Reader::for_path(path);
    trace!(path = %path.display(), ?reader, depth = context.depth() + 1, "loading included file");
    reader.read(&text, &context.enter(path, canonical), loader)
}
