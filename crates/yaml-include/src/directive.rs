//! Interpretation of the include directive's argument.
//!
//! The directive accepts three shapes:
//!
//! ```yaml
//! a: !include path/to/file.yaml
//! b: !include [path/with/**/*.yaml, true]
//! c: !include {pathname: path/with/**/*.yaml, recursive: true, encoding: utf-8}
//! ```
//!
//! Each is decoded once into a [`DirectiveArgument`] and then normalized to an
//! [`IncludeSpec`]; nothing downstream inspects the raw node.

use crate::encoding::Encoding;
use crate::error::{Error, Result};
use yaml_rust2::Yaml;

/// The raw directive argument, decoded by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveArgument {
    /// `!include path`
    Scalar(String),

    /// `!include [path]` or `!include [path, recursive]`
    Sequence {
        pathname: String,
        recursive: Option<bool>,
    },

    /// `!include {pathname: path, recursive: bool, encoding: name}`
    Mapping {
        pathname: String,
        recursive: Option<bool>,
        encoding: Option<Encoding>,
    },
}

/// What to include: the canonical form of every directive shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeSpec {
    /// Pathname as written, possibly containing wildcards.
    pub pathname: String,

    /// Whether `**` descends into subdirectories at any depth.
    pub recursive: bool,

    /// Encoding of the included files.
    pub encoding: Encoding,
}

impl DirectiveArgument {
    /// Decode a directive node.
    ///
    /// # Errors
    ///
    /// Returns `Error::Directive` for any shape other than the three accepted
    /// ones: wrong arity, wrong element types, unknown or missing keys.
    pub fn from_yaml(node: &Yaml) -> Result<Self> {
        match node {
            Yaml::Array(items) => {
                let (pathname, recursive) = match items.as_slice() {
                    [pathname] => (pathname, None),
                    [pathname, recursive] => (pathname, Some(expect_bool(recursive, "recursive")?)),
                    _ => {
                        return Err(Error::directive(format!(
                            "sequence form takes [pathname] or [pathname, recursive], got {} items",
                            items.len()
                        )));
                    }
                };
                Ok(DirectiveArgument::Sequence {
                    pathname: expect_pathname(pathname)?,
                    recursive,
                })
            }

            Yaml::Hash(hash) => {
                let mut pathname = None;
                let mut recursive = None;
                let mut encoding = None;

                for (key, value) in hash {
                    let Yaml::String(key) = key else {
                        return Err(Error::directive(format!(
                            "mapping keys must be strings, got {}",
                            kind(key)
                        )));
                    };
                    match key.as_str() {
                        "pathname" => pathname = Some(expect_pathname(value)?),
                        "recursive" => recursive = Some(expect_bool(value, "recursive")?),
                        "encoding" => {
                            let name = expect_string(value, "encoding")?;
                            encoding = Some(name.parse()?);
                        }
                        other => {
                            return Err(Error::directive(format!(
                                "unknown option '{other}' (expected pathname, recursive, encoding)"
                            )));
                        }
                    }
                }

                let pathname = pathname
                    .ok_or_else(|| Error::directive("mapping form requires a 'pathname' key"))?;
                Ok(DirectiveArgument::Mapping {
                    pathname,
                    recursive,
                    encoding,
                })
            }

            scalar => Ok(DirectiveArgument::Scalar(expect_pathname(scalar)?)),
        }
    }

    /// Fill in defaults for the options the directive left out.
    pub fn into_spec(self, default_encoding: Encoding) -> IncludeSpec {
        let (pathname, recursive, encoding) = match self {
            DirectiveArgument::Scalar(pathname) => (pathname, None, None),
            DirectiveArgument::Sequence {
                pathname,
                recursive,
            } => (pathname, recursive, None),
            DirectiveArgument::Mapping {
                pathname,
                recursive,
                encoding,
            } => (pathname, recursive, encoding),
        };
        IncludeSpec {
            pathname,
            recursive: recursive.unwrap_or(false),
            encoding: encoding.unwrap_or(default_encoding),
        }
    }
}

/// Normalize a directive node into an [`IncludeSpec`].
pub fn interpret(node: &Yaml, default_encoding: Encoding) -> Result<IncludeSpec> {
    DirectiveArgument::from_yaml(node).map(|arg| arg.into_spec(default_encoding))
}

fn expect_pathname(node: &Yaml) -> Result<String> {
    let pathname = expect_string(node, "pathname")?;
    if pathname.is_empty() {
        return Err(Error::directive("pathname is empty"));
    }
    Ok(pathname.to_owned())
}

fn expect_string<'a>(node: &'a Yaml, what: &str) -> Result<&'a str> {
    node.as_str()
        .ok_or_else(|| Error::directive(format!("{what} must be a string, got {}", kind(node))))
}

fn expect_bool(node: &Yaml, what: &str) -> Result<bool> {
    node.as_bool()
        .ok_or_else(|| Error::directive(format!("{what} must be a boolean, got {}", kind(node))))
}

fn kind(node: &Yaml) -> &'static str {
    match node {
        Yaml::Real(_) => "float",
        Yaml::Integer(_) => "integer",
        Yaml::String(_) => "string",
        Yaml::Boolean(_) => "boolean",
        Yaml::Array(_) => "sequence",
        Yaml::Hash(_) => "mapping",
        Yaml::Alias(_) => "alias",
        Yaml::Null => "null",
        Yaml::BadValue => "invalid value",
    }
}
