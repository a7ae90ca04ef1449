//! Turning an included file's text into a value, by file extension.

use crate::context::LoadContext;
use crate::error::{Error, Result};
use crate::loader::Loader;
use std::path::Path;
use yaml_rust2::yaml::Hash;
use yaml_rust2::Yaml;

/// How an included file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reader {
    /// YAML (and JSON), parsed by the loader so nested directives resolve.
    Yaml,
    /// TOML, converted to the equivalent YAML value.
    Toml,
    /// Plain text, included as a single string.
    Text,
}

impl Reader {
    /// Pick a reader from the file extension. Unknown extensions read as YAML.
    pub fn for_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => Reader::Toml,
            Some("txt" | "text") => Reader::Text,
            _ => Reader::Yaml,
        }
    }

    /// Produce the value for `text`, the decoded contents of `context.file()`.
    pub fn read(self, text: &str, context: &LoadContext, loader: &Loader) -> Result<Yaml> {
        match self {
            Reader::Yaml => loader.load_str(text, context),
            Reader::Toml => {
                let value: toml::Value = toml::from_str(text).map_err(|err| Error::Parse {
                    message: err.to_string(),
                    file: context.file().map(Path::to_path_buf),
                })?;
                Ok(toml_to_yaml(value))
            }
            Reader::Text => Ok(Yaml::String(text.to_owned())),
        }
    }
}

fn toml_to_yaml(value: toml::Value) -> Yaml {
    match value {
        toml::Value::String(s) => Yaml::String(s),
        toml::Value::Integer(i) => Yaml::Integer(i),
        toml::Value::Float(f) => Yaml::Real(float_repr(f)),
        toml::Value::Boolean(b) => Yaml::Boolean(b),
        toml::Value::Datetime(dt) => Yaml::String(dt.to_string()),
        toml::Value::Array(items) => Yaml::Array(items.into_iter().map(toml_to_yaml).collect()),
        toml::Value::Table(table) => {
            let mut hash = Hash::new();
            for (key, value) in table {
                hash.insert(Yaml::String(key), toml_to_yaml(value));
            }
            Yaml::Hash(hash)
        }
    }
}

/// Float in the form `Yaml::Real` expects.
fn float_repr(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_owned()
    } else if f.is_infinite() {
        let repr = if f > 0.0 { ".inf" } else { "-.inf" };
        repr.to_owned()
    } else {
        format!("{f:?}")
    }
}
