//! YAML loader that dispatches tagged nodes to registered constructors.
//!
//! The loader builds `yaml_rust2::Yaml` trees from parser events, like
//! `YamlLoader` does, but when a node carries a tag that has a
//! [`Constructor`] registered, the finished node is handed to that
//! constructor and its result takes the node's place. Constructors receive
//! the loader itself and the current [`LoadContext`], so they can parse
//! further documents recursively.

use crate::context::LoadContext;
use crate::error::{Error, Location, Result};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};
use yaml_rust2::yaml::Hash;
use yaml_rust2::Yaml;

/// Handle of the YAML core schema, as the parser reports `!!` tags.
const CORE_SCHEMA_HANDLE: &str = "tag:yaml.org,2002:";

/// Builds a value for a tagged node.
pub trait Constructor: Send + Sync {
    /// Replace `node` (already built, without its tag) with a new value.
    ///
    /// `context` describes the document containing the node.
    fn construct(&self, loader: &Loader, context: &LoadContext, node: Yaml) -> Result<Yaml>;
}

impl<F> Constructor for F
where
    F: Fn(&Loader, &LoadContext, Yaml) -> Result<Yaml> + Send + Sync,
{
    fn construct(&self, loader: &Loader, context: &LoadContext, node: Yaml) -> Result<Yaml> {
        self(loader, context, node)
    }
}

/// YAML loader with a registry of tag constructors.
///
/// A loader is configured once, before parsing, and is not mutated while
/// documents are being loaded. Loaders are independent: registering a tag on
/// one does not affect another.
///
/// ```rust
/// use yaml_include::{LoadContext, Loader, Result};
/// use yaml_rust2::Yaml;
///
/// let mut loader = Loader::new();
/// loader.register("!upper", |_: &Loader, _: &LoadContext, node: Yaml| -> Result<Yaml> {
///     Ok(Yaml::String(node.as_str().unwrap_or_default().to_uppercase()))
/// });
///
/// let doc = loader.load_str("greeting: !upper hello", &LoadContext::working_dir()).unwrap();
/// assert_eq!(doc["greeting"].as_str(), Some("HELLO"));
/// ```
#[derive(Clone, Default)]
pub struct Loader {
    constructors: HashMap<String, Arc<dyn Constructor>>,
}

impl Loader {
    /// A loader with no constructors registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `tag` to `constructor`, replacing any previous binding.
    ///
    /// The leading `!` is optional: `"include"` and `"!include"` name the
    /// same tag.
    pub fn register(&mut self, tag: &str, constructor: impl Constructor + 'static) -> &mut Self {
        self.constructors
            .insert(normalize_tag(tag), Arc::new(constructor));
        self
    }

    /// Whether a constructor is bound to `tag`.
    pub fn is_registered(&self, tag: &str) -> bool {
        self.constructors.contains_key(&normalize_tag(tag))
    }

    /// Parse the single document in `text`.
    ///
    /// An empty stream yields `Yaml::Null`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` for invalid YAML or a stream holding more than
    /// one document, or `Error::AtDirective` wrapping the first constructor
    /// failure.
    pub fn load_str(&self, text: &str, context: &LoadContext) -> Result<Yaml> {
        let mut parser = Parser::new_from_str(text);
        let mut builder = DocumentBuilder::new(self, context);

        // Scan the whole stream so a second document is reported, not dropped
        let scanned = parser.load(&mut builder, true);

        // A constructor failure stops the build before any later syntax error
        if let Some(err) = builder.error.take() {
            return Err(err);
        }
        scanned.map_err(|err| Error::Parse {
            message: err.to_string(),
            file: context.file().map(Path::to_path_buf),
        })?;

        Ok(builder.root.unwrap_or(Yaml::Null))
    }

    /// Read and parse the UTF-8 file at `path`.
    ///
    /// Relative pathnames inside the file resolve against its directory.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Yaml> {
        let path = path.as_ref();
        let canonical = fs::canonicalize(path).map_err(|err| Error::from_io(path, err))?;
        let text = fs::read_to_string(path).map_err(|err| Error::from_io(path, err))?;
        self.load_str(&text, &LoadContext::for_file(path, canonical))
    }

    fn constructor_for(&self, tag: &Tag) -> Option<&Arc<dyn Constructor>> {
        if self.constructors.is_empty() {
            return None;
        }
        self.constructors
            .get(&format!("{}{}", tag.handle, tag.suffix))
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.constructors.keys().collect();
        tags.sort();
        f.debug_struct("Loader").field("tags", &tags).finish()
    }
}

fn normalize_tag(tag: &str) -> String {
    if tag.starts_with('!') {
        tag.to_owned()
    } else {
        format!("!{tag}")
    }
}

/// Builder that implements MarkedEventReceiver to construct one document.
struct DocumentBuilder<'a> {
    loader: &'a Loader,
    context: &'a LoadContext,

    /// Stack of collections being constructed
    stack: Vec<BuildNode>,

    /// Completed anchored nodes, by anchor id
    anchors: HashMap<usize, Yaml>,

    /// The completed root node
    root: Option<Yaml>,

    /// Documents started so far
    documents: usize,

    /// First failure; later events are ignored once set
    error: Option<Error>,
}

/// A collection being constructed during parsing.
enum BuildNode {
    Sequence {
        start: Marker,
        anchor_id: usize,
        tag: Option<Tag>,
        items: Vec<Yaml>,
    },

    Mapping {
        start: Marker,
        anchor_id: usize,
        tag: Option<Tag>,
        entries: Hash,
        pending_key: Option<Yaml>,
    },
}

impl<'a> DocumentBuilder<'a> {
    fn new(loader: &'a Loader, context: &'a LoadContext) -> Self {
        Self {
            loader,
            context,
            stack: Vec::new(),
            anchors: HashMap::new(),
            root: None,
            documents: 0,
            error: None,
        }
    }

    /// Run the node's constructor, if any, record its anchor and attach it
    /// to the parent.
    fn complete(&mut self, node: Yaml, anchor_id: usize, tag: Option<Tag>, marker: Marker) {
        let loader = self.loader;
        let node = match tag.as_ref().and_then(|t| loader.constructor_for(t)) {
            Some(constructor) => {
                tracing::trace!(
                    tag = ?tag,
                    line = marker.line(),
                    "constructing tagged node"
                );
                match constructor.construct(loader, self.context, node) {
                    Ok(value) => value,
                    Err(err) => {
                        self.error = Some(Error::AtDirective {
                            location: Location::from_marker(&marker, self.context.file()),
                            source: Box::new(err),
                        });
                        return;
                    }
                }
            }
            None => node,
        };

        if anchor_id > 0 {
            self.anchors.insert(anchor_id, node.clone());
        }
        self.push_complete(node);
    }

    fn push_complete(&mut self, node: Yaml) {
        match self.stack.last_mut() {
            None => {
                // This is the root
                self.root = Some(node);
            }
            Some(BuildNode::Sequence { items, .. }) => items.push(node),
            Some(BuildNode::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => {
                    entries.insert(key, node);
                }
                None => *pending_key = Some(node),
            },
        }
    }

    fn unbalanced(&mut self, what: &str) {
        self.error = Some(Error::Parse {
            message: format!("unbalanced {what}"),
            file: self.context.file().map(Path::to_path_buf),
        });
    }
}

impl MarkedEventReceiver for DocumentBuilder<'_> {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }

        match ev {
            Event::Nothing | Event::StreamStart | Event::StreamEnd | Event::DocumentEnd => {}

            Event::DocumentStart => {
                self.documents += 1;
                if self.documents > 1 {
                    self.error = Some(Error::Parse {
                        message: format!(
                            "expected a single document in the stream, found another at line {}",
                            marker.line()
                        ),
                        file: self.context.file().map(Path::to_path_buf),
                    });
                }
            }

            Event::Scalar(value, style, anchor_id, tag) => {
                let node = scalar_value(value, style, tag.as_ref());
                self.complete(node, anchor_id, tag, marker);
            }

            Event::SequenceStart(anchor_id, tag) => {
                self.stack.push(BuildNode::Sequence {
                    start: marker,
                    anchor_id,
                    tag,
                    items: Vec::new(),
                });
            }

            Event::SequenceEnd => {
                let Some(BuildNode::Sequence {
                    start,
                    anchor_id,
                    tag,
                    items,
                }) = self.stack.pop()
                else {
                    self.unbalanced("sequence end");
                    return;
                };
                self.complete(Yaml::Array(items), anchor_id, tag, start);
            }

            Event::MappingStart(anchor_id, tag) => {
                self.stack.push(BuildNode::Mapping {
                    start: marker,
                    anchor_id,
                    tag,
                    entries: Hash::new(),
                    pending_key: None,
                });
            }

            Event::MappingEnd => {
                let Some(BuildNode::Mapping {
                    start,
                    anchor_id,
                    tag,
                    entries,
                    ..
                }) = self.stack.pop()
                else {
                    self.unbalanced("mapping end");
                    return;
                };
                self.complete(Yaml::Hash(entries), anchor_id, tag, start);
            }

            Event::Alias(anchor_id) => {
                let node = self
                    .anchors
                    .get(&anchor_id)
                    .cloned()
                    .unwrap_or(Yaml::BadValue);
                self.push_complete(node);
            }
        }
    }
}

/// Resolve a scalar the way yaml-rust2's own loader does.
///
/// Quoted scalars and scalars with a non-core tag stay strings; plain
/// scalars are typed (integers, floats, booleans, null); `!!` core tags
/// force their type.
fn scalar_value(value: String, style: TScalarStyle, tag: Option<&Tag>) -> Yaml {
    if style != TScalarStyle::Plain {
        return Yaml::String(value);
    }

    let Some(tag) = tag else {
        return Yaml::from_str(&value);
    };

    if tag.handle != CORE_SCHEMA_HANDLE && tag.handle != "!!" {
        return Yaml::String(value);
    }

    match tag.suffix.as_str() {
        "bool" => match value.as_str() {
            "true" | "True" | "TRUE" => Yaml::Boolean(true),
            "false" | "False" | "FALSE" => Yaml::Boolean(false),
            _ => Yaml::BadValue,
        },
        "int" => value.parse::<i64>().map_or(Yaml::BadValue, Yaml::Integer),
        "float" => match Yaml::from_str(&value) {
            real @ Yaml::Real(_) => real,
            Yaml::Integer(_) => Yaml::Real(value),
            _ => Yaml::BadValue,
        },
        "null" => match value.as_str() {
            "~" | "null" | "Null" | "NULL" | "" => Yaml::Null,
            _ => Yaml::BadValue,
        },
        _ => Yaml::String(value),
    }
}
