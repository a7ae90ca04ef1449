//! The `!include` constructor.

use crate::context::LoadContext;
use crate::directive::interpret;
use crate::error::Result;
use crate::loader::{Constructor, Loader};
use crate::options::IncludeOptions;
use crate::resolver::resolve;
use yaml_rust2::Yaml;

/// Constructor that replaces an include directive with the included files.
///
/// ```rust,no_run
/// use yaml_include::{IncludeConstructor, LoadContext, Loader};
///
/// let mut loader = Loader::new();
/// IncludeConstructor::default().register_on(&mut loader);
///
/// let doc = loader
///     .load_str("settings: !include conf/settings.yaml", &LoadContext::working_dir())
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct IncludeConstructor {
    options: IncludeOptions,
}

impl IncludeConstructor {
    pub fn new(options: IncludeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IncludeOptions {
        &self.options
    }

    /// Bind this constructor to `loader` under the configured tag.
    ///
    /// Each loader needs its own call; registration is not shared.
    pub fn register_on(self, loader: &mut Loader) -> &mut Loader {
        let tag = self.options.tag.clone();
        loader.register(&tag, self)
    }
}

impl Constructor for IncludeConstructor {
    fn construct(&self, loader: &Loader, context: &LoadContext, node: Yaml) -> Result<Yaml> {
        let spec = interpret(&node, self.options.encoding)?;
        resolve(&spec, &self.options, context, loader)
    }
}

/// A loader with [`IncludeConstructor`] bound to `!include`.
pub fn loader() -> Loader {
    loader_with_options(IncludeOptions::default())
}

/// A loader with an [`IncludeConstructor`] configured by `options`.
pub fn loader_with_options(options: IncludeOptions) -> Loader {
    let mut loader = Loader::new();
    IncludeConstructor::new(options).register_on(&mut loader);
    loader
}
