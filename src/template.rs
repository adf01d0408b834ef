use std::path::PathBuf;
use std::sync::Arc;
use crate::config::{Config, Verbosity};
use crate::error::Error;
use crate::model::IntoModel;
use crate::render::{Rendered, Renderer};
use crate::store::{compile, FileSource, TemplateCache, TemplateSource};


/// Renders named templates from a [TemplateSource], keeping compiled text
/// in a [TemplateCache].
///
/// An engine can be shared between threads; every render works on its own
/// tree and its own copy of the model.
pub struct Engine {
    config: Config,
    source: Box<dyn TemplateSource>,
    cache: Arc<TemplateCache>
}

impl Engine {
    /// An engine reading templates from files below `config.template_root`.
    pub fn new(config: Config) -> Self {
        let source = FileSource::new(config.template_root.clone());
        Engine::with_source(config, source)
    }

    pub fn with_source(config: Config, source: impl TemplateSource + 'static) -> Self {
        Engine {
            config,
            source: Box::new(source),
            cache: Arc::new(TemplateCache::new())
        }
    }

    /// Use `cache` instead of a private cache, e.g. to share it between engines.
    pub fn with_cache(mut self, cache: Arc<TemplateCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Arc<TemplateCache> {
        &self.cache
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.config.verbosity = verbosity;
    }

    /// Read templates from files below `root` from now on. Compiled
    /// templates of the previous source are dropped.
    pub fn set_template_root(&mut self, root: impl Into<PathBuf>) {
        self.config.template_root = root.into();
        self.source = Box::new(FileSource::new(self.config.template_root.clone()));
        self.cache.clear();
    }

    /// Load and compile `name` unless it is already cached.
    pub fn compile(&self, name: &str) -> Result<Arc<str>, Error> {
        self.cache.get_or_compile(self.template_name(name), self.source.as_ref())
    }

    // names may be given with the template root in front
    fn template_name<'n>(&self, name: &'n str) -> &'n str {
        const SEPARATORS: [char; 2] = ['/', '\\'];
        let root = match self.config.template_root.to_str() {
            Some(root) if !root.is_empty() => root,
            _ => return name
        };
        match name.strip_prefix(root) {
            Some(rest) if rest.starts_with(SEPARATORS) || root.ends_with(SEPARATORS) => {
                rest.trim_start_matches(SEPARATORS)
            },
            _ => name
        }
    }

    pub fn render<M: IntoModel + ?Sized>(&self, name: &str, data: &M) -> Result<String, Error> {
        self.render_report(name, data).map(|rendered| rendered.text)
    }

    /// Like [Engine::render], also returning the diagnostics of the render.
    pub fn render_report<M: IntoModel + ?Sized>(&self, name: &str, data: &M) -> Result<Rendered, Error> {
        let compiled = self.compile(name).map_err(|err| {
            if self.config.verbosity >= Verbosity::Concise {
                tracing::warn!(target: "teddy", "cannot render template {}: {}", name, err);
            }
            err
        })?;
        Ok(Renderer::new(self, data.into_model()).run(&compiled))
    }

    /// Render and hand the result to `callback`, which is called exactly once.
    pub fn render_with<M, F>(&self, name: &str, data: &M, callback: F)
    where M: IntoModel + ?Sized, F: FnOnce(Result<String, Error>) {
        callback(self.render(name, data))
    }

    /// Render template text that is not registered in the source; includes
    /// still resolve through it.
    pub fn render_str<M: IntoModel + ?Sized>(&self, text: &str, data: &M) -> Rendered {
        Renderer::new(self, data.into_model()).run(&compile(text))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Config::default())
    }
}
