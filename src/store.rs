use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::fs;
use regex::Regex;
use crate::error::Error;


/// Where raw template text comes from.
pub trait TemplateSource: Send + Sync {
    fn load(&self, name: &str) -> Result<String, Error>;
}


/// Templates read from files below a root directory.
pub struct FileSource {
    root: PathBuf
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSource { root: root.into() }
    }
}

impl TemplateSource for FileSource {
    fn load(&self, name: &str) -> Result<String, Error> {
        fs::read_to_string(self.root.join(name)).map_err(
            |source| match source.kind() {
                ErrorKind::NotFound => Error::NotFound(name.to_owned()),
                _ => Error::Io { name: name.to_owned(), source }
            }
        )
    }
}


/// In-memory templates.
#[derive(Debug, Default, Clone)]
pub struct TemplateMap {
    templates: HashMap<String, String>
}

impl TemplateMap {
    pub fn new() -> Self {
        TemplateMap { templates: HashMap::new() }
    }

    pub fn insert(&mut self, name: &str, text: &str) -> &mut Self {
        self.templates.insert(name.to_owned(), text.to_owned());
        self
    }
}

impl TemplateSource for TemplateMap {
    fn load(&self, name: &str) -> Result<String, Error> {
        self.templates.get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_owned()))
    }
}


/// Compiled template text by name. Safe to share between threads; a miss
/// compiled twice by racing renders stores the same text twice.
#[derive(Debug, Default)]
pub struct TemplateCache {
    compiled: RwLock<HashMap<String, Arc<str>>>
}

impl TemplateCache {
    pub fn new() -> Self {
        TemplateCache::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<str>> {
        self.compiled.read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn insert(&self, name: &str, compiled: Arc<str>) {
        self.compiled.write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), compiled);
    }

    pub fn get_or_compile(&self, name: &str, source: &dyn TemplateSource) -> Result<Arc<str>, Error> {
        if let Some(compiled) = self.get(name) {
            return Ok(compiled);
        }
        let compiled: Arc<str> = compile(&source.load(name)?).into();
        self.insert(name, Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.compiled.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.compiled.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}


fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static pattern"))
}

/// Strip `{! comments !}`, line breaks and tabs, collapse whitespace runs
/// and the blanks between adjacent tags.
pub fn compile(raw: &str) -> String {
    static COMMENT: OnceLock<Regex> = OnceLock::new();
    static CONTROL: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();
    let text = pattern(&COMMENT, r"(?s)\{!.*?!\}").replace_all(raw, "");
    let text = pattern(&CONTROL, r"[\x0C\n\r\t\x0B]").replace_all(&text, "");
    let text = pattern(&SPACES, r"\s{2,}").replace_all(&text, " ");
    text.replace("> <", "><")
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn compile_strips_comments_and_whitespace() {
        let raw = "<p>\n\t{! a\ncomment !}Hello   {name}</p>\r\n <p>x</p>";
        assert_eq!(compile(raw), "<p>Hello {name}</p><p>x</p>");
    }

    #[test]
    fn compile_keeps_single_spaces() {
        assert_eq!(compile("<b>a b</b> <i>c</i>"), "<b>a b</b><i>c</i>");
        assert_eq!(compile("{item} "), "{item} ");
    }

    #[test]
    fn map_source() {
        let mut templates = TemplateMap::new();
        templates.insert("a", "<p>a</p>");
        assert_eq!(templates.load("a").unwrap(), "<p>a</p>");
        assert!(matches!(templates.load("b"), Err(Error::NotFound(name)) if name == "b"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let source = FileSource::new("/nonexistent/teddy/root");
        assert!(matches!(source.load("x.html"), Err(Error::NotFound(_))));
    }

    struct Counting {
        loads: AtomicUsize
    }

    impl TemplateSource for Counting {
        fn load(&self, name: &str) -> Result<String, Error> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(format!("<p>{}</p>\n", name))
        }
    }

    #[test]
    fn cache_compiles_once() {
        let source = Counting { loads: AtomicUsize::new(0) };
        let cache = TemplateCache::new();
        assert_eq!(&*cache.get_or_compile("a", &source).unwrap(), "<p>a</p>");
        assert_eq!(&*cache.get_or_compile("a", &source).unwrap(), "<p>a</p>");
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
