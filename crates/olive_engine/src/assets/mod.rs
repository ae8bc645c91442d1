//! Content loading
//!
//! Scenes load named content of a given type during their content phase.
//! Each type has a registered loader that turns raw bytes into a value.
//! Loaded values are cached by name and shared through [`Rc`].

mod obj;

pub use obj::parse_obj;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, info};
use thiserror::Error;

use crate::render::Model;

/// Content loading errors
#[derive(Error, Debug)]
pub enum ContentError {
    /// Nothing with that name under the content root
    #[error("Content not found: {0}")]
    NotFound(String),

    /// No loader registered for the requested type
    #[error("No loader registered for {0}")]
    NoLoader(&'static str),

    /// Cached under that name with a different type
    #[error("Content '{name}' was loaded as a different type than {requested}")]
    TypeMismatch {
        /// Content name
        name: String,
        /// Type asked for
        requested: &'static str,
    },

    /// The loader rejected the data
    #[error("Failed to parse '{name}': {message}")]
    Parse {
        /// Content name
        name: String,
        /// What went wrong
        message: String,
    },

    /// Reading the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

type Loader = Box<dyn Fn(&str, &[u8]) -> Result<Rc<dyn Any>, ContentError>>;

/// Typed, name-cached content loader
pub struct ContentManager {
    root: PathBuf,
    loaders: HashMap<TypeId, Loader>,
    sources: HashMap<String, Vec<u8>>,
    cache: HashMap<String, Rc<dyn Any>>,
}

impl Default for ContentManager {
    fn default() -> Self {
        Self::new("Content")
    }
}

impl ContentManager {
    /// Manager reading from `root`, with loaders for [`Model`] (OBJ) and
    /// `String` (UTF-8 text)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let mut content = Self {
            root: root.into(),
            loaders: HashMap::new(),
            sources: HashMap::new(),
            cache: HashMap::new(),
        };
        content.register_loader::<Model, _>(parse_obj);
        content.register_loader::<String, _>(|name, bytes| {
            String::from_utf8(bytes.to_vec()).map_err(|error| ContentError::Parse {
                name: name.to_string(),
                message: error.to_string(),
            })
        });
        content
    }

    /// Directory content names are resolved against
    pub fn root_directory(&self) -> &Path {
        &self.root
    }

    /// Register or replace the loader for `T`
    pub fn register_loader<T, F>(&mut self, loader: F)
    where
        T: Any,
        F: Fn(&str, &[u8]) -> Result<T, ContentError> + 'static,
    {
        self.loaders.insert(
            TypeId::of::<T>(),
            Box::new(move |name, bytes| Ok(Rc::new(loader(name, bytes)?) as Rc<dyn Any>)),
        );
    }

    /// Serve `name` from memory instead of the file system
    pub fn insert_source(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.sources.insert(name.into(), bytes.into());
    }

    /// Load `name` as a `T`, or return the cached value
    pub fn load<T: Any>(&mut self, name: &str) -> Result<Rc<T>, ContentError> {
        if let Some(cached) = self.cache.get(name) {
            return Rc::clone(cached).downcast::<T>().map_err(|_| ContentError::TypeMismatch {
                name: name.to_string(),
                requested: std::any::type_name::<T>(),
            });
        }

        let loader = self
            .loaders
            .get(&TypeId::of::<T>())
            .ok_or(ContentError::NoLoader(std::any::type_name::<T>()))?;
        let value = match self.sources.get(name) {
            Some(bytes) => loader(name, bytes)?,
            None => {
                let path = self.root.join(name);
                if !path.is_file() {
                    return Err(ContentError::NotFound(name.to_string()));
                }
                let bytes = std::fs::read(&path)?;
                loader(name, &bytes)?
            }
        };
        debug!("Loaded content '{name}' as {}", std::any::type_name::<T>());
        self.cache.insert(name.to_string(), Rc::clone(&value));
        value.downcast::<T>().map_err(|_| ContentError::TypeMismatch {
            name: name.to_string(),
            requested: std::any::type_name::<T>(),
        })
    }

    /// Whether `name` is cached
    pub fn is_loaded(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// Number of cached items
    pub fn loaded_count(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached item
    pub fn unload_all(&mut self) {
        if !self.cache.is_empty() {
            info!("Unloading {} content item(s)", self.cache.len());
        }
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Level(u32);

    #[test]
    fn test_load_is_cached_by_name() {
        let mut content = ContentManager::default();
        content.insert_source("greeting", "hello");

        let first = content.load::<String>("greeting").unwrap();
        let second = content.load::<String>("greeting").unwrap();
        assert_eq!(first.as_str(), "hello");
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(content.loaded_count(), 1);

        content.unload_all();
        assert!(!content.is_loaded("greeting"));
    }

    #[test]
    fn test_custom_loader() {
        let mut content = ContentManager::default();
        content.register_loader::<Level, _>(|name, bytes| {
            std::str::from_utf8(bytes)
                .ok()
                .and_then(|text| text.trim().parse().ok())
                .map(Level)
                .ok_or_else(|| ContentError::Parse {
                    name: name.to_string(),
                    message: "expected a level number".to_string(),
                })
        });
        content.insert_source("level", "7");
        content.insert_source("bad", "seven");

        assert_eq!(*content.load::<Level>("level").unwrap(), Level(7));
        assert!(matches!(content.load::<Level>("bad"), Err(ContentError::Parse { .. })));
    }

    #[test]
    fn test_errors() {
        let mut content = ContentManager::new("does-not-exist");
        content.insert_source("text", "abc");

        assert!(matches!(content.load::<String>("missing.txt"), Err(ContentError::NotFound(_))));
        assert!(matches!(content.load::<Level>("text"), Err(ContentError::NoLoader(_))));

        content.load::<String>("text").unwrap();
        assert!(matches!(content.load::<Model>("text"), Err(ContentError::TypeMismatch { .. })));
    }

    #[test]
    fn test_models_load_from_obj() {
        let mut content = ContentManager::default();
        content.insert_source("tri.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let model = content.load::<Model>("tri.obj").unwrap();
        assert_eq!(model.name(), "tri.obj");
        assert_eq!(model.meshes()[0].indices.len(), 3);
    }
}
