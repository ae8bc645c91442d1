//! Component types addressable by name
//!
//! Lets data-driven code attach components without naming the Rust type.
//! `Camera` and `ModelRenderer` are registered by default.

use std::collections::HashMap;

use crate::ecs::component::{Component, ComponentKind};
use crate::ecs::components::{Behavior, Camera};
use crate::engine::{EngineError, EngineResult};
use crate::render::{ModelRenderer, Renderer};

type Factory = Box<dyn Fn() -> ComponentKind>;

/// Name to factory table
pub struct ComponentRegistry {
    factories: HashMap<String, Factory>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    /// Registry with the built-in component types
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register::<Camera>("Camera");
        registry.register_renderer::<ModelRenderer>("ModelRenderer");
        registry
    }

    /// Register a component type
    pub fn register<T: Component + Default>(&mut self, name: impl Into<String>) {
        self.factories
            .insert(name.into(), Box::new(|| T::default().into_kind()));
    }

    /// Register a behavior type
    pub fn register_behavior<B: Behavior + Default>(&mut self, name: impl Into<String>) {
        self.factories
            .insert(name.into(), Box::new(|| ComponentKind::behavior(B::default())));
    }

    /// Register a renderer type
    pub fn register_renderer<R: Renderer + Default>(&mut self, name: impl Into<String>) {
        self.factories
            .insert(name.into(), Box::new(|| ComponentKind::renderer(R::default())));
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build a new component of the named type
    pub fn create(&self, name: &str) -> EngineResult<ComponentKind> {
        if name == "Transform" {
            return Err(EngineError::InvalidArgument(
                "a game object cannot have more than one transform".to_string(),
            ));
        }
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| EngineError::InvalidArgument(format!("'{name}' is not a registered component type")))
    }
}
