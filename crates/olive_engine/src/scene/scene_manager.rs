//! Scene manager strategies
//!
//! The manager decides which scenes are live. It only holds scene handles;
//! scene and entity lifetimes stay with the [`World`]. Every strategy is
//! driven through the same facade on the world: load, unload, push, pop,
//! and per-tick update, draw and post-render over [`SceneManager::active_scenes`].
//!
//! - **Simple**: one current scene; loading replaces it.
//! - **Additive**: any number of scenes, updated and drawn in load order.
//! - **Stacked**: a stack seeded with the placeholder scene; every layer is
//!   updated and drawn, bottom to top.

use log::info;
use serde::{Deserialize, Serialize};

use crate::ecs::World;
use crate::engine::{EngineError, EngineResult};
use crate::foundation::collections::SceneId;

const ALREADY_LOADED: &str = "Scene is already loaded.";
const NOT_LOADED: &str = "Specified scene is not loaded by this manager.";

/// Which strategy a [`SceneManager`] uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SceneManagerKind {
    /// One scene at a time
    Simple,
    /// Any number of scenes side by side
    #[default]
    Additive,
    /// Layers pushed and popped in LIFO order
    Stacked,
}

/// How [`World::load_scene_with_mode`] treats scenes that are already loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneLoadMode {
    /// Unload everything first
    #[default]
    Single,
    /// Keep what is loaded
    Additive,
}

/// Active scene set, per strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneManager {
    /// Exactly one active scene
    Simple {
        /// The active scene, or the placeholder
        current: SceneId,
        /// Scene shown when nothing is loaded
        placeholder: SceneId,
    },
    /// Concurrently active scenes in load order
    Additive {
        /// Loaded scenes
        scenes: Vec<SceneId>,
    },
    /// LIFO stack whose bottom is always the placeholder
    Stacked {
        /// Bottom to top
        stack: Vec<SceneId>,
    },
}

impl SceneManager {
    /// Empty manager of the given kind
    pub fn new(kind: SceneManagerKind, placeholder: SceneId) -> Self {
        match kind {
            SceneManagerKind::Simple => Self::Simple {
                current: placeholder,
                placeholder,
            },
            SceneManagerKind::Additive => Self::Additive { scenes: Vec::new() },
            SceneManagerKind::Stacked => Self::Stacked {
                stack: vec![placeholder],
            },
        }
    }

    /// Strategy of this manager
    pub const fn kind(&self) -> SceneManagerKind {
        match self {
            Self::Simple { .. } => SceneManagerKind::Simple,
            Self::Additive { .. } => SceneManagerKind::Additive,
            Self::Stacked { .. } => SceneManagerKind::Stacked,
        }
    }

    /// Snapshot of the scenes to update and draw, in visiting order
    pub fn active_scenes(&self) -> Vec<SceneId> {
        match self {
            Self::Simple { current, .. } => vec![*current],
            Self::Additive { scenes } => scenes.clone(),
            Self::Stacked { stack } => stack.clone(),
        }
    }

    /// Whether `scene` is in the active set
    pub fn contains(&self, scene: SceneId) -> bool {
        match self {
            Self::Simple { current, .. } => *current == scene,
            Self::Additive { scenes } => scenes.contains(&scene),
            Self::Stacked { stack } => stack.contains(&scene),
        }
    }

    /// The current scene, the last loaded one, or the top of the stack
    pub fn primary_scene(&self) -> Option<SceneId> {
        match self {
            Self::Simple { current, .. } => Some(*current),
            Self::Additive { scenes } => scenes.last().copied(),
            Self::Stacked { stack } => stack.last().copied(),
        }
    }

    pub(crate) fn load(&mut self, scene: SceneId) -> EngineResult<()> {
        if self.contains(scene) {
            return Err(EngineError::InvalidOperation(ALREADY_LOADED.to_string()));
        }
        match self {
            Self::Simple { current, .. } => *current = scene,
            Self::Additive { scenes } => scenes.push(scene),
            Self::Stacked { stack } => stack.push(scene),
        }
        Ok(())
    }

    pub(crate) fn unload(&mut self, scene: SceneId) -> EngineResult<()> {
        if !self.contains(scene) {
            return Err(EngineError::InvalidOperation(NOT_LOADED.to_string()));
        }
        match self {
            Self::Simple { current, placeholder } => *current = *placeholder,
            Self::Additive { scenes } => scenes.retain(|&id| id != scene),
            Self::Stacked { stack } => stack.retain(|&id| id != scene),
        }
        Ok(())
    }

    /// Remove the most recent scene, never the placeholder
    pub(crate) fn pop(&mut self, placeholder: SceneId) -> Option<SceneId> {
        match self {
            Self::Simple { current, .. } if *current != placeholder => {
                Some(std::mem::replace(current, placeholder))
            }
            Self::Simple { .. } => None,
            Self::Additive { scenes } => scenes.pop(),
            Self::Stacked { stack } if stack.len() > 1 => stack.pop(),
            Self::Stacked { .. } => None,
        }
    }

    /// Remove every scene except the placeholder
    pub(crate) fn clear(&mut self, placeholder: SceneId) {
        *self = Self::new(self.kind(), placeholder);
    }
}

impl World {
    /// The active scene manager
    pub const fn scene_manager(&self) -> &SceneManager {
        &self.scene_manager
    }

    /// Replace the scene manager with an empty one of another strategy
    pub fn set_scene_manager(&mut self, kind: SceneManagerKind) {
        info!("Switching to {kind:?} scene manager");
        self.scene_manager = SceneManager::new(kind, self.placeholder);
    }

    /// The empty scene that seeds simple and stacked managers
    pub const fn placeholder_scene(&self) -> SceneId {
        self.placeholder
    }

    /// Load `scene` with [`SceneLoadMode::Additive`] semantics on the
    /// current strategy. A simple manager replaces its current scene.
    pub fn load_scene(&mut self, scene: SceneId) -> EngineResult<()> {
        self.load_scene_with_mode(scene, SceneLoadMode::Additive)
    }

    /// Load `scene`, first unloading everything when `mode` is
    /// [`SceneLoadMode::Single`].
    ///
    /// The scene's content phase and initialization run if they have not
    /// already. On failure the active set is left as it was.
    pub fn load_scene_with_mode(&mut self, scene: SceneId, mode: SceneLoadMode) -> EngineResult<()> {
        self.ensure_loadable(scene)?;
        if self.scene_manager.contains(scene) {
            return Err(EngineError::InvalidOperation(ALREADY_LOADED.to_string()));
        }
        let previous = self.scene_manager.clone();
        if mode == SceneLoadMode::Single {
            self.scene_manager.clear(self.placeholder);
        }
        self.scene_manager.load(scene)?;
        if let Err(error) = self.initialize_scene(scene) {
            self.scene_manager = previous;
            return Err(error);
        }
        info!("Loaded scene '{}' ({mode:?})", self.scene(scene)?.name());
        Ok(())
    }

    /// Remove `scene` from the active set. Its entities are not disposed.
    pub fn unload_scene(&mut self, scene: SceneId) -> EngineResult<()> {
        self.scene(scene)?;
        if scene == self.placeholder {
            return Err(EngineError::InvalidOperation(NOT_LOADED.to_string()));
        }
        self.scene_manager.unload(scene)?;
        info!("Unloaded scene '{}'", self.scene(scene)?.name());
        Ok(())
    }

    /// Initialize `scene` and put it on top of the active set
    pub fn push_scene(&mut self, scene: SceneId) -> EngineResult<()> {
        self.ensure_loadable(scene)?;
        if self.scene_manager.contains(scene) {
            return Err(EngineError::InvalidOperation(ALREADY_LOADED.to_string()));
        }
        self.initialize_scene(scene)?;
        self.scene_manager.load(scene)?;
        info!("Pushed scene '{}'", self.scene(scene)?.name());
        Ok(())
    }

    /// Remove and return the most recently loaded scene, or `None` when
    /// only the placeholder is left
    pub fn pop_scene(&mut self) -> Option<SceneId> {
        let popped = self.scene_manager.pop(self.placeholder)?;
        if let Some(scene) = self.scenes.get(popped) {
            info!("Popped scene '{}'", scene.name());
        }
        Some(popped)
    }

    /// Loaded scenes in visiting order, without the placeholder
    pub fn loaded_scenes(&self) -> Vec<SceneId> {
        self.scene_manager
            .active_scenes()
            .into_iter()
            .filter(|&scene| scene != self.placeholder)
            .collect()
    }

    /// Whether `scene` is currently loaded
    pub fn is_scene_loaded(&self, scene: SceneId) -> bool {
        scene != self.placeholder && self.scene_manager.contains(scene)
    }

    fn ensure_loadable(&self, scene: SceneId) -> EngineResult<()> {
        if self.scene(scene)?.placeholder {
            return Err(EngineError::InvalidOperation("cannot load the empty scene".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids() -> (SceneId, SceneId, SceneId) {
        let mut map: SlotMap<SceneId, ()> = SlotMap::with_key();
        (map.insert(()), map.insert(()), map.insert(()))
    }

    #[test]
    fn test_simple_replaces_current() {
        let (placeholder, a, b) = ids();
        let mut manager = SceneManager::new(SceneManagerKind::Simple, placeholder);
        assert_eq!(manager.active_scenes(), vec![placeholder]);

        manager.load(a).unwrap();
        manager.load(b).unwrap();
        assert_eq!(manager.active_scenes(), vec![b]);
        assert!(manager.load(b).is_err());

        manager.unload(b).unwrap();
        assert_eq!(manager.active_scenes(), vec![placeholder]);
    }

    #[test]
    fn test_additive_rejects_duplicates_and_unknown_scenes() {
        let (placeholder, a, b) = ids();
        let mut manager = SceneManager::new(SceneManagerKind::Additive, placeholder);
        manager.load(a).unwrap();
        assert!(matches!(manager.load(a), Err(EngineError::InvalidOperation(_))));
        assert!(matches!(manager.unload(b), Err(EngineError::InvalidOperation(_))));
        assert_eq!(manager.active_scenes(), vec![a]);
    }

    #[test]
    fn test_stacked_pop_keeps_placeholder() {
        let (placeholder, a, b) = ids();
        let mut manager = SceneManager::new(SceneManagerKind::Stacked, placeholder);
        manager.load(a).unwrap();
        manager.load(b).unwrap();

        assert_eq!(manager.pop(placeholder), Some(b));
        assert_eq!(manager.primary_scene(), Some(a));
        assert_eq!(manager.pop(placeholder), Some(a));
        assert_eq!(manager.pop(placeholder), None);
        assert_eq!(manager.active_scenes(), vec![placeholder]);
    }

    #[test]
    fn test_kind_round_trips() {
        for kind in [SceneManagerKind::Simple, SceneManagerKind::Additive, SceneManagerKind::Stacked] {
            let (placeholder, _, _) = ids();
            assert_eq!(SceneManager::new(kind, placeholder).kind(), kind);
        }
    }
}
