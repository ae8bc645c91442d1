//! World: the engine root
//!
//! Owns every entity, component, coroutine and scene in slot-map arenas,
//! plus the active scene manager strategy. A handle whose slot has been
//! removed is disposed; every accessor goes through one of the liveness
//! guards below and fails with [`EngineError::Disposed`] on a stale handle.

use log::{debug, info};

use crate::assets::ContentManager;
use crate::ecs::component::ComponentSlot;
use crate::ecs::coroutine::Coroutine;
use crate::ecs::entity::GameObject;
use crate::ecs::registry::ComponentRegistry;
use crate::engine::{EngineError, EngineResult};
use crate::foundation::collections::{ComponentId, CoroutineId, EntityId, SceneId, SlotMap};
use crate::foundation::color::Color;
use crate::foundation::time::FrameContext;
use crate::render::RenderDevice;
use crate::scene::{Scene, SceneManager, SceneManagerKind};

pub(crate) const GAME_OBJECT: &str = "game object";
pub(crate) const COMPONENT: &str = "component";
pub(crate) const SCENE: &str = "scene";

/// Engine root context
pub struct World {
    pub(crate) entities: SlotMap<EntityId, GameObject>,
    pub(crate) components: SlotMap<ComponentId, ComponentSlot>,
    pub(crate) coroutines: SlotMap<CoroutineId, Coroutine>,
    pub(crate) scenes: SlotMap<SceneId, Scene>,
    pub(crate) scene_manager: SceneManager,
    pub(crate) placeholder: SceneId,
    pub(crate) background: Color,
    registry: ComponentRegistry,
    content: ContentManager,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// World with an additive scene manager
    pub fn new() -> Self {
        Self::with_scene_manager(SceneManagerKind::Additive)
    }

    /// World with the given scene manager strategy
    pub fn with_scene_manager(kind: SceneManagerKind) -> Self {
        let mut scenes = SlotMap::with_key();
        let placeholder = scenes.insert(Scene::placeholder());
        debug!("Creating world with {kind:?} scene manager");
        Self {
            entities: SlotMap::with_key(),
            components: SlotMap::with_key(),
            coroutines: SlotMap::with_key(),
            scenes,
            scene_manager: SceneManager::new(kind, placeholder),
            placeholder,
            background: Color::BLACK,
            registry: ComponentRegistry::new(),
            content: ContentManager::default(),
        }
    }

    /// Replace the content manager
    pub fn with_content(mut self, content: ContentManager) -> Self {
        self.content = content;
        self
    }

    /// Clear color used when nothing is drawn
    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    pub(crate) fn entity(&self, id: EntityId) -> EngineResult<&GameObject> {
        self.entities.get(id).ok_or(EngineError::Disposed { kind: GAME_OBJECT })
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> EngineResult<&mut GameObject> {
        self.entities.get_mut(id).ok_or(EngineError::Disposed { kind: GAME_OBJECT })
    }

    /// Liveness guard for components
    pub fn component(&self, id: ComponentId) -> EngineResult<&ComponentSlot> {
        self.components.get(id).ok_or(EngineError::Disposed { kind: COMPONENT })
    }

    pub(crate) fn component_mut(&mut self, id: ComponentId) -> EngineResult<&mut ComponentSlot> {
        self.components.get_mut(id).ok_or(EngineError::Disposed { kind: COMPONENT })
    }

    pub(crate) fn scene(&self, id: SceneId) -> EngineResult<&Scene> {
        self.scenes.get(id).ok_or(EngineError::Disposed { kind: SCENE })
    }

    pub(crate) fn scene_mut(&mut self, id: SceneId) -> EngineResult<&mut Scene> {
        self.scenes.get_mut(id).ok_or(EngineError::Disposed { kind: SCENE })
    }

    /// Whether the game object has not been disposed
    pub fn is_game_object_alive(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Whether the component has not been disposed
    pub fn is_component_alive(&self, id: ComponentId) -> bool {
        self.components.contains_key(id)
    }

    /// Number of live components across all scenes
    pub fn live_component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of live game objects across all scenes
    pub fn live_game_object_count(&self) -> usize {
        self.entities.len()
    }

    /// Named component factories
    pub const fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Named component factories, mutably
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Content loader
    pub const fn content(&self) -> &ContentManager {
        &self.content
    }

    /// Content loader, mutably
    pub fn content_mut(&mut self) -> &mut ContentManager {
        &mut self.content
    }

    /// Initialize every active scene that has not been initialized yet
    pub fn initialize(&mut self) -> EngineResult<()> {
        for scene in self.scene_manager.active_scenes() {
            if self.scenes.contains_key(scene) {
                self.initialize_scene(scene)?;
            }
        }
        Ok(())
    }

    /// Advance every active scene by one tick
    pub fn update(&mut self, frame: &FrameContext) -> EngineResult<()> {
        for scene in self.scene_manager.active_scenes() {
            if self.scenes.contains_key(scene) {
                self.update_scene(scene, frame)?;
            }
        }
        Ok(())
    }

    /// Draw every active scene.
    ///
    /// With a main camera the frame is cleared once to its color. Otherwise
    /// the first scene that draws clears to its own camera's color. If no
    /// scene draws, the frame is cleared to the background color. Returns
    /// whether anything was drawn.
    pub fn draw(&mut self, frame: &FrameContext, device: &mut dyn RenderDevice) -> EngineResult<bool> {
        let scenes = self.scene_manager.active_scenes();
        let main_camera = self.main_camera()?;
        if let Some(camera) = main_camera {
            device.clear(self.camera_data(camera)?.clear_color);
        }

        let mut drawn = false;
        for scene in scenes {
            if !self.scenes.contains_key(scene) {
                continue;
            }
            let clear = main_camera.is_none() && !drawn;
            if self.render_scene(scene, frame, device, clear)? {
                drawn = true;
            }
        }

        if !drawn {
            device.clear(self.background);
        }
        Ok(drawn)
    }

    /// Post-render pass over every active scene
    pub fn post_render(&mut self, frame: &FrameContext) -> EngineResult<()> {
        for scene in self.scene_manager.active_scenes() {
            if self.scenes.contains_key(scene) {
                self.post_render_scene(scene, frame)?;
            }
        }
        Ok(())
    }

    /// Run the content phase for every active scene that has not had it yet
    pub fn load_content(&mut self) -> EngineResult<()> {
        for scene in self.scene_manager.active_scenes() {
            if self.scenes.contains_key(scene) {
                self.load_scene_content(scene)?;
            }
        }
        Ok(())
    }

    /// Dispose everything and reset the scene manager
    pub fn shutdown(&mut self) -> EngineResult<()> {
        let entities: Vec<EntityId> = self.entities.keys().collect();
        for entity in entities {
            if self.entities.contains_key(entity) {
                self.dispose_game_object(entity)?;
            }
        }
        let kind = self.scene_manager.kind();
        let placeholder = self.placeholder;
        self.scenes.retain(|id, _| id == placeholder);
        self.scene_manager = SceneManager::new(kind, self.placeholder);
        self.content.unload_all();
        info!("World shut down");
        Ok(())
    }
}
