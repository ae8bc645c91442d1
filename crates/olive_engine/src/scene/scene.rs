//! Scenes
//!
//! A scene owns an ordered list of game objects. It becomes live once a
//! scene manager loads it, which runs its content phase and its one-time
//! initialization. Per-scene behavior lives in an optional [`SceneLogic`].

use log::{debug, info, trace, warn};

use crate::ecs::component::{AsAny, Capabilities, ComponentKind};
use crate::ecs::components::MAIN_CAMERA_TAG;
use crate::ecs::World;
use crate::engine::{EngineError, EngineResult};
use crate::foundation::collections::{ComponentId, EntityId, SceneId};
use crate::foundation::math::Mat4;
use crate::foundation::time::FrameContext;
use crate::render::{RenderContext, RenderDevice};
use crate::scene::SceneTransform;

/// Overridable scene hooks
#[allow(unused_variables)]
pub trait SceneLogic: AsAny {
    /// Load assets through `cx.world.content_mut()`. Runs once, before
    /// [`initialize`](Self::initialize).
    fn load_content(&mut self, cx: &mut SceneContext<'_>) -> EngineResult<()> {
        Ok(())
    }

    /// Build the scene's game objects. Runs once, when the scene is first
    /// loaded.
    fn initialize(&mut self, cx: &mut SceneContext<'_>) -> EngineResult<()> {
        Ok(())
    }

    /// Called every tick before the scene's game objects update
    fn update(&mut self, cx: &mut SceneContext<'_>, frame: &FrameContext) -> EngineResult<()> {
        Ok(())
    }
}

/// What a running scene hook can reach
pub struct SceneContext<'w> {
    /// The whole world
    pub world: &'w mut World,
    scene: SceneId,
}

impl SceneContext<'_> {
    /// Scene whose hook is running
    pub const fn scene(&self) -> SceneId {
        self.scene
    }

    /// Create a game object in this scene
    pub fn create_game_object(&mut self, name: impl Into<String>) -> EngineResult<EntityId> {
        self.world.create_game_object(self.scene, name)
    }
}

/// Scene record
pub struct Scene {
    name: String,
    pub(crate) game_objects: Vec<EntityId>,
    pub(crate) initialized: bool,
    pub(crate) content_loaded: bool,
    pub(crate) placeholder: bool,
    pub(crate) transform: SceneTransform,
    logic: Option<Box<dyn SceneLogic>>,
}

impl Scene {
    fn new(name: String, logic: Option<Box<dyn SceneLogic>>) -> Self {
        Self {
            name,
            game_objects: Vec::new(),
            initialized: false,
            content_loaded: false,
            placeholder: false,
            transform: SceneTransform::default(),
            logic,
        }
    }

    /// The empty scene seeding simple and stacked managers
    pub(crate) fn placeholder() -> Self {
        Self {
            placeholder: true,
            initialized: true,
            content_loaded: true,
            ..Self::new("Empty".to_string(), None)
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owned game objects in attachment order
    pub fn game_objects(&self) -> &[EntityId] {
        &self.game_objects
    }

    /// Whether the scene has run its initialization
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Add an entity; adding one already present does nothing
    pub(crate) fn add_game_object(&mut self, entity: EntityId) {
        if !self.game_objects.contains(&entity) {
            self.game_objects.push(entity);
        }
    }
}

impl World {
    /// Create an unloaded scene without custom hooks
    pub fn create_scene(&mut self, name: impl Into<String>) -> SceneId {
        let id = self.scenes.insert(Scene::new(name.into(), None));
        debug!("Created scene {id:?}");
        id
    }

    /// Create an unloaded scene driven by `logic`
    pub fn create_scene_with<L: SceneLogic>(&mut self, name: impl Into<String>, logic: L) -> SceneId {
        let id = self.scenes.insert(Scene::new(name.into(), Some(Box::new(logic))));
        debug!("Created scene {id:?}");
        id
    }

    /// Scene record behind a handle
    pub fn scene_info(&self, scene: SceneId) -> EngineResult<&Scene> {
        self.scene(scene)
    }

    /// Display name of a scene
    pub fn scene_name(&self, scene: SceneId) -> EngineResult<&str> {
        Ok(self.scene(scene)?.name())
    }

    /// Whether the scene has run its initialization
    pub fn is_scene_initialized(&self, scene: SceneId) -> EngineResult<bool> {
        Ok(self.scene(scene)?.initialized)
    }

    /// Scene-level transform
    pub fn scene_transform(&self, scene: SceneId) -> EngineResult<&SceneTransform> {
        Ok(&self.scene(scene)?.transform)
    }

    /// Scene-level transform, mutably
    pub fn scene_transform_mut(&mut self, scene: SceneId) -> EngineResult<&mut SceneTransform> {
        Ok(&mut self.scene_mut(scene)?.transform)
    }

    /// Register `entity` with `scene`.
    ///
    /// Entities are added to their scene at creation, so this only
    /// succeeds as a no-op for the owning scene.
    pub fn add_game_object(&mut self, scene: SceneId, entity: EntityId) -> EngineResult<()> {
        let owner = self.entity(entity)?.scene;
        if self.scene(scene)?.placeholder {
            return Err(EngineError::InvalidOperation(
                "cannot add a game object to the empty scene".to_string(),
            ));
        }
        if owner != scene {
            return Err(EngineError::InvalidOperation(
                "game object belongs to another scene".to_string(),
            ));
        }
        self.scene_mut(scene)?.add_game_object(entity);
        Ok(())
    }

    /// Owned game objects in attachment order
    pub fn game_objects(&self, scene: SceneId) -> EngineResult<&[EntityId]> {
        Ok(&self.scene(scene)?.game_objects)
    }

    /// Game objects without a parent, in attachment order
    pub fn top_level_game_objects(&self, scene: SceneId) -> EngineResult<Vec<EntityId>> {
        let mut top_level = Vec::new();
        for &entity in &self.scene(scene)?.game_objects {
            let transform = self.entity(entity)?.transform;
            if self.transform_data(transform)?.parent_id().is_none() {
                top_level.push(entity);
            }
        }
        Ok(top_level)
    }

    /// Depth-first pre-order walk: parents before descendants, siblings
    /// in attachment order
    pub fn scene_hierarchy(&self, scene: SceneId) -> EngineResult<Vec<EntityId>> {
        let mut stack = self.top_level_game_objects(scene)?;
        stack.reverse();
        let mut visited = Vec::with_capacity(stack.len());
        while let Some(entity) = stack.pop() {
            visited.push(entity);
            let mut children = self.child_entities(self.entity(entity)?.transform)?;
            children.reverse();
            stack.extend(children);
        }
        Ok(visited)
    }

    /// First game object in `scene` named `name`
    pub fn find_game_object(&self, scene: SceneId, name: &str) -> EngineResult<Option<EntityId>> {
        for &entity in &self.scene(scene)?.game_objects {
            if self.entity(entity)?.name == name {
                return Ok(Some(entity));
            }
        }
        Ok(None)
    }

    /// Game objects carrying `tag` across the active scenes
    pub fn find_game_objects_with_tag(&self, tag: &str) -> EngineResult<Vec<EntityId>> {
        let mut found = Vec::new();
        for scene in self.scene_manager.active_scenes() {
            let Some(record) = self.scenes.get(scene) else {
                continue;
            };
            for &entity in &record.game_objects {
                if self.has_tag(entity, tag)? {
                    found.push(entity);
                }
            }
        }
        Ok(found)
    }

    /// Run `hook` on the scene's logic with the logic temporarily taken out
    fn with_scene_logic<F>(&mut self, scene: SceneId, hook: F) -> EngineResult<()>
    where
        F: FnOnce(&mut dyn SceneLogic, &mut SceneContext<'_>) -> EngineResult<()>,
    {
        let Some(mut logic) = self.scene_mut(scene)?.logic.take() else {
            return Ok(());
        };
        let result = {
            let mut cx = SceneContext { world: self, scene };
            hook(&mut *logic, &mut cx)
        };
        if let Some(record) = self.scenes.get_mut(scene) {
            record.logic = Some(logic);
        }
        result
    }

    /// Content phase; runs at most once per scene
    pub(crate) fn load_scene_content(&mut self, scene: SceneId) -> EngineResult<()> {
        let record = self.scene_mut(scene)?;
        if record.content_loaded {
            return Ok(());
        }
        record.content_loaded = true;
        debug!("Loading content for scene '{}'", record.name);
        let result = self.with_scene_logic(scene, |logic, cx| logic.load_content(cx));
        if result.is_err() {
            if let Some(record) = self.scenes.get_mut(scene) {
                record.content_loaded = false;
            }
        }
        result
    }

    /// One-time initialization: content phase, scene hook, then every
    /// active game object's behaviors get their `start` hook.
    ///
    /// On failure the scene is returned to its uninitialized state and
    /// game objects created during the attempt are disposed, so a later
    /// load runs every phase again.
    pub fn initialize_scene(&mut self, scene: SceneId) -> EngineResult<()> {
        let record = self.scene_mut(scene)?;
        if record.initialized {
            return Ok(());
        }
        record.initialized = true;
        let had_content = record.content_loaded;
        let existing = record.game_objects.clone();

        if let Err(error) = self.run_initialization(scene) {
            self.roll_back_initialization(scene, &existing, had_content)?;
            return Err(error);
        }
        info!("Initialized scene '{}'", self.scene(scene)?.name);
        Ok(())
    }

    fn run_initialization(&mut self, scene: SceneId) -> EngineResult<()> {
        self.load_scene_content(scene)?;
        self.with_scene_logic(scene, |logic, cx| logic.initialize(cx))?;

        let entities = self.scene(scene)?.game_objects.clone();
        for entity in entities {
            if self.entities.contains_key(entity) && self.is_active_in_hierarchy(entity)? {
                self.initialize_game_object(entity)?;
            }
        }
        Ok(())
    }

    fn roll_back_initialization(
        &mut self,
        scene: SceneId,
        existing: &[EntityId],
        had_content: bool,
    ) -> EngineResult<()> {
        let Some(record) = self.scenes.get_mut(scene) else {
            return Ok(());
        };
        record.initialized = false;
        record.content_loaded = had_content;
        warn!("Initialization of scene '{}' failed; rolling back", record.name);
        let created: Vec<EntityId> = record
            .game_objects
            .iter()
            .copied()
            .filter(|entity| !existing.contains(entity))
            .collect();
        for entity in created {
            if self.entities.contains_key(entity) {
                self.dispose_game_object(entity)?;
            }
        }
        Ok(())
    }

    /// One tick of a scene: its logic, then every live game object that is
    /// active in the hierarchy
    pub(crate) fn update_scene(&mut self, scene: SceneId, frame: &FrameContext) -> EngineResult<()> {
        trace!("Updating scene {scene:?}");
        self.with_scene_logic(scene, |logic, cx| logic.update(cx, frame))?;

        let Some(record) = self.scenes.get(scene) else {
            return Ok(());
        };
        let entities = record.game_objects.clone();
        for entity in entities {
            if !self.entities.contains_key(entity) || !self.is_active_in_hierarchy(entity)? {
                continue;
            }
            self.update_game_object(entity, frame)?;
        }
        Ok(())
    }

    /// Camera tagged [`MAIN_CAMERA_TAG`] in any active scene
    pub fn main_camera(&self) -> EngineResult<Option<ComponentId>> {
        for entity in self.find_game_objects_with_tag(MAIN_CAMERA_TAG)? {
            if let Some(camera) = self.active_camera_on(entity)? {
                return Ok(Some(camera));
            }
        }
        Ok(None)
    }

    /// Camera a scene renders through: the main camera if there is one,
    /// otherwise the first camera on an active game object of the scene
    pub fn resolve_camera(&self, scene: SceneId) -> EngineResult<Option<ComponentId>> {
        if let Some(camera) = self.main_camera()? {
            return Ok(Some(camera));
        }
        for &entity in &self.scene(scene)?.game_objects {
            if let Some(camera) = self.active_camera_on(entity)? {
                return Ok(Some(camera));
            }
        }
        Ok(None)
    }

    fn active_camera_on(&self, entity: EntityId) -> EngineResult<Option<ComponentId>> {
        if !self.is_active_in_hierarchy(entity)? {
            return Ok(None);
        }
        Ok(self.components_with(entity, Capabilities::CAMERA)?.first().copied())
    }

    /// Draw one scene through its resolved camera.
    ///
    /// Clears to the camera's color when `clear` is set. Returns `false`
    /// without drawing when no camera resolves.
    pub(crate) fn render_scene(
        &self,
        scene: SceneId,
        frame: &FrameContext,
        device: &mut dyn RenderDevice,
        clear: bool,
    ) -> EngineResult<bool> {
        let Some(camera) = self.resolve_camera(scene)? else {
            if !self.scene(scene)?.game_objects.is_empty() {
                warn!("Scene '{}' has no camera; nothing drawn", self.scene(scene)?.name);
            }
            return Ok(false);
        };
        let matrices = self.camera_matrices(camera, device.viewport().aspect_ratio())?;
        if clear {
            device.clear(matrices.clear_color);
        }

        let scene_matrix = self.scene(scene)?.transform.world_matrix(&Mat4::identity());
        for entity in self.scene_hierarchy(scene)? {
            if !self.is_active_in_hierarchy(entity)? {
                continue;
            }
            for id in self.components_with(entity, Capabilities::RENDERER)? {
                let ComponentKind::Renderer(renderer) = &self.component(id)?.kind else {
                    continue;
                };
                let cx = RenderContext {
                    world: self,
                    entity,
                    frame: *frame,
                    world_matrix: self.transform(entity)?.world_matrix(&scene_matrix)?,
                    view: matrices.view,
                    projection: matrices.projection,
                };
                renderer.render(&cx, device)?;
            }
        }
        Ok(true)
    }

    /// Post-render hook for every renderer drawn by the scene
    pub(crate) fn post_render_scene(&mut self, scene: SceneId, frame: &FrameContext) -> EngineResult<()> {
        for entity in self.scene_hierarchy(scene)? {
            if !self.entities.contains_key(entity) || !self.is_active_in_hierarchy(entity)? {
                continue;
            }
            for id in self.components_with(entity, Capabilities::RENDERER)? {
                if let ComponentKind::Renderer(renderer) = &mut self.component_mut(id)?.kind {
                    renderer.post_render(frame)?;
                }
            }
        }
        Ok(())
    }

    /// Dispose every game object of `scene` and the scene itself.
    ///
    /// The scene is unloaded first if it is loaded.
    pub fn dispose_scene(&mut self, scene: SceneId) -> EngineResult<()> {
        if self.scene(scene)?.placeholder {
            return Err(EngineError::InvalidOperation("cannot dispose the empty scene".to_string()));
        }
        if self.scene_manager.contains(scene) {
            self.scene_manager.unload(scene)?;
        }
        let entities = self.scene(scene)?.game_objects.clone();
        for entity in entities {
            if self.entities.contains_key(entity) {
                self.dispose_game_object(entity)?;
            }
        }
        if let Some(record) = self.scenes.remove(scene) {
            info!("Disposed scene '{}'", record.name);
        }
        Ok(())
    }
}
