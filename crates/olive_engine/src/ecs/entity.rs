//! Game objects
//!
//! A game object is a named container of components owned by exactly one
//! scene. It always carries one transform, attached at creation and only
//! replaced through [`World::set_transform_space`].

use std::any::Any;

use log::{debug, trace};

use crate::ecs::component::{Capabilities, Component, ComponentKind, ComponentSlot};
use crate::ecs::components::{Behavior, Transform, TransformSpace};
use crate::ecs::World;
use crate::engine::{EngineError, EngineResult};
use crate::foundation::collections::{ComponentId, CoroutineId, EntityId, SceneId};
use crate::foundation::time::FrameContext;
use crate::render::Renderer;

/// Entity record
#[derive(Debug)]
pub struct GameObject {
    pub(crate) name: String,
    pub(crate) active_self: bool,
    pub(crate) scene: SceneId,
    pub(crate) transform: ComponentId,
    pub(crate) components: Vec<ComponentId>,
    pub(crate) coroutines: Vec<CoroutineId>,
    pub(crate) tags: Vec<String>,
}

impl World {
    /// Create a game object with a spatial transform in `scene`
    pub fn create_game_object(&mut self, scene: SceneId, name: impl Into<String>) -> EngineResult<EntityId> {
        self.create_game_object_in_space(scene, name, TransformSpace::Spatial)
    }

    /// Create a game object whose transform is constrained to `space`
    pub fn create_game_object_in_space(
        &mut self,
        scene: SceneId,
        name: impl Into<String>,
        space: TransformSpace,
    ) -> EngineResult<EntityId> {
        if self.scene(scene)?.placeholder {
            return Err(EngineError::InvalidOperation(
                "cannot add a game object to the empty scene".to_string(),
            ));
        }

        let name = name.into();
        let entity = self.entities.insert(GameObject {
            name,
            active_self: true,
            scene,
            transform: ComponentId::default(),
            components: Vec::new(),
            coroutines: Vec::new(),
            tags: Vec::new(),
        });
        let transform = self.components.insert(ComponentSlot {
            owner: entity,
            kind: ComponentKind::Transform(Transform::new(space)),
        });
        let record = self.entity_mut(entity)?;
        record.transform = transform;
        record.components.push(transform);
        self.scene_mut(scene)?.add_game_object(entity);

        debug!("Created game object '{}' ({entity:?})", self.entity(entity)?.name);
        Ok(entity)
    }

    /// Display name
    pub fn name(&self, entity: EntityId) -> EngineResult<&str> {
        Ok(&self.entity(entity)?.name)
    }

    /// Rename a game object
    pub fn set_name(&mut self, entity: EntityId, name: impl Into<String>) -> EngineResult<()> {
        self.entity_mut(entity)?.name = name.into();
        Ok(())
    }

    /// Scene that owns the game object
    pub fn scene_of(&self, entity: EntityId) -> EngineResult<SceneId> {
        Ok(self.entity(entity)?.scene)
    }

    /// Handle of the game object's transform component
    pub fn transform_id(&self, entity: EntityId) -> EngineResult<ComponentId> {
        Ok(self.entity(entity)?.transform)
    }

    /// Attached components in attachment order
    pub fn components(&self, entity: EntityId) -> EngineResult<&[ComponentId]> {
        Ok(&self.entity(entity)?.components)
    }

    /// The game object's own active flag
    pub fn is_active_self(&self, entity: EntityId) -> EngineResult<bool> {
        Ok(self.entity(entity)?.active_self)
    }

    /// Set the game object's own active flag
    pub fn set_active(&mut self, entity: EntityId, active: bool) -> EngineResult<()> {
        self.entity_mut(entity)?.active_self = active;
        Ok(())
    }

    /// Active flag combined with every ancestor's
    pub fn is_active_in_hierarchy(&self, entity: EntityId) -> EngineResult<bool> {
        let record = self.entity(entity)?;
        if !record.active_self {
            return Ok(false);
        }
        match self.transform_data(record.transform)?.parent_id() {
            Some(parent) => self.is_active_in_hierarchy(self.component(parent)?.owner),
            None => Ok(true),
        }
    }

    /// Add a tag; adding an existing tag does nothing
    pub fn add_tag(&mut self, entity: EntityId, tag: impl Into<String>) -> EngineResult<()> {
        let tag = tag.into();
        let record = self.entity_mut(entity)?;
        if !record.tags.contains(&tag) {
            record.tags.push(tag);
        }
        Ok(())
    }

    /// Remove a tag, returning whether it was present
    pub fn remove_tag(&mut self, entity: EntityId, tag: &str) -> EngineResult<bool> {
        let record = self.entity_mut(entity)?;
        let before = record.tags.len();
        record.tags.retain(|existing| existing != tag);
        Ok(record.tags.len() != before)
    }

    /// Whether the game object carries `tag`
    pub fn has_tag(&self, entity: EntityId, tag: &str) -> EngineResult<bool> {
        Ok(self.entity(entity)?.tags.iter().any(|existing| existing == tag))
    }

    /// Tags in the order they were added
    pub fn tags(&self, entity: EntityId) -> EngineResult<&[String]> {
        Ok(&self.entity(entity)?.tags)
    }

    /// Attach a component payload.
    ///
    /// A behavior's `initialize` hook runs before this returns. A failed
    /// attach leaves the game object unchanged.
    pub fn attach(&mut self, entity: EntityId, kind: ComponentKind) -> EngineResult<ComponentId> {
        self.entity(entity)?;
        if matches!(kind, ComponentKind::Transform(_)) {
            return Err(EngineError::InvalidArgument(
                "a game object cannot have more than one transform".to_string(),
            ));
        }

        let is_behavior = matches!(kind, ComponentKind::Behavior(_));
        let type_name = kind.type_name();
        let id = self.components.insert(ComponentSlot { owner: entity, kind });
        self.entity_mut(entity)?.components.push(id);
        debug!("Attached {type_name} ({id:?}) to {entity:?}");

        if is_behavior {
            if let Err(error) = self.with_behavior(id, |behavior, cx| behavior.initialize(cx)) {
                if self.entities.contains_key(entity) && self.components.contains_key(id) {
                    self.detach_component(entity, id, false)?;
                }
                return Err(error);
            }
        }
        Ok(id)
    }

    /// Attach `value` as the kind its [`Component`] impl selects. A
    /// behavior is initialized before this returns.
    pub fn add_component<T: Component>(&mut self, entity: EntityId, value: T) -> EngineResult<ComponentId> {
        self.attach(entity, value.into_kind())
    }

    /// Attach a default-constructed `T`
    pub fn add_component_default<T: Component + Default>(&mut self, entity: EntityId) -> EngineResult<ComponentId> {
        self.add_component(entity, T::default())
    }

    /// Attach the value produced by `factory`
    pub fn add_component_with<T, F>(&mut self, entity: EntityId, factory: F) -> EngineResult<ComponentId>
    where
        T: Component,
        F: FnOnce() -> T,
    {
        self.entity(entity)?;
        self.add_component(entity, factory())
    }

    /// Attach a behavior and run its `initialize` hook
    pub fn add_behavior<B: Behavior>(&mut self, entity: EntityId, behavior: B) -> EngineResult<ComponentId> {
        self.attach(entity, ComponentKind::behavior(behavior))
    }

    /// Attach a renderer
    pub fn add_renderer<R: Renderer>(&mut self, entity: EntityId, renderer: R) -> EngineResult<ComponentId> {
        self.attach(entity, ComponentKind::renderer(renderer))
    }

    /// Attach a component by its registered type name
    pub fn add_component_by_name(&mut self, entity: EntityId, type_name: &str) -> EngineResult<ComponentId> {
        self.entity(entity)?;
        let kind = self.registry().create(type_name)?;
        self.attach(entity, kind)
    }

    /// First component of type `T`
    pub fn find_component<T: Any>(&self, entity: EntityId) -> EngineResult<Option<ComponentId>> {
        Ok(self
            .entity(entity)?
            .components
            .iter()
            .copied()
            .find(|&id| self.components.get(id).and_then(ComponentSlot::downcast_ref::<T>).is_some()))
    }

    /// Every component of type `T`, in attachment order
    pub fn find_components<T: Any>(&self, entity: EntityId) -> EngineResult<Vec<ComponentId>> {
        Ok(self
            .entity(entity)?
            .components
            .iter()
            .copied()
            .filter(|&id| self.components.get(id).and_then(ComponentSlot::downcast_ref::<T>).is_some())
            .collect())
    }

    /// Components having any of `capabilities`, in attachment order
    pub fn components_with(&self, entity: EntityId, capabilities: Capabilities) -> EngineResult<Vec<ComponentId>> {
        Ok(self
            .entity(entity)?
            .components
            .iter()
            .copied()
            .filter(|&id| {
                self.components
                    .get(id)
                    .is_some_and(|slot| slot.kind.capabilities().intersects(capabilities))
            })
            .collect())
    }

    /// First component of type `T`
    pub fn get_component<T: Any>(&self, entity: EntityId) -> EngineResult<Option<&T>> {
        Ok(self
            .find_component::<T>(entity)?
            .and_then(|id| self.components.get(id))
            .and_then(ComponentSlot::downcast_ref::<T>))
    }

    /// First component of type `T`, mutably
    pub fn get_component_mut<T: Any>(&mut self, entity: EntityId) -> EngineResult<Option<&mut T>> {
        let Some(id) = self.find_component::<T>(entity)? else {
            return Ok(None);
        };
        Ok(self.components.get_mut(id).and_then(ComponentSlot::downcast_mut::<T>))
    }

    /// Every component of type `T`, in attachment order
    pub fn get_components<T: Any>(&self, entity: EntityId) -> EngineResult<Vec<&T>> {
        Ok(self
            .find_components::<T>(entity)?
            .into_iter()
            .filter_map(|id| self.components.get(id))
            .filter_map(ComponentSlot::downcast_ref::<T>)
            .collect())
    }

    /// First component of type `T`, or a missing-component error
    pub fn require_component<T: Any>(&self, entity: EntityId) -> EngineResult<&T> {
        self.get_component::<T>(entity)?
            .ok_or(EngineError::MissingComponent(std::any::type_name::<T>()))
    }

    /// A specific component viewed as `T`
    pub fn component_as<T: Any>(&self, id: ComponentId) -> EngineResult<&T> {
        self.component(id)?.downcast_ref::<T>().ok_or_else(|| {
            EngineError::InvalidArgument(format!("component is not a {}", std::any::type_name::<T>()))
        })
    }

    /// A specific component viewed as `T`, mutably
    pub fn component_as_mut<T: Any>(&mut self, id: ComponentId) -> EngineResult<&mut T> {
        self.component_mut(id)?.downcast_mut::<T>().ok_or_else(|| {
            EngineError::InvalidArgument(format!("component is not a {}", std::any::type_name::<T>()))
        })
    }

    /// Game object a component is attached to
    pub fn owner_of(&self, component: ComponentId) -> EngineResult<EntityId> {
        Ok(self.component(component)?.owner)
    }

    /// Detach and dispose a component. The transform cannot be removed.
    pub fn remove_component(&mut self, entity: EntityId, component: ComponentId) -> EngineResult<()> {
        self.detach_component(entity, component, false)
    }

    pub(crate) fn detach_component(
        &mut self,
        entity: EntityId,
        component: ComponentId,
        force: bool,
    ) -> EngineResult<()> {
        let record = self.entity(entity)?;
        if self.component(component)?.owner != entity {
            return Err(EngineError::InvalidArgument(
                "component is not attached to this game object".to_string(),
            ));
        }
        if component == record.transform && !force {
            return Err(EngineError::InvalidOperation(
                "cannot remove the transform of a game object".to_string(),
            ));
        }

        self.entity_mut(entity)?.components.retain(|&id| id != component);
        if let Some(slot) = self.components.remove(component) {
            debug!("Removed {} ({component:?}) from {entity:?}", slot.kind.type_name());
        }
        Ok(())
    }

    /// Dispose a component through its owner
    pub fn dispose_component(&mut self, component: ComponentId) -> EngineResult<()> {
        let owner = self.component(component)?.owner;
        self.remove_component(owner, component)
    }

    /// Replace the transform with one constrained to `space`.
    ///
    /// Local values carry over (re-constrained), and children are linked
    /// to the replacement. Returns the new transform handle.
    pub fn set_transform_space(&mut self, entity: EntityId, space: TransformSpace) -> EngineResult<ComponentId> {
        let old = self.entity(entity)?.transform;
        let current = self.transform_data(old)?;
        if current.space() == space {
            return Ok(old);
        }
        let replacement = current.converted(space);
        let children = self.child_entities(old)?;

        self.detach_component(entity, old, true)?;
        let new = self.components.insert(ComponentSlot {
            owner: entity,
            kind: ComponentKind::Transform(replacement),
        });
        let record = self.entity_mut(entity)?;
        record.transform = new;
        record.components.insert(0, new);

        for child in children {
            let child_transform = self.entity(child)?.transform;
            self.transform_data_mut(child_transform)?.reparent(Some(new));
        }
        debug!("Switched {entity:?} to a {space:?} transform");
        Ok(new)
    }

    /// Dispose a game object, its components and its coroutines.
    ///
    /// Children are detached and become top-level.
    pub fn dispose_game_object(&mut self, entity: EntityId) -> EngineResult<()> {
        let record = self.entity(entity)?;
        let transform = record.transform;
        let scene = record.scene;
        let components = record.components.clone();
        let coroutines = record.coroutines.clone();

        for child in self.child_entities(transform)? {
            let child_transform = self.entity(child)?.transform;
            self.transform_data_mut(child_transform)?.reparent(None);
        }
        for coroutine in coroutines {
            self.coroutines.remove(coroutine);
        }
        for component in components {
            self.components.remove(component);
        }
        if let Some(scene) = self.scenes.get_mut(scene) {
            scene.game_objects.retain(|&id| id != entity);
        }
        if let Some(record) = self.entities.remove(entity) {
            debug!("Disposed game object '{}' ({entity:?})", record.name);
        }
        Ok(())
    }

    /// Start every behavior that has not started yet
    pub(crate) fn initialize_game_object(&mut self, entity: EntityId) -> EngineResult<()> {
        for behavior in self.components_with(entity, Capabilities::BEHAVIOR)? {
            if !self.entities.contains_key(entity) {
                break;
            }
            if self.components.contains_key(behavior) {
                self.start_behavior(behavior)?;
            }
        }
        Ok(())
    }

    /// One tick: behaviors in attachment order, then one step per coroutine
    pub(crate) fn update_game_object(&mut self, entity: EntityId, frame: &FrameContext) -> EngineResult<()> {
        trace!("Updating {entity:?}");
        for behavior in self.components_with(entity, Capabilities::BEHAVIOR)? {
            if !self.entities.contains_key(entity) {
                return Ok(());
            }
            if !self.components.contains_key(behavior) {
                continue;
            }
            self.start_behavior(behavior)?;
            if self.components.contains_key(behavior) {
                self.with_behavior(behavior, |hooks, cx| hooks.update(cx, frame))?;
            }
        }

        // Coroutines started during this pass take their first step next tick
        let Some(record) = self.entities.get(entity) else {
            return Ok(());
        };
        let running = record.coroutines.clone();
        for coroutine in running {
            if !self.entities.contains_key(entity) {
                return Ok(());
            }
            if self.coroutines.contains_key(coroutine) {
                self.advance_coroutine(coroutine, frame)?;
            }
        }
        Ok(())
    }
}
