//! Behavior components
//!
//! A behavior is a component with lifecycle hooks:
//!
//! 1. `initialize` runs synchronously when the behavior is attached, so it
//!    can see siblings attached before it but not those attached after.
//! 2. `start` runs once, when the owning scene initializes or right before
//!    the first `update`, whichever comes first.
//! 3. `update` runs every tick the entity is active in the hierarchy, in
//!    attachment order.
//!
//! While a hook runs, the behavior is detached from its slot, so it is not
//! visible to component lookups on its own entity.

use std::any::Any;

use crate::ecs::component::{AsAny, ComponentKind};
use crate::ecs::components::{TransformMut, TransformRef};
use crate::ecs::coroutine::Routine;
use crate::ecs::World;
use crate::engine::EngineResult;
use crate::foundation::collections::{ComponentId, CoroutineId, EntityId, SceneId};
use crate::foundation::time::FrameContext;

/// Lifecycle hooks for a behavior component
#[allow(unused_variables)]
pub trait Behavior: AsAny {
    /// Called once when the behavior is attached
    fn initialize(&mut self, cx: &mut BehaviorContext<'_>) -> EngineResult<()> {
        Ok(())
    }

    /// Called once before the first update
    fn start(&mut self, cx: &mut BehaviorContext<'_>) -> EngineResult<()> {
        Ok(())
    }

    /// Called every tick
    fn update(&mut self, cx: &mut BehaviorContext<'_>, frame: &FrameContext) -> EngineResult<()> {
        Ok(())
    }
}

/// What a running behavior hook can reach
pub struct BehaviorContext<'w> {
    /// The whole world, for anything not covered by the helpers
    pub world: &'w mut World,
    entity: EntityId,
    component: ComponentId,
}

impl<'w> BehaviorContext<'w> {
    pub(crate) fn new(world: &'w mut World, entity: EntityId, component: ComponentId) -> Self {
        Self { world, entity, component }
    }

    /// Entity the behavior is attached to
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// The behavior's own component handle
    pub const fn component(&self) -> ComponentId {
        self.component
    }

    /// Scene owning the entity
    pub fn scene(&self) -> EngineResult<SceneId> {
        self.world.scene_of(self.entity)
    }

    /// The entity's transform
    pub fn transform(&self) -> EngineResult<TransformRef<'_>> {
        self.world.transform(self.entity)
    }

    /// The entity's transform, mutably
    pub fn transform_mut(&mut self) -> EngineResult<TransformMut<'_>> {
        self.world.transform_mut(self.entity)
    }

    /// First sibling component of type `T`
    pub fn get_component<T: Any>(&self) -> EngineResult<Option<&T>> {
        self.world.get_component::<T>(self.entity)
    }

    /// First sibling component of type `T`, mutably
    pub fn get_component_mut<T: Any>(&mut self) -> EngineResult<Option<&mut T>> {
        self.world.get_component_mut::<T>(self.entity)
    }

    /// Run `routine` on the entity's coroutine scheduler
    pub fn start_coroutine<R: Routine>(&mut self, routine: R) -> EngineResult<CoroutineId> {
        self.world.start_coroutine(self.entity, routine)
    }

    /// Stop a coroutine on the entity
    pub fn stop_coroutine(&mut self, coroutine: CoroutineId) -> EngineResult<bool> {
        self.world.stop_coroutine(self.entity, coroutine)
    }
}

impl World {
    /// Runs `hook` on a behavior with the behavior temporarily detached.
    ///
    /// Returns `Ok(false)` when the component is not a behavior or is
    /// already running a hook further up the stack. A behavior disposed by
    /// its own hook is dropped instead of being put back.
    pub(crate) fn with_behavior<F>(&mut self, id: ComponentId, hook: F) -> EngineResult<bool>
    where
        F: FnOnce(&mut dyn Behavior, &mut BehaviorContext<'_>) -> EngineResult<()>,
    {
        let slot = self.component_mut(id)?;
        let owner = slot.owner;
        let ComponentKind::Behavior(behavior_slot) = &mut slot.kind else {
            return Ok(false);
        };
        let Some(mut behavior) = behavior_slot.behavior.take() else {
            return Ok(false);
        };

        let result = {
            let mut cx = BehaviorContext::new(self, owner, id);
            hook(&mut *behavior, &mut cx)
        };

        if let Some(slot) = self.components.get_mut(id) {
            if let ComponentKind::Behavior(behavior_slot) = &mut slot.kind {
                behavior_slot.behavior = Some(behavior);
            }
        }
        result.map(|()| true)
    }

    /// Runs `start` on a behavior that has not started yet
    pub(crate) fn start_behavior(&mut self, id: ComponentId) -> EngineResult<()> {
        let slot = self.component_mut(id)?;
        let ComponentKind::Behavior(behavior_slot) = &mut slot.kind else {
            return Ok(());
        };
        if behavior_slot.started {
            return Ok(());
        }
        behavior_slot.started = true;
        self.with_behavior(id, |behavior, cx| behavior.start(cx))?;
        Ok(())
    }
}
