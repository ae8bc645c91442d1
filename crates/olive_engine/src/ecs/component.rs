//! Component storage
//!
//! Components are stored as a closed set of kinds, chosen by the
//! [`Component`] impl of the attached type. Built-in kinds
//! (transform, camera) are stored by value; behaviors, renderers and
//! plain data are boxed trait objects. Typed lookups go through
//! [`ComponentKind::as_any`] so a query for a concrete type matches
//! whichever kind holds it.

use std::any::Any;

use bitflags::bitflags;

use crate::ecs::components::{Behavior, Camera, Transform};
use crate::foundation::collections::EntityId;
use crate::render::Renderer;

/// Upcast to [`Any`] for trait objects
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;

    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Concrete type name, for logging
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

bitflags! {
    /// What a component can do
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Spatial transform
        const TRANSFORM = 1 << 0;
        /// Per-tick behavior hooks
        const BEHAVIOR = 1 << 1;
        /// Draws during scene rendering
        const RENDERER = 1 << 2;
        /// View and projection source
        const CAMERA = 1 << 3;
        /// Plain data
        const DATA = 1 << 4;
    }
}

/// A type that can be attached to a game object.
///
/// [`into_kind`](Self::into_kind) decides which lifecycle the value gets:
/// behaviors are initialized and updated, renderers are drawn, plain data is
/// only stored. Use [`behavior_component!`](crate::behavior_component),
/// [`renderer_component!`](crate::renderer_component) or
/// [`data_component!`](crate::data_component) to implement it.
///
/// Types that do not implement it cannot be attached:
///
/// ```compile_fail
/// use olive_engine::prelude::*;
///
/// let mut world = World::new();
/// let scene = world.create_scene("main");
/// let entity = world.create_game_object(scene, "thing").unwrap();
/// world.add_component(entity, 5_i32).unwrap();
/// ```
pub trait Component: Any {
    /// Wrap `self` in the payload kind it is stored as
    fn into_kind(self) -> ComponentKind;
}

impl Component for Camera {
    fn into_kind(self) -> ComponentKind {
        ComponentKind::Camera(self)
    }
}

impl Component for Transform {
    fn into_kind(self) -> ComponentKind {
        ComponentKind::Transform(self)
    }
}

/// Implement [`Component`] for behavior types
#[macro_export]
macro_rules! behavior_component {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::ecs::Component for $ty {
            fn into_kind(self) -> $crate::ecs::ComponentKind {
                $crate::ecs::ComponentKind::behavior(self)
            }
        })+
    };
}

/// Implement [`Component`] for renderer types
#[macro_export]
macro_rules! renderer_component {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::ecs::Component for $ty {
            fn into_kind(self) -> $crate::ecs::ComponentKind {
                $crate::ecs::ComponentKind::renderer(self)
            }
        })+
    };
}

/// Implement [`Component`] for plain data types
#[macro_export]
macro_rules! data_component {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::ecs::Component for $ty {
            fn into_kind(self) -> $crate::ecs::ComponentKind {
                $crate::ecs::ComponentKind::Data(Box::new(self))
            }
        })+
    };
}

/// A behavior plus its lifecycle bookkeeping.
///
/// `behavior` is `None` while one of its own hooks is running.
pub struct BehaviorSlot {
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    pub(crate) started: bool,
}

impl BehaviorSlot {
    pub(crate) fn new(behavior: Box<dyn Behavior>) -> Self {
        Self {
            behavior: Some(behavior),
            started: false,
        }
    }
}

/// Component payload
pub enum ComponentKind {
    /// The entity's transform
    Transform(Transform),
    /// A camera
    Camera(Camera),
    /// A behavior with lifecycle hooks
    Behavior(BehaviorSlot),
    /// Something drawn by the scene
    Renderer(Box<dyn Renderer>),
    /// Anything else
    Data(Box<dyn Any>),
}

impl ComponentKind {
    /// Wrap a behavior
    pub fn behavior<B: Behavior>(behavior: B) -> Self {
        Self::Behavior(BehaviorSlot::new(Box::new(behavior)))
    }

    /// Wrap a renderer
    pub fn renderer<R: Renderer>(renderer: R) -> Self {
        Self::Renderer(Box::new(renderer))
    }

    /// Capability set of this kind
    pub const fn capabilities(&self) -> Capabilities {
        match self {
            Self::Transform(_) => Capabilities::TRANSFORM,
            Self::Camera(_) => Capabilities::CAMERA,
            Self::Behavior(_) => Capabilities::BEHAVIOR,
            Self::Renderer(_) => Capabilities::RENDERER,
            Self::Data(_) => Capabilities::DATA,
        }
    }

    /// The stored value as `Any`, or `None` for a behavior mid-hook
    pub fn as_any(&self) -> Option<&dyn Any> {
        match self {
            Self::Transform(transform) => Some(transform as &dyn Any),
            Self::Camera(camera) => Some(camera as &dyn Any),
            Self::Behavior(slot) => slot.behavior.as_deref().map(behavior_any),
            Self::Renderer(renderer) => Some(renderer_any(&**renderer)),
            Self::Data(data) => Some(&**data),
        }
    }

    /// Mutable counterpart of [`as_any`](Self::as_any)
    pub fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        match self {
            Self::Transform(transform) => Some(transform as &mut dyn Any),
            Self::Camera(camera) => Some(camera as &mut dyn Any),
            Self::Behavior(slot) => slot.behavior.as_deref_mut().map(behavior_any_mut),
            Self::Renderer(renderer) => Some(renderer_any_mut(&mut **renderer)),
            Self::Data(data) => Some(&mut **data),
        }
    }

    /// Type name for log output
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Transform(_) => "Transform",
            Self::Camera(_) => "Camera",
            Self::Behavior(slot) => slot
                .behavior
                .as_deref()
                .map_or("Behavior", |behavior| AsAny::type_name(behavior)),
            Self::Renderer(renderer) => AsAny::type_name(&**renderer),
            Self::Data(_) => "Data",
        }
    }
}

fn behavior_any(behavior: &dyn Behavior) -> &dyn Any {
    behavior.as_any()
}

fn behavior_any_mut(behavior: &mut dyn Behavior) -> &mut dyn Any {
    behavior.as_any_mut()
}

fn renderer_any(renderer: &dyn Renderer) -> &dyn Any {
    renderer.as_any()
}

fn renderer_any_mut(renderer: &mut dyn Renderer) -> &mut dyn Any {
    renderer.as_any_mut()
}

/// One attached component
pub struct ComponentSlot {
    pub(crate) owner: EntityId,
    pub(crate) kind: ComponentKind,
}

impl ComponentSlot {
    /// Owning entity
    pub const fn owner(&self) -> EntityId {
        self.owner
    }

    /// Payload
    pub const fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Typed view of the payload
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.kind.as_any()?.downcast_ref::<T>()
    }

    /// Typed mutable view of the payload
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.kind.as_any_mut()?.downcast_mut::<T>()
    }
}
