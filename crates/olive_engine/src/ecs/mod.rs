//! Object model
//!
//! Game objects own components, exactly one of which is a transform.
//! Behaviors get per-tick hooks and can run coroutines. All objects live in
//! the [`World`] and are addressed by generational handles.

pub mod component;
pub mod components;
pub mod coroutine;
pub mod entity;
pub mod registry;
pub mod world;

#[cfg(test)]
mod tests;

pub use component::{AsAny, Capabilities, Component, ComponentKind, ComponentSlot};
pub use coroutine::{Routine, RoutineContext, Step, WaitSeconds, WaitTicks};
pub use entity::GameObject;
pub use registry::ComponentRegistry;
pub use world::World;
