//! Arena handle types
//!
//! Every engine object lives in a [`SlotMap`] owned by the [`World`](crate::ecs::World).
//! Keys are generational, so a handle to a removed object never aliases a
//! newer one.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to a game object
    pub struct EntityId;

    /// Handle to an attached component
    pub struct ComponentId;

    /// Handle to a scene
    pub struct SceneId;

    /// Handle to a running coroutine
    pub struct CoroutineId;
}
