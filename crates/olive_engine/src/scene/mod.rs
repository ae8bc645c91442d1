//! Scene management
//!
//! Scenes own game objects; a [`SceneManager`] strategy decides which
//! scenes are live each tick.
//!
//! ```text
//! Engine loop
//!      ↓
//! SceneManager (Simple | Additive | Stacked)
//!      ↓
//! Scene → GameObject → Behavior / Coroutine
//! ```

mod scene;
mod scene_manager;
mod scene_transform;

#[cfg(test)]
mod tests;

pub use scene::{Scene, SceneContext, SceneLogic};
pub use scene_manager::{SceneLoadMode, SceneManager, SceneManagerKind};
pub use scene_transform::SceneTransform;
