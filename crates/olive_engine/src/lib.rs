//! # Olive Engine
//!
//! The object model of a small real-time engine: game objects composed of
//! components, a transform hierarchy, behaviors with coroutines, and
//! interchangeable scene management strategies.
//!
//! ## Features
//!
//! - **Game objects**: named component containers with exactly one transform
//! - **Behaviors**: `initialize`/`start`/`update` hooks and per-entity coroutines
//! - **Scenes**: simple, additive and stacked scene managers
//! - **Disposal safety**: every stale handle fails with a disposed error
//! - **Headless rendering**: a recording device for tests and tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use olive_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let scene = engine.world.create_scene("main");
//!         let camera = engine.world.create_game_object(scene, "camera")?;
//!         engine.world.add_component(camera, Camera::default())?;
//!         engine.world.load_scene(scene)?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _frame: &FrameContext) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::new("My App");
//!     Engine::run(config, Box::new(RecordingDevice::default()), &mut MyApp)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod assets;
pub mod config;
pub mod ecs;
pub mod foundation;
pub mod render;
pub mod scene;

mod application;
mod engine;

pub use application::{AppError, AppEvent, Application};
pub use engine::{Engine, EngineError, EngineResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::ContentManager,
        core::{ApplicationConfig, DisplayMode, EngineConfig, TimingConfig, WindowConfig},
        ecs::components::{Behavior, BehaviorContext, Camera, TransformSpace, MAIN_CAMERA_TAG},
        ecs::coroutine::from_fn,
        ecs::{Component, Routine, RoutineContext, Step, WaitSeconds, WaitTicks, World},
        foundation::collections::{ComponentId, CoroutineId, EntityId, SceneId},
        foundation::color::Color,
        foundation::math::{direction, Quat, Vec3},
        foundation::time::FrameContext,
        render::{Model, ModelRenderer, RecordingDevice, RenderDevice},
        scene::{SceneContext, SceneLoadMode, SceneLogic, SceneManagerKind},
        AppError, AppEvent, Application, Engine, EngineError, EngineResult,
    };
}
