//! Built-in components

pub mod behavior;
pub mod camera;
pub mod transform;

pub use behavior::{Behavior, BehaviorContext};
pub use camera::{Camera, CameraMatrices, MAIN_CAMERA_TAG};
pub use transform::{Transform, TransformMut, TransformRef, TransformSpace};
