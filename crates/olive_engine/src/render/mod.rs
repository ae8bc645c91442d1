//! Render collaborator seam
//!
//! Scenes resolve a camera and hand every renderer its world, view and
//! projection matrices. Actual drawing goes through a [`RenderDevice`].

pub mod debug;
mod device;
mod model;

pub use device::{DrawCommand, DrawTransforms, RecordingDevice, RenderDevice, Viewport};
pub use model::{Aabb, Mesh, Model, ModelRenderer};

use crate::ecs::component::AsAny;
use crate::ecs::World;
use crate::engine::EngineResult;
use crate::foundation::collections::EntityId;
use crate::foundation::math::Mat4;
use crate::foundation::time::FrameContext;

/// Everything a renderer needs for one draw
pub struct RenderContext<'w> {
    /// The world, read-only during drawing
    pub world: &'w World,
    /// Entity being drawn
    pub entity: EntityId,
    /// Timing for the current frame
    pub frame: FrameContext,
    /// Entity transform composed with the scene transform
    pub world_matrix: Mat4,
    /// Camera view matrix
    pub view: Mat4,
    /// Camera projection matrix
    pub projection: Mat4,
}

/// Component capability: something the scene draws
#[allow(unused_variables)]
pub trait Renderer: AsAny {
    /// Issue draw calls for this frame
    fn render(&self, cx: &RenderContext<'_>, device: &mut dyn RenderDevice) -> EngineResult<()>;

    /// Called after every active scene has drawn
    fn post_render(&mut self, frame: &FrameContext) -> EngineResult<()> {
        Ok(())
    }

    /// World-space bounds under `world`, if the renderer has geometry
    fn bounds(&self, world: &Mat4) -> Option<Aabb> {
        None
    }
}
