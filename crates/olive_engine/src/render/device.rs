//! Render device seam
//!
//! The engine never talks to a GPU directly. Scenes issue clears, model
//! draws and debug lines through [`RenderDevice`]; a backend implements it.
//! [`RecordingDevice`] keeps the calls in memory for tests and headless
//! hosts.

use log::trace;

use crate::ecs::component::AsAny;
use crate::engine::EngineResult;
use crate::foundation::color::Color;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::Model;

/// Back-buffer dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Viewport of the given size
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, or 1 for a degenerate viewport
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Matrices for one draw call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTransforms {
    /// Object to world
    pub world: Mat4,
    /// World to view
    pub view: Mat4,
    /// View to clip
    pub projection: Mat4,
}

/// Graphics backend as seen by the engine
pub trait RenderDevice: AsAny {
    /// Current back-buffer size
    fn viewport(&self) -> Viewport;

    /// Resize the back buffer
    fn set_viewport(&mut self, viewport: Viewport);

    /// Clear the frame to `color`
    fn clear(&mut self, color: Color);

    /// Submit every mesh of `model`
    fn draw_model(&mut self, model: &Model, transforms: &DrawTransforms) -> EngineResult<()>;

    /// Draw a single world-space line segment
    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Color, transforms: &DrawTransforms);
}

/// A call captured by [`RecordingDevice`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Frame cleared
    Clear(Color),
    /// Model submitted
    Model {
        /// Name of the drawn model
        name: String,
        /// Matrices it was drawn with
        transforms: DrawTransforms,
    },
    /// Debug line submitted
    Line {
        /// Start point in world space
        start: Vec3,
        /// End point in world space
        end: Vec3,
        /// Line color
        color: Color,
    },
}

/// Device that records calls instead of drawing
#[derive(Debug, Clone)]
pub struct RecordingDevice {
    viewport: Viewport,
    commands: Vec<DrawCommand>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl RecordingDevice {
    /// Recording device with a `width` by `height` back buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            commands: Vec::new(),
        }
    }

    /// Everything recorded so far
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the device empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Colors of every clear, in order
    pub fn clears(&self) -> Vec<Color> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Clear(color) => Some(*color),
                _ => None,
            })
            .collect()
    }

    /// Names of every drawn model, in order
    pub fn drawn_models(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Model { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of debug lines drawn
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Line { .. }))
            .count()
    }
}

impl RenderDevice for RecordingDevice {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn clear(&mut self, color: Color) {
        trace!("clear {color:?}");
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_model(&mut self, model: &Model, transforms: &DrawTransforms) -> EngineResult<()> {
        trace!("draw model '{}'", model.name());
        self.commands.push(DrawCommand::Model {
            name: model.name().to_string(),
            transforms: *transforms,
        });
        Ok(())
    }

    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Color, _transforms: &DrawTransforms) {
        self.commands.push(DrawCommand::Line { start, end, color });
    }
}
