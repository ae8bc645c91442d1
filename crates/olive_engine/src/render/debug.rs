//! Immediate-mode debug drawing
//!
//! Lines and boxes are drawn in world space through the main camera. With
//! no main camera nothing is drawn.

use crate::ecs::World;
use crate::engine::EngineResult;
use crate::foundation::color::Color;
use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::render::{DrawTransforms, RenderDevice};

/// Oriented box for [`draw_box`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugBox {
    /// Center in world space
    pub origin: Vec3,
    /// Half-size along each local axis
    pub half_extents: Vec3,
    /// Orientation about the center
    pub rotation: Quat,
}

impl DebugBox {
    /// Oriented box
    pub const fn new(origin: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        Self {
            origin,
            half_extents,
            rotation,
        }
    }

    /// Unrotated box
    pub fn axis_aligned(origin: Vec3, half_extents: Vec3) -> Self {
        Self::new(origin, half_extents, Quat::identity())
    }

    /// World-space corners: the four front corners (toward `-Z`) clockwise
    /// from top-left, then the four back corners in the same order
    pub fn corners(&self) -> [Vec3; 8] {
        let (x, y, z) = (self.half_extents.x, self.half_extents.y, self.half_extents.z);
        [
            Vec3::new(-x, y, -z),
            Vec3::new(x, y, -z),
            Vec3::new(x, -y, -z),
            Vec3::new(-x, -y, -z),
            Vec3::new(-x, y, z),
            Vec3::new(x, y, z),
            Vec3::new(x, -y, z),
            Vec3::new(-x, -y, z),
        ]
        .map(|corner| self.origin + self.rotation * corner)
    }

    /// The twelve edges as corner pairs
    pub fn edges(&self) -> [(Vec3, Vec3); 12] {
        let c = self.corners();
        [
            (c[0], c[1]),
            (c[1], c[2]),
            (c[2], c[3]),
            (c[3], c[0]),
            (c[4], c[5]),
            (c[5], c[6]),
            (c[6], c[7]),
            (c[7], c[4]),
            (c[0], c[4]),
            (c[1], c[5]),
            (c[2], c[6]),
            (c[3], c[7]),
        ]
    }
}

fn main_camera_transforms(world: &World, device: &dyn RenderDevice) -> EngineResult<Option<DrawTransforms>> {
    let Some(camera) = world.main_camera()? else {
        return Ok(None);
    };
    let matrices = world.camera_matrices(camera, device.viewport().aspect_ratio())?;
    Ok(Some(DrawTransforms {
        world: Mat4::identity(),
        view: matrices.view,
        projection: matrices.projection,
    }))
}

/// Draw a line through the main camera. Returns whether it was drawn.
pub fn draw_line(
    world: &World,
    device: &mut dyn RenderDevice,
    start: Vec3,
    end: Vec3,
    color: Color,
) -> EngineResult<bool> {
    let Some(transforms) = main_camera_transforms(world, device)? else {
        return Ok(false);
    };
    device.draw_line(start, end, color, &transforms);
    Ok(true)
}

/// Draw the twelve edges of `bounds` through the main camera
pub fn draw_box(world: &World, device: &mut dyn RenderDevice, bounds: &DebugBox, color: Color) -> EngineResult<bool> {
    let Some(transforms) = main_camera_transforms(world, device)? else {
        return Ok(false);
    };
    for (start, end) in bounds.edges() {
        device.draw_line(start, end, color, &transforms);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Camera, MAIN_CAMERA_TAG};
    use crate::foundation::math::{direction, rotation};
    use crate::render::RecordingDevice;
    use approx::assert_relative_eq;

    #[test]
    fn test_corners_and_edges() {
        let bounds = DebugBox::axis_aligned(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0));
        let corners = bounds.corners();
        assert_relative_eq!(corners[0], Vec3::new(0.0, 2.0, -3.0));
        assert_relative_eq!(corners[6], Vec3::new(2.0, -2.0, 3.0));

        for (start, end) in bounds.edges() {
            let differing = (0..3).filter(|&axis| (start[axis] - end[axis]).abs() > 1e-6).count();
            assert_eq!(differing, 1);
        }
    }

    #[test]
    fn test_rotated_box_corners() {
        let bounds = DebugBox::new(
            Vec3::zeros(),
            Vec3::new(1.0, 1.0, 2.0),
            rotation::from_axis_degrees(&direction::up(), 90.0),
        );
        let front_center = (bounds.corners()[0] + bounds.corners()[2]) * 0.5;
        assert_relative_eq!(front_center, Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_requires_main_camera() {
        let mut world = World::new();
        let scene = world.create_scene("debug");
        let camera = world.create_game_object(scene, "camera").unwrap();
        world.add_component(camera, Camera::default()).unwrap();
        world.load_scene(scene).unwrap();
        let mut device = RecordingDevice::default();

        let bounds = DebugBox::axis_aligned(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        assert!(!draw_box(&world, &mut device, &bounds, Color::GREEN).unwrap());
        assert_eq!(device.line_count(), 0);

        world.add_tag(camera, MAIN_CAMERA_TAG).unwrap();
        assert!(draw_box(&world, &mut device, &bounds, Color::GREEN).unwrap());
        assert!(draw_line(&world, &mut device, Vec3::zeros(), Vec3::x(), Color::RED).unwrap());
        assert_eq!(device.line_count(), 13);
    }
}
