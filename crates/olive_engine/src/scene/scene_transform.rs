//! Scene-level transform
//!
//! Offsets a whole scene's contents. There is no hierarchy at this level:
//! the parent matrix is supplied by the caller, and the result is handed to
//! renderers as the outer world matrix for every entity in the scene.

use crate::foundation::math::{direction, matrix, rotation, Mat4, Quat, Vec3};

/// Position, rotation and scale of a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTransform {
    /// Offset of the scene origin
    pub position: Vec3,
    /// Orientation of the scene
    pub rotation: Quat,
    /// Scale of the scene
    pub scale: Vec3,
}

impl Default for SceneTransform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl SceneTransform {
    /// Identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotation as Euler degrees (`x` pitch, `y` yaw, `z` roll)
    pub fn euler_angles(&self) -> Vec3 {
        rotation::to_euler_degrees(&self.rotation)
    }

    /// Set the rotation from Euler degrees
    pub fn set_euler_angles(&mut self, euler: Vec3) {
        self.rotation = rotation::from_euler_degrees(euler);
    }

    /// Forward axis of the scene
    pub fn forward(&self) -> Vec3 {
        self.rotation * direction::forward()
    }

    /// Move the scene origin
    pub fn translate(&mut self, translation: Vec3) {
        self.position += translation;
    }

    /// Compose `rotation` onto the current rotation
    pub fn rotate(&mut self, rotation: Quat) {
        self.rotation *= rotation;
    }

    /// Compose a rotation given as Euler degrees
    pub fn rotate_euler(&mut self, euler: Vec3) {
        self.rotate(rotation::from_euler_degrees(euler));
    }

    /// Compose a rotation of `degrees` about `axis`
    pub fn rotate_axis(&mut self, axis: Vec3, degrees: f32) {
        self.rotate(rotation::from_axis_degrees(&axis, degrees));
    }

    /// Swing the scene origin `degrees` about `axis` through `point`
    pub fn rotate_around(&mut self, point: Vec3, axis: Vec3, degrees: f32) {
        let turn = rotation::from_axis_degrees(&axis, degrees);
        self.position = point + turn * (self.position - point);
    }

    /// Face `target` with world up
    pub fn look_at(&mut self, target: Vec3) {
        self.look_at_with_up(target, direction::up());
    }

    /// Face `target` using `up` as the up reference
    pub fn look_at_with_up(&mut self, target: Vec3, up: Vec3) {
        self.rotation = rotation::look_at(&self.position, &target, &up);
    }

    /// Scale, then rotation, then translation, inside `parent`
    pub fn world_matrix(&self, parent: &Mat4) -> Mat4 {
        parent * matrix::trs(&self.position, &self.rotation, &self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_default_is_identity() {
        let transform = SceneTransform::default();
        assert_relative_eq!(transform.world_matrix(&Mat4::identity()), Mat4::identity());
    }

    #[test]
    fn test_world_matrix_applies_scale_rotation_translation() {
        let mut transform = SceneTransform::new();
        transform.scale = Vec3::new(2.0, 2.0, 2.0);
        transform.rotate_axis(direction::up(), 90.0);
        transform.translate(Vec3::new(0.0, 5.0, 0.0));

        let point = transform
            .world_matrix(&Mat4::identity())
            .transform_point(&Point3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(point.coords, Vec3::new(2.0, 5.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_rotate_around_keeps_orientation() {
        let mut transform = SceneTransform::new();
        transform.position = Vec3::new(0.0, 0.0, -2.0);
        transform.rotate_around(Vec3::zeros(), direction::up(), 90.0);

        assert_relative_eq!(transform.position, Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(transform.forward(), direction::forward(), epsilon = EPSILON);
    }

    #[test]
    fn test_euler_round_trip() {
        let mut transform = SceneTransform::new();
        transform.set_euler_angles(Vec3::new(10.0, 20.0, 30.0));
        assert_relative_eq!(transform.euler_angles(), Vec3::new(10.0, 20.0, 30.0), epsilon = 1e-3);
    }

    #[test]
    fn test_look_at_points_forward_at_target() {
        let mut transform = SceneTransform::new();
        transform.look_at(Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(transform.forward(), direction::right(), epsilon = EPSILON);
    }
}
