//! # Camera Component
//!
//! A camera takes its eye position and orientation from the transform of
//! the entity it is attached to. The projection is either perspective or
//! orthographic and is built against the viewport aspect ratio at draw
//! time.
//!
//! # Coordinate System
//! Right-handed, Y-up. The camera looks down its transform's forward axis
//! (`-Z` in local space).

use crate::ecs::component::ComponentKind;
use crate::ecs::World;
use crate::engine::{EngineError, EngineResult};
use crate::foundation::collections::ComponentId;
use crate::foundation::color::Color;
use crate::foundation::math::{matrix, utils, Mat4, Vec3};

/// Tag marking the camera every loaded scene should render through
pub const MAIN_CAMERA_TAG: &str = "MainCamera";

/// Camera settings
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Background the frame is cleared to
    pub clear_color: Color,

    /// Vertical field of view in degrees (perspective only)
    pub field_of_view: f32,

    /// Distance to near clipping plane
    pub near_plane: f32,

    /// Distance to far clipping plane
    pub far_plane: f32,

    /// Use an orthographic projection
    pub orthographic: bool,

    /// Height of the view volume in world units (orthographic only)
    pub orthographic_size: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            clear_color: Color::CORNFLOWER_BLUE,
            field_of_view: 90.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            orthographic: false,
            orthographic_size: 1.0,
        }
    }
}

impl Camera {
    /// Perspective camera with the default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clear color
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Set the vertical field of view in degrees
    pub fn with_field_of_view(mut self, degrees: f32) -> Self {
        self.field_of_view = degrees;
        self
    }

    /// Switch to an orthographic projection `size` units tall
    pub fn with_orthographic(mut self, size: f32) -> Self {
        self.orthographic = true;
        self.orthographic_size = size;
        self
    }

    /// Projection matrix for a viewport with the given aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        if self.orthographic {
            matrix::orthographic(self.orthographic_size, aspect, self.near_plane, self.far_plane)
        } else {
            matrix::perspective(
                utils::deg_to_rad(self.field_of_view),
                aspect,
                self.near_plane,
                self.far_plane,
            )
        }
    }
}

/// View state resolved for one draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    /// Camera component that produced these matrices
    pub camera: ComponentId,
    /// World-space eye position
    pub position: Vec3,
    /// World to view
    pub view: Mat4,
    /// View to clip
    pub projection: Mat4,
    /// Background color
    pub clear_color: Color,
}

impl World {
    pub(crate) fn camera_data(&self, id: ComponentId) -> EngineResult<&Camera> {
        match &self.component(id)?.kind {
            ComponentKind::Camera(camera) => Ok(camera),
            _ => Err(EngineError::InvalidArgument("component is not a camera".to_string())),
        }
    }

    /// View and projection for a camera component
    pub fn camera_matrices(&self, id: ComponentId, aspect: f32) -> EngineResult<CameraMatrices> {
        let camera = self.camera_data(id)?;
        let transform = self.transform(self.component(id)?.owner)?;
        let position = transform.position()?;
        Ok(CameraMatrices {
            camera: id,
            position,
            view: matrix::view(&position, &transform.forward()?, &transform.up()?),
            projection: camera.projection_matrix(aspect),
            clear_color: camera.clear_color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let camera = Camera::default();
        assert_eq!(camera.clear_color, Color::CORNFLOWER_BLUE);
        assert_relative_eq!(camera.field_of_view, 90.0);
        assert_relative_eq!(camera.near_plane, 0.1);
        assert_relative_eq!(camera.far_plane, 1000.0);
        assert!(!camera.orthographic);
    }

    #[test]
    fn test_view_moves_eye_to_origin() {
        let mut world = World::new();
        let scene = world.create_scene("camera");
        let entity = world.create_game_object(scene, "camera").unwrap();
        let id = world.add_component(entity, Camera::default()).unwrap();
        world.transform_mut(entity).unwrap().set_position(Vec3::new(0.0, 0.0, 10.0)).unwrap();

        let matrices = world.camera_matrices(id, 16.0 / 9.0).unwrap();
        let eye = matrices.view.transform_point(&Point3::new(0.0, 0.0, 10.0));
        let ahead = matrices.view.transform_point(&Point3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(eye.coords, Vec3::zeros(), epsilon = 1e-5);
        assert_relative_eq!(ahead.coords, Vec3::new(0.0, 0.0, -10.0), epsilon = 1e-5);
    }

    #[test]
    fn test_orthographic_projection_scales_by_size() {
        let camera = Camera::default().with_orthographic(4.0);
        let projection = camera.projection_matrix(2.0);
        assert_relative_eq!(projection[(1, 1)], 0.5, epsilon = 1e-6);
        assert_relative_eq!(projection[(0, 0)], 0.25, epsilon = 1e-6);
    }
}
