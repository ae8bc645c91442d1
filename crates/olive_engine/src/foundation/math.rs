//! Math utilities and types
//!
//! Thin layer over nalgebra with the engine's axis conventions: right-handed,
//! `Up = +Y`, `Right = +X`, `Forward = -Z`.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

use crate::engine::{EngineError, EngineResult};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Unit direction vectors in engine space
pub mod direction {
    use super::Vec3;

    /// `(0, 0, -1)`
    pub fn forward() -> Vec3 {
        Vec3::new(0.0, 0.0, -1.0)
    }

    /// `(0, 0, 1)`
    pub fn backward() -> Vec3 {
        Vec3::new(0.0, 0.0, 1.0)
    }

    /// `(1, 0, 0)`
    pub fn right() -> Vec3 {
        Vec3::new(1.0, 0.0, 0.0)
    }

    /// `(-1, 0, 0)`
    pub fn left() -> Vec3 {
        Vec3::new(-1.0, 0.0, 0.0)
    }

    /// `(0, 1, 0)`
    pub fn up() -> Vec3 {
        Vec3::new(0.0, 1.0, 0.0)
    }

    /// `(0, -1, 0)`
    pub fn down() -> Vec3 {
        Vec3::new(0.0, -1.0, 0.0)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}

/// Quaternion construction and conversion helpers
pub mod rotation {
    use super::{utils, Mat3, Quat, Unit, Vec3};
    use nalgebra::Rotation3;

    /// Builds a rotation from yaw (about Y), pitch (about X) and roll (about Z), in radians.
    ///
    /// Roll is applied first, then pitch, then yaw.
    pub fn from_yaw_pitch_roll(yaw: f32, pitch: f32, roll: f32) -> Quat {
        Quat::from_axis_angle(&Vec3::y_axis(), yaw)
            * Quat::from_axis_angle(&Vec3::x_axis(), pitch)
            * Quat::from_axis_angle(&Vec3::z_axis(), roll)
    }

    /// Builds a rotation from Euler angles in degrees: `x` pitch, `y` yaw, `z` roll.
    pub fn from_euler_degrees(euler: Vec3) -> Quat {
        from_yaw_pitch_roll(
            utils::deg_to_rad(euler.y),
            utils::deg_to_rad(euler.x),
            utils::deg_to_rad(euler.z),
        )
    }

    /// Inverse of [`from_euler_degrees`], away from gimbal lock.
    pub fn to_euler_degrees(rotation: &Quat) -> Vec3 {
        let m = rotation.to_rotation_matrix();
        let m = m.matrix();
        let pitch = (-m[(1, 2)]).clamp(-1.0, 1.0).asin();
        let yaw = m[(0, 2)].atan2(m[(2, 2)]);
        let roll = m[(1, 0)].atan2(m[(1, 1)]);
        Vec3::new(
            utils::rad_to_deg(pitch),
            utils::rad_to_deg(yaw),
            utils::rad_to_deg(roll),
        )
    }

    /// Rotation of `degrees` about `axis`.
    ///
    /// Positive angles turn clockwise when looking down the axis toward the
    /// origin, so a quarter turn about `Up` takes `Forward` to `Right`.
    /// A zero-length axis yields the identity.
    pub fn from_axis_degrees(axis: &Vec3, degrees: f32) -> Quat {
        Unit::try_new(*axis, f32::EPSILON).map_or_else(Quat::identity, |axis| {
            Quat::from_axis_angle(&axis, -utils::deg_to_rad(degrees))
        })
    }

    /// Orientation at `from` whose forward axis points at `target`.
    ///
    /// Colinear `forward`/`up` is not checked.
    pub fn look_at(from: &Vec3, target: &Vec3, up: &Vec3) -> Quat {
        let back = (from - target).normalize();
        let right = up.cross(&back).normalize();
        let up = back.cross(&right);
        let basis = Mat3::from_columns(&[right, up, back]);
        Quat::from_rotation_matrix(&Rotation3::from_matrix_unchecked(basis))
    }
}

/// Matrix construction helpers
pub mod matrix {
    use super::{Mat4, Point3, Quat, Vec3};

    /// Scale, then rotate, then translate.
    pub fn trs(position: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4 {
        Mat4::new_translation(position)
            * rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(scale)
    }

    /// View matrix looking from `eye` along `forward`.
    pub fn view(eye: &Vec3, forward: &Vec3, up: &Vec3) -> Mat4 {
        let eye = Point3::from(*eye);
        Mat4::look_at_rh(&eye, &(eye + forward), up)
    }

    /// Perspective projection with a vertical field of view in radians.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    /// Orthographic projection `size` units tall, centred on the view axis.
    pub fn orthographic(size: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let half_height = size * 0.5;
        let half_width = half_height * aspect;
        Mat4::new_orthographic(-half_width, half_width, -half_height, half_height, near, far)
    }
}

/// Checked component access by index.
///
/// Out-of-range indices are an [`EngineError::InvalidArgument`].
pub trait ComponentIndex {
    /// Number of addressable components.
    const LEN: usize;

    /// Reads component `index`.
    fn component(&self, index: usize) -> EngineResult<f32>;

    /// Writes component `index`.
    fn set_component(&mut self, index: usize, value: f32) -> EngineResult<()>;
}

fn index_error(index: usize, len: usize) -> EngineError {
    EngineError::InvalidArgument(format!("component index {index} out of range 0..{len}"))
}

macro_rules! impl_vector_index {
    ($ty:ty, $len:expr) => {
        impl ComponentIndex for $ty {
            const LEN: usize = $len;

            fn component(&self, index: usize) -> EngineResult<f32> {
                self.get(index).copied().ok_or_else(|| index_error(index, Self::LEN))
            }

            fn set_component(&mut self, index: usize, value: f32) -> EngineResult<()> {
                let slot = self.get_mut(index).ok_or_else(|| index_error(index, Self::LEN))?;
                *slot = value;
                Ok(())
            }
        }
    };
}

impl_vector_index!(Vec2, 2);
impl_vector_index!(Vec3, 3);
impl_vector_index!(Vec4, 4);

/// Row-major indexing: `index = row * 4 + column`.
impl ComponentIndex for Mat4 {
    const LEN: usize = 16;

    fn component(&self, index: usize) -> EngineResult<f32> {
        if index >= Self::LEN {
            return Err(index_error(index, Self::LEN));
        }
        Ok(self[(index / 4, index % 4)])
    }

    fn set_component(&mut self, index: usize, value: f32) -> EngineResult<()> {
        if index >= Self::LEN {
            return Err(index_error(index, Self::LEN));
        }
        self[(index / 4, index % 4)] = value;
        Ok(())
    }
}

/// `x, y, z, w` order. Writing renormalizes the quaternion.
impl ComponentIndex for Quat {
    const LEN: usize = 4;

    fn component(&self, index: usize) -> EngineResult<f32> {
        self.coords.get(index).copied().ok_or_else(|| index_error(index, Self::LEN))
    }

    fn set_component(&mut self, index: usize, value: f32) -> EngineResult<()> {
        let mut raw = *self.quaternion();
        let slot = raw.coords.get_mut(index).ok_or_else(|| index_error(index, Self::LEN))?;
        *slot = value;
        *self = Quat::new_normalize(raw);
        Ok(())
    }
}
