//! Transform component and hierarchy
//!
//! Each entity owns exactly one transform. A transform may reference a
//! parent transform; world-space values are composed by walking that chain:
//!
//! - world position = parent world position + local position
//! - world rotation = parent world rotation * local rotation
//! - world scale    = parent world scale (component-wise) * local scale
//!
//! Children are never stored. They are derived by scanning the owning
//! scene for transforms whose parent is this one, in attachment order.

use serde::{Deserialize, Serialize};

use crate::ecs::component::ComponentKind;
use crate::ecs::World;
use crate::engine::{EngineError, EngineResult};
use crate::foundation::collections::{ComponentId, EntityId};
use crate::foundation::math::{direction, matrix, rotation, Mat4, Quat, Vec3};

/// Coordinate space a transform is constrained to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransformSpace {
    /// Unconstrained 3D
    #[default]
    Spatial,
    /// XY plane: `z = 0`, rotation about Z only, unit Z scale
    Planar,
}

/// Local position, rotation and scale plus an optional parent link
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    local_position: Vec3,
    local_rotation: Quat,
    local_scale: Vec3,
    parent: Option<ComponentId>,
    space: TransformSpace,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(TransformSpace::Spatial)
    }
}

impl Transform {
    /// Identity transform in `space`
    pub fn new(space: TransformSpace) -> Self {
        Self {
            local_position: Vec3::zeros(),
            local_rotation: Quat::identity(),
            local_scale: Vec3::new(1.0, 1.0, 1.0),
            parent: None,
            space,
        }
    }

    /// Position relative to the parent
    pub const fn local_position(&self) -> Vec3 {
        self.local_position
    }

    /// Rotation relative to the parent
    pub const fn local_rotation(&self) -> Quat {
        self.local_rotation
    }

    /// Scale relative to the parent
    pub const fn local_scale(&self) -> Vec3 {
        self.local_scale
    }

    /// Parent transform, if any
    pub const fn parent_id(&self) -> Option<ComponentId> {
        self.parent
    }

    /// Coordinate space
    pub const fn space(&self) -> TransformSpace {
        self.space
    }

    fn set_local_position(&mut self, mut position: Vec3) {
        if self.space == TransformSpace::Planar {
            position.z = 0.0;
        }
        self.local_position = position;
    }

    fn set_local_rotation(&mut self, rotation: Quat) {
        self.local_rotation = match self.space {
            TransformSpace::Spatial => rotation,
            TransformSpace::Planar => {
                let (_, _, about_z) = rotation.euler_angles();
                Quat::from_axis_angle(&Vec3::z_axis(), about_z)
            }
        };
    }

    fn set_local_scale(&mut self, mut scale: Vec3) {
        if self.space == TransformSpace::Planar {
            scale.z = 1.0;
        }
        self.local_scale = scale;
    }

    /// Same local values, re-constrained to `space`
    pub(crate) fn converted(&self, space: TransformSpace) -> Self {
        let mut transform = Self::new(space);
        transform.parent = self.parent;
        transform.set_local_position(self.local_position);
        transform.set_local_rotation(self.local_rotation);
        transform.set_local_scale(self.local_scale);
        transform
    }

    pub(crate) fn reparent(&mut self, parent: Option<ComponentId>) {
        self.parent = parent;
    }
}

impl World {
    pub(crate) fn transform_data(&self, id: ComponentId) -> EngineResult<&Transform> {
        match &self.component(id)?.kind {
            ComponentKind::Transform(transform) => Ok(transform),
            _ => Err(EngineError::InvalidArgument("component is not a transform".to_string())),
        }
    }

    pub(crate) fn transform_data_mut(&mut self, id: ComponentId) -> EngineResult<&mut Transform> {
        match &mut self.component_mut(id)?.kind {
            ComponentKind::Transform(transform) => Ok(transform),
            _ => Err(EngineError::InvalidArgument("component is not a transform".to_string())),
        }
    }

    /// Read-only view of an entity's transform
    pub fn transform(&self, entity: EntityId) -> EngineResult<TransformRef<'_>> {
        let id = self.entity(entity)?.transform;
        let data = self.transform_data(id)?;
        Ok(TransformRef { world: self, id, data })
    }

    /// Mutable view of an entity's transform
    pub fn transform_mut(&mut self, entity: EntityId) -> EngineResult<TransformMut<'_>> {
        let id = self.entity(entity)?.transform;
        self.transform_data(id)?;
        Ok(TransformMut { world: self, id })
    }

    fn world_position(&self, id: ComponentId) -> EngineResult<Vec3> {
        let data = self.transform_data(id)?;
        match data.parent {
            Some(parent) => Ok(self.world_position(parent)? + data.local_position),
            None => Ok(data.local_position),
        }
    }

    fn world_rotation(&self, id: ComponentId) -> EngineResult<Quat> {
        let data = self.transform_data(id)?;
        match data.parent {
            Some(parent) => Ok(self.world_rotation(parent)? * data.local_rotation),
            None => Ok(data.local_rotation),
        }
    }

    fn world_scale(&self, id: ComponentId) -> EngineResult<Vec3> {
        let data = self.transform_data(id)?;
        match data.parent {
            Some(parent) => Ok(self.world_scale(parent)?.component_mul(&data.local_scale)),
            None => Ok(data.local_scale),
        }
    }

    /// Entities whose transform is parented to `transform`, in scene order
    pub(crate) fn child_entities(&self, transform: ComponentId) -> EngineResult<Vec<EntityId>> {
        let owner = self.component(transform)?.owner;
        let scene = self.entity(owner)?.scene;
        let mut children = Vec::new();
        for &candidate in &self.scene(scene)?.game_objects {
            let child = self.entity(candidate)?;
            if self.transform_data(child.transform)?.parent == Some(transform) {
                children.push(candidate);
            }
        }
        Ok(children)
    }
}

/// Read-only transform view
pub struct TransformRef<'w> {
    world: &'w World,
    id: ComponentId,
    data: &'w Transform,
}

impl<'w> TransformRef<'w> {
    /// Component handle of this transform
    pub const fn id(&self) -> ComponentId {
        self.id
    }

    /// Underlying local data
    pub const fn data(&self) -> &'w Transform {
        self.data
    }

    /// Coordinate space
    pub const fn space(&self) -> TransformSpace {
        self.data.space
    }

    /// Position relative to the parent
    pub const fn local_position(&self) -> Vec3 {
        self.data.local_position
    }

    /// Rotation relative to the parent
    pub const fn local_rotation(&self) -> Quat {
        self.data.local_rotation
    }

    /// Scale relative to the parent
    pub const fn local_scale(&self) -> Vec3 {
        self.data.local_scale
    }

    /// World-space position
    pub fn position(&self) -> EngineResult<Vec3> {
        self.world.world_position(self.id)
    }

    /// World-space rotation
    pub fn rotation(&self) -> EngineResult<Quat> {
        self.world.world_rotation(self.id)
    }

    /// World-space scale
    pub fn scale(&self) -> EngineResult<Vec3> {
        self.world.world_scale(self.id)
    }

    /// World-space rotation as Euler degrees (`x` pitch, `y` yaw, `z` roll)
    pub fn euler_angles(&self) -> EngineResult<Vec3> {
        Ok(rotation::to_euler_degrees(&self.rotation()?))
    }

    /// World-space forward axis
    pub fn forward(&self) -> EngineResult<Vec3> {
        Ok(self.rotation()? * direction::forward())
    }

    /// World-space right axis
    pub fn right(&self) -> EngineResult<Vec3> {
        Ok(self.rotation()? * direction::right())
    }

    /// World-space up axis
    pub fn up(&self) -> EngineResult<Vec3> {
        Ok(self.rotation()? * direction::up())
    }

    /// Scale, then rotation, then translation, inside `outer`
    pub fn world_matrix(&self, outer: &Mat4) -> EngineResult<Mat4> {
        Ok(outer * matrix::trs(&self.position()?, &self.rotation()?, &self.scale()?))
    }

    /// Entity owning the parent transform
    pub fn parent(&self) -> EngineResult<Option<EntityId>> {
        self.data
            .parent
            .map(|parent| self.world.component(parent).map(|slot| slot.owner))
            .transpose()
    }

    /// Entities parented directly to this transform, in attachment order
    pub fn children(&self) -> EngineResult<Vec<EntityId>> {
        self.world.child_entities(self.id)
    }
}

/// Mutable transform view
///
/// World-space setters back-solve the local value from the parent's
/// world value. Without a parent, world and local are the same.
pub struct TransformMut<'w> {
    world: &'w mut World,
    id: ComponentId,
}

impl TransformMut<'_> {
    /// Component handle of this transform
    pub const fn id(&self) -> ComponentId {
        self.id
    }

    /// Read-only access to the same transform
    pub fn view(&self) -> EngineResult<TransformRef<'_>> {
        let world: &World = &*self.world;
        let data = world.transform_data(self.id)?;
        Ok(TransformRef { world, id: self.id, data })
    }

    fn data_mut(&mut self) -> EngineResult<&mut Transform> {
        self.world.transform_data_mut(self.id)
    }

    fn parent(&self) -> EngineResult<Option<ComponentId>> {
        Ok(self.world.transform_data(self.id)?.parent)
    }

    /// World-space position
    pub fn position(&self) -> EngineResult<Vec3> {
        self.world.world_position(self.id)
    }

    /// World-space rotation
    pub fn rotation(&self) -> EngineResult<Quat> {
        self.world.world_rotation(self.id)
    }

    /// World-space scale
    pub fn scale(&self) -> EngineResult<Vec3> {
        self.world.world_scale(self.id)
    }

    /// Set position relative to the parent
    pub fn set_local_position(&mut self, position: Vec3) -> EngineResult<()> {
        self.data_mut()?.set_local_position(position);
        Ok(())
    }

    /// Set rotation relative to the parent
    pub fn set_local_rotation(&mut self, rotation: Quat) -> EngineResult<()> {
        self.data_mut()?.set_local_rotation(rotation);
        Ok(())
    }

    /// Set scale relative to the parent
    pub fn set_local_scale(&mut self, scale: Vec3) -> EngineResult<()> {
        self.data_mut()?.set_local_scale(scale);
        Ok(())
    }

    /// Set world-space position
    pub fn set_position(&mut self, position: Vec3) -> EngineResult<()> {
        let local = match self.parent()? {
            Some(parent) => position - self.world.world_position(parent)?,
            None => position,
        };
        self.set_local_position(local)
    }

    /// Set world-space rotation
    pub fn set_rotation(&mut self, rotation: Quat) -> EngineResult<()> {
        let local = match self.parent()? {
            Some(parent) => self.world.world_rotation(parent)?.inverse() * rotation,
            None => rotation,
        };
        self.set_local_rotation(local)
    }

    /// Set world-space scale
    pub fn set_scale(&mut self, scale: Vec3) -> EngineResult<()> {
        let local = match self.parent()? {
            Some(parent) => scale.component_div(&self.world.world_scale(parent)?),
            None => scale,
        };
        self.set_local_scale(local)
    }

    /// Set world-space rotation from Euler degrees
    pub fn set_euler_angles(&mut self, euler: Vec3) -> EngineResult<()> {
        self.set_rotation(rotation::from_euler_degrees(euler))
    }

    /// Move by `translation` in world space
    pub fn translate(&mut self, translation: Vec3) -> EngineResult<()> {
        let position = self.position()?;
        self.set_position(position + translation)
    }

    /// Compose `rotation` onto the world rotation
    pub fn rotate(&mut self, rotation: Quat) -> EngineResult<()> {
        let current = self.rotation()?;
        self.set_rotation(current * rotation)
    }

    /// Compose a rotation given as Euler degrees
    pub fn rotate_euler(&mut self, euler: Vec3) -> EngineResult<()> {
        self.rotate(rotation::from_euler_degrees(euler))
    }

    /// Compose a rotation of `degrees` about `axis`
    pub fn rotate_axis(&mut self, axis: Vec3, degrees: f32) -> EngineResult<()> {
        self.rotate(rotation::from_axis_degrees(&axis, degrees))
    }

    /// Swing the position `degrees` about `axis` through `point`.
    ///
    /// Orientation is left unchanged.
    pub fn rotate_around(&mut self, point: Vec3, axis: Vec3, degrees: f32) -> EngineResult<()> {
        let turn = rotation::from_axis_degrees(&axis, degrees);
        let offset = self.position()? - point;
        self.set_position(point + turn * offset)
    }

    /// Face `target` with world up as the up reference
    pub fn look_at(&mut self, target: Vec3) -> EngineResult<()> {
        self.look_at_with_up(target, direction::up())
    }

    /// Face `target` using `up` as the up reference
    pub fn look_at_with_up(&mut self, target: Vec3, up: Vec3) -> EngineResult<()> {
        let from = self.position()?;
        self.set_rotation(rotation::look_at(&from, &target, &up))
    }

    /// Face another entity's world position
    pub fn look_at_entity(&mut self, target: EntityId) -> EngineResult<()> {
        let target = self.world.transform(target)?.position()?;
        self.look_at(target)
    }

    /// Attach to `parent`'s transform, or detach with `None`.
    ///
    /// Local values are kept. Fails if the parent is in another scene or
    /// if the link would make this transform its own ancestor.
    pub fn set_parent(&mut self, parent: Option<EntityId>) -> EngineResult<()> {
        let parent_transform = match parent {
            Some(parent) => {
                let own_scene = self.world.entity(self.world.component(self.id)?.owner)?.scene;
                let parent_entity = self.world.entity(parent)?;
                if parent_entity.scene != own_scene {
                    return Err(EngineError::InvalidOperation(
                        "cannot parent a transform to one in another scene".to_string(),
                    ));
                }
                let parent_transform = parent_entity.transform;
                let mut cursor = Some(parent_transform);
                while let Some(ancestor) = cursor {
                    if ancestor == self.id {
                        return Err(EngineError::InvalidOperation(
                            "parenting would create a transform cycle".to_string(),
                        ));
                    }
                    cursor = self.world.transform_data(ancestor)?.parent;
                }
                Some(parent_transform)
            }
            None => None,
        };
        self.data_mut()?.reparent(parent_transform);
        Ok(())
    }
}
