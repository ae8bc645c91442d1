//! Models and the model renderer

use std::rc::Rc;

use crate::ecs::{Capabilities, ComponentKind, World};
use crate::engine::EngineResult;
use crate::foundation::collections::EntityId;
use crate::foundation::math::{Mat4, Point3, Vec3};
use crate::render::{DrawTransforms, RenderContext, RenderDevice, Renderer};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Box spanning `min` to `max`
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for no points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, point| Self {
            min: bounds.min.inf(point),
            max: bounds.max.sup(point),
        }))
    }

    /// Center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-size along each axis
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Whether `point` lies inside or on the box
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Axis-aligned box around this box after `matrix`
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners: Vec<Vec3> = (0..8)
            .map(|i| {
                let corner = Point3::new(
                    if i & 1 == 0 { self.min.x } else { self.max.x },
                    if i & 2 == 0 { self.min.y } else { self.max.y },
                    if i & 4 == 0 { self.min.z } else { self.max.z },
                );
                matrix.transform_point(&corner).coords
            })
            .collect();
        Self::from_points(&corners).unwrap_or(*self)
    }
}

/// Vertex positions of one mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Object-space vertex positions
    pub positions: Vec<Vec3>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Mesh from positions and triangle indices
    pub const fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }
}

/// Named collection of meshes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    name: String,
    meshes: Vec<Mesh>,
}

impl Model {
    /// Model from meshes
    pub fn new(name: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.into(),
            meshes,
        }
    }

    /// Axis-aligned cube centred on the origin
    pub fn cube(name: impl Into<String>, half_extent: f32) -> Self {
        let h = half_extent;
        let positions = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 7, 6, 3, 6, 2, // top
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        Self::new(name, vec![Mesh::new(positions, indices)])
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Meshes in submission order
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Object-space bounds of every vertex
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.meshes.iter().flat_map(|mesh| mesh.positions.iter()))
    }
}

/// Draws a shared [`Model`] at its entity's transform
#[derive(Debug, Clone, Default)]
pub struct ModelRenderer {
    /// Model to draw; nothing is drawn while unset
    pub model: Option<Rc<Model>>,
}

impl ModelRenderer {
    /// Renderer for `model`
    pub const fn new(model: Rc<Model>) -> Self {
        Self { model: Some(model) }
    }
}

crate::renderer_component!(ModelRenderer);

impl Renderer for ModelRenderer {
    fn render(&self, cx: &RenderContext<'_>, device: &mut dyn RenderDevice) -> EngineResult<()> {
        let Some(model) = &self.model else {
            return Ok(());
        };
        device.draw_model(
            model,
            &DrawTransforms {
                world: cx.world_matrix,
                view: cx.view,
                projection: cx.projection,
            },
        )
    }

    fn bounds(&self, world: &Mat4) -> Option<Aabb> {
        self.model.as_ref()?.bounds().map(|bounds| bounds.transformed(world))
    }
}

impl World {
    /// World-space bounds of every renderer on `entity`, including its
    /// scene's transform
    pub fn renderer_bounds(&self, entity: EntityId) -> EngineResult<Option<Aabb>> {
        let scene = self.entity(entity)?.scene;
        let scene_matrix = self.scene_transform(scene)?.world_matrix(&Mat4::identity());
        let world = self.transform(entity)?.world_matrix(&scene_matrix)?;

        let mut bounds: Option<Aabb> = None;
        for id in self.components_with(entity, Capabilities::RENDERER)? {
            let ComponentKind::Renderer(renderer) = &self.component(id)?.kind else {
                continue;
            };
            if let Some(next) = renderer.bounds(&world) {
                bounds = Some(bounds.map_or(next, |current| current.union(&next)));
            }
        }
        Ok(bounds)
    }
}
