use glam::{Affine3A, Vec2, Vec3};
use uuid::Uuid;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty set.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the box diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Transforms the eight corners and returns their bounds.
    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut new_min = Vec3::splat(f32::INFINITY);
        let mut new_max = Vec3::splat(f32::NEG_INFINITY);

        for point in corners {
            let transformed = matrix.transform_point3(point);
            new_min = new_min.min(transformed);
            new_max = new_max.max(transformed);
        }

        Self { min: new_min, max: new_max }
    }
}

/// Immutable vertex data shared between meshes.
///
/// Only the attributes the viewer inspects are kept on the CPU side:
/// positions for bounds, plus normals, UVs and indices for the host renderer.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub uuid: Uuid,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Option<Vec<u32>>,
    /// Number of morph targets carried by the source primitive
    pub morph_target_count: usize,
    bounding_box: Option<BoundingBox>,
}

impl Geometry {
    #[must_use]
    pub fn new(positions: Vec<Vec3>) -> Self {
        let bounding_box = BoundingBox::from_points(positions.iter().copied());
        Self {
            uuid: Uuid::new_v4(),
            positions,
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: None,
            morph_target_count: 0,
            bounding_box,
        }
    }

    #[must_use]
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = normals;
        self
    }

    #[must_use]
    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = uvs;
        self
    }

    #[must_use]
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    #[must_use]
    pub fn with_morph_targets(mut self, count: usize) -> Self {
        self.morph_target_count = count;
        self
    }

    /// Local-space bounds, `None` when the geometry has no vertices.
    #[must_use]
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }
}
