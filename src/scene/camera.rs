use glam::{Affine3A, Mat4, Vec3};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub uuid: Uuid,

    // === Projection ===
    pub projection_type: ProjectionType,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Half height of the orthographic view volume
    pub ortho_size: f32,

    // Cached matrices, refreshed by the transform system
    pub(crate) world_matrix: Affine3A,
    pub(crate) view_matrix: Mat4,
    pub(crate) projection_matrix: Mat4,
    pub(crate) view_projection_matrix: Mat4,
}

impl Camera {
    /// `fov` is given in degrees.
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            uuid: Uuid::new_v4(),
            projection_type: ProjectionType::Perspective,
            fov: fov.to_radians(),
            aspect,
            near,
            far,
            ortho_size: 10.0,

            world_matrix: Affine3A::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
        };

        cam.update_projection_matrix();
        cam
    }

    #[must_use]
    pub fn new_orthographic(ortho_size: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self::new_perspective(60.0, aspect, near, far);
        cam.projection_type = ProjectionType::Orthographic;
        cam.ortho_size = ortho_size;
        cam.update_projection_matrix();
        cam
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = match self.projection_type {
            ProjectionType::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
            }
            ProjectionType::Orthographic => {
                let w = self.ortho_size * self.aspect;
                let h = self.ortho_size;
                Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far)
            }
        };

        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    pub fn update_view_projection(&mut self, world_transform: &Affine3A) {
        self.world_matrix = *world_transform;
        self.view_matrix = Mat4::from(*world_transform).inverse();
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
        self.update_projection_matrix();
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix
    }

    /// World-space position as of the last transform update.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.world_matrix.translation.into()
    }
}
