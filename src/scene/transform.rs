use glam::{Affine3A, Mat3, Quat, Vec3};

/// Local TRS of a node plus its cached local and world matrices.
///
/// The local matrix is only rebuilt when one of the TRS fields differs from
/// the values it was last built from.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    // TRS the local matrix was last built from
    last_position: Vec3,
    last_rotation: Quat,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,

            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,

            last_position: Vec3::ZERO,
            last_rotation: Quat::IDENTITY,
            last_scale: Vec3::ONE,
            force_update: true,
        }
    }

    /// Recomputes the local matrix if any TRS component changed.
    ///
    /// Returns whether the matrix was rebuilt.
    pub fn update_local_matrix(&mut self) -> bool {
        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.local_matrix =
                Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);

            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    pub(crate) fn set_world_matrix(&mut self, world: Affine3A) {
        self.world_matrix = world;
    }

    /// Orients -Z towards `target`.
    ///
    /// `target` and `up` are expressed in the parent space of this transform.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let offset = target - self.position;
        if offset.length_squared() < f32::EPSILON {
            return;
        }
        let forward = offset.normalize();

        // Degenerate when looking straight along `up`
        if forward.cross(up).length_squared() < 1e-4 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();

        let rot_mat = Mat3::from_cols(right, new_up, -forward);
        self.rotation = Quat::from_mat3(&rot_mat);
    }

    /// Forces a rebuild on the next hierarchy update.
    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_matrix_rebuilds_only_on_change() {
        let mut transform = Transform::new();
        assert!(transform.update_local_matrix());
        assert!(!transform.update_local_matrix());

        transform.position = Vec3::new(1.0, 2.0, 3.0);
        assert!(transform.update_local_matrix());
        assert_eq!(Vec3::from(transform.local_matrix().translation), Vec3::new(1.0, 2.0, 3.0));

        transform.mark_dirty();
        assert!(transform.update_local_matrix());
    }

    #[test]
    fn look_at_points_negative_z() {
        let mut transform = Transform::new();
        transform.position = Vec3::new(0.0, 0.0, 5.0);
        transform.look_at(Vec3::ZERO, Vec3::Y);
        let forward = transform.rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);

        // Straight down the up axis leaves the rotation alone
        let before = transform.rotation;
        transform.look_at(Vec3::new(0.0, -10.0, 5.0), Vec3::Y);
        assert_eq!(transform.rotation, before);
    }
}
