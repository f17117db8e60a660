use std::ops::Mul;

use glam::{Mat4, Quat, Vec3};

/// Transform
///
/// Translation, rotation and scale (TRS) of a single joint, relative to its
/// parent. Transforms compose like matrices: `parent * child` maps a point from
/// the child's space into the parent's space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    // ========================================================================
    // Composition
    // ========================================================================

    /// Composes `self` (the parent) with `child`.
    ///
    /// Scale is combined component-wise, so the result matches the matrix
    /// product exactly only when the parent scale is uniform.
    #[must_use]
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.translation + self.rotation * (self.scale * child.translation),
            rotation: (self.rotation * child.rotation).normalize(),
            scale: self.scale * child.scale,
        }
    }

    /// Inverse transform. Zero scale components invert to zero.
    ///
    /// Exact only for uniform scale: the inverse of a rotated non-uniform
    /// scale is a shear, which TRS cannot hold. Use
    /// [`Transform::inverse_matrix`] in that case.
    #[must_use]
    pub fn inverse(&self) -> Transform {
        let rotation = self.rotation.inverse();
        let scale = Vec3::new(
            recip_or_zero(self.scale.x),
            recip_or_zero(self.scale.y),
            recip_or_zero(self.scale.z),
        );
        let translation = rotation * (scale * -self.translation);

        Transform {
            translation,
            rotation,
            scale,
        }
    }

    #[inline]
    #[must_use]
    pub fn transform_point3(&self, point: Vec3) -> Vec3 {
        self.rotation * (self.scale * point) + self.translation
    }

    #[inline]
    #[must_use]
    pub fn transform_vector3(&self, vector: Vec3) -> Vec3 {
        self.rotation * (self.scale * vector)
    }

    // ========================================================================
    // Matrix Conversion
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Exact inverse as a matrix, valid for any invertible scale.
    #[inline]
    #[must_use]
    pub fn inverse_matrix(&self) -> Mat4 {
        self.to_matrix().inverse()
    }

    /// Decomposes a matrix into TRS.
    ///
    /// Shear cannot be represented and is lost.
    #[must_use]
    pub fn from_matrix(mat: &Mat4) -> Self {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        Self {
            translation,
            rotation: rotation.normalize(),
            scale,
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Transform;

    #[inline]
    fn mul(self, rhs: Transform) -> Transform {
        self.mul_transform(&rhs)
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.to_matrix()
    }
}

#[inline]
fn recip_or_zero(v: f32) -> f32 {
    if v.abs() < f32::EPSILON { 0.0 } else { 1.0 / v }
}
