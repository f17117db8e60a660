use glam::Mat4;

use crate::animation::pose::Pose;
use crate::errors::Result;

/// Bind-time skeleton data.
///
/// Immutable after construction. A [`Controller`](crate::Controller) takes
/// exclusive ownership of its skeleton; models sharing the same source data
/// each get their own clone.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    rest_pose: Pose,

    // Inverse Bind Matrices, one per joint, in joint order.
    // Transforms vertices from mesh (bind) space into joint local space.
    inverse_bind_matrices: Vec<Mat4>,

    joint_names: Vec<String>,
}

impl Skeleton {
    /// Builds a skeleton from its rest pose and per-joint bind data.
    ///
    /// The rest pose hierarchy must be valid (see [`Pose::validate`]). Bind
    /// data is fitted to the joint count: missing inverse bind matrices become
    /// identity and missing names become `joint_<index>`; surplus entries are
    /// dropped. Both cases are logged.
    pub fn new(
        rest_pose: Pose,
        mut inverse_bind_matrices: Vec<Mat4>,
        mut joint_names: Vec<String>,
    ) -> Result<Self> {
        rest_pose.validate()?;
        let count = rest_pose.len();

        if inverse_bind_matrices.len() != count {
            log::warn!(
                "Skeleton has {count} joints but {} inverse bind matrices, padding with identity",
                inverse_bind_matrices.len()
            );
            inverse_bind_matrices.resize(count, Mat4::IDENTITY);
        }

        if joint_names.len() != count {
            log::warn!(
                "Skeleton has {count} joints but {} joint names",
                joint_names.len()
            );
            joint_names.truncate(count);
            let named = joint_names.len();
            joint_names.extend((named..count).map(|i| format!("joint_{i}")));
        }

        Ok(Self {
            rest_pose,
            inverse_bind_matrices,
            joint_names,
        })
    }

    #[inline]
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.rest_pose.len()
    }

    #[inline]
    #[must_use]
    pub fn rest_pose(&self) -> &Pose {
        &self.rest_pose
    }

    #[inline]
    #[must_use]
    pub fn inverse_bind_matrices(&self) -> &[Mat4] {
        &self.inverse_bind_matrices
    }

    #[inline]
    #[must_use]
    pub fn inverse_bind_matrix(&self, joint: usize) -> Option<&Mat4> {
        self.inverse_bind_matrices.get(joint)
    }

    #[inline]
    #[must_use]
    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    #[inline]
    #[must_use]
    pub fn joint_name(&self, joint: usize) -> Option<&str> {
        self.joint_names.get(joint).map(String::as_str)
    }

    /// Index of the first joint called `name`.
    #[must_use]
    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.joint_names.iter().position(|n| n == name)
    }
}
