//! Hierarchical joint poses.
//!
//! A [`Pose`] stores one local [`Transform`] and one optional parent index per
//! joint. Parents are not required to precede their children: source node
//! order is kept as-is, so global evaluation follows parent links rather than
//! array position. Globals are matrix products, so non-uniform scale and
//! shear propagate exactly. The hierarchy must be acyclic; [`Pose::validate`]
//! checks it and evaluation stops at the first repeated joint instead of
//! looping.

use glam::Mat4;
use smallvec::{SmallVec, smallvec};

use crate::errors::{AnimationError, Result};
use crate::transform::Transform;

/// Joint counts up to this size evaluate without heap scratch space.
const INLINE_JOINTS: usize = 128;

#[derive(Debug, Default, PartialEq)]
pub struct Pose {
    locals: Vec<Transform>,
    parents: Vec<Option<usize>>,
}

impl Clone for Pose {
    fn clone(&self) -> Self {
        Self {
            locals: self.locals.clone(),
            parents: self.parents.clone(),
        }
    }

    /// Copies into existing storage; resetting a working pose to the rest
    /// pose every frame does not allocate.
    fn clone_from(&mut self, source: &Self) {
        self.locals.clone_from(&source.locals);
        self.parents.clone_from(&source.parents);
    }
}

impl Pose {
    /// A pose of `joint_count` disconnected identity joints.
    #[must_use]
    pub fn new(joint_count: usize) -> Self {
        Self {
            locals: vec![Transform::IDENTITY; joint_count],
            parents: vec![None; joint_count],
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.locals.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    /// Grows or shrinks the pose. New joints are identity roots; surviving
    /// joints whose parent was cut off become roots.
    pub fn resize(&mut self, joint_count: usize) {
        self.locals.resize(joint_count, Transform::IDENTITY);
        self.parents.resize(joint_count, None);
        for parent in &mut self.parents {
            if parent.is_some_and(|p| p >= joint_count) {
                *parent = None;
            }
        }
    }

    // ========================================================================
    // Joint Access
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn local(&self, joint: usize) -> Transform {
        self.locals[joint]
    }

    #[inline]
    pub fn set_local(&mut self, joint: usize, transform: Transform) {
        self.locals[joint] = transform;
    }

    #[inline]
    #[must_use]
    pub fn locals(&self) -> &[Transform] {
        &self.locals
    }

    #[inline]
    #[must_use]
    pub fn parent(&self, joint: usize) -> Option<usize> {
        self.parents[joint]
    }

    /// Links `joint` under `parent`, or makes it a root with `None`.
    ///
    /// Out-of-range joints and self-links are rejected and leave the pose
    /// unchanged. Longer cycles are not checked here; see [`Pose::validate`].
    pub fn set_parent(&mut self, joint: usize, parent: Option<usize>) -> Result<()> {
        let count = self.len();
        if joint >= count {
            log::warn!("Cannot link joint {joint}: pose has {count} joints");
            return Err(AnimationError::JointOutOfRange { joint, count });
        }
        match parent {
            Some(p) if p >= count => {
                log::warn!("Cannot link joint {joint} under {p}: pose has {count} joints");
                Err(AnimationError::JointOutOfRange { joint: p, count })
            }
            Some(p) if p == joint => {
                log::warn!("Joint {joint} cannot be its own parent");
                Err(AnimationError::HierarchyCycle { joint })
            }
            _ => {
                self.parents[joint] = parent;
                Ok(())
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    /// True when `ancestor` lies on the parent chain of `joint`.
    #[must_use]
    pub fn is_descendant_of(&self, joint: usize, ancestor: usize) -> bool {
        let mut current = self.parents.get(joint).copied().flatten();
        for _ in 0..self.len() {
            match current {
                Some(p) if p == ancestor => return true,
                Some(p) => current = self.parents.get(p).copied().flatten(),
                None => return false,
            }
        }
        false
    }

    /// Checks that every parent index is in range and that following parent
    /// links from any joint reaches a root.
    pub fn validate(&self) -> Result<()> {
        let count = self.len();
        for (joint, parent) in self.parents.iter().enumerate() {
            if let Some(p) = *parent {
                if p >= count {
                    return Err(AnimationError::JointOutOfRange { joint: p, count });
                }
            }
        }

        for joint in 0..count {
            let mut current = self.parents[joint];
            let mut steps = 0;
            while let Some(p) = current {
                steps += 1;
                if steps > count {
                    return Err(AnimationError::HierarchyCycle { joint });
                }
                current = self.parents[p];
            }
        }
        Ok(())
    }

    // ========================================================================
    // Global Evaluation
    // ========================================================================

    /// Global matrix of `joint`: `parent_global * local` composed along its
    /// parent chain.
    #[must_use]
    pub fn global_matrix(&self, joint: usize) -> Mat4 {
        let mut result = self.locals[joint].to_matrix();
        let mut current = self.parents[joint];
        let mut steps = 0;

        while let Some(p) = current {
            steps += 1;
            if steps > self.len() {
                log::error!("Joint hierarchy cycle detected while evaluating joint {joint}");
                break;
            }
            result = self.locals[p].to_matrix() * result;
            current = self.parents[p];
        }

        result
    }

    /// [`Pose::global_matrix`] decomposed into TRS. Shear produced by
    /// non-uniform parent scale is lost.
    #[must_use]
    pub fn global(&self, joint: usize) -> Transform {
        Transform::from_matrix(&self.global_matrix(joint))
    }

    /// Writes the global matrix of every joint into `out`, evaluating each
    /// joint once regardless of node order.
    pub fn global_matrices_into(&self, out: &mut Vec<Mat4>) {
        let count = self.len();
        out.clear();
        out.resize(count, Mat4::IDENTITY);

        let mut resolved: SmallVec<[bool; INLINE_JOINTS]> = smallvec![false; count];
        let mut chain: SmallVec<[usize; 32]> = SmallVec::new();

        for joint in 0..count {
            if resolved[joint] {
                continue;
            }

            // Climb until a root or an already evaluated ancestor
            chain.clear();
            let mut current = Some(joint);
            while let Some(j) = current {
                if resolved[j] {
                    break;
                }
                if chain.len() >= count {
                    log::error!("Joint hierarchy cycle detected while evaluating joint {joint}");
                    break;
                }
                chain.push(j);
                current = self.parents[j];
            }

            let mut parent_world = current.filter(|&p| resolved[p]).map(|p| out[p]);

            // Walk back down, root side first
            for &j in chain.iter().rev() {
                let local = self.locals[j].to_matrix();
                let world = match parent_world {
                    Some(parent) => parent * local,
                    None => local,
                };
                out[j] = world;
                resolved[j] = true;
                parent_world = Some(world);
            }
        }
    }
}
