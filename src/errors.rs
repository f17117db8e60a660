//! Error Types
//!
//! This module defines the error type shared by the animation core.
//!
//! # Overview
//!
//! [`AnimationError`] covers two families of failures:
//! - Configuration errors raised during playback (missing skeleton, bad clip
//!   index). These are non-fatal: the operation becomes a no-op and the error
//!   is returned so callers can assert on it.
//! - Malformed source data rejected while building skeletons and clips.
//!
//! # Usage
//!
//! ```rust,ignore
//! use armature::errors::{AnimationError, Result};
//!
//! fn select(controller: &mut Controller) -> Result<()> {
//!     controller.set_current_animation(2)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the animation core.
#[derive(Error, Debug)]
pub enum AnimationError {
    // ========================================================================
    // Playback Configuration Errors
    // ========================================================================
    /// The controller has no skeleton bound.
    #[error("Skeleton not set for controller")]
    NoSkeleton,

    /// A clip index does not address any clip owned by the controller.
    #[error("Clip with index ({index}) does not exist (clip count: {count})")]
    ClipIndexOutOfRange {
        /// The requested index
        index: usize,
        /// Number of clips currently owned
        count: usize,
    },

    // ========================================================================
    // Hierarchy Errors
    // ========================================================================
    /// A joint index does not address a joint of the pose or skeleton.
    #[error("Joint index out of range: {joint} (joint count: {count})")]
    JointOutOfRange {
        /// The offending joint index
        joint: usize,
        /// Number of joints available
        count: usize,
    },

    /// Following parent links from `joint` never reaches a root.
    #[error("Joint hierarchy contains a cycle through joint {joint}")]
    HierarchyCycle {
        /// A joint that lies on the cycle
        joint: usize,
    },

    // ========================================================================
    // Source Data Errors
    // ========================================================================
    /// A joint description could not be turned into rest-pose data.
    #[error("Malformed joint {joint}: {reason}")]
    MalformedJoint {
        /// Index of the joint in the source description
        joint: usize,
        /// What was wrong with it
        reason: String,
    },

    /// An animation channel could not be turned into a keyframe track.
    #[error("Malformed channel {channel} in clip '{clip}': {reason}")]
    MalformedChannel {
        /// Name of the clip being built
        clip: String,
        /// Index of the channel inside the clip description
        channel: usize,
        /// What was wrong with it
        reason: String,
    },

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, AnimationError>`.
pub type Result<T> = std::result::Result<T, AnimationError>;
