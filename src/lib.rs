#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Skeletal animation core.
//!
//! Keyframe tracks are sampled into per-joint transforms, clips gather those
//! tracks, poses evaluate the joint hierarchy, and a [`Controller`] drives
//! playback to produce the skinning matrices a renderer uploads.

pub mod animation;
pub mod errors;
pub mod settings;
pub mod transform;

pub use animation::{
    AnimationAsset, ChannelPath, Clip, Controller, Frame, Interpolatable, InterpolationMode, PlaybackState, Pose,
    Skeleton, Track, TransformTrack,
};
pub use errors::{AnimationError, Result};
pub use settings::AnimationSettings;
pub use transform::Transform;
