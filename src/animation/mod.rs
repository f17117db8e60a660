mod values;
pub mod tracks;
pub mod transform_track;
pub mod clip;
pub mod pose;
pub mod skeleton;
pub mod controller;
pub mod asset;

pub use values::Interpolatable;
pub use tracks::{Frame, InterpolationMode, KeyframeCursor, Track};
pub use transform_track::{ChannelPath, TransformCursor, TransformTrack};
pub use clip::{Clip, ClipCursor};
pub use pose::Pose;
pub use skeleton::Skeleton;
pub use controller::{Controller, PlaybackState};
pub use asset::{AnimationAsset, ChannelDesc, ClipDesc, JointDesc, SkeletonDesc};
