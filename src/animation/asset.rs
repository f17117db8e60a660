//! Loader-facing descriptions of skeletons and clips.
//!
//! A file decoder (glTF or otherwise) fills these plain, `serde`-compatible
//! structs and hands them over; building them validates the data once at load
//! time so playback never has to deal with malformed input.
//!
//! Policy: data that cannot be interpreted (mismatched sample counts,
//! unordered key times, broken hierarchies) fails with a descriptive error.
//! Data that is merely absent or unsupported is warned about and replaced by a
//! default: identity rest transforms and inverse bind matrices, generated
//! joint names, and skipped non-transform channels.
//!
//! ```rust,ignore
//! let asset = AnimationAsset::from_json(&std::fs::read_to_string("walk.json")?)?;
//! if let Some(mut controller) = asset.build_controller(AnimationSettings::default())? {
//!     controller.play();
//! }
//! ```

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::animation::clip::Clip;
use crate::animation::controller::Controller;
use crate::animation::pose::Pose;
use crate::animation::skeleton::Skeleton;
use crate::animation::tracks::{Frame, InterpolationMode, Track};
use crate::animation::transform_track::ChannelPath;
use crate::animation::values::Interpolatable;
use crate::errors::{AnimationError, Result};
use crate::settings::{AnimationSettings, DEFAULT_CLIP_LOOPING};
use crate::transform::Transform;

// ============================================================================
// Skeleton Description
// ============================================================================

/// One joint of a skeleton.
///
/// The rest transform starts from `matrix` (column-major) when present and is
/// then overridden by whichever of `translation`, `rotation` (`[x, y, z, w]`)
/// and `scale` are given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointDesc {
    pub name: Option<String>,
    pub parent: Option<usize>,
    pub matrix: Option<[f32; 16]>,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    /// Column-major; identity when absent.
    pub inverse_bind_matrix: Option<[f32; 16]>,
}

impl JointDesc {
    pub fn rest_transform(&self, joint: usize) -> Result<Transform> {
        let malformed = |reason: &str| AnimationError::MalformedJoint {
            joint,
            reason: reason.to_string(),
        };

        let mut transform = match &self.matrix {
            Some(m) => Transform::from_matrix(&Mat4::from_cols_array(m)),
            None => Transform::IDENTITY,
        };
        if let Some(t) = self.translation {
            transform.translation = Vec3::from_array(t);
        }
        if let Some(r) = self.rotation {
            let q = Quat::from_array(r);
            if q.length_squared() <= f32::EPSILON {
                return Err(malformed("rotation quaternion has zero length"));
            }
            transform.rotation = q.normalize();
        }
        if let Some(s) = self.scale {
            transform.scale = Vec3::from_array(s);
        }

        if !transform.is_finite() {
            return Err(malformed("rest transform is not finite"));
        }
        Ok(transform)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonDesc {
    pub joints: Vec<JointDesc>,
}

impl SkeletonDesc {
    pub fn build(&self) -> Result<Skeleton> {
        let count = self.joints.len();
        let mut rest_pose = Pose::new(count);
        let mut inverse_bind_matrices = Vec::with_capacity(count);
        let mut joint_names = Vec::with_capacity(count);
        let mut missing_bind = 0;

        for (joint, desc) in self.joints.iter().enumerate() {
            rest_pose.set_local(joint, desc.rest_transform(joint)?);

            if let Some(parent) = desc.parent {
                if parent >= count {
                    return Err(AnimationError::MalformedJoint {
                        joint,
                        reason: format!("parent {parent} is out of range ({count} joints)"),
                    });
                }
                if parent == joint {
                    return Err(AnimationError::MalformedJoint {
                        joint,
                        reason: "joint is its own parent".to_string(),
                    });
                }
                rest_pose.set_parent(joint, Some(parent))?;
            }

            let inverse_bind = match &desc.inverse_bind_matrix {
                Some(m) => Mat4::from_cols_array(m),
                None => {
                    missing_bind += 1;
                    Mat4::IDENTITY
                }
            };
            if !inverse_bind.is_finite() {
                return Err(AnimationError::MalformedJoint {
                    joint,
                    reason: "inverse bind matrix is not finite".to_string(),
                });
            }
            inverse_bind_matrices.push(inverse_bind);

            joint_names.push(desc.name.clone().unwrap_or_else(|| format!("joint_{joint}")));
        }

        if missing_bind > 0 {
            log::warn!("{missing_bind} of {count} joints have no inverse bind matrix, using identity");
        }

        Skeleton::new(rest_pose, inverse_bind_matrices, joint_names)
    }
}

// ============================================================================
// Clip Description
// ============================================================================

/// One animation channel: keyframes for a single component of a single joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDesc {
    /// Joint index driven by this channel.
    pub target: usize,
    /// `translation`, `rotation` or `scale`. Anything else is skipped.
    pub path: String,
    #[serde(default)]
    pub interpolation: InterpolationMode,
    pub times: Vec<f32>,
    /// Flattened components, 3 per key (4 for rotation). Cubic channels
    /// without separate tangent arrays may interleave `[in, value, out]` per
    /// key instead.
    pub values: Vec<f32>,
    #[serde(default)]
    pub in_tangents: Option<Vec<f32>>,
    #[serde(default)]
    pub out_tangents: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipDesc {
    pub name: String,
    pub looping: Option<bool>,
    pub channels: Vec<ChannelDesc>,
}

impl ClipDesc {
    /// Builds the clip. With `joint_count`, channels targeting joints outside
    /// the skeleton are rejected.
    pub fn build(&self, joint_count: Option<usize>) -> Result<Clip> {
        let mut clip = Clip::new(self.name.clone());
        clip.set_looping(self.looping.unwrap_or(DEFAULT_CLIP_LOOPING));

        for (index, channel) in self.channels.iter().enumerate() {
            let malformed = |reason: String| AnimationError::MalformedChannel {
                clip: self.name.clone(),
                channel: index,
                reason,
            };

            let Some(path) = ChannelPath::parse(&channel.path) else {
                log::warn!(
                    "Clip '{}': skipping channel {index} with unsupported path '{}'",
                    self.name,
                    channel.path
                );
                continue;
            };

            if let Some(count) = joint_count {
                if channel.target >= count {
                    return Err(malformed(format!(
                        "targets joint {} but the skeleton has {count} joints",
                        channel.target
                    )));
                }
            }

            if channel.times.is_empty() {
                log::warn!("Clip '{}': channel {index} has no keyframes, skipping", self.name);
                continue;
            }

            match path {
                ChannelPath::Translation | ChannelPath::Scale => {
                    let track = channel_track(channel, 3, Vec3::from_slice).map_err(malformed)?;
                    clip.edit_or_insert_track(channel.target, |t| {
                        let slot = if path == ChannelPath::Translation {
                            &mut t.translation
                        } else {
                            &mut t.scale
                        };
                        warn_if_replacing(&self.name, channel.target, path, slot);
                        *slot = track;
                    });
                }
                ChannelPath::Rotation => {
                    let mut track = channel_track(channel, 4, Quat::from_slice).map_err(malformed)?;
                    normalize_rotations(&mut track).map_err(malformed)?;
                    clip.edit_or_insert_track(channel.target, |t| {
                        warn_if_replacing(&self.name, channel.target, path, &t.rotation);
                        t.rotation = track;
                    });
                }
            }
        }

        Ok(clip)
    }
}

fn warn_if_replacing<T: Interpolatable>(clip: &str, joint: usize, path: ChannelPath, track: &Track<T>) {
    if !track.is_empty() {
        log::warn!("Clip '{clip}': several {path:?} channels target joint {joint}, keeping the last");
    }
}

/// Validates a channel and turns it into keyframes of `components` floats
/// each.
fn channel_track<T: Interpolatable>(
    channel: &ChannelDesc,
    components: usize,
    from_slice: fn(&[f32]) -> T,
) -> std::result::Result<Track<T>, String> {
    let keys = channel.times.len();

    for pair in channel.times.windows(2) {
        if pair[1] <= pair[0] {
            return Err(format!(
                "key times must be strictly increasing ({} then {})",
                pair[0], pair[1]
            ));
        }
    }
    if let Some(t) = channel.times.iter().find(|t| !t.is_finite()) {
        return Err(format!("key time {t} is not finite"));
    }
    if let Some(v) = channel.values.iter().find(|v| !v.is_finite()) {
        return Err(format!("value {v} is not finite"));
    }

    let expected = keys * components;
    let interleaved = channel.interpolation == InterpolationMode::Cubic
        && channel.in_tangents.is_none()
        && channel.out_tangents.is_none()
        && channel.values.len() == expected * 3;

    if !interleaved && channel.values.len() != expected {
        return Err(format!(
            "expected {expected} values for {keys} keys, found {}",
            channel.values.len()
        ));
    }
    for (label, tangents) in [("in", &channel.in_tangents), ("out", &channel.out_tangents)] {
        if let Some(tangents) = tangents {
            if tangents.len() != expected {
                return Err(format!(
                    "expected {expected} {label} tangents for {keys} keys, found {}",
                    tangents.len()
                ));
            }
        }
    }

    let element = |data: &[f32], key: usize| from_slice(&data[key * components..(key + 1) * components]);
    let tangent = |data: &Option<Vec<f32>>, key: usize| data.as_deref().map_or(T::ZERO, |d| element(d, key));

    let frames = channel
        .times
        .iter()
        .enumerate()
        .map(|(key, &time)| {
            if interleaved {
                let base = key * 3;
                Frame::cubic(
                    time,
                    element(&channel.values, base),
                    element(&channel.values, base + 1),
                    element(&channel.values, base + 2),
                )
            } else {
                Frame::cubic(
                    time,
                    tangent(&channel.in_tangents, key),
                    element(&channel.values, key),
                    tangent(&channel.out_tangents, key),
                )
            }
        })
        .collect();

    Ok(Track::new(frames, channel.interpolation))
}

fn normalize_rotations(track: &mut Track<Quat>) -> std::result::Result<(), String> {
    let mut frames = track.frames().to_vec();
    for frame in &mut frames {
        if frame.value.length_squared() <= f32::EPSILON {
            return Err(format!("rotation at time {} has zero length", frame.time));
        }
        frame.value = frame.value.normalize();
    }
    *track = Track::new(frames, track.interpolation);
    Ok(())
}

// ============================================================================
// Asset
// ============================================================================

/// Everything a model contributes to animation: an optional skeleton and
/// the clips that drive it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationAsset {
    pub skeleton: Option<SkeletonDesc>,
    pub clips: Vec<ClipDesc>,
}

impl AnimationAsset {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds a controller owning the skeleton and every clip, with the first
    /// clip selected and playback stopped.
    ///
    /// Returns `Ok(None)` when the asset has no skeleton; its clips are
    /// dropped with a warning since nothing could play them.
    pub fn build_controller(&self, settings: AnimationSettings) -> Result<Option<Controller>> {
        let Some(skeleton_desc) = &self.skeleton else {
            if !self.clips.is_empty() {
                log::warn!("Model has {} animation clip(s) but no skeleton", self.clips.len());
            }
            return Ok(None);
        };

        let skeleton = skeleton_desc.build()?;
        let joint_count = skeleton.joint_count();

        let mut controller = Controller::with_settings(settings);
        controller.set_skeleton(skeleton);
        for desc in &self.clips {
            controller.add_clip(desc.build(Some(joint_count))?);
        }

        Ok(Some(controller))
    }
}
