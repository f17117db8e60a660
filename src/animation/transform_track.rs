use glam::{Quat, Vec3};

use crate::animation::tracks::{KeyframeCursor, Track};
use crate::transform::Transform;

/// Which component of a joint transform a channel animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelPath {
    Translation,
    Rotation,
    Scale,
}

impl ChannelPath {
    /// Parses a glTF-style `target.path`. Other paths (e.g. `weights`) are
    /// not joint transforms and yield `None`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        match path {
            "translation" => Some(Self::Translation),
            "rotation" => Some(Self::Rotation),
            "scale" => Some(Self::Scale),
            _ => None,
        }
    }
}

/// Per-channel cursors for one [`TransformTrack`].
#[derive(Debug, Clone, Default)]
pub struct TransformCursor {
    pub translation: KeyframeCursor,
    pub rotation: KeyframeCursor,
    pub scale: KeyframeCursor,
}

/// Translation, rotation and scale curves driving one skeleton joint.
///
/// Each channel is optional: an empty sub-track leaves that component of the
/// reference transform untouched, so a clip can animate rotation alone while
/// translation and scale keep their rest-pose values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformTrack {
    joint_id: usize,
    pub translation: Track<Vec3>,
    pub rotation: Track<Quat>,
    pub scale: Track<Vec3>,
}

impl TransformTrack {
    #[must_use]
    pub fn new(joint_id: usize) -> Self {
        Self {
            joint_id,
            ..Default::default()
        }
    }

    /// Joint index this track drives.
    #[inline]
    #[must_use]
    pub fn id(&self) -> usize {
        self.joint_id
    }

    /// Retargets the track. Inside a [`Clip`](crate::Clip) use
    /// [`Clip::edit_track`](crate::Clip::edit_track) so the clip's joint index
    /// follows the change.
    pub fn set_id(&mut self, joint_id: usize) {
        self.joint_id = joint_id;
    }

    /// True when at least one channel has keyframes.
    #[must_use]
    pub fn is_animated(&self) -> bool {
        !(self.translation.is_empty() && self.rotation.is_empty() && self.scale.is_empty())
    }

    pub(crate) fn set_looping(&mut self, looping: bool) {
        self.translation.looping = looping;
        self.rotation.looping = looping;
        self.scale.looping = looping;
    }

    /// Combined `(start, end)` over the populated channels.
    #[must_use]
    pub fn time_range(&self) -> Option<(f32, f32)> {
        [
            self.translation.time_range(),
            self.rotation.time_range(),
            self.scale.time_range(),
        ]
        .into_iter()
        .flatten()
        .reduce(|(s0, e0), (s1, e1)| (s0.min(s1), e0.max(e1)))
    }

    #[must_use]
    pub fn start_time(&self) -> f32 {
        self.time_range().map_or(0.0, |(start, _)| start)
    }

    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.time_range().map_or(0.0, |(_, end)| end)
    }

    /// Samples every populated channel at `time` over `reference`.
    #[must_use]
    pub fn sample(&self, time: f32, reference: &Transform) -> Transform {
        let mut result = *reference;
        if !self.translation.is_empty() {
            result.translation = self.translation.sample(time);
        }
        if !self.rotation.is_empty() {
            result.rotation = self.rotation.sample(time);
        }
        if !self.scale.is_empty() {
            result.scale = self.scale.sample(time);
        }
        result
    }

    /// Same as [`TransformTrack::sample`], reusing per-channel cursors.
    pub fn sample_with_cursor(
        &self,
        time: f32,
        reference: &Transform,
        cursor: &mut TransformCursor,
    ) -> Transform {
        let mut result = *reference;
        if !self.translation.is_empty() {
            result.translation = self
                .translation
                .sample_with_cursor(time, &mut cursor.translation);
        }
        if !self.rotation.is_empty() {
            result.rotation = self.rotation.sample_with_cursor(time, &mut cursor.rotation);
        }
        if !self.scale.is_empty() {
            result.scale = self.scale.sample_with_cursor(time, &mut cursor.scale);
        }
        result
    }
}
