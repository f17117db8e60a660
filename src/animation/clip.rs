use rustc_hash::FxHashMap;

use crate::animation::pose::Pose;
use crate::animation::tracks::wrap_or_clamp;
use crate::animation::transform_track::{TransformCursor, TransformTrack};
use crate::settings::DEFAULT_CLIP_LOOPING;

/// Per-track cursors for sequential playback of one [`Clip`].
#[derive(Debug, Clone, Default)]
pub struct ClipCursor {
    tracks: Vec<TransformCursor>,
}

impl ClipCursor {
    pub fn reset(&mut self) {
        self.tracks.clear();
    }
}

/// A named, time-bounded set of joint animation tracks.
///
/// Tracks are kept in insertion order with at most one track per joint. The
/// cached `[start_time, end_time]` range is recomputed by every mutating
/// method, so it can never go stale.
#[derive(Debug, Clone)]
pub struct Clip {
    name: String,
    tracks: Vec<TransformTrack>,
    /// joint id -> position in `tracks`
    index: FxHashMap<usize, usize>,
    looping: bool,
    start_time: f32,
    end_time: f32,
}

impl Default for Clip {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl PartialEq for Clip {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.looping == other.looping && self.tracks == other.tracks
    }
}

impl Clip {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
            index: FxHashMap::default(),
            looping: DEFAULT_CLIP_LOOPING,
            start_time: 0.0,
            end_time: 0.0,
        }
    }

    #[must_use]
    pub fn with_tracks(name: impl Into<String>, tracks: Vec<TransformTrack>) -> Self {
        let mut clip = Self::new(name);
        for track in tracks {
            clip.insert_track(track);
        }
        clip.recalc_duration();
        clip
    }

    // ========================================================================
    // Properties
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    #[must_use]
    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        for track in &mut self.tracks {
            track.set_looping(looping);
        }
    }

    #[inline]
    #[must_use]
    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    #[inline]
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.end_time
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.end_time - self.start_time
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn tracks(&self) -> &[TransformTrack] {
        &self.tracks
    }

    #[inline]
    #[must_use]
    pub fn track_at(&self, index: usize) -> Option<&TransformTrack> {
        self.tracks.get(index)
    }

    /// Joint id driven by the track at `index`.
    #[must_use]
    pub fn id_at_index(&self, index: usize) -> Option<usize> {
        self.tracks.get(index).map(TransformTrack::id)
    }

    #[must_use]
    pub fn track(&self, joint_id: usize) -> Option<&TransformTrack> {
        self.index.get(&joint_id).map(|&i| &self.tracks[i])
    }

    /// Adds a track, replacing any existing track for the same joint. The
    /// track inherits the clip's looping flag.
    pub fn add_track(&mut self, track: TransformTrack) {
        self.insert_track(track);
        self.recalc_duration();
    }

    pub fn remove_track(&mut self, joint_id: usize) -> Option<TransformTrack> {
        let position = self.index.remove(&joint_id)?;
        let removed = self.tracks.remove(position);
        self.reindex();
        self.recalc_duration();
        Some(removed)
    }

    /// Mutates the track for `joint_id` in place and refreshes the cached
    /// range afterwards. Returns `None` when the clip has no such track.
    pub fn edit_track<R>(
        &mut self,
        joint_id: usize,
        f: impl FnOnce(&mut TransformTrack) -> R,
    ) -> Option<R> {
        let position = *self.index.get(&joint_id)?;
        Some(self.edit_at(position, joint_id, f))
    }

    /// Like [`Clip::edit_track`], creating an empty track for `joint_id`
    /// first when needed.
    pub fn edit_or_insert_track<R>(
        &mut self,
        joint_id: usize,
        f: impl FnOnce(&mut TransformTrack) -> R,
    ) -> R {
        let position = if let Some(&position) = self.index.get(&joint_id) {
            position
        } else {
            self.insert_track(TransformTrack::new(joint_id));
            self.tracks.len() - 1
        };
        self.edit_at(position, joint_id, f)
    }

    fn edit_at<R>(
        &mut self,
        position: usize,
        joint_id: usize,
        f: impl FnOnce(&mut TransformTrack) -> R,
    ) -> R {
        let track = &mut self.tracks[position];
        let result = f(track);
        track.set_looping(self.looping);

        if track.id() != joint_id {
            self.reindex();
        }
        self.recalc_duration();
        result
    }

    fn insert_track(&mut self, mut track: TransformTrack) {
        track.set_looping(self.looping);
        let joint_id = track.id();
        if let Some(&position) = self.index.get(&joint_id) {
            log::debug!("Clip '{}': replacing track for joint {joint_id}", self.name);
            self.tracks[position] = track;
        } else {
            self.index.insert(joint_id, self.tracks.len());
            self.tracks.push(track);
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        let mut duplicate = None;
        for (position, track) in self.tracks.iter().enumerate() {
            if self.index.insert(track.id(), position).is_some() {
                duplicate = Some(track.id());
            }
        }

        // Keep one track per joint, the later one wins
        if let Some(joint_id) = duplicate {
            log::warn!("Clip '{}': several tracks target joint {joint_id}, keeping the last", self.name);
            let mut seen = FxHashMap::default();
            for (position, track) in self.tracks.iter().enumerate().rev() {
                seen.entry(track.id()).or_insert(position);
            }
            let mut position = 0;
            self.tracks.retain(|track| {
                let keep = seen.get(&track.id()) == Some(&position);
                position += 1;
                keep
            });
            self.reindex();
        }
    }

    /// Recomputes the cached time range from the populated channels of every
    /// track. An unanimated clip has an empty `[0, 0]` range.
    pub fn recalc_duration(&mut self) {
        let range = self
            .tracks
            .iter()
            .filter_map(TransformTrack::time_range)
            .reduce(|(s0, e0), (s1, e1)| (s0.min(s1), e0.max(e1)));

        (self.start_time, self.end_time) = range.unwrap_or((0.0, 0.0));
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    /// Fits `time` into the clip range: wraps when looping, clamps otherwise.
    #[must_use]
    pub fn adjust_time(&self, time: f32) -> f32 {
        wrap_or_clamp(time, self.start_time, self.end_time, self.looping)
    }

    /// Writes the clip's joint transforms at `time` into `pose` and returns
    /// the adjusted sample time.
    ///
    /// Channels without keyframes keep whatever `pose` already holds, so the
    /// pose is normally reset to the rest pose first. Tracks targeting joints
    /// past the end of `pose` are skipped.
    pub fn sample(&self, pose: &mut Pose, time: f32) -> f32 {
        let time = self.adjust_time(time);

        for track in &self.tracks {
            let joint = track.id();
            if joint >= pose.len() {
                log::trace!("Clip '{}': joint {joint} is outside the pose", self.name);
                continue;
            }
            let local = track.sample(time, &pose.local(joint));
            pose.set_local(joint, local);
        }

        time
    }

    /// Same as [`Clip::sample`], reusing `cursor` between calls.
    pub fn sample_with_cursor(&self, pose: &mut Pose, time: f32, cursor: &mut ClipCursor) -> f32 {
        let time = self.adjust_time(time);

        if cursor.tracks.len() != self.tracks.len() {
            cursor.tracks.resize_with(self.tracks.len(), TransformCursor::default);
        }

        for (track, track_cursor) in self.tracks.iter().zip(&mut cursor.tracks) {
            let joint = track.id();
            if joint >= pose.len() {
                log::trace!("Clip '{}': joint {joint} is outside the pose", self.name);
                continue;
            }
            let local = track.sample_with_cursor(time, &pose.local(joint), track_cursor);
            pose.set_local(joint, local);
        }

        time
    }
}
