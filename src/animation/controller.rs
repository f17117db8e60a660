use glam::Mat4;

use crate::animation::clip::{Clip, ClipCursor};
use crate::animation::pose::Pose;
use crate::animation::skeleton::Skeleton;
use crate::errors::{AnimationError, Result};
use crate::settings::AnimationSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    Playing,
    Paused,
    #[default]
    Stopped,
}

/// Playback state machine for one skeleton and its clips.
///
/// The controller exclusively owns its [`Skeleton`] and every [`Clip`] added
/// to it. Each [`Controller::update`] resets the working pose to the rest pose,
/// samples the current clip at the elapsed time, then advances time;
/// [`Controller::pose`] turns the working pose into skinning matrices.
///
/// Not reentrant: drive one controller from one update loop.
#[derive(Debug)]
pub struct Controller {
    skeleton: Option<Skeleton>,
    clips: Vec<Clip>,
    current_clip: usize,

    /// Unbounded; clips wrap it while sampling.
    elapsed: f32,
    speed: f32,
    state: PlaybackState,
    settings: AnimationSettings,

    working_pose: Option<Pose>,
    cursor: ClipCursor,

    // Scratch reused across frames
    globals: Vec<Mat4>,
    palette: Vec<Mat4>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(AnimationSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: AnimationSettings) -> Self {
        let settings = settings.sanitized();
        Self {
            skeleton: None,
            clips: Vec::new(),
            current_clip: 0,
            elapsed: 0.0,
            speed: settings.default_speed,
            state: PlaybackState::Stopped,
            settings,
            working_pose: None,
            cursor: ClipCursor::default(),
            globals: Vec::new(),
            palette: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    // ========================================================================
    // Skeleton & Clips
    // ========================================================================

    /// Binds `skeleton`, returning the previously bound one.
    ///
    /// The working pose is allocated on first bind and reused afterwards; it
    /// starts out as a copy of the rest pose.
    pub fn set_skeleton(&mut self, skeleton: Skeleton) -> Option<Skeleton> {
        match &mut self.working_pose {
            Some(pose) => pose.clone_from(skeleton.rest_pose()),
            None => self.working_pose = Some(skeleton.rest_pose().clone()),
        }
        self.cursor.reset();
        self.skeleton.replace(skeleton)
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn working_pose(&self) -> Option<&Pose> {
        self.working_pose.as_ref()
    }

    /// Takes ownership of `clip` and returns its index.
    pub fn add_clip(&mut self, clip: Clip) -> usize {
        if let Some(skeleton) = &self.skeleton {
            let count = skeleton.joint_count();
            if let Some(track) = clip.tracks().iter().find(|t| t.id() >= count) {
                log::warn!(
                    "Clip '{}' animates joint {} but the skeleton has {count} joints",
                    clip.name(),
                    track.id()
                );
            }
        }
        self.clips.push(clip);
        self.clips.len() - 1
    }

    /// Removes and returns the clip at `index`. The current selection keeps
    /// pointing at the same clip when another one is removed.
    pub fn remove_clip(&mut self, index: usize) -> Result<Clip> {
        self.check_clip_index(index)?;

        let clip = self.clips.remove(index);
        if index < self.current_clip {
            self.current_clip -= 1;
        } else if index == self.current_clip {
            self.reset();
            self.cursor.reset();
        }
        Ok(clip)
    }

    /// Drops every owned clip.
    pub fn clear_clips(&mut self) {
        self.clips.clear();
        self.current_clip = 0;
        self.reset();
        self.cursor.reset();
    }

    #[inline]
    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    #[inline]
    #[must_use]
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn clip(&self, index: usize) -> Result<&Clip> {
        self.check_clip_index(index)?;
        Ok(&self.clips[index])
    }

    pub fn clip_mut(&mut self, index: usize) -> Result<&mut Clip> {
        self.check_clip_index(index)?;
        if index == self.current_clip {
            self.cursor.reset();
        }
        Ok(&mut self.clips[index])
    }

    fn check_clip_index(&self, index: usize) -> Result<()> {
        if index < self.clips.len() {
            Ok(())
        } else {
            log::warn!("Clip with index ({index}) does not exist");
            Err(AnimationError::ClipIndexOutOfRange {
                index,
                count: self.clips.len(),
            })
        }
    }

    #[inline]
    #[must_use]
    pub fn current_animation(&self) -> usize {
        self.current_clip
    }

    /// Name of the selected clip, `None` when the selection is invalid.
    #[must_use]
    pub fn current_animation_name(&self) -> Option<&str> {
        self.clips.get(self.current_clip).map(Clip::name)
    }

    /// Selects a clip. Elapsed time restarts at zero even when `index` is
    /// rejected; the playback state is left alone.
    pub fn set_current_animation(&mut self, index: usize) -> Result<()> {
        self.reset();
        self.check_clip_index(index)?;
        self.current_clip = index;
        self.cursor.reset();
        Ok(())
    }

    // ========================================================================
    // Playback State
    // ========================================================================

    pub fn play(&mut self) {
        if matches!(self.state, PlaybackState::Stopped | PlaybackState::Paused) {
            self.state = PlaybackState::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.elapsed = 0.0;
    }

    /// Rewinds to the start without touching the playback state.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Sets the playback speed, clamped into the configured range.
    pub fn set_speed(&mut self, speed: f32) {
        let AnimationSettings {
            min_speed,
            max_speed,
            ..
        } = self.settings;

        self.speed = if speed.is_nan() {
            log::warn!("Speed cannot be NaN. Keeping speed at {}", self.speed);
            self.speed
        } else if speed < min_speed {
            log::warn!("Speed {speed} is below the minimum. Setting speed to {min_speed}");
            min_speed
        } else if speed > max_speed {
            log::warn!(
                "Speed {speed} may cause undesirable effects in animation playback. Setting speed to {max_speed}"
            );
            max_speed
        } else {
            speed
        };
    }

    // ========================================================================
    // Per-frame Evaluation
    // ========================================================================

    /// Advances playback by `delta_time` seconds.
    ///
    /// Does nothing unless playing. A missing skeleton or clip is logged and
    /// reported, leaving the working pose and elapsed time untouched.
    pub fn update(&mut self, delta_time: f32) -> Result<()> {
        if self.state != PlaybackState::Playing {
            return Ok(());
        }

        let Some(skeleton) = &self.skeleton else {
            log::warn!("Skeleton not set for controller");
            return Err(AnimationError::NoSkeleton);
        };
        let Some(clip) = self.clips.get(self.current_clip) else {
            log::warn!("Clip with index ({}) not found in controller", self.current_clip);
            return Err(AnimationError::ClipIndexOutOfRange {
                index: self.current_clip,
                count: self.clips.len(),
            });
        };

        let pose = self
            .working_pose
            .get_or_insert_with(|| skeleton.rest_pose().clone());
        pose.clone_from(skeleton.rest_pose());

        clip.sample_with_cursor(pose, self.elapsed, &mut self.cursor);

        if delta_time.is_finite() {
            self.elapsed += delta_time * self.speed;
        } else {
            log::warn!("Ignoring non-finite delta time {delta_time}");
        }
        Ok(())
    }

    /// Skinning matrices for the working pose, one per joint in joint order:
    /// `global(joint) * inverse_bind(joint)`.
    ///
    /// Empty when no skeleton is bound. The returned buffer is reused across
    /// calls.
    pub fn pose(&mut self) -> &[Mat4] {
        self.palette.clear();

        let (Some(skeleton), Some(pose)) = (&self.skeleton, &self.working_pose) else {
            return &self.palette;
        };

        pose.global_matrices_into(&mut self.globals);
        self.palette.extend(
            self.globals
                .iter()
                .zip(skeleton.inverse_bind_matrices())
                .map(|(global, inverse_bind)| *global * *inverse_bind),
        );

        &self.palette
    }

    /// [`Controller::pose`] as raw bytes, ready for a GPU buffer upload.
    pub fn pose_bytes(&mut self) -> &[u8] {
        bytemuck::cast_slice(self.pose())
    }

    /// Matrices produced by the last [`Controller::pose`] call.
    #[inline]
    #[must_use]
    pub fn skinning_matrices(&self) -> &[Mat4] {
        &self.palette
    }
}
