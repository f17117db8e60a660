use serde::{Deserialize, Serialize};

use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    /// Hold the value of the previous keyframe.
    #[serde(alias = "STEP")]
    Constant,
    #[default]
    #[serde(alias = "LINEAR")]
    Linear,
    /// Hermite spline using the keyframe tangents.
    #[serde(alias = "CUBICSPLINE")]
    Cubic,
}

const MAX_SCAN_OFFSET: usize = 3;

/// Segments shorter than this are treated as a hard step.
const MIN_SEGMENT_DURATION: f32 = 1e-6;

/// A single keyframe. Tangents are only read in [`InterpolationMode::Cubic`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<T: Interpolatable> {
    pub value: T,
    pub tangent_in: T,
    pub tangent_out: T,
    pub time: f32,
}

impl<T: Interpolatable> Frame<T> {
    /// Keyframe with zero tangents.
    #[must_use]
    pub fn new(time: f32, value: T) -> Self {
        Self {
            value,
            tangent_in: T::ZERO,
            tangent_out: T::ZERO,
            time,
        }
    }

    #[must_use]
    pub fn cubic(time: f32, tangent_in: T, value: T, tangent_out: T) -> Self {
        Self {
            value,
            tangent_in,
            tangent_out,
            time,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

impl KeyframeCursor {
    #[inline]
    pub fn reset(&mut self) {
        self.last_index = 0;
    }
}

/// A curve of keyframes ordered by strictly increasing time.
#[derive(Debug, Clone, PartialEq)]
pub struct Track<T: Interpolatable> {
    frames: Vec<Frame<T>>,
    pub interpolation: InterpolationMode,
    /// Wrap sample times into the keyed range instead of clamping them.
    pub looping: bool,
}

impl<T: Interpolatable> Default for Track<T> {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            interpolation: InterpolationMode::Linear,
            looping: false,
        }
    }
}

impl<T: Interpolatable> Track<T> {
    /// Builds a track from keyframes in any order.
    ///
    /// Frames are sorted by time. Frames with a non-finite time and frames
    /// sharing a time with an earlier frame are dropped with a warning.
    #[must_use]
    pub fn new(mut frames: Vec<Frame<T>>, interpolation: InterpolationMode) -> Self {
        let before = frames.len();
        frames.retain(|f| f.time.is_finite());
        if frames.len() != before {
            log::warn!("Dropped {} keyframe(s) with non-finite time", before - frames.len());
        }

        frames.sort_by(|a, b| a.time.total_cmp(&b.time));

        let before = frames.len();
        frames.dedup_by(|later, earlier| later.time == earlier.time);
        if frames.len() != before {
            log::warn!("Dropped {} keyframe(s) with duplicate time", before - frames.len());
        }

        Self {
            frames,
            interpolation,
            looping: false,
        }
    }

    #[must_use]
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    // ========================================================================
    // Keyframe Access
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn frames(&self) -> &[Frame<T>] {
        &self.frames
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Inserts a keyframe at its time-ordered position. A keyframe already at
    /// exactly that time is replaced.
    pub fn push_frame(&mut self, frame: Frame<T>) {
        if !frame.time.is_finite() {
            log::warn!("Ignoring keyframe with non-finite time {}", frame.time);
            return;
        }

        let idx = self.frames.partition_point(|f| f.time < frame.time);
        match self.frames.get_mut(idx) {
            Some(existing) if existing.time == frame.time => *existing = frame,
            _ => self.frames.insert(idx, frame),
        }
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// `(first, last)` keyframe times, or `None` for an empty track.
    #[must_use]
    pub fn time_range(&self) -> Option<(f32, f32)> {
        Some((self.frames.first()?.time, self.frames.last()?.time))
    }

    #[must_use]
    pub fn start_time(&self) -> f32 {
        self.frames.first().map_or(0.0, |f| f.time)
    }

    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.frames.last().map_or(0.0, |f| f.time)
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    /// Maps `time` into the keyed range, wrapping when looping and clamping
    /// otherwise.
    #[must_use]
    pub fn adjust_time(&self, time: f32) -> f32 {
        match self.time_range() {
            Some((start, end)) => wrap_or_clamp(time, start, end, self.looping),
            None => 0.0,
        }
    }

    /// Stateless sampling via binary search.
    ///
    /// An empty track yields [`Interpolatable::ZERO`]; callers should treat
    /// that as "no data".
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        match self.frames.len() {
            0 => T::ZERO,
            1 => self.frames[0].value,
            _ => {
                let time = self.adjust_time(time);
                // First frame strictly after `time`
                let next_idx = self.frames.partition_point(|f| f.time <= time);
                self.sample_at_frame(next_idx.saturating_sub(1), time)
            }
        }
    }

    /// Sampling with a cursor remembering the last bracketing keyframe.
    ///
    /// Sequential playback finds the segment with a short local scan; large
    /// jumps fall back to binary search. The result is identical to
    /// [`Track::sample`].
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        let len = self.frames.len();
        match len {
            0 => return T::ZERO,
            1 => return self.frames[0].value,
            _ => {}
        }

        let time = self.adjust_time(time);

        // A cursor left over from a longer track is pulled back in range
        let i = cursor.last_index.min(len - 1);
        let t_curr = self.frames[i].time;

        let found_index = if time >= t_curr {
            // Forward: normal playback
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    if time >= self.frames[len - 1].time {
                        res = Some(len - 1);
                    }
                    break;
                }
                if time < self.frames[idx + 1].time {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            // Backward: loop wrap or reverse scrubbing
            let mut res = None;
            for offset in 1..=MAX_SCAN_OFFSET {
                if i < offset {
                    break;
                }
                let idx = i - offset;
                if time >= self.frames[idx].time {
                    res = Some(idx);
                    break;
                }
            }
            res
        };

        let final_index = found_index.unwrap_or_else(|| {
            let next_idx = self.frames.partition_point(|f| f.time <= time);
            next_idx.saturating_sub(1)
        });
        cursor.last_index = final_index;

        self.sample_at_frame(final_index, time)
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.frames.len();

        if index >= len - 1 {
            return self.frames[len - 1].value;
        }

        let f0 = &self.frames[index];
        let f1 = &self.frames[index + 1];
        let dt = f1.time - f0.time;

        let t = if dt > MIN_SEGMENT_DURATION {
            ((time - f0.time) / dt).clamp(0.0, 1.0)
        } else {
            0.0
        };

        // Keyframe times reproduce their values exactly
        if t <= 0.0 {
            return f0.value;
        }

        match self.interpolation {
            InterpolationMode::Constant => f0.value,
            InterpolationMode::Linear => T::interpolate_linear(f0.value, f1.value, t),
            InterpolationMode::Cubic => {
                T::interpolate_cubic(f0.value, f0.tangent_out, f1.tangent_in, f1.value, t, dt)
            }
        }
    }
}

/// Fits `time` into `[start, end]`.
///
/// Times already inside the closed range pass through unchanged, so the last
/// keyframe stays reachable. Outside it a looping range wraps with a floored
/// modulo (negative times wrap backwards) and a non-looping range clamps. A
/// zero-length range always yields `start`.
#[must_use]
pub(crate) fn wrap_or_clamp(time: f32, start: f32, end: f32, looping: bool) -> f32 {
    let span = end - start;
    if !time.is_finite() || span <= 0.0 {
        return start;
    }

    if (start..=end).contains(&time) {
        return time;
    }

    if looping {
        (start + (time - start).rem_euclid(span)).min(end)
    } else {
        time.clamp(start, end)
    }
}
