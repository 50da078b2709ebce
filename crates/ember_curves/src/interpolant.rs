//! Piecewise-linear curve evaluation and baking

use crate::error::{CurveError, Result};
use crate::lookup::LookupTable;
use crate::values::Interpolate;
use ember_core::{Color, Vec3};

/// A single keyframe on a curve
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe<T> {
    /// Time position in seconds
    pub time: f32,
    /// Value at this keyframe
    pub value: T,
}

impl<T> Keyframe<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Time-keyed piecewise-linear curve
///
/// Evaluation clamps to the endpoint values outside the keyframe range.
/// The keyframe list is immutable after construction; baking reads the
/// curve without mutating it.
#[derive(Clone, Debug)]
pub struct Interpolant<T: Interpolate> {
    frames: Vec<Keyframe<T>>,
}

/// Scalar curve
pub type FloatInterpolant = Interpolant<f32>;
/// 3-vector curve
pub type Vec3Interpolant = Interpolant<Vec3>;
/// RGB color curve (alpha is carried by a companion scalar curve)
pub type ColorInterpolant = Interpolant<Color>;

impl<T: Interpolate> Interpolant<T> {
    /// Build a curve from keyframes
    ///
    /// Times must be finite and strictly ascending, and the list must be
    /// non-empty.
    pub fn new(frames: Vec<Keyframe<T>>) -> Result<Self> {
        if frames.is_empty() {
            return Err(CurveError::Empty);
        }
        for (index, frame) in frames.iter().enumerate() {
            if !frame.time.is_finite() {
                return Err(CurveError::NonFiniteTime { index });
            }
            if index > 0 && frame.time <= frames[index - 1].time {
                return Err(CurveError::NonAscending { index });
            }
        }
        Ok(Self { frames })
    }

    /// The keyframes this curve was built from
    pub fn frames(&self) -> &[Keyframe<T>] {
        &self.frames
    }

    /// Time of the last keyframe
    pub fn end_time(&self) -> f32 {
        self.frames[self.frames.len() - 1].time
    }

    /// Evaluate the curve at `t`
    ///
    /// Outside `[first.time, last.time]` the nearest endpoint value is
    /// returned.
    pub fn evaluate(&self, t: f32) -> T {
        let first = &self.frames[0];
        if t <= first.time {
            return first.value.clone();
        }

        let last = &self.frames[self.frames.len() - 1];
        if t >= last.time {
            return last.value.clone();
        }

        for pair in self.frames.windows(2) {
            if t <= pair[1].time {
                let span = pair[1].time - pair[0].time;
                let local_t = (t - pair[0].time) / span;
                return pair[0].value.lerp(&pair[1].value, local_t);
            }
        }

        last.value.clone()
    }

    /// Smallest inter-keyframe gap normalized to `max_time`, starting from
    /// the 0.5 baseline that caps the minimum table width at 3 samples
    fn fold_smallest_step(&self, max_time: f32, mut smallest: f32) -> f32 {
        for pair in self.frames.windows(2) {
            let step = (pair[1].time - pair[0].time) / max_time;
            smallest = smallest.min(step);
        }
        smallest
    }
}

impl FloatInterpolant {
    /// Bake into a single-channel lookup table
    ///
    /// The table spans `[0, end_time]` with a resolution fine enough to
    /// resolve the tightest keyframe spacing:
    /// `width = ceil(1 / smallest_normalized_step) + 1`.
    pub fn bake(&self) -> LookupTable {
        let max_time = self.end_time();
        let smallest_step = self.fold_smallest_step(max_time, 0.5);

        let width = (1.0 / smallest_step).ceil() as u32 + 1;
        let mut data = Vec::with_capacity(width as usize);

        for i in 0..width {
            let t = i as f32 / (width - 1) as f32;
            data.push(self.evaluate(t * max_time));
        }

        LookupTable::new(width, 1, data)
    }
}

impl ColorInterpolant {
    /// Bake into an RGBA lookup table, taking alpha from a companion curve
    ///
    /// The table spans `[0, max(end times)]`; the resolution accounts for
    /// the keyframe spacing of both curves.
    pub fn bake_with_alpha(&self, alpha: &FloatInterpolant) -> LookupTable {
        let max_time = self.end_time().max(alpha.end_time());

        let smallest_step = self.fold_smallest_step(max_time, 0.5);
        let smallest_step = alpha.fold_smallest_step(max_time, smallest_step);

        let width = (1.0 / smallest_step).ceil() as u32 + 1;
        let mut data = Vec::with_capacity(width as usize * 4);

        for i in 0..width {
            let t = i as f32 / (width - 1) as f32;
            let color = self.evaluate(t * max_time);
            let a = alpha.evaluate(t * max_time);

            data.push(color.r);
            data.push(color.g);
            data.push(color.b);
            data.push(a);
        }

        LookupTable::new(width, 4, data)
    }
}
