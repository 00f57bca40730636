use std::cmp::Ordering;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, Result};

/// What happens when playback time leaves [0, duration]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWrapMode {
    #[default]
    Clamp,
    Repeat,
    PingPong,
}

/// Linear translation keyframes for a single node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TranslationTrack {
    times: Vec<f32>,
    values: Vec<Vec3>,
}

impl TranslationTrack {
    pub fn new(times: Vec<f32>, values: Vec<Vec3>) -> Result<Self> {
        if times.is_empty() {
            return Err(GenerateError::InvalidAnimation(
                "a track needs at least one keyframe".to_string(),
            ));
        }
        if times.len() != values.len() {
            return Err(GenerateError::InvalidAnimation(format!(
                "time count ({}) does not match value count ({})",
                times.len(),
                values.len()
            )));
        }
        if let Some(t) = times.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(GenerateError::InvalidAnimation(format!(
                "keyframe time {} must be finite and non-negative",
                t
            )));
        }
        if let Some(pair) = times.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(GenerateError::InvalidAnimation(format!(
                "keyframe times must be strictly increasing ({} >= {})",
                pair[0], pair[1]
            )));
        }
        Ok(Self { times, values })
    }

    /// Two keyframes, `from` at t = 0 and `to` at t = duration.
    pub fn between(from: Vec3, to: Vec3, duration: f32) -> Result<Self> {
        Self::new(vec![0.0, duration], vec![from, to])
    }

    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn values(&self) -> &[Vec3] {
        &self.values
    }

    pub fn first_value(&self) -> Vec3 {
        self.values[0]
    }

    pub fn last_value(&self) -> Vec3 {
        self.values[self.values.len() - 1]
    }

    pub fn duration(&self) -> f32 {
        self.times[self.times.len() - 1]
    }

    /// Output accessor payload, three floats per keyframe.
    pub fn flattened_values(&self) -> Vec<f32> {
        self.values.iter().flat_map(|v| v.to_array()).collect()
    }

    /// Plays the track backwards over the same timeline: keyframes are
    /// mirrored between the first and last keyframe time.
    pub fn reversed(&self) -> Self {
        let span = self.times[0] + self.duration();
        Self {
            times: self.times.iter().rev().map(|t| span - t).collect(),
            values: self.values.iter().rev().copied().collect(),
        }
    }

    /// Linear interpolation at `t`, clamped to the first and last keyframe.
    pub fn sample(&self, t: f32) -> Vec3 {
        let (i0, i1) = bin_search_keyframes(&self.times, t);
        let (t0, t1) = (self.times[i0], self.times[i1]);
        let alpha = if i0 == i1 || (t1 - t0).abs() < f32::EPSILON {
            0.0
        } else {
            (t - t0) / (t1 - t0)
        };
        self.values[i0].lerp(self.values[i1], alpha)
    }

    /// Value of the last keyframe at or before `t`.
    pub fn sample_step(&self, t: f32) -> Vec3 {
        let (i0, _) = bin_search_keyframes(&self.times, t);
        self.values[i0]
    }
}

/// CUBICSPLINE keyframes: every keyframe carries an in-tangent, a value and
/// an out-tangent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CubicSplineTrack {
    keys: TranslationTrack,
    in_tangents: Vec<Vec3>,
    out_tangents: Vec<Vec3>,
}

impl CubicSplineTrack {
    /// `outputs` holds (in-tangent, value, out-tangent) triplets, one per time.
    pub fn new(times: Vec<f32>, outputs: Vec<Vec3>) -> Result<Self> {
        if outputs.len() != times.len() * 3 {
            return Err(GenerateError::InvalidAnimation(format!(
                "cubic spline needs 3 outputs per keyframe, got {} for {} times",
                outputs.len(),
                times.len()
            )));
        }
        let mut in_tangents = Vec::with_capacity(times.len());
        let mut values = Vec::with_capacity(times.len());
        let mut out_tangents = Vec::with_capacity(times.len());
        for triplet in outputs.chunks_exact(3) {
            in_tangents.push(triplet[0]);
            values.push(triplet[1]);
            out_tangents.push(triplet[2]);
        }
        Ok(Self {
            keys: TranslationTrack::new(times, values)?,
            in_tangents,
            out_tangents,
        })
    }

    pub fn keys(&self) -> &TranslationTrack {
        &self.keys
    }

    /// Hermite interpolation between the surrounding keyframes.
    pub fn sample(&self, t: f32) -> Vec3 {
        let times = self.keys.times();
        let values = self.keys.values();
        let (i0, i1) = bin_search_keyframes(times, t);
        if i0 == i1 {
            return values[i0];
        }

        let dt = times[i1] - times[i0];
        let s = (t - times[i0]) / dt;
        let s2 = s * s;
        let s3 = s2 * s;
        (2.0 * s3 - 3.0 * s2 + 1.0) * values[i0]
            + (s3 - 2.0 * s2 + s) * dt * self.out_tangents[i0]
            + (-2.0 * s3 + 3.0 * s2) * values[i1]
            + (s3 - s2) * dt * self.in_tangents[i1]
    }
}

/// A translation track together with the way it is interpolated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "interpolation", rename_all = "UPPERCASE")]
pub enum Curve {
    Linear(TranslationTrack),
    Step(TranslationTrack),
    CubicSpline(CubicSplineTrack),
}

impl Curve {
    /// Keyframe times and values, without tangents.
    pub fn keys(&self) -> &TranslationTrack {
        match self {
            Curve::Linear(track) | Curve::Step(track) => track,
            Curve::CubicSpline(spline) => spline.keys(),
        }
    }

    pub fn duration(&self) -> f32 {
        self.keys().duration()
    }

    pub fn sample(&self, t: f32) -> Vec3 {
        match self {
            Curve::Linear(track) => track.sample(t),
            Curve::Step(track) => track.sample_step(t),
            Curve::CubicSpline(spline) => spline.sample(t),
        }
    }
}

fn bin_search_keyframes(times: &[f32], val: f32) -> (usize, usize) {
    let n = times.len();
    if n <= 1 {
        return (0, 0);
    }

    match times.binary_search_by(|x| x.partial_cmp(&val).unwrap_or(Ordering::Greater)) {
        Ok(i) => (i, i),
        Err(0) => (0, 0),
        Err(i) if i >= n => (n - 1, n - 1),
        Err(i) => (i - 1, i),
    }
}

/// Maps playback time into [0, duration].
pub fn wrap_time(time: f32, duration: f32, mode: TimeWrapMode) -> f32 {
    if duration <= f32::EPSILON {
        return 0.0;
    }
    match mode {
        TimeWrapMode::Clamp => time.clamp(0.0, duration),
        TimeWrapMode::Repeat => time.rem_euclid(duration),
        TimeWrapMode::PingPong => {
            let period = duration * 2.0;
            let t = time.rem_euclid(period);
            if t <= duration {
                t
            } else {
                period - t
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> TranslationTrack {
        TranslationTrack::new(
            vec![0.0, 0.6, 1.2],
            vec![Vec3::ZERO, Vec3::new(0.0, 0.05, 0.0), Vec3::ZERO],
        )
        .unwrap()
    }

    #[test]
    fn rejects_non_increasing_times() {
        let result = TranslationTrack::new(vec![0.0, 0.6, 0.6], vec![Vec3::ZERO; 3]);
        assert!(matches!(result, Err(GenerateError::InvalidAnimation(_))));
    }

    #[test]
    fn rejects_length_mismatch() {
        let result = TranslationTrack::new(vec![0.0, 1.0], vec![Vec3::ZERO; 3]);
        assert!(matches!(result, Err(GenerateError::InvalidAnimation(_))));
    }

    #[test]
    fn rejects_empty_and_negative_times() {
        assert!(TranslationTrack::new(vec![], vec![]).is_err());
        assert!(TranslationTrack::new(vec![-1.0, 1.0], vec![Vec3::ZERO; 2]).is_err());
        assert!(TranslationTrack::new(vec![0.0, f32::NAN], vec![Vec3::ZERO; 2]).is_err());
    }

    #[test]
    fn flattened_values_hold_three_floats_per_keyframe() {
        let track = bob();
        assert_eq!(track.flattened_values().len(), 3 * track.times().len());
        assert_eq!(track.flattened_values()[4], 0.05);
    }

    #[test]
    fn reversed_swaps_endpoints_and_keeps_duration() {
        let track = TranslationTrack::between(Vec3::X, Vec3::Y, 1.0).unwrap();
        let reversed = track.reversed();
        assert_eq!(reversed.times(), &[0.0, 1.0]);
        assert_eq!(reversed.first_value(), Vec3::Y);
        assert_eq!(reversed.last_value(), Vec3::X);
        assert_eq!(reversed.reversed(), track);
    }

    #[test]
    fn reversed_keeps_a_late_starting_timeline() {
        let track = TranslationTrack::new(
            vec![0.5, 1.0, 1.5],
            vec![Vec3::X, Vec3::Y, Vec3::Z],
        )
        .unwrap();
        let reversed = track.reversed();
        assert_eq!(reversed.times(), &[0.5, 1.0, 1.5]);
        assert_eq!(reversed.values(), &[Vec3::Z, Vec3::Y, Vec3::X]);
        assert_eq!(reversed.reversed(), track);
    }

    #[test]
    fn sample_interpolates_linearly_and_clamps() {
        let track = TranslationTrack::between(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 1.0).unwrap();
        assert_eq!(track.sample(0.5), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(track.sample(-1.0), Vec3::ZERO);
        assert_eq!(track.sample(3.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(bob().sample(0.6), Vec3::new(0.0, 0.05, 0.0));
    }

    #[test]
    fn step_holds_the_previous_keyframe() {
        let track = TranslationTrack::between(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 1.0).unwrap();
        let curve = Curve::Step(track);
        assert_eq!(curve.sample(0.5), Vec3::ZERO);
        assert_eq!(curve.sample(0.999), Vec3::ZERO);
        assert_eq!(curve.sample(1.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(curve.sample(-1.0), Vec3::ZERO);
    }

    #[test]
    fn cubic_spline_splits_triplets_and_uses_tangents() {
        let outputs = vec![
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::ZERO,
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::ZERO,
        ];
        let spline = CubicSplineTrack::new(vec![0.0, 1.0], outputs).unwrap();
        assert_eq!(spline.keys().values(), &[Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)]);

        let curve = Curve::CubicSpline(spline);
        assert_eq!(curve.sample(0.0), Vec3::ZERO);
        assert_eq!(curve.sample(1.0), Vec3::new(2.0, 0.0, 0.0));
        // 0.5 * 2 from the values, plus 0.125 * 4 from the out-tangent
        assert!(curve.sample(0.5).abs_diff_eq(Vec3::new(1.5, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn cubic_spline_rejects_missing_tangents() {
        let result = CubicSplineTrack::new(vec![0.0, 1.0], vec![Vec3::ZERO; 2]);
        assert!(matches!(result, Err(GenerateError::InvalidAnimation(_))));
    }

    #[test]
    fn wrap_modes() {
        assert_eq!(wrap_time(1.5, 1.0, TimeWrapMode::Clamp), 1.0);
        assert!((wrap_time(1.25, 1.0, TimeWrapMode::Repeat) - 0.25).abs() < 1e-6);
        assert!((wrap_time(1.25, 1.0, TimeWrapMode::PingPong) - 0.75).abs() < 1e-6);
        assert_eq!(wrap_time(5.0, 0.0, TimeWrapMode::Repeat), 0.0);
    }
}
