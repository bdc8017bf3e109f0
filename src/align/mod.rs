pub mod fastdtw;

use serde::Serialize;

use crate::analysis::contour::PitchContour;

/// Monotonic pairing of (reference frame, user frame) indices.
pub type AlignmentPath = Vec<(usize, usize)>;

/// Result of aligning a user contour against a reference contour.
#[derive(Debug, Clone, Serialize)]
pub struct Alignment {
    /// Sum of the point distance over every step of the path.
    pub distance: f32,
    pub path: AlignmentPath,
}

impl Alignment {
    /// Reference values in path order, one per path step.
    pub fn reference_series(&self, reference: &[f32]) -> Vec<f32> {
        self.path.iter().map(|&(r, _)| series_value(reference, r)).collect()
    }

    /// User values in path order, one per path step.
    pub fn user_series(&self, user: &[f32]) -> Vec<f32> {
        self.path.iter().map(|&(_, u)| series_value(user, u)).collect()
    }
}

/// Empty series are aligned as a single silent frame, so index 0 reads 0.0.
fn series_value(series: &[f32], index: usize) -> f32 {
    series.get(index).copied().unwrap_or(0.0)
}

/// Absolute difference, the point distance used for normalized pitch.
pub fn absolute_difference(a: f32, b: f32) -> f32 {
    (a - b).abs()
}

/// Elastic alignment of two pitch contours.
#[derive(Debug, Clone)]
pub struct SequenceAligner {
    radius: usize,
}

impl Default for SequenceAligner {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

impl SequenceAligner {
    pub fn new(radius: usize) -> Self {
        Self { radius }
    }

    /// Align `user` against `reference` under `point_distance`.
    ///
    /// The path starts at (0, 0), ends at (last_ref, last_user) and never
    /// moves backwards in either sequence. A zero-length contour is aligned
    /// as a single frame of 0.0.
    pub fn align<F>(&self, reference: &PitchContour, user: &PitchContour, point_distance: F) -> Alignment
    where
        F: Fn(f32, f32) -> f32,
    {
        let silent = [0.0_f32];
        let reference = if reference.is_empty() { &silent[..] } else { reference.values() };
        let user = if user.is_empty() { &silent[..] } else { user.values() };

        let (distance, path) = fastdtw::fastdtw(reference, user, self.radius, &point_distance);
        Alignment { distance, path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contour(values: &[f32]) -> PitchContour {
        PitchContour::new(values.to_vec())
    }

    fn assert_well_formed(path: &AlignmentPath, ref_len: usize, user_len: usize) {
        assert_eq!(path.first(), Some(&(0, 0)));
        assert_eq!(path.last(), Some(&(ref_len - 1, user_len - 1)));
        for pair in path.windows(2) {
            let (r0, u0) = pair[0];
            let (r1, u1) = pair[1];
            assert!(r1 >= r0 && u1 >= u0, "path went backwards: {pair:?}");
            assert!(r1 - r0 <= 1 && u1 - u0 <= 1, "path skipped a frame: {pair:?}");
        }
        assert!(path.len() >= ref_len.max(user_len));
    }

    #[test]
    fn self_alignment_is_identity() {
        let c = contour(&[0.0, 0.0, 1.0, 1.0, 0.0]);
        let alignment = SequenceAligner::default().align(&c, &c, absolute_difference);

        assert_eq!(alignment.distance, 0.0);
        assert_eq!(alignment.path, vec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]);
    }

    #[test]
    fn long_self_alignment_is_identity() {
        let values: Vec<f32> = (0..300).map(|i| (i as f32 * 0.07).sin()).collect();
        let c = contour(&values);
        let alignment = SequenceAligner::default().align(&c, &c, absolute_difference);

        assert_eq!(alignment.distance, 0.0);
        assert!(alignment.path.iter().all(|&(r, u)| r == u));
        assert_eq!(alignment.path.len(), 300);
    }

    #[test]
    fn different_lengths_are_well_formed() {
        let reference: Vec<f32> = (0..120).map(|i| (i as f32 * 0.05).sin()).collect();
        let user: Vec<f32> = (0..75).map(|i| (i as f32 * 0.08).sin() + 0.1).collect();
        let alignment =
            SequenceAligner::default().align(&contour(&reference), &contour(&user), absolute_difference);

        assert_well_formed(&alignment.path, 120, 75);
        assert!(alignment.distance >= 0.0);
    }

    #[test]
    fn distance_is_sum_over_path() {
        let reference = contour(&[0.0, 1.0, 2.0, 1.0, 0.0, -1.0, 0.5]);
        let user = contour(&[0.5, 2.0, 1.5, -1.0]);
        let alignment = SequenceAligner::default().align(&reference, &user, absolute_difference);

        let summed: f32 = alignment
            .path
            .iter()
            .map(|&(r, u)| (reference.values()[r] - user.values()[u]).abs())
            .sum();
        assert!((alignment.distance - summed).abs() < 1e-5);
    }

    #[test]
    fn empty_contour_is_single_silent_frame() {
        let empty = contour(&[]);
        let user = contour(&[1.0, -1.0, 2.0]);
        let alignment = SequenceAligner::default().align(&empty, &user, absolute_difference);

        assert_eq!(alignment.path, vec![(0, 0), (0, 1), (0, 2)]);
        assert!((alignment.distance - 4.0).abs() < 1e-6);
        assert_eq!(alignment.reference_series(empty.values()), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn aligned_series_follow_path() {
        let reference = contour(&[0.0, 1.0, 2.0]);
        let user = contour(&[0.0, 2.0]);
        let alignment = SequenceAligner::default().align(&reference, &user, absolute_difference);

        let r = alignment.reference_series(reference.values());
        let u = alignment.user_series(user.values());
        assert_eq!(r.len(), alignment.path.len());
        assert_eq!(u.len(), alignment.path.len());
        assert_eq!(r.first(), Some(&0.0));
        assert_eq!(u.last(), Some(&2.0));
    }
}
