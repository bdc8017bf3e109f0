use super::regions::Region;
use crate::config::ScoringConfig;

pub const PERFECT_PITCH: &str = "Perfect pitch!";

/// Flags syllables sung noticeably above or below the reference.
#[derive(Debug, Clone)]
pub struct FeedbackGenerator {
    min_region_width: usize,
    tolerance: f32,
}

impl Default for FeedbackGenerator {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl FeedbackGenerator {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            min_region_width: config.min_region_width,
            tolerance: config.pitch_tolerance,
        }
    }

    /// Compare mean aligned pitch per region.
    ///
    /// Regions narrower than the minimum width are skipped. Comments come
    /// out in region order, joined by spaces; with nothing to report the
    /// result is [`PERFECT_PITCH`].
    pub fn feedback(&self, reference_aligned: &[f32], user_aligned: &[f32], regions: &[Region]) -> String {
        let comments: Vec<String> = regions
            .iter()
            .filter(|r| r.width() >= self.min_region_width)
            .filter_map(|r| self.judge(reference_aligned, user_aligned, r))
            .collect();

        if comments.is_empty() {
            PERFECT_PITCH.to_string()
        } else {
            comments.join(" ")
        }
    }

    fn judge(&self, reference: &[f32], user: &[f32], region: &Region) -> Option<String> {
        let ref_mean = slice_mean(reference, region)?;
        let user_mean = slice_mean(user, region)?;

        if user_mean > ref_mean + self.tolerance {
            Some(format!("{} too high.", region.label))
        } else if user_mean < ref_mean - self.tolerance {
            Some(format!("{} too low.", region.label))
        } else {
            None
        }
    }
}

/// Mean over [start, end) of the region, clipped to the series.
fn slice_mean(series: &[f32], region: &Region) -> Option<f32> {
    let end = region.end_index.min(series.len());
    let slice = series.get(region.start_index..end)?;
    if slice.is_empty() {
        return None;
    }
    Some(slice.iter().sum::<f32>() / slice.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(label: &str, start: usize, end: usize) -> Region {
        Region {
            label: label.into(),
            start_index: start,
            end_index: end,
        }
    }

    #[test]
    fn identical_curves_are_perfect() {
        let curve: Vec<f32> = (0..30).map(|i| (i as f32 * 0.3).sin()).collect();
        let regions = vec![region("Ha", 0, 15), region("i", 15, 29)];
        assert_eq!(FeedbackGenerator::default().feedback(&curve, &curve, &regions), PERFECT_PITCH);
    }

    #[test]
    fn shifted_up_region_is_too_high() {
        let reference = vec![0.0; 20];
        let mut user = vec![0.0; 20];
        for v in &mut user[10..19] {
            *v += 2.0;
        }
        let regions = vec![region("De", 0, 10), region("Su", 10, 19)];
        assert_eq!(
            FeedbackGenerator::default().feedback(&reference, &user, &regions),
            "Su too high."
        );
    }

    #[test]
    fn comments_follow_region_order() {
        let reference = vec![0.0; 30];
        let mut user = vec![0.0; 30];
        user[..10].iter_mut().for_each(|v| *v = -1.0);
        user[20..].iter_mut().for_each(|v| *v = 1.0);
        let regions = vec![region("Wa", 0, 10), region("Ta", 10, 20), region("Shi", 20, 29)];
        assert_eq!(
            FeedbackGenerator::default().feedback(&reference, &user, &regions),
            "Wa too low. Shi too high."
        );
    }

    #[test]
    fn within_tolerance_is_silent() {
        let reference = vec![0.0; 10];
        let user = vec![0.5; 10];
        let regions = vec![region("Ha", 0, 9)];
        assert_eq!(FeedbackGenerator::default().feedback(&reference, &user, &regions), PERFECT_PITCH);
    }

    #[test]
    fn narrow_regions_are_skipped() {
        let reference = vec![0.0; 10];
        let user = vec![3.0; 10];
        let regions = vec![region("n", 0, 4), region("Ni", 4, 9)];
        assert_eq!(
            FeedbackGenerator::default().feedback(&reference, &user, &regions),
            "Ni too high."
        );
    }

    #[test]
    fn out_of_range_region_is_ignored() {
        let regions = vec![region("Ko", 50, 60)];
        assert_eq!(
            FeedbackGenerator::default().feedback(&[0.0; 10], &[2.0; 10], &regions),
            PERFECT_PITCH
        );
    }
}
