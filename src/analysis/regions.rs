use serde::{Deserialize, Serialize};

use crate::align::AlignmentPath;

/// A contiguous slice of the alignment path attributed to one syllable.
///
/// `start_index` and `end_index` are positions in the path, not frame
/// indices. Consecutive regions share their boundary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub label: String,
    pub start_index: usize,
    pub end_index: usize,
}

impl Region {
    /// Number of path steps covered.
    pub fn width(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }
}

/// Split an alignment path into one region per syllable label.
///
/// The reference timeline is divided into equal chunks, one per label, on
/// the assumption that syllables in the reference recording are roughly the
/// same length. Each region ends at the first path entry that reaches its
/// chunk's end; the last region always runs to the end of the path.
///
/// Empty labels or an empty path produce no regions.
pub fn segment(path: &AlignmentPath, labels: &[String]) -> Vec<Region> {
    let Some(&(last_ref, _)) = path.last() else {
        return Vec::new();
    };
    if labels.is_empty() {
        return Vec::new();
    }

    let last_index = path.len() - 1;
    let count = labels.len();
    let mut start = 0;

    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let end = if i + 1 == count {
                last_index
            } else {
                let target = ((i + 1) as f64 * last_ref as f64 / count as f64).round() as usize;
                path.iter()
                    .position(|&(r, _)| r >= target)
                    .unwrap_or(last_index)
                    .max(start)
            };

            let region = Region {
                label: label.clone(),
                start_index: start,
                end_index: end,
            };
            start = end;
            region
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn diagonal(len: usize) -> AlignmentPath {
        (0..len).map(|i| (i, i)).collect()
    }

    fn assert_covers(regions: &[Region], path_len: usize) {
        assert_eq!(regions.first().unwrap().start_index, 0);
        assert_eq!(regions.last().unwrap().end_index, path_len - 1);
        for pair in regions.windows(2) {
            assert_eq!(pair[0].end_index, pair[1].start_index);
            assert!(pair[0].start_index <= pair[0].end_index);
        }
    }

    #[test]
    fn even_split_on_diagonal() {
        let regions = segment(&diagonal(21), &labels(&["Ha", "i"]));
        assert_eq!(
            regions,
            vec![
                Region { label: "Ha".into(), start_index: 0, end_index: 10 },
                Region { label: "i".into(), start_index: 10, end_index: 20 },
            ]
        );
    }

    #[test]
    fn returns_one_region_per_label() {
        let names = labels(&["Ko", "n", "Ni", "Chi", "Wa"]);
        let regions = segment(&diagonal(37), &names);
        assert_eq!(regions.len(), 5);
        assert_covers(&regions, 37);
        let got: Vec<&str> = regions.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(got, vec!["Ko", "n", "Ni", "Chi", "Wa"]);
    }

    #[test]
    fn warped_path_still_covered() {
        // Reference stalls at frame 3 while the user keeps going, then the
        // path ends with a run of horizontal steps.
        let path: AlignmentPath = vec![
            (0, 0), (1, 1), (2, 2), (3, 3), (3, 4), (3, 5), (3, 6),
            (4, 7), (5, 8), (6, 9), (6, 10), (6, 11),
        ];
        let regions = segment(&path, &labels(&["Se", "n", "Se", "i"]));
        assert_eq!(regions.len(), 4);
        assert_covers(&regions, path.len());
    }

    #[test]
    fn more_labels_than_frames() {
        let path: AlignmentPath = vec![(0, 0), (0, 1), (1, 2)];
        let names = labels(&["Ha", "i", "Wa", "Ta", "Shi"]);
        let regions = segment(&path, &names);
        assert_eq!(regions.len(), 5);
        assert_covers(&regions, 3);
    }

    #[test]
    fn single_frame_reference() {
        let path: AlignmentPath = vec![(0, 0), (0, 1), (0, 2)];
        let regions = segment(&path, &labels(&["De", "Su"]));
        assert_eq!(regions[0].end_index, 0);
        assert_eq!(regions[1].end_index, 2);
    }

    #[test]
    fn empty_inputs_give_no_regions() {
        assert!(segment(&Vec::new(), &labels(&["Ha"])).is_empty());
        assert!(segment(&diagonal(10), &[]).is_empty());
    }

    #[test]
    fn width_is_span() {
        let r = Region { label: "Wa".into(), start_index: 4, end_index: 11 };
        assert_eq!(r.width(), 7);
    }
}
