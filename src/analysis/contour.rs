use serde::{Deserialize, Serialize};

/// A normalized pitch contour: one value per analysis frame.
///
/// Voiced frames hold z-score normalized pitch, unvoiced frames hold exactly
/// 0.0. The frame rate is fixed by the pitch tracker's hop size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchContour {
    values: Vec<f32>,
}

impl PitchContour {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// The "no usable pitch" contour: `len` frames of silence.
    pub fn fallback(len: usize) -> Self {
        Self {
            values: vec![0.0; len.max(1)],
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when no frame carries pitch, as in the fallback contour.
    pub fn is_silent(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }
}

impl From<Vec<f32>> for PitchContour {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

/// Z-score normalize a raw contour of frequencies (0.0 = unvoiced).
///
/// Mean and standard deviation come from voiced frames only; unvoiced frames
/// stay at exactly 0.0. Returns `None` if nothing is voiced.
pub fn normalize(frequencies: &[f32]) -> Option<Vec<f32>> {
    const EPSILON: f32 = 1e-6;

    let voiced: Vec<f32> = frequencies.iter().copied().filter(|&f| f > 0.0).collect();
    if voiced.is_empty() {
        return None;
    }

    let n = voiced.len() as f32;
    let mean = voiced.iter().sum::<f32>() / n;
    let variance = voiced.iter().map(|f| (f - mean).powi(2)).sum::<f32>() / n;
    let std = variance.sqrt();

    Some(
        frequencies
            .iter()
            .map(|&f| if f > 0.0 { (f - mean) / (std + EPSILON) } else { 0.0 })
            .collect(),
    )
}
