use std::f32::consts::PI;

use pitch_detection::detector::mcleod::McLeodDetector;
use pitch_detection::detector::PitchDetector;

/// Configuration for pitch tracking.
#[derive(Debug, Clone)]
pub struct PitchConfig {
    /// Lowest accepted fundamental in Hz. 50 Hz sits below a low male
    /// speaking voice.
    pub pitch_floor_hz: f32,

    /// Highest accepted fundamental in Hz. Speech rarely goes above 400 Hz
    /// outside of singing, so anything higher is treated as an artifact.
    pub pitch_ceiling_hz: f32,

    /// Analysis window duration in milliseconds.
    pub frame_size_ms: f32,

    /// How far to advance between frames, in milliseconds. This fixes the
    /// contour's frame rate.
    pub hop_size_ms: f32,

    /// McLeod power threshold: frames quieter than this are unvoiced.
    pub power_threshold: f64,

    /// McLeod clarity threshold in 0.0-1.0: how periodic a frame must be.
    pub clarity_threshold: f64,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            pitch_floor_hz: 50.0,
            pitch_ceiling_hz: 400.0,
            frame_size_ms: 46.0,
            hop_size_ms: 23.2,
            power_threshold: 0.2,
            clarity_threshold: 0.5,
        }
    }
}

/// One analysis hop of a pitch contour. Frames are spaced `hop_size_ms`
/// apart; `None` means the frame was unvoiced (no detectable pitch).
#[derive(Debug, Clone)]
pub struct PitchFrame {
    pub frequency: Option<f32>,
}

/// Extract a pitch contour from mono audio samples.
///
/// Slides a window across the audio, runs the McLeod pitch detector on each
/// Hann-windowed frame and keeps estimates that fall inside the configured
/// voice band. Every hop produces exactly one frame, voiced or not, so the
/// contour length tracks the audio duration.
///
/// Audio shorter than one detector window yields an empty contour.
pub fn extract_pitch_contour(
    samples: &[f32],
    sample_rate: u32,
    config: &PitchConfig,
) -> Vec<PitchFrame> {
    let sr = sample_rate as f32;

    let frame_size = (config.frame_size_ms / 1000.0 * sr) as usize;
    let hop_size = ((config.hop_size_ms / 1000.0 * sr) as usize).max(1);

    // The detector needs at least two periods of the lowest pitch we accept.
    // At 50 Hz and 22050 Hz that is 882 samples, rounded up to 1024.
    let min_buffer = (2.0 * sr / config.pitch_floor_hz.max(1.0)).ceil() as usize;
    let detector_size = min_buffer.next_power_of_two().max(frame_size);
    let padding = detector_size / 2;

    let window = hann_window(detector_size);
    let mut detector = McLeodDetector::<f64>::new(detector_size, padding);
    let mut buffer = vec![0.0_f64; detector_size];

    let mut contour = Vec::new();
    let mut pos = 0;

    while pos + detector_size <= samples.len() {
        let frame = &samples[pos..pos + detector_size];
        for ((out, &s), &w) in buffer.iter_mut().zip(frame).zip(&window) {
            *out = (s * w) as f64;
        }

        let pitch = detector.get_pitch(
            &buffer,
            sample_rate as usize,
            config.power_threshold,
            config.clarity_threshold,
        );

        let frequency = pitch
            .map(|p| p.frequency as f32)
            .filter(|f| f.is_finite())
            .filter(|&f| f >= config.pitch_floor_hz && f <= config.pitch_ceiling_hz);

        contour.push(PitchFrame { frequency });

        pos += hop_size;
    }

    contour
}

/// Hann window coefficients: zero at both edges, one in the middle.
fn hann_window(len: usize) -> Vec<f32> {
    if len <= 1 {
        return vec![1.0; len];
    }
    let scale = 2.0 * PI / (len - 1) as f32;
    (0..len)
        .map(|i| 0.5 * (1.0 - (scale * i as f32).cos()))
        .collect()
}

/// Fraction of frames that are voiced. Returns 0.0 for an empty contour.
pub fn voiced_fraction(contour: &[PitchFrame]) -> f32 {
    if contour.is_empty() {
        return 0.0;
    }
    let voiced = contour.iter().filter(|f| f.frequency.is_some()).count();
    voiced as f32 / contour.len() as f32
}
