use std::ops::Range;

/// Analysis frame for silence detection, in samples.
pub const TRIM_FRAME: usize = 2048;

/// Hop between silence-detection frames, in samples.
pub const TRIM_HOP: usize = 512;

/// Find the non-silent span of a recording.
///
/// The signal is cut into frames and each frame's RMS is compared against
/// the loudest frame. Frames within `top_db` of that peak count as sound;
/// everything before the first and after the last such frame is dropped.
///
/// Returns `None` when the whole signal is digital silence (or empty).
pub fn non_silent_span(samples: &[f32], top_db: f32, frame: usize, hop: usize) -> Option<Range<usize>> {
    if samples.is_empty() || frame == 0 || hop == 0 {
        return None;
    }

    let frame_rms = frame_rms_levels(samples, frame, hop);
    let peak = frame_rms.iter().cloned().fold(0.0_f32, f32::max);
    if peak <= 0.0 {
        return None;
    }

    let is_sound = |rms: f32| rms > 0.0 && 20.0 * (rms / peak).log10() > -top_db;

    let first = frame_rms.iter().position(|&r| is_sound(r))?;
    let last = frame_rms.iter().rposition(|&r| is_sound(r))?;

    let start = first * hop;
    let end = (last * hop + frame).min(samples.len());
    (start < end).then_some(start..end)
}

/// Trim leading and trailing near-silence. All-silent input yields an empty slice.
pub fn trim_silence(samples: &[f32], top_db: f32) -> &[f32] {
    match non_silent_span(samples, top_db, TRIM_FRAME, TRIM_HOP) {
        Some(span) => &samples[span],
        None => &[],
    }
}

/// RMS of each analysis frame. A signal shorter than one frame is a single frame.
fn frame_rms_levels(samples: &[f32], frame: usize, hop: usize) -> Vec<f32> {
    if samples.len() <= frame {
        return vec![rms(samples)];
    }

    (0..=(samples.len() - frame) / hop)
        .map(|i| rms(&samples[i * hop..i * hop + frame]))
        .collect()
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|&s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}
