use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavSpec};

/// Mono 16-bit PCM, the format test recordings are written in.
#[cfg(test)]
pub fn mono_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Load a WAV file as mono f32 samples in [-1.0, 1.0].
///
/// Multi-channel files are downmixed by averaging each interleaved frame.
/// The returned spec is the file's original one, so callers can read the
/// sample rate before resampling.
pub fn load_samples(path: &Path) -> Result<(Vec<f32>, WavSpec)> {
    let mut reader = WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;

    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<hound::Result<Vec<_>>>()
                .context("Failed to read WAV samples")?
        }
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<hound::Result<Vec<_>>>()
            .context("Failed to read WAV samples")?,
    };

    Ok((downmix(&interleaved, spec.channels), spec))
}

/// Average interleaved channels into a single mono channel.
pub fn downmix(interleaved: &[f32], channels: u16) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    if channels == 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Write mono f32 samples as 16-bit PCM. Only tests synthesize recordings.
#[cfg(test)]
pub fn write_samples(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let mut writer = hound::WavWriter::create(path, mono_spec(sample_rate))
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for &sample in samples {
        let s16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(s16)?;
    }

    writer.finalize().context("Failed to finalize WAV file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn wav_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("roundtrip.wav");

        let original: Vec<f32> = (0..1000).map(|i| (i as f32 / 1000.0) * 2.0 - 1.0).collect();
        write_samples(&path, &original, 22050).unwrap();

        let (loaded, spec) = load_samples(&path).unwrap();
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.channels, 1);
        assert_eq!(loaded.len(), original.len());

        // 16-bit quantization error is ~0.00003
        for (orig, loaded) in original.iter().zip(loaded.iter()) {
            assert!(
                (orig - loaded).abs() < 0.001,
                "Sample mismatch: original={orig}, loaded={loaded}"
            );
        }
    }

    #[test]
    fn stereo_is_downmixed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(i16::MAX / 2).unwrap();
            writer.write_sample(0_i16).unwrap();
        }
        writer.finalize().unwrap();

        let (loaded, spec) = load_samples(&path).unwrap();
        assert_eq!(spec.channels, 2);
        assert_eq!(loaded.len(), 100);
        assert!((loaded[0] - 0.25).abs() < 0.001);
    }

    #[test]
    fn downmix_drops_incomplete_frame() {
        let mono = downmix(&[1.0, 0.0, 0.5, 0.5, 1.0], 2);
        assert_eq!(mono, vec![0.5, 0.5]);
    }

    #[test]
    fn load_nonexistent_file() {
        let result = load_samples(Path::new("/tmp/does-not-exist-pitchcoach.wav"));
        assert!(result.is_err());
    }
}
