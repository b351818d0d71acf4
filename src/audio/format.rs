//! Sample format conversion using the rubato resampler
//!
//! Used by the compact recording encoding to turn device-rate interleaved
//! audio into 16kHz mono.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Frames fed to the resampler per call
const CHUNK_FRAMES: usize = 1024;

/// Resamples interleaved audio to a mono target rate
pub struct AudioConverter {
    resampler: SincFixedIn<f32>,
    source_channels: usize,
    ratio: f64,
}

impl AudioConverter {
    pub fn new(
        source_rate: u32,
        target_rate: u32,
        source_channels: usize,
    ) -> Result<Self, rubato::ResamplerConstructionError> {
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };
        let ratio = f64::from(target_rate) / f64::from(source_rate);

        let resampler = SincFixedIn::new(ratio, 2.0, params, CHUNK_FRAMES, 1)?;

        Ok(Self {
            resampler,
            source_channels: source_channels.max(1),
            ratio,
        })
    }

    /// Convert a complete interleaved recording
    ///
    /// The tail is zero-padded to a whole chunk and the output is trimmed back
    /// to the length the ratio implies.
    pub fn convert_all(&mut self, interleaved: &[f32]) -> Result<Vec<f32>, rubato::ResampleError> {
        let mono = mix_to_mono(interleaved, self.source_channels);
        let expected = (mono.len() as f64 * self.ratio).round() as usize;
        let mut output = Vec::with_capacity(expected + CHUNK_FRAMES);

        for chunk in mono.chunks(CHUNK_FRAMES) {
            let mut frame = chunk.to_vec();
            frame.resize(CHUNK_FRAMES, 0.0);
            let waves_in = vec![frame];
            let waves_out = self.resampler.process(&waves_in, None)?;
            output.extend(waves_out.into_iter().next().unwrap_or_default());
        }

        // The sinc filter delays output; push silence until the tail is out
        while output.len() < expected + self.resampler.output_delay() {
            let silence = vec![vec![0.0f32; CHUNK_FRAMES]];
            let waves_out = self.resampler.process(&silence, None)?;
            let produced = waves_out.into_iter().next().unwrap_or_default();
            if produced.is_empty() {
                break;
            }
            output.extend(produced);
        }

        let delay = self.resampler.output_delay().min(output.len());
        output.drain(..delay);
        output.truncate(expected);
        Ok(output)
    }
}

/// Average interleaved frames down to one channel
pub fn mix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Convert f32 samples to i16 with proper scaling
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s * 32767.0).clamp(-32768.0, 32767.0) as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converter_new() {
        assert!(AudioConverter::new(48000, 16000, 2).is_ok());
    }

    #[test]
    fn test_mix_to_mono() {
        let stereo = vec![0.5, -0.5, 0.3, 0.1, 1.0, 1.0];
        let mono = mix_to_mono(&stereo, 2);
        assert_eq!(mono.len(), 3);
        assert!(mono[0].abs() < 0.0001);
        assert!((mono[1] - 0.2).abs() < 0.0001);
        assert!((mono[2] - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_mix_to_mono_passthrough() {
        let mono = vec![0.1, 0.2, 0.3];
        assert_eq!(mix_to_mono(&mono, 1), mono);
    }

    #[test]
    fn test_f32_to_i16() {
        let i16_samples = f32_to_i16(&[1.0, 0.5, 0.0, -0.5, -1.0, 2.0]);
        assert_eq!(i16_samples[0], 32767);
        assert_eq!(i16_samples[1], 16383);
        assert_eq!(i16_samples[2], 0);
        assert_eq!(i16_samples[3], -16383);
        assert_eq!(i16_samples[4], -32767);
        assert_eq!(i16_samples[5], 32767);
    }

    #[test]
    fn test_convert_all_length_follows_ratio() {
        let mut converter = AudioConverter::new(48000, 16000, 1).unwrap();
        let input: Vec<f32> = (0..48000).map(|i| (i as f32 * 0.01).sin() * 0.3).collect();
        let output = converter.convert_all(&input).unwrap();
        assert_eq!(output.len(), 16000);
    }

    #[test]
    fn test_convert_all_stereo() {
        let mut converter = AudioConverter::new(44100, 16000, 2).unwrap();
        // One second of stereo silence
        let output = converter.convert_all(&vec![0.0; 88200]).unwrap();
        assert_eq!(output.len(), 16000);
        assert!(output.iter().all(|s| s.abs() < 0.001));
    }
}
