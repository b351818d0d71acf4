//! Loudness metering from a frequency-domain snapshot
//!
//! The recorder's amplitude readings are computed the way a browser analyser
//! node reports byte frequency data: a Blackman-windowed FFT of the newest
//! samples, smoothed over time, mapped from a decibel range onto 0..=255 and
//! then averaged across bins. The average is rescaled to the 0-100 scale
//! used by waveforms.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Samples per analysis frame
pub const FFT_SIZE: usize = 256;

/// Lower bound of the byte mapping, in dB
const MIN_DECIBELS: f32 = -100.0;

/// Upper bound of the byte mapping, in dB
const MAX_DECIBELS: f32 = -30.0;

/// Weight given to the previous snapshot when smoothing bins
const SMOOTHING: f32 = 0.8;

/// FFT-based loudness analyser
pub struct FrequencyAnalyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    smoothed: Vec<f32>,
    buffer: Vec<Complex<f32>>,
}

impl Default for FrequencyAnalyser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyAnalyser {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        Self {
            fft,
            window: blackman_window(FFT_SIZE),
            smoothed: vec![0.0; FFT_SIZE / 2],
            buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
        }
    }

    /// Byte spectrum of the newest `FFT_SIZE` samples in `frame`
    ///
    /// Shorter frames are zero-padded at the front. Returns `FFT_SIZE / 2` bins.
    pub fn byte_frequency_data(&mut self, frame: &[f32]) -> Vec<u8> {
        let newest = &frame[frame.len().saturating_sub(FFT_SIZE)..];
        let pad = FFT_SIZE - newest.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { newest[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let scale = 1.0 / FFT_SIZE as f32;
        self.smoothed
            .iter_mut()
            .zip(self.buffer.iter())
            .map(|(smoothed, bin)| {
                let magnitude = bin.norm() * scale;
                *smoothed = SMOOTHING * *smoothed + (1.0 - SMOOTHING) * magnitude;
                db_to_byte(amplitude_to_db(*smoothed))
            })
            .collect()
    }

    /// Instantaneous loudness on a 0-100 scale
    pub fn loudness(&mut self, frame: &[f32]) -> f32 {
        let bins = self.byte_frequency_data(frame);
        if bins.is_empty() {
            return 0.0;
        }
        let sum: u32 = bins.iter().map(|&b| u32::from(b)).sum();
        let average = sum as f32 / bins.len() as f32;
        (average / 255.0 * 100.0).clamp(0.0, 100.0)
    }

    /// Forget smoothing history
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);
    }
}

fn blackman_window(len: usize) -> Vec<f32> {
    let (a0, a1, a2) = (0.42f32, 0.5f32, 0.08f32);
    let n = len as f32;
    (0..len)
        .map(|i| {
            let x = 2.0 * std::f32::consts::PI * i as f32 / n;
            a0 - a1 * x.cos() + a2 * (2.0 * x).cos()
        })
        .collect()
}

fn db_to_byte(db: f32) -> u8 {
    if !db.is_finite() {
        return 0;
    }
    let scaled = 255.0 / (MAX_DECIBELS - MIN_DECIBELS) * (db - MIN_DECIBELS);
    scaled.clamp(0.0, 255.0) as u8
}

/// Convert linear amplitude to decibels
pub fn amplitude_to_db(amplitude: f32) -> f32 {
    if amplitude > 0.0 {
        20.0 * amplitude.log10()
    } else {
        -f32::INFINITY
    }
}
