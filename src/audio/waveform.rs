//! Fixed-length waveform summaries for display

/// Number of points in a finished waveform
pub const WAVEFORM_POINTS: usize = 50;

/// Minimum value of any emitted point, so silent stretches stay visible
pub const WAVEFORM_FLOOR: f32 = 10.0;

/// Reduce an amplitude history to exactly `WAVEFORM_POINTS` values
///
/// Histories at least `WAVEFORM_POINTS` long are split into equal buckets of
/// `len / WAVEFORM_POINTS` samples and each bucket is averaged; any remainder
/// at the end is dropped. Shorter histories keep their values and are padded
/// with the floor. Every output value is at least `WAVEFORM_FLOOR`.
pub fn downsample(history: &[f32]) -> Vec<f32> {
    if history.len() < WAVEFORM_POINTS {
        let mut points: Vec<f32> = history.iter().map(|&v| floor(v)).collect();
        points.resize(WAVEFORM_POINTS, WAVEFORM_FLOOR);
        return points;
    }

    let bucket = history.len() / WAVEFORM_POINTS;
    history
        .chunks_exact(bucket)
        .take(WAVEFORM_POINTS)
        .map(|chunk| floor(chunk.iter().sum::<f32>() / chunk.len() as f32))
        .collect()
}

fn floor(value: f32) -> f32 {
    if value.is_nan() {
        return WAVEFORM_FLOOR;
    }
    value.round().max(WAVEFORM_FLOOR)
}
