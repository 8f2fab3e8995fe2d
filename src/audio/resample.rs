/// Whisper's required sample rate
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Downmix interleaved samples to mono by averaging the channels of each frame
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Resample mono audio to the target rate using linear interpolation
///
/// Handles arbitrary source rates; uploads are not fixed at any one rate.
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = source_rate as f64 / target_rate as f64;
    let output_len = (samples.len() as f64 / ratio).round() as usize;
    let last = samples.len() - 1;

    let mut output = Vec::with_capacity(output_len);
    for i in 0..output_len {
        let position = i as f64 * ratio;
        let index = (position as usize).min(last);
        let next = (index + 1).min(last);
        let frac = (position - index as f64) as f32;
        output.push(samples[index] + (samples[next] - samples[index]) * frac);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo() {
        let interleaved = vec![0.2, 0.4, -0.2, -0.4];
        let mono = downmix_to_mono(&interleaved, 2);

        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 0.001);
        assert!((mono[1] + 0.3).abs() < 0.001);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&samples, 1), samples);
    }

    #[test]
    fn test_resample_identity() {
        let samples = vec![0.5, -0.5, 0.25];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn test_resample_halves_length() {
        let samples: Vec<f32> = (0..8).map(|i| i as f32).collect();
        let resampled = resample(&samples, 32000, 16000);

        assert_eq!(resampled.len(), 4);
        assert!((resampled[0] - 0.0).abs() < 0.001);
        assert!((resampled[1] - 2.0).abs() < 0.001);
        assert!((resampled[2] - 4.0).abs() < 0.001);
        assert!((resampled[3] - 6.0).abs() < 0.001);
    }

    #[test]
    fn test_resample_interpolates_upsample() {
        let samples = vec![0.0, 1.0];
        let resampled = resample(&samples, 8000, 16000);

        assert_eq!(resampled.len(), 4);
        assert!((resampled[0] - 0.0).abs() < 0.001);
        assert!((resampled[1] - 0.5).abs() < 0.001);
        assert!((resampled[2] - 1.0).abs() < 0.001);
        assert!((resampled[3] - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_resample_48k_to_16k_length() {
        let samples = vec![0.0; 48000];
        assert_eq!(resample(&samples, 48000, WHISPER_SAMPLE_RATE).len(), 16000);
    }
}
