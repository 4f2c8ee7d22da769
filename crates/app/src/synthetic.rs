use std::f32::consts::TAU;

/// Frames per cycle of the demo signal.
const CYCLE_FRAMES: u64 = 240;
/// Trailing frames of every cycle that are fully silent.
const SILENT_FRAMES: u64 = 30;
/// Nominal frame rate the motion is tuned for.
const NOMINAL_FPS: f32 = 60.0;

/// Deterministic stand-in for the audio analysis pipeline.
///
/// Each channel carries a gaussian bump wandering across the spectrum on top
/// of a small ripple, under a slow loudness envelope. The end of every cycle
/// is silent so the display's silence handling gets exercised. Output rows
/// are reused between frames.
#[derive(Debug)]
pub struct SyntheticSpectrum {
    channels: usize,
    frame: u64,
    rows: Vec<Vec<f32>>,
}

impl SyntheticSpectrum {
    pub fn new(channels: usize) -> Self {
        Self {
            channels: channels.max(1),
            frame: 0,
            rows: Vec::new(),
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Produces the next frame with `bins` values per channel.
    pub fn next_frame(&mut self, bins: usize) -> &[Vec<f32>] {
        let t = self.frame as f32 / NOMINAL_FPS;
        let silent = self.frame % CYCLE_FRAMES >= CYCLE_FRAMES - SILENT_FRAMES;
        let envelope = 0.6 + 0.4 * (0.25 * TAU * t).sin();
        let width = bins.max(1) as f32;

        self.rows.resize_with(self.channels, Vec::new);
        for (channel, row) in self.rows.iter_mut().enumerate() {
            row.clear();
            if silent {
                row.resize(bins, 0.0);
                continue;
            }

            let phase = channel as f32 * 0.5;
            let center = 0.5 + 0.4 * (0.7 * t + phase).sin();
            row.extend((0..bins).map(|i| {
                let x = i as f32 / width;
                let bump = (-((x - center) / 0.08).powi(2)).exp();
                let ripple = 0.15 * (1.0 + (23.0 * x + 3.0 * t + phase).sin());
                1.5 * envelope * (bump + ripple)
            }));
        }

        self.frame += 1;
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_match_requested_shape() {
        let mut source = SyntheticSpectrum::new(2);
        let frame = source.next_frame(17);
        assert_eq!(frame.len(), 2);
        assert!(frame.iter().all(|row| row.len() == 17));
        assert!(frame.iter().flatten().all(|v| *v >= 0.0));

        // Shrinking the request shrinks the rows too.
        assert!(source.next_frame(3).iter().all(|row| row.len() == 3));
    }

    #[test]
    fn cycle_ends_in_silence() {
        let mut source = SyntheticSpectrum::new(1);
        for _ in 0..CYCLE_FRAMES - SILENT_FRAMES {
            let frame = source.next_frame(8);
            assert!(frame[0].iter().any(|v| *v > 0.01));
        }
        for _ in 0..SILENT_FRAMES {
            assert!(source.next_frame(8)[0].iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn zero_channels_is_promoted_to_mono() {
        assert_eq!(SyntheticSpectrum::new(0).channels(), 1);
    }
}
