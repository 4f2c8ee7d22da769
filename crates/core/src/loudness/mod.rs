use crate::stats::PeakStatistics;

/// Peak below which a frame counts towards silence.
pub const SILENCE_THRESHOLD: f32 = 1e-4;
/// Consecutive quiet frames before the display freezes.
pub const SILENCE_FRAMES: u32 = 10;
/// Peak at or above which the auto-scaler takes a new sample.
pub const PEAK_THRESHOLD: f32 = 0.01;
/// Saturation point of the zero-loudness counter.
pub const ZERO_THRESHOLD: u32 = 5;

/// Largest value among the first `channels` channels, reading at most
/// `active_bins` values of each. Short channels are read up to their length.
pub fn frame_peak<B: AsRef<[f32]>>(frame: &[B], channels: usize, active_bins: usize) -> f32 {
    frame
        .iter()
        .take(channels)
        .flat_map(|ch| {
            let ch = ch.as_ref();
            &ch[..active_bins.min(ch.len())]
        })
        .fold(0.0_f32, |peak, &v| if v > peak { v } else { peak })
}

/// Cross-frame loudness counters.
///
/// Two saturating counters run side by side: `silence` decides whether a
/// frame reaches the display at all, `zeroes` tracks how long the signal has
/// been too quiet to feed the auto-scaler.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoudnessTracker {
    peak: f32,
    silence: u32,
    zeroes: u32,
}

impl LoudnessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    pub fn silence_count(&self) -> u32 {
        self.silence
    }

    pub fn zero_count(&self) -> u32 {
        self.zeroes
    }

    pub fn is_silent(&self) -> bool {
        self.silence >= SILENCE_FRAMES
    }

    /// Records the frame peak and advances the silence counter. Returns
    /// whether the display is now silent.
    pub fn observe(&mut self, peak: f32) -> bool {
        self.peak = peak;
        if peak < SILENCE_THRESHOLD {
            self.silence = (self.silence + 1).min(SILENCE_FRAMES);
        } else {
            self.silence = 0;
        }
        self.is_silent()
    }

    /// Whether the current peak is loud enough to feed the auto-scaler.
    pub fn above_peak_threshold(&self) -> bool {
        self.peak >= PEAK_THRESHOLD
    }

    pub fn reset_zeroes(&mut self) {
        self.zeroes = 0;
    }

    pub fn bump_zeroes(&mut self) {
        self.zeroes = (self.zeroes + 1).min(ZERO_THRESHOLD);
    }
}

/// Turns peak loudness into a display divisor via a trailing mean and
/// standard deviation. The scale is never below 1.0.
pub struct AutoScaler {
    stats: Box<dyn PeakStatistics>,
    scale: f32,
}

impl AutoScaler {
    pub fn new(stats: Box<dyn PeakStatistics>) -> Self {
        Self { stats, scale: 1.0 }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn reset(&mut self) {
        self.scale = 1.0;
    }

    /// Feeds a loud peak to the estimator and adopts `mean + 2·stddev` when it
    /// exceeds 1.0. Comparisons against NaN fail, which keeps the floor.
    pub fn sample(&mut self, peak: f32) -> f32 {
        let (mean, stddev) = self.stats.update(peak);
        let target = mean + 2.0 * stddev;
        if target > 1.0 {
            self.scale = target;
        }
        self.scale
    }
}

impl std::fmt::Debug for AutoScaler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoScaler")
            .field("scale", &self.scale)
            .finish()
    }
}
