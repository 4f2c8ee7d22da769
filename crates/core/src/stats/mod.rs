//! Trailing-window statistics over successive peak values.
//!
//! The display engine only depends on [`PeakStatistics`]; [`MovingWindow`]
//! is the implementation used unless another estimator is injected.

/// Stateful estimator fed one peak per frame. Returns `(mean, stddev)` over
/// the trailing window including `sample`. Implementations must keep the
/// standard deviation non-negative.
pub trait PeakStatistics: Send {
    fn update(&mut self, sample: f32) -> (f32, f32);
}

/// Fixed-capacity ring buffer with running sum and sum of squares.
#[derive(Debug, Clone)]
pub struct MovingWindow {
    samples: Vec<f64>,
    pos: usize,
    len: usize,
    sum: f64,
    sum_sq: f64,
}

impl MovingWindow {
    /// Creates a window over the last `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity.max(1)],
            pos: 0,
            len: 0,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn mean(&self) -> f32 {
        if self.len == 0 {
            return 0.0;
        }
        (self.sum / self.len as f64) as f32
    }

    pub fn stddev(&self) -> f32 {
        if self.len == 0 {
            return 0.0;
        }
        let n = self.len as f64;
        let mean = self.sum / n;
        // Clamp away negative variance from floating point drift.
        let variance = (self.sum_sq / n - mean * mean).max(0.0);
        variance.sqrt() as f32
    }

    fn push(&mut self, sample: f64) {
        if self.len == self.samples.len() {
            let old = self.samples[self.pos];
            self.sum -= old;
            self.sum_sq -= old * old;
        } else {
            self.len += 1;
        }

        self.samples[self.pos] = sample;
        self.sum += sample;
        self.sum_sq += sample * sample;
        self.pos = (self.pos + 1) % self.samples.len();
    }
}

impl PeakStatistics for MovingWindow {
    fn update(&mut self, sample: f32) -> (f32, f32) {
        self.push(sample as f64);
        (self.mean(), self.stddev())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn reports_mean_and_population_stddev() {
        let mut window = MovingWindow::new(8);
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0] {
            window.update(v);
        }
        let (mean, sd) = window.update(9.0);
        assert_relative_eq!(mean, 5.0, epsilon = 1e-6);
        assert_relative_eq!(sd, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn forgets_samples_outside_the_window() {
        let mut window = MovingWindow::new(3);
        for v in [100.0, 1.0, 1.0] {
            window.update(v);
        }
        let (mean, sd) = window.update(1.0);
        assert_eq!(window.len, 3);
        assert_relative_eq!(mean, 1.0, epsilon = 1e-6);
        assert_relative_eq!(sd, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn sustained_increase_raises_the_mean() {
        let mut window = MovingWindow::new(16);
        let (before, _) = window.update(0.1);
        let mut after = before;
        for _ in 0..32 {
            after = window.update(3.0).0;
        }
        assert!(after > before);
        assert_relative_eq!(after, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn zero_capacity_is_promoted() {
        let mut window = MovingWindow::new(0);
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.update(4.0), (4.0, 0.0));
    }
}
