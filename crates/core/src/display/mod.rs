use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    geometry::active_bin_count, loudness::frame_peak, AppConfig, AutoScaler, BarGeometry,
    BarGeometryBuilder, BarVizError, BinBuffer, LoudnessTracker, MovingWindow, PeakStatistics,
    RedrawListener, RedrawSignal, RenderConfig, Result, Viewport,
};

/// Producer-facing side of the display: where analysed frames are written.
pub trait FrameSink {
    /// Bins per channel the sink can show for `channels` channels.
    fn bin_capacity(&self, channels: usize) -> Result<usize>;

    /// Hands over one frame. The sink copies what it keeps, so `bins` may be
    /// reused as soon as this returns.
    fn submit(&self, bins: &[Vec<f32>], channels: usize) -> Result<()>;
}

/// Point-in-time copy of the engine's counters, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySnapshot {
    pub peak: f32,
    pub scale: f32,
    pub silence_count: u32,
    pub zero_count: u32,
    pub is_silent: bool,
    pub channels: usize,
    pub viewport: Viewport,
    pub channel_capacity: usize,
    pub bin_capacity: usize,
}

/// All mutable display state. Only ever touched with the engine lock held.
#[derive(Debug)]
struct DisplayState {
    bins: BinBuffer,
    loudness: LoudnessTracker,
    scaler: AutoScaler,
    config: RenderConfig,
    viewport: Viewport,
    channels: usize,
    redraw: RedrawSignal,
}

impl DisplayState {
    fn active_bins(&self, channels: usize) -> usize {
        active_bin_count(self.viewport.width, self.config.bar_pitch(), channels)
    }

    fn submit<B: AsRef<[f32]>>(&mut self, bins: &[B], channels: usize) {
        let active = self.active_bins(channels);
        let peak = frame_peak(bins, channels, active);
        let was_silent = self.loudness.is_silent();
        let silent = self.loudness.observe(peak);
        self.channels = channels;

        if silent {
            if !was_silent {
                tracing::debug!(peak, "display entered silence");
            }
            return;
        }
        if was_silent {
            tracing::debug!(peak, "display left silence");
        }

        if self.bins.copy_from(bins) {
            tracing::debug!(
                channels = self.bins.channel_capacity(),
                bins = self.bins.bin_capacity(),
                "grew bin buffer"
            );
        }

        self.scaler.reset();
        if self.loudness.above_peak_threshold() {
            let scale = self.scaler.sample(peak);
            tracing::trace!(peak, scale, "auto-scale sample");
            self.loudness.reset_zeroes();
        } else {
            self.loudness.bump_zeroes();
        }

        self.redraw.notify();
    }

    fn render(&mut self, viewport: Viewport) -> BarGeometry {
        self.viewport = viewport;
        BarGeometryBuilder {
            bins: &self.bins,
            channels: self.channels,
            scale: self.scaler.scale(),
            viewport,
            config: &self.config,
        }
        .build()
    }

    fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            peak: self.loudness.peak(),
            scale: self.scaler.scale(),
            silence_count: self.loudness.silence_count(),
            zero_count: self.loudness.zero_count(),
            is_silent: self.loudness.is_silent(),
            channels: self.channels,
            viewport: self.viewport,
            channel_capacity: self.bins.channel_capacity(),
            bin_capacity: self.bins.bin_capacity(),
        }
    }
}

/// Audio-reactive bar display shared between a producer and a render loop.
///
/// Cloning yields another handle onto the same state. Every operation holds
/// the single state lock for its full duration, so a render never sees a
/// half-copied frame and a submit never sees a half-updated viewport.
#[derive(Clone)]
pub struct DisplayEngine {
    shared: Arc<Mutex<DisplayState>>,
}

impl DisplayEngine {
    /// Builds an engine from the application configuration, with the default
    /// moving-window estimator sized from the audio settings.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let render = config.display.render_config()?;
        let viewport = Viewport::new(config.display.width, config.display.height);
        let window = MovingWindow::new(config.audio.scaling_window_len());
        tracing::info!(
            style = %render.draw_style,
            bar_width = render.bar_thickness,
            bar_gap = render.bar_gap,
            window = window.capacity(),
            "creating display engine"
        );
        Self::with_statistics(render, viewport, Box::new(window))
    }

    /// Builds an engine around a caller-supplied peak estimator.
    pub fn with_statistics(
        config: RenderConfig,
        viewport: Viewport,
        stats: Box<dyn PeakStatistics>,
    ) -> Result<Self> {
        config.validate()?;
        let state = DisplayState {
            bins: BinBuffer::new(),
            loudness: LoudnessTracker::new(),
            scaler: AutoScaler::new(stats),
            config,
            viewport,
            channels: 0,
            redraw: RedrawSignal::new(),
        };
        Ok(Self {
            shared: Arc::new(Mutex::new(state)),
        })
    }

    /// Processes one analysed frame: peak and silence tracking, auto-scale,
    /// buffer copy and redraw notification.
    pub fn submit<B: AsRef<[f32]>>(&self, bins: &[B], channels: usize) -> Result<()> {
        self.lock()?.submit(bins, channels);
        Ok(())
    }

    /// Bins per channel that fit the last known viewport.
    pub fn bin_capacity(&self, channels: usize) -> Result<usize> {
        Ok(self.lock()?.active_bins(channels))
    }

    /// Builds bar geometry for the given viewport and remembers its size for
    /// subsequent submits. Empty before the first frame.
    pub fn render(&self, width: f32, height: f32) -> Result<BarGeometry> {
        Ok(self.lock()?.render(Viewport::new(width, height)))
    }

    pub fn render_config(&self) -> Result<RenderConfig> {
        Ok(self.lock()?.config)
    }

    /// Replaces the render settings. Invalid settings are rejected and the
    /// previous ones kept.
    pub fn set_render_config(&self, config: RenderConfig) -> Result<()> {
        if let Err(err) = config.validate() {
            tracing::warn!(%err, "rejected render configuration");
            return Err(err);
        }
        self.lock()?.config = config;
        Ok(())
    }

    /// Returns a listener woken (coalesced) after every non-silent frame.
    pub fn subscribe(&self) -> Result<RedrawListener> {
        Ok(self.lock()?.redraw.subscribe())
    }

    /// Closes the redraw signal; blocked listeners return.
    pub fn close_redraw(&self) -> Result<()> {
        self.lock()?.redraw.close();
        Ok(())
    }

    pub fn snapshot(&self) -> Result<DisplaySnapshot> {
        Ok(self.lock()?.snapshot())
    }

    fn lock(&self) -> Result<MutexGuard<'_, DisplayState>> {
        self.shared
            .lock()
            .map_err(|_| BarVizError::Poisoned("display state"))
    }
}

impl FrameSink for DisplayEngine {
    fn bin_capacity(&self, channels: usize) -> Result<usize> {
        DisplayEngine::bin_capacity(self, channels)
    }

    fn submit(&self, bins: &[Vec<f32>], channels: usize) -> Result<()> {
        DisplayEngine::submit(self, bins, channels)
    }
}

impl std::fmt::Debug for DisplayEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayEngine").finish()
    }
}
