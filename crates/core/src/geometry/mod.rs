//! Bar geometry for the two draw styles.
//!
//! Everything here is a pure function of the buffered bins, the current
//! scale and the viewport. The output is a list of vertical line segments
//! meant to be stroked with a single width and a single paint.

use serde::{Deserialize, Serialize};

use crate::{BinBuffer, Color, DrawStyle, RenderConfig};

/// Size of the drawable area in logical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// False for zero, negative or non-finite sizes.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Number of bins per channel that fit the viewport width.
pub fn active_bin_count(width: f32, bar_pitch: f32, channels: usize) -> usize {
    if channels == 0 || !(width > 0.0) || !(bar_pitch > 0.0) {
        return 0;
    }
    // Saturating cast: infinite widths clamp to usize::MAX.
    (width / bar_pitch / channels as f32).floor() as usize
}

/// One vertical bar: a stroke at `x` from `y_start` to `y_end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x: f32,
    pub y_start: f32,
    pub y_end: f32,
}

impl LineSegment {
    pub fn length(&self) -> f32 {
        (self.y_end - self.y_start).abs()
    }
}

/// How the stroked bars are filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarPaint {
    Solid(Color),
    /// Linear gradient running from `top` at `y_top` to `bottom` at
    /// `y_bottom`, identical for every column.
    VerticalGradient {
        top: Color,
        bottom: Color,
        y_top: f32,
        y_bottom: f32,
    },
}

impl BarPaint {
    fn for_colors(colors: [Color; 2], height: f32) -> Self {
        let [top, bottom] = colors;
        if top == bottom {
            BarPaint::Solid(top)
        } else {
            BarPaint::VerticalGradient {
                top,
                bottom,
                y_top: 0.0,
                y_bottom: height,
            }
        }
    }
}

/// Output of one render: segments sharing a stroke width and paint.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    pub segments: Vec<LineSegment>,
    pub stroke_width: f32,
    pub paint: BarPaint,
}

impl BarGeometry {
    pub fn empty(config: &RenderConfig) -> Self {
        Self {
            segments: Vec::new(),
            stroke_width: config.bar_thickness,
            paint: BarPaint::Solid(config.bar_colors[0]),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Borrowed view of everything one render needs.
#[derive(Debug, Clone, Copy)]
pub struct BarGeometryBuilder<'a> {
    pub bins: &'a BinBuffer,
    pub channels: usize,
    pub scale: f32,
    pub viewport: Viewport,
    pub config: &'a RenderConfig,
}

impl BarGeometryBuilder<'_> {
    pub fn build(&self) -> BarGeometry {
        if !self.viewport.is_drawable() || self.channels == 0 || self.bins.frame_len() == 0 {
            return BarGeometry::empty(self.config);
        }

        let segments = match self.config.draw_style {
            DrawStyle::VerticalBars => self.vertical_bars(),
            DrawStyle::SymmetricVerticalBars => self.symmetric_bars(),
        };

        BarGeometry {
            segments,
            stroke_width: self.config.bar_thickness,
            paint: BarPaint::for_colors(self.config.bar_colors, self.viewport.height),
        }
    }

    /// Bars per channel, limited to what the buffered frame actually holds.
    fn bar_count(&self) -> usize {
        active_bin_count(self.viewport.width, self.config.bar_pitch(), self.channels)
            .min(self.bins.frame_len())
    }

    /// Right edge of the bar grid and the x of the first column. The grid is
    /// the nearest whole number of pitches wide and centered in the viewport,
    /// so it may overhang either edge by up to half a pitch.
    fn columns(&self) -> (f32, f32) {
        let pitch = self.config.bar_pitch();
        let width = self.viewport.width;
        let usable = (width / pitch).round() * pitch;
        (usable, pitch / 2.0 + (width - usable) / 2.0)
    }

    fn scale(&self) -> f32 {
        if self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }

    /// Channels sweep left-to-right then right-to-left, each bin on its own
    /// column. Bars start at the inset baseline and reach up to
    /// `height - clamp(value * height / scale, 0, height)`.
    fn vertical_bars(&self) -> Vec<LineSegment> {
        let pitch = self.config.bar_pitch();
        let height = self.viewport.height;
        let bars = self.bar_count();
        let (usable, mut x) = self.columns();

        let baseline = (height - self.config.bar_thickness).max(0.0);
        let pixels_per_unit = height / self.scale();
        let stub = self.config.min_bar_stub.min(height);

        let channels = self.channels.min(self.bins.frame_channels());
        let mut segments = Vec::with_capacity(bars * channels);
        let mut bin = 0_isize;
        let mut step = 1_isize;

        for row in (0..channels).filter_map(|ch| self.bins.channel(ch)) {
            while bin >= 0 && (bin as usize) < bars && x < usable {
                let length = bar_length(row[bin as usize], pixels_per_unit, height).max(stub);
                segments.push(LineSegment {
                    x,
                    y_start: baseline,
                    y_end: height - length,
                });
                x += pitch;
                bin += step;
            }
            step = -step;
            bin += step;
        }

        segments
    }

    /// One segment per column spanning `center - left` to `center + right`.
    /// A mono frame mirrors channel 0 onto both halves.
    ///
    /// Each half gets `(height - 2 * thickness) / 2` pixels and the axis sits
    /// at `thickness + half`, which is always `height / 2`. Placing the axis
    /// at `half` instead would push the mirror image up by `thickness` and
    /// let the stroke caps run off the top edge.
    fn symmetric_bars(&self) -> Vec<LineSegment> {
        let Some(left) = self.bins.channel(0) else {
            return Vec::new();
        };
        let right = if self.channels >= 2 && self.bins.frame_channels() >= 2 {
            self.bins.channel(1).unwrap_or(left)
        } else {
            left
        };

        let pitch = self.config.bar_pitch();
        let inset = self.config.bar_thickness;
        let half = ((self.viewport.height - 2.0 * inset) / 2.0).max(0.0);
        let center = inset + half;
        let pixels_per_unit = half / self.scale();
        let (usable, mut x) = self.columns();

        let mut segments = Vec::with_capacity(self.bar_count());
        for (l, r) in left.iter().zip(right).take(self.bar_count()) {
            if x >= usable {
                break;
            }
            segments.push(LineSegment {
                x,
                y_start: center - bar_length(*l, pixels_per_unit, half),
                y_end: center + bar_length(*r, pixels_per_unit, half),
            });
            x += pitch;
        }

        segments
    }
}

/// Scaled bar length clamped into `[0, limit]`. NaN maps to zero.
fn bar_length(value: f32, pixels_per_unit: f32, limit: f32) -> f32 {
    let length = value * pixels_per_unit;
    if length > 0.0 {
        length.min(limit)
    } else {
        0.0
    }
}
