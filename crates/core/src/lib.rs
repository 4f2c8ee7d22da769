//! Core library for the bar visualiser.
//!
//! An analysis thread submits per-channel frequency bins to a
//! [`DisplayEngine`]; a render thread, woken through a coalescing
//! [`RedrawSignal`], turns the latest bins into stroked bar geometry. The
//! engine tracks silence and auto-scales bar heights to recent loudness.

pub mod buffer;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod loudness;
pub mod render;
pub mod signal;
pub mod stats;

pub use buffer::BinBuffer;
pub use config::{AppConfig, AudioConfig, Color, DisplayConfig, DrawStyle, RenderConfig};
pub use display::{DisplayEngine, DisplaySnapshot, FrameSink};
pub use error::{BarVizError, Result};
pub use geometry::{BarGeometry, BarGeometryBuilder, BarPaint, LineSegment, Viewport};
pub use loudness::{AutoScaler, LoudnessTracker};
pub use render::{RenderLoop, StrokePainter};
pub use signal::{RedrawListener, RedrawSignal, RedrawWait};
pub use stats::{MovingWindow, PeakStatistics};
