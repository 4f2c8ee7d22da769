use std::{fmt, fs, io, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{BarVizError, Result};

/// Length of the trailing window used for auto-scaling, in seconds.
pub const SCALING_WINDOW_SECONDS: f32 = 1.5;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub display: DisplayConfig,
    pub audio: AudioConfig,
}

impl AppConfig {
    /// Reads a configuration file. A missing file is not an error and yields
    /// `Ok(None)` so callers can fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let config = serde_json::from_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(Some(config))
    }

    /// Writes the configuration as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        tracing::debug!(path = %path.display(), "saved configuration");
        Ok(())
    }
}

/// Parameters of the upstream analysis. Only used to size the auto-scale
/// window; no audio is processed by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: f32,
    pub sample_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 128_000.0,
            sample_size: 2048,
        }
    }
}

impl AudioConfig {
    /// Number of peak samples kept by the auto-scale estimator: two windows'
    /// worth of analysis frames over [`SCALING_WINDOW_SECONDS`].
    pub fn scaling_window_len(&self) -> usize {
        if self.sample_size == 0 || !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return 1;
        }

        let samples = (SCALING_WINDOW_SECONDS * self.sample_rate) as usize;
        ((samples / self.sample_size) * 2).max(1)
    }
}

/// User-facing display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub bar_width: f32,
    pub bar_gap: f32,
    pub draw_style: DrawStyle,
    pub bar_colors: Vec<Color>,
    pub background: Color,
    /// Shortest bar drawn in the vertical-bars style, so silent bins stay
    /// visible as a sliver.
    pub min_bar_stub: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            bar_width: 15.0,
            bar_gap: 5.0,
            draw_style: DrawStyle::SymmetricVerticalBars,
            bar_colors: vec![Color::WHITE],
            background: Color::BLACK,
            min_bar_stub: 0.01,
            width: 1000.0,
            height: 200.0,
        }
    }
}

impl DisplayConfig {
    /// Validates the settings and produces the engine-facing [`RenderConfig`].
    pub fn render_config(&self) -> Result<RenderConfig> {
        let bar_colors = match self.bar_colors.as_slice() {
            [only] => [*only, *only],
            [top, bottom] => [*top, *bottom],
            [] => return Err(BarVizError::InvalidConfig("no bar color specified".into())),
            _ => {
                return Err(BarVizError::InvalidConfig(
                    "more than 2 colors specified".into(),
                ))
            }
        };

        let config = RenderConfig {
            bar_thickness: self.bar_width,
            bar_gap: self.bar_gap,
            draw_style: self.draw_style,
            bar_colors,
            min_bar_stub: self.min_bar_stub,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Settings read by the geometry builder on every render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub bar_thickness: f32,
    pub bar_gap: f32,
    pub draw_style: DrawStyle,
    /// Gradient stops, top first. Equal stops mean a flat color.
    pub bar_colors: [Color; 2],
    pub min_bar_stub: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bar_thickness: 20.0,
            bar_gap: 4.0,
            draw_style: DrawStyle::VerticalBars,
            bar_colors: [Color::WHITE, Color::WHITE],
            min_bar_stub: 0.01,
        }
    }
}

impl RenderConfig {
    /// Distance between the centers of two neighbouring bars.
    pub fn bar_pitch(&self) -> f32 {
        self.bar_thickness + self.bar_gap
    }

    pub fn validate(&self) -> Result<()> {
        let sizes = [self.bar_thickness, self.bar_gap, self.min_bar_stub];
        if sizes.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(BarVizError::InvalidConfig(
                "bar sizes must be finite and non-negative".into(),
            ));
        }
        if self.bar_pitch() <= 0.0 {
            return Err(BarVizError::InvalidConfig(
                "bar width plus gap must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Layout policy mapping bins to bar positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawStyle {
    /// Bars grow up from the bottom; channels sweep back and forth across
    /// the width.
    VerticalBars,
    /// One bar per column mirrored around the vertical center, left channel
    /// above and right channel below.
    SymmetricVerticalBars,
}

impl DrawStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawStyle::VerticalBars => "vertical-bars",
            DrawStyle::SymmetricVerticalBars => "symmetric-vertical-bars",
        }
    }
}

impl fmt::Display for DrawStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrawStyle {
    type Err = BarVizError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "vertical-bars" => Ok(DrawStyle::VerticalBars),
            "symmetric-vertical-bars" => Ok(DrawStyle::SymmetricVerticalBars),
            other => Err(BarVizError::InvalidConfig(format!(
                "unknown draw style {other:?}"
            ))),
        }
    }
}

/// Non-premultiplied 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb` form, without alpha.
    pub fn to_rgb_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = BarVizError;

    /// Parses `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || BarVizError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).map(|v| v * 17);
        let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);

        let parsed = match hex.len() {
            3 => (digit(0), digit(1), digit(2), Ok(255)),
            4 => (digit(0), digit(1), digit(2), digit(3)),
            6 => (pair(0), pair(2), pair(4), Ok(255)),
            8 => (pair(0), pair(2), pair(4), pair(6)),
            _ => return Err(invalid()),
        };

        match parsed {
            (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Color::rgba(r, g, b, a)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}

impl TryFrom<String> for Color {
    type Error = BarVizError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_hex_form() {
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!(
            "#1234".parse::<Color>().unwrap(),
            Color::rgba(0x11, 0x22, 0x33, 0x44)
        );
        assert_eq!(
            "#0a0b0c".parse::<Color>().unwrap(),
            Color::rgba(10, 11, 12, 255)
        );
        assert_eq!(
            "#0A0B0C80".parse::<Color>().unwrap(),
            Color::rgba(10, 11, 12, 128)
        );
    }

    #[test]
    fn rejects_malformed_colors() {
        for input in ["fff", "#ff", "#fffff", "#ggg", "#ffé", "", "#+f+f+f", "#-1ff"] {
            assert!(input.parse::<Color>().is_err(), "{input} should fail");
        }
    }

    #[test]
    fn single_color_fills_both_stops() {
        let display = DisplayConfig {
            bar_colors: vec![Color::BLACK],
            ..Default::default()
        };
        let render = display.render_config().unwrap();
        assert_eq!(render.bar_colors, [Color::BLACK, Color::BLACK]);
    }

    #[test]
    fn rejects_more_than_two_colors() {
        let display = DisplayConfig {
            bar_colors: vec![Color::BLACK, Color::WHITE, Color::BLACK],
            ..Default::default()
        };
        let err = display.render_config().unwrap_err();
        assert!(err.to_string().contains("more than 2 colors"));
    }

    #[test]
    fn rejects_zero_bar_pitch() {
        let display = DisplayConfig {
            bar_width: 0.0,
            bar_gap: 0.0,
            ..Default::default()
        };
        assert!(display.render_config().is_err());
    }

    #[test]
    fn scaling_window_matches_frame_rate() {
        let audio = AudioConfig::default();
        // 1.5 s * 128 kHz / 2048 samples = 93 frames, doubled.
        assert_eq!(audio.scaling_window_len(), 186);

        let degenerate = AudioConfig {
            sample_rate: 0.0,
            sample_size: 0,
        };
        assert_eq!(degenerate.scaling_window_len(), 1);
    }

    #[test]
    fn config_round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("bar-visualiser-{}", std::process::id()));
        let path = dir.join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.display.draw_style = DrawStyle::VerticalBars;
        config.display.bar_colors = vec!["#ff0000".parse().unwrap(), Color::BLACK];
        config.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"vertical-bars\""));
        assert!(text.contains("\"#ff0000ff\""));

        let loaded = AppConfig::load(&path).unwrap().expect("file exists");
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_loads_as_none() {
        let path = std::env::temp_dir().join("bar-visualiser-does-not-exist.json");
        assert!(AppConfig::load(path).unwrap().is_none());
    }

    #[test]
    fn partial_file_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "display": { "bar_width": 3.0 } }"#).unwrap();
        assert_eq!(config.display.bar_width, 3.0);
        assert_eq!(config.display.bar_gap, DisplayConfig::default().bar_gap);
        assert_eq!(config.audio, AudioConfig::default());
    }
}
