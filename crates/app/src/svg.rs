use std::{fs, path::PathBuf};

use bar_visualiser_core::{BarGeometry, BarPaint, Color, Result, StrokePainter, Viewport};

/// Writes each painted frame to an SVG file, replacing the previous one.
#[derive(Debug, Clone)]
pub struct SvgPainter {
    path: PathBuf,
    viewport: Viewport,
    background: Color,
}

impl SvgPainter {
    pub fn new(path: impl Into<PathBuf>, viewport: Viewport, background: Color) -> Self {
        Self {
            path: path.into(),
            viewport,
            background,
        }
    }

    pub fn document(&self, geometry: &BarGeometry) -> String {
        let Viewport { width, height } = self.viewport;
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
             viewBox=\"0 0 {width} {height}\">\n"
        );
        svg.push_str(&format!(
            "  <rect width=\"100%\" height=\"100%\" fill=\"{}\" fill-opacity=\"{}\"/>\n",
            self.background.to_rgb_hex(),
            opacity(self.background)
        ));

        let stroke = match geometry.paint {
            BarPaint::Solid(color) => format!(
                "stroke=\"{}\" stroke-opacity=\"{}\"",
                color.to_rgb_hex(),
                opacity(color)
            ),
            BarPaint::VerticalGradient {
                top,
                bottom,
                y_top,
                y_bottom,
            } => {
                svg.push_str(&format!(
                    "  <defs>\n    <linearGradient id=\"bars\" gradientUnits=\"userSpaceOnUse\" \
                     x1=\"0\" y1=\"{y_top}\" x2=\"0\" y2=\"{y_bottom}\">\n"
                ));
                for (offset, color) in [(0, top), (1, bottom)] {
                    svg.push_str(&format!(
                        "      <stop offset=\"{offset}\" stop-color=\"{}\" stop-opacity=\"{}\"/>\n",
                        color.to_rgb_hex(),
                        opacity(color)
                    ));
                }
                svg.push_str("    </linearGradient>\n  </defs>\n");
                "stroke=\"url(#bars)\"".to_string()
            }
        };

        svg.push_str(&format!(
            "  <g {stroke} stroke-width=\"{}\">\n",
            geometry.stroke_width
        ));
        for segment in &geometry.segments {
            svg.push_str(&format!(
                "    <line x1=\"{x}\" y1=\"{}\" x2=\"{x}\" y2=\"{}\"/>\n",
                segment.y_start,
                segment.y_end,
                x = segment.x,
            ));
        }
        svg.push_str("  </g>\n</svg>\n");
        svg
    }
}

impl StrokePainter for SvgPainter {
    fn paint(&mut self, geometry: &BarGeometry) -> Result<()> {
        fs::write(&self.path, self.document(geometry))?;
        tracing::debug!(path = %self.path.display(), bars = geometry.len(), "wrote svg frame");
        Ok(())
    }
}

fn opacity(color: Color) -> f32 {
    color.a as f32 / 255.0
}

#[cfg(test)]
mod tests {
    use bar_visualiser_core::LineSegment;

    use super::*;

    fn geometry(paint: BarPaint) -> BarGeometry {
        BarGeometry {
            segments: vec![
                LineSegment {
                    x: 5.0,
                    y_start: 90.0,
                    y_end: 40.0,
                },
                LineSegment {
                    x: 15.0,
                    y_start: 90.0,
                    y_end: 70.0,
                },
            ],
            stroke_width: 8.0,
            paint,
        }
    }

    #[test]
    fn draws_one_line_per_segment() {
        let painter = SvgPainter::new("unused.svg", Viewport::new(20.0, 100.0), Color::BLACK);
        let svg = painter.document(&geometry(BarPaint::Solid(Color::WHITE)));

        assert_eq!(svg.matches("<line ").count(), 2);
        assert!(svg.contains("<line x1=\"5\" y1=\"90\" x2=\"5\" y2=\"40\"/>"));
        assert!(svg.contains("stroke=\"#ffffff\""));
        assert!(svg.contains("stroke-width=\"8\""));
        assert!(!svg.contains("linearGradient"));
    }

    #[test]
    fn gradients_are_anchored_to_the_viewport() {
        let painter = SvgPainter::new("unused.svg", Viewport::new(20.0, 100.0), Color::BLACK);
        let svg = painter.document(&geometry(BarPaint::VerticalGradient {
            top: Color::WHITE,
            bottom: Color::rgba(255, 0, 0, 255),
            y_top: 0.0,
            y_bottom: 100.0,
        }));

        assert!(svg.contains("y1=\"0\" x2=\"0\" y2=\"100\""));
        assert!(svg.contains("stop-color=\"#ff0000\""));
        assert!(svg.contains("stroke=\"url(#bars)\""));
    }

    #[test]
    fn paint_writes_the_file() {
        let path = std::env::temp_dir().join(format!("bar-visualiser-{}.svg", std::process::id()));
        let mut painter = SvgPainter::new(&path, Viewport::new(20.0, 100.0), Color::BLACK);
        painter.paint(&geometry(BarPaint::Solid(Color::WHITE))).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<svg"));
        fs::remove_file(&path).unwrap();
    }
}
