use crate::{BarGeometry, DisplayEngine, RedrawListener, Result, Viewport};

/// Paint backend that strokes a frame's bar geometry.
pub trait StrokePainter {
    fn paint(&mut self, geometry: &BarGeometry) -> Result<()>;
}

impl<F> StrokePainter for F
where
    F: FnMut(&BarGeometry) -> Result<()>,
{
    fn paint(&mut self, geometry: &BarGeometry) -> Result<()> {
        self(geometry)
    }
}

/// Consumer side of the engine: renders once per redraw notification until
/// the engine's redraw signal is closed.
pub struct RenderLoop<V> {
    engine: DisplayEngine,
    listener: RedrawListener,
    viewport: V,
}

impl<V> RenderLoop<V>
where
    V: FnMut() -> Viewport,
{
    /// `viewport` is asked for the current size before every render.
    pub fn new(engine: DisplayEngine, viewport: V) -> Result<Self> {
        let listener = engine.subscribe()?;
        Ok(Self {
            engine,
            listener,
            viewport,
        })
    }

    /// Renders the current state once, without waiting for a notification.
    pub fn render_once<P: StrokePainter>(&mut self, painter: &mut P) -> Result<()> {
        let viewport = (self.viewport)();
        let geometry = self.engine.render(viewport.width, viewport.height)?;
        painter.paint(&geometry)
    }

    /// Blocks on the redraw signal and returns the number of frames rendered
    /// once it closes. Engine and painter errors end the loop.
    pub fn run<P: StrokePainter>(&mut self, painter: &mut P) -> Result<u64> {
        tracing::info!("render loop started");
        let mut frames = 0_u64;
        while self.listener.wait() {
            self.render_once(painter)?;
            frames += 1;
        }
        tracing::info!(frames, "render loop stopped");
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;
    use crate::{BarVizError, DrawStyle, MovingWindow, RenderConfig};

    fn engine() -> DisplayEngine {
        let config = RenderConfig {
            bar_thickness: 2.0,
            bar_gap: 2.0,
            draw_style: DrawStyle::VerticalBars,
            ..Default::default()
        };
        DisplayEngine::with_statistics(
            config,
            Viewport::new(40.0, 40.0),
            Box::new(MovingWindow::new(4)),
        )
        .unwrap()
    }

    #[test]
    fn renders_pending_frame_then_stops_on_close() {
        let display = engine();
        let mut render_loop =
            RenderLoop::new(display.clone(), || Viewport::new(40.0, 40.0)).unwrap();

        display.submit(&[vec![0.5_f32; 10]], 1).unwrap();
        display.close_redraw().unwrap();

        let mut bars = Vec::new();
        let frames = render_loop
            .run(&mut |geometry: &BarGeometry| -> Result<()> {
                bars.push(geometry.len());
                Ok(())
            })
            .unwrap();

        assert_eq!(frames, 1);
        assert_eq!(bars, vec![10]);
    }

    #[test]
    fn painter_errors_end_the_loop() {
        let display = engine();
        let mut render_loop =
            RenderLoop::new(display.clone(), || Viewport::new(40.0, 40.0)).unwrap();
        display.submit(&[vec![0.5_f32; 10]], 1).unwrap();

        let err = render_loop
            .run(&mut |_: &BarGeometry| -> Result<()> {
                Err(BarVizError::msg("paint failed"))
            })
            .unwrap_err();
        assert!(err.to_string().contains("paint failed"));
    }

    #[test]
    fn blocked_loop_exits_when_signal_closes() {
        let display = engine();
        let mut render_loop =
            RenderLoop::new(display.clone(), || Viewport::new(40.0, 40.0)).unwrap();

        let consumer =
            thread::spawn(move || render_loop.run(&mut |_: &BarGeometry| -> Result<()> { Ok(()) }));
        thread::sleep(Duration::from_millis(20));
        display.close_redraw().unwrap();

        assert_eq!(consumer.join().unwrap().unwrap(), 0);
    }
}
