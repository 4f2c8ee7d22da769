use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use bar_visualiser_core::{
    AppConfig, BarGeometry, BarVizError, Color, DisplayEngine, DrawStyle, RenderLoop,
    StrokePainter, Viewport,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod svg;
mod synthetic;

use svg::SvgPainter;
use synthetic::SyntheticSpectrum;

fn main() -> bar_visualiser_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Live {
            display,
            seconds,
            input_fps,
            svg,
        } => run_live(&display, seconds, input_fps, svg),
        Commands::Snapshot {
            display,
            frames,
            output,
        } => run_snapshot(&display, frames, &output),
    }
}

fn run_live(
    args: &DisplayArgs,
    seconds: f32,
    input_fps: f32,
    svg: Option<PathBuf>,
) -> bar_visualiser_core::Result<()> {
    let config = args.resolve()?;
    let viewport = Viewport::new(config.display.width, config.display.height);
    let engine = DisplayEngine::new(&config)?;
    let running = Arc::new(AtomicBool::new(true));
    tracing::info!(seconds, input_fps, channels = args.channels, "starting live mode");

    let producer = {
        let engine = engine.clone();
        let running = running.clone();
        let period = Duration::from_secs_f32(1.0 / input_fps.max(1.0));
        let mut source = SyntheticSpectrum::new(args.channels.into());
        thread::spawn(move || -> bar_visualiser_core::Result<u64> {
            let mut frames = 0_u64;
            while running.load(Ordering::SeqCst) {
                let channels = source.channels();
                let bins = engine.bin_capacity(channels)?;
                engine.submit(source.next_frame(bins), channels)?;
                frames += 1;
                thread::sleep(period);
            }
            Ok(frames)
        })
    };

    let renderer = {
        let mut render_loop = RenderLoop::new(engine.clone(), move || viewport)?;
        thread::spawn(move || -> bar_visualiser_core::Result<(u64, Option<BarGeometry>)> {
            let mut last = None;
            let mut keep_last = |geometry: &BarGeometry| -> bar_visualiser_core::Result<()> {
                last = Some(geometry.clone());
                Ok(())
            };
            let frames = render_loop.run(&mut keep_last)?;
            Ok((frames, last))
        })
    };

    thread::sleep(Duration::from_secs_f32(seconds.max(0.0)));

    running.store(false, Ordering::SeqCst);
    let produced = producer
        .join()
        .map_err(|_| BarVizError::msg("producer thread panicked"))??;
    // Closing the signal lets the render loop drain and return.
    engine.close_redraw()?;
    let (rendered, last) = renderer
        .join()
        .map_err(|_| BarVizError::msg("render thread panicked"))??;

    let snapshot = engine.snapshot()?;
    tracing::info!(
        produced,
        rendered,
        scale = snapshot.scale,
        silent = snapshot.is_silent,
        "live mode finished"
    );

    if let (Some(path), Some(geometry)) = (svg, last) {
        SvgPainter::new(path, viewport, config.display.background).paint(&geometry)?;
    }
    Ok(())
}

fn run_snapshot(
    args: &DisplayArgs,
    frames: usize,
    output: &PathBuf,
) -> bar_visualiser_core::Result<()> {
    let config = args.resolve()?;
    let engine = DisplayEngine::new(&config)?;
    let mut source = SyntheticSpectrum::new(args.channels.into());
    tracing::info!(frames, ?output, "rendering snapshot");

    for _ in 0..frames {
        let channels = source.channels();
        let bins = engine.bin_capacity(channels)?;
        engine.submit(source.next_frame(bins), channels)?;
    }

    let viewport = Viewport::new(config.display.width, config.display.height);
    let geometry = engine.render(viewport.width, viewport.height)?;
    SvgPainter::new(output, viewport, config.display.background).paint(&geometry)?;
    tracing::info!(bars = geometry.len(), "snapshot written");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio-reactive bar visualiser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a producer and a render thread against a synthetic spectrum.
    Live {
        #[command(flatten)]
        display: DisplayArgs,
        /// How long to run before shutting down.
        #[arg(long, default_value_t = 5.0)]
        seconds: f32,
        /// Rate at which the producer submits frames.
        #[arg(long = "fps-in", default_value_t = 60.0)]
        input_fps: f32,
        /// Write the last rendered frame to this SVG file.
        #[arg(long)]
        svg: Option<PathBuf>,
    },
    /// Feed a fixed number of frames, render once and write an SVG.
    Snapshot {
        #[command(flatten)]
        display: DisplayArgs,
        /// Number of frames submitted before rendering.
        #[arg(long, default_value_t = 120)]
        frames: usize,
        /// Output path for the SVG.
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct DisplayArgs {
    /// JSON configuration file. Missing files fall back to defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the merged configuration back to `--config`.
    #[arg(long, requires = "config")]
    save_config: bool,
    /// Width of bars.
    #[arg(short = 'w', long)]
    bar_width: Option<f32>,
    /// Gap between bars.
    #[arg(short = 'g', long)]
    bar_gap: Option<f32>,
    /// `vertical-bars` or `symmetric-vertical-bars`.
    #[arg(short = 'S', long)]
    draw_style: Option<DrawStyle>,
    /// Bar color gradient, one or two hex colors (`#fff,#f00`).
    #[arg(short = 'c', long = "bar-color", value_delimiter = ',')]
    bar_colors: Vec<Color>,
    /// Background color.
    #[arg(short = 'B', long)]
    background: Option<Color>,
    /// Viewport width in pixels.
    #[arg(long)]
    width: Option<f32>,
    /// Viewport height in pixels.
    #[arg(long)]
    height: Option<f32>,
    /// Channels in the synthetic spectrum.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    channels: u8,
}

impl DisplayArgs {
    /// Loads `--config` (if any), then applies command line overrides.
    fn resolve(&self) -> bar_visualiser_core::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?.unwrap_or_default(),
            None => AppConfig::default(),
        };

        let display = &mut config.display;
        if let Some(bar_width) = self.bar_width {
            display.bar_width = bar_width;
        }
        if let Some(bar_gap) = self.bar_gap {
            display.bar_gap = bar_gap;
        }
        if let Some(draw_style) = self.draw_style {
            display.draw_style = draw_style;
        }
        if !self.bar_colors.is_empty() {
            display.bar_colors = self.bar_colors.clone();
        }
        if let Some(background) = self.background {
            display.background = background;
        }
        if let Some(width) = self.width {
            display.width = width;
        }
        if let Some(height) = self.height {
            display.height = height;
        }

        // Reject bad settings before they are persisted.
        display.render_config()?;

        if self.save_config {
            if let Some(path) = &self.config {
                config.save(path)?;
                tracing::info!(?path, "saved configuration");
            }
        }
        Ok(config)
    }
}
