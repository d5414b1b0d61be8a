//! console_rt: ray traced spheres and cylinders in the terminal
//!
//! Renders a small scene into colored console cells, one frame per line of
//! input, and offers a headless mode that prints or dumps a frame as hex digits.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use console_rt::{
    config::AppConfig,
    ray::Projection,
    renderer::FrameDriver,
    terminal::{draw_test_patch, Canvas, FrameBuffer, TerminalDisplay},
    RenderError, COLUMNS_PER_PIXEL,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
#[command(name = "console_rt")]
#[command(version = "0.1.0")]
#[command(about = "Ray traced spheres and cylinders drawn in the terminal")]
#[command(long_about = "
console_rt ray traces a scene of spheres, open cylinders and a point light and
draws it with colored console cells, two columns per pixel.

Example usage:
  console_rt run
  console_rt run --width 64 --height 32 --orthographic
  console_rt render --dump-dir debug
  console_rt check-config --config console-rt.yaml
")]
struct Cli {
    /// Path to config file (defaults: console-rt.yaml, config/console-rt.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render interactively; press Enter for another frame, Ctrl-D to quit
    Run {
        #[command(flatten)]
        view: ViewArgs,
        /// Stop after this many frames
        #[arg(long)]
        frames: Option<u32>,
    },

    /// Render one frame without a terminal and print it as hex digits
    Render {
        #[command(flatten)]
        view: ViewArgs,
        /// Write frame_000.txt into this directory instead of stdout
        #[arg(long, value_name = "DIR")]
        dump_dir: Option<PathBuf>,
    },

    /// Show every foreground/background color pair
    TestPatch,

    /// Validate configuration file
    CheckConfig,
}

#[derive(Debug, clap::Args)]
struct ViewArgs {
    /// Override viewport width in pixels
    #[arg(long)]
    width: Option<u16>,
    /// Override viewport height in pixels
    #[arg(long)]
    height: Option<u16>,
    /// Use parallel rays instead of perspective
    #[arg(long)]
    orthographic: bool,
}

impl ViewArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(width) = self.width {
            config.viewport.width = Some(width);
        }
        if let Some(height) = self.height {
            config.viewport.height = Some(height);
        }
        if self.orthographic {
            config.camera.projection = Projection::Orthographic;
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level_filter = if let Some(level) = cli.log_level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            .to_string()
    };

    // Frames go to stdout, so logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter))
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Run { view, frames } => run_interactive(config_path, &view, frames),
        Commands::Render { view, dump_dir } => render_headless(config_path, &view, dump_dir.as_deref()),
        Commands::TestPatch => test_patch(),
        Commands::CheckConfig => check_config(config_path),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "console_rt failed");
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Load, apply CLI overrides, validate
fn load_config(config_path: Option<&Path>, view: &ViewArgs) -> Result<AppConfig, RenderError> {
    let mut config = AppConfig::load_or_default(config_path)?;
    view.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Interactive rendering on the terminal
fn run_interactive(
    config_path: Option<&Path>,
    view: &ViewArgs,
    frames: Option<u32>,
) -> Result<(), RenderError> {
    let mut config = load_config(config_path, view)?;
    if frames.is_some() {
        config.render.max_frames = frames;
    }

    let scene = config.build_scene()?;
    let camera = config.camera.camera();

    let mut display = TerminalDisplay::new()?;
    let (columns, rows) = display.size()?;
    // One row stays free for the prompt
    let fitted = (
        (columns / COLUMNS_PER_PIXEL).max(1),
        rows.saturating_sub(1).max(1),
    );
    let viewport = config.viewport.build(fitted)?;

    let needed = (
        viewport.width().saturating_mul(COLUMNS_PER_PIXEL),
        viewport.height().saturating_add(1),
    );
    if needed.0 > columns || needed.1 > rows {
        if let Err(e) = display.set_size(needed.0.max(columns), needed.1.max(rows)) {
            tracing::warn!(error = %e, "Could not grow the console; the image will be clipped");
        }
    }

    tracing::info!(
        width = viewport.width(),
        height = viewport.height(),
        projection = ?camera.projection,
        "Starting renderer"
    );

    let mut driver = FrameDriver::new(scene, viewport, camera, display)
        .with_prompt(config.render.show_prompt);
    let stdin = std::io::stdin();
    let rendered = driver.run(stdin.lock(), config.render.max_frames)?;

    let status = driver.canvas_mut().close()?;
    if status.is_warning() {
        tracing::warn!(?status, "Console was already released");
    }
    tracing::info!(frames = rendered, "Renderer finished");
    Ok(())
}

/// One frame into memory, printed or dumped as palette hex digits
fn render_headless(
    config_path: Option<&Path>,
    view: &ViewArgs,
    dump_dir: Option<&Path>,
) -> Result<(), RenderError> {
    let config = load_config(config_path, view)?;
    let scene = config.build_scene()?;
    let viewport = config.viewport.build_default()?;
    let canvas = FrameBuffer::for_viewport(&viewport);

    let mut driver = FrameDriver::new(scene, viewport, config.camera.camera(), canvas);
    let stats = driver.render_frame()?;
    let output = driver.into_canvas().to_hex_string();

    match dump_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(format!("frame_{:03}.txt", 0));
            std::fs::write(&path, &output)?;
            tracing::info!(
                path = %path.display(),
                pixels = stats.pixels,
                hits = stats.hits,
                "Wrote frame"
            );
        }
        None => print!("{}", output),
    }
    Ok(())
}

/// Palette test patch, held until Enter
fn test_patch() -> Result<(), RenderError> {
    let mut display = TerminalDisplay::new()?;
    draw_test_patch(&mut display)?;
    display.write_text("  press Enter to exit")?;
    display.set_cursor_visible(true)?;
    display.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    display.close()?;
    Ok(())
}

/// Validate configuration file
fn check_config(config_path: Option<&Path>) -> Result<(), RenderError> {
    let config = AppConfig::load_or_default(config_path)?;
    config.validate()?;

    println!("✓ Configuration is valid\n");
    println!("Viewport:");
    match (config.viewport.width, config.viewport.height) {
        (Some(w), Some(h)) => println!("  Size: {}x{}", w, h),
        (w, h) => println!(
            "  Size: {}x{} (unset dimensions fit the terminal)",
            w.map_or("auto".to_string(), |w| w.to_string()),
            h.map_or("auto".to_string(), |h| h.to_string())
        ),
    }
    match config.viewport.fov_degrees {
        Some(fov) => println!("  Field of view: {}°", fov),
        None => println!("  View height: {}", config.viewport.view_height),
    }
    println!("  Distance: {}", config.viewport.distance);
    println!("\nCamera:");
    println!("  Eye: {:?}", config.camera.eye);
    println!("  Projection: {:?}", config.camera.projection);

    let scene = config.build_scene()?;
    let layout = scene.layout();
    println!("\nScene:{}", if config.scene.is_none() { " (demo)" } else { "" });
    println!("  Spheres: {}", layout.spheres);
    println!("  Cylinders: {}", layout.cylinders);
    println!("  Point lights: {}", layout.point_lights);
    println!("  Background: {:?}", scene.background());
    println!("\nRender:");
    match config.render.max_frames {
        Some(n) => println!("  Max frames: {}", n),
        None => println!("  Max frames: unlimited"),
    }
    println!("  Prompt: {}", config.render.show_prompt);
    Ok(())
}
