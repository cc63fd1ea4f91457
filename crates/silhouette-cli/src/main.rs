use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use silhouette_core::{Overlay, ShimmerSynchronizer};
use silhouette_schema::TraceRequest;
use silhouette_skia::{OverlayRenderer, SkiaTextMeasurer};
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the trace request (JSON)
    #[arg(value_name = "REQUEST")]
    request: PathBuf,

    /// Output PNG path
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Render the shimmer frame this many seconds into the cycle
    #[arg(long, value_name = "SECONDS")]
    time: Option<f64>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_logging(level: LogLevel, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.to_string().parse()?)
        .from_env_lossy();

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let output_path = cli.output.unwrap_or_else(|| {
        let mut p = cli.request.clone();
        p.set_extension("png");
        p
    });

    info!("Request: {:?}", cli.request);
    info!("Output: {:?}", output_path);

    let json = fs::read_to_string(&cli.request)
        .with_context(|| format!("reading {}", cli.request.display()))?;
    let request = TraceRequest::from_json(&json).context("parsing trace request")?;
    if request.width == 0 || request.height == 0 {
        bail!("request size must be non-zero, got {}x{}", request.width, request.height);
    }

    let root = request.root_node()?;
    let tracer = request.tracer(Rc::new(SkiaTextMeasurer::new()));

    let overlay = Rc::new(Overlay::new(&request.overlay));
    overlay.trace(&tracer, &root);
    info!(bounds = ?overlay.bounds(), "Traced silhouette");

    if let Some(time) = cli.time {
        let sync = ShimmerSynchronizer::new(request.overlay.shimmer_period());
        overlay.start_shimmer(request.overlay.shimmer_period(), Some(sync.clone()));
        sync.tick(0.0);
        sync.tick(time.max(0.0));
        info!(progress = sync.progress(), "Shimmer frame");
    }

    let png = OverlayRenderer::render_png(
        &overlay,
        (
            i32::try_from(request.width)?,
            i32::try_from(request.height)?,
        ),
        request.background,
    )?;
    fs::write(&output_path, png)
        .with_context(|| format!("writing {}", output_path.display()))?;

    overlay.stop_shimmer();
    info!("Render complete.");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.log_level, cli.log_format) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        error!("Render failed: {:#}", e);
        std::process::exit(1);
    }
}
