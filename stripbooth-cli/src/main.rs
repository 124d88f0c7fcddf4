use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stripbooth", version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite three photos into a strip JPEG.
    Strip(StripArgs),
    /// Run a full timed capture session against a still image.
    Session(SessionArgs),
    /// Show or reset the stored settings.
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
struct StripArgs {
    /// Input photo; pass exactly three times, in strip order.
    #[arg(long = "photo", required = true)]
    photos: Vec<PathBuf>,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,

    /// Strip background colour (#hex, rgb(), hsl()).
    #[arg(long)]
    background: Option<String>,

    /// Branding graphic (SVG or raster).
    #[arg(long)]
    branding: Option<PathBuf>,

    /// Fallback title when no graphic is used.
    #[arg(long)]
    title: Option<String>,

    /// Fallback subtitle when no graphic is used.
    #[arg(long)]
    subtitle: Option<String>,

    /// Print layout of the written file.
    #[arg(long, value_enum, default_value_t = LayoutArg::Single)]
    layout: LayoutArg,
}

#[derive(Parser, Debug)]
struct SessionArgs {
    /// Still image standing in for the camera feed.
    #[arg(long)]
    source: PathBuf,

    /// Directory the strip is downloaded into when no save folder is configured.
    #[arg(long)]
    out_dir: PathBuf,

    /// Settings directory; defaults apply when omitted.
    #[arg(long)]
    settings_dir: Option<PathBuf>,

    /// Shorten the ready pause and countdown ticks.
    #[arg(long, default_value_t = false)]
    fast: bool,
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Settings directory.
    #[arg(long)]
    settings_dir: PathBuf,

    /// Restore both settings records to their defaults.
    #[arg(long, default_value_t = false)]
    reset: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    Single,
    TwoUp,
}

impl From<LayoutArg> for stripbooth::PrintLayout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Single => Self::Single,
            LayoutArg::TwoUp => Self::TwoUp,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Strip(args) => cmd_strip(args),
        Command::Session(args) => cmd_session(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("build tokio runtime")
}

fn open_store(dir: Option<&PathBuf>) -> Box<dyn stripbooth::SettingsStore> {
    match dir {
        Some(dir) => Box::new(stripbooth::JsonDirStore::new(dir)),
        None => Box::new(stripbooth::MemoryStore::new()),
    }
}

fn cmd_strip(args: StripArgs) -> anyhow::Result<()> {
    if args.photos.len() != stripbooth::PHOTO_COUNT {
        anyhow::bail!(
            "expected {} --photo arguments, got {}",
            stripbooth::PHOTO_COUNT,
            args.photos.len()
        );
    }

    let mut settings = stripbooth::AppSettings::default();
    if let Some(bg) = args.background {
        settings.strip_background_color = bg;
    }
    if let Some(title) = args.title {
        settings.branding_title = title;
    }
    if let Some(subtitle) = args.subtitle {
        settings.branding_subtitle = subtitle;
    }
    if let Some(path) = &args.branding {
        settings.branding_image_path = path.display().to_string();
    }

    // Inputs go through the capture path so any size is cropped to the photo slot.
    let adjustments = stripbooth::VisualAdjustments::default();
    let mut photos = Vec::with_capacity(args.photos.len());
    for (index, path) in args.photos.iter().enumerate() {
        let bytes =
            std::fs::read(path).with_context(|| format!("read photo '{}'", path.display()))?;
        let source = stripbooth::StillFrameSource::from_encoded(&bytes)
            .with_context(|| format!("decode photo '{}'", path.display()))?;
        let image = stripbooth::capture_frame(&source, &adjustments)?;
        photos.push(stripbooth::CapturedPhoto::new(image, index)?);
    }

    let branding = stripbooth::Branding::from_settings(&settings);
    let compositor = stripbooth::StripCompositor::new(branding);
    let strip = compositor.compose(photos, settings.background())?;
    let artifact = stripbooth::build_print_artifact(&strip.image, args.layout.into())?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, artifact.bytes.as_slice())
        .with_context(|| format!("write jpeg '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_session(args: SessionArgs) -> anyhow::Result<()> {
    let store = open_store(args.settings_dir.as_ref());
    let adjustments = stripbooth::load_camera_settings(store.as_ref());
    let settings = stripbooth::load_app_settings(store.as_ref());

    let bytes = std::fs::read(&args.source)
        .with_context(|| format!("read source '{}'", args.source.display()))?;
    let source = Arc::new(
        stripbooth::StillFrameSource::from_encoded(&bytes)
            .with_context(|| format!("decode source '{}'", args.source.display()))?,
    );

    let timing = if args.fast {
        stripbooth::CaptureTiming {
            ready_pause: Duration::from_millis(50),
            tick: Duration::from_millis(50),
            ..stripbooth::CaptureTiming::default()
        }
    } else {
        stripbooth::CaptureTiming::default()
    };

    let branding = stripbooth::Branding::from_settings(&settings);
    let compositor = stripbooth::StripCompositor::new(branding);
    let mut session = stripbooth::KioskSession::new(compositor, settings);
    let fallback = stripbooth::DownloadDirFallback::in_dir(&args.out_dir);

    let rt = runtime()?;
    let receipt = rt.block_on(async {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let progress = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                tracing::info!(?event, "capture progress");
            }
        });

        session.start()?;
        let sequencer = stripbooth::CaptureSequencer::with_timing(source, adjustments, timing)
            .with_events(tx);
        if !session.capture(sequencer).await? {
            anyhow::bail!("capture sequence was cancelled");
        }
        progress.await.context("progress task failed")?;

        session.generate_strip().await?;
        let receipt = session.print(&stripbooth::FolderBridge, &fallback, chrono::Utc::now())?;
        session.finish();
        Ok::<_, anyhow::Error>(receipt)
    })?;

    eprintln!("wrote {}", receipt.saved_to.path().display());
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let store = stripbooth::JsonDirStore::new(&args.settings_dir);
    let (camera, app) = if args.reset {
        (
            stripbooth::reset_camera_settings(&store)?,
            stripbooth::reset_app_settings(&store)?,
        )
    } else {
        (
            stripbooth::load_camera_settings(&store),
            stripbooth::load_app_settings(&store),
        )
    };

    let mut doc = serde_json::Map::new();
    doc.insert(
        stripbooth::CAMERA_SETTINGS_KEY.to_owned(),
        serde_json::to_value(camera)?,
    );
    doc.insert(
        stripbooth::APP_SETTINGS_KEY.to_owned(),
        serde_json::to_value(app)?,
    );
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
