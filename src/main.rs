use anyhow::{Context, Result};
use clap::Parser;
use portrait_fx::config::{self, BlurRange, PortraitConfig};
use portrait_fx::segmentation::{self, ObjectChoice};
use portrait_fx::{BlurStrength, PortraitSession};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input photo
    #[arg(short, long)]
    input: PathBuf,

    /// JSON manifest of precomputed object masks
    #[arg(short, long)]
    masks: PathBuf,

    /// Object to keep sharp, as "<index>_<label>" or a bare index
    #[arg(long)]
    object: Option<String>,

    /// Background blur strength, clamped to [0.5, 10]
    #[arg(short, long, default_value_t = config::DEFAULT_BLUR_STRENGTH)]
    blur_strength: f32,

    /// Output image path (format from extension)
    #[arg(short, long, default_value = "portrait.png")]
    output: PathBuf,

    /// Working width images are resized to
    #[arg(long, default_value_t = config::TARGET_WIDTH)]
    target_width: u32,

    /// List detected objects and exit
    #[arg(long)]
    list: bool,

    /// Write the selected object's mask instead of the blurred photo
    #[arg(long)]
    show_mask: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("portrait-fx starting");

    let config = PortraitConfig {
        target_width: args.target_width,
        blur_range: BlurRange::default(),
    };
    let mut session = PortraitSession::new(config).context("Invalid configuration")?;

    let image = image::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?
        .to_rgb8();
    tracing::info!("Input: {}x{}", image.width(), image.height());

    let mut segmenter =
        segmentation::create_default_segmenter(&args.masks).context("Failed to load masks")?;

    let analyze_start = Instant::now();
    let choices = session
        .analyze(segmenter.as_mut(), &image)
        .context("Failed to analyze image")?;
    tracing::debug!("Analysis took {:.1}ms", analyze_start.elapsed().as_secs_f64() * 1000.0);

    if args.list {
        for choice in &choices {
            println!("{}", choice);
        }
        return Ok(());
    }

    let Some(object) = args.object.as_deref() else {
        anyhow::bail!(
            "No object selected, pass --object with one of: {}",
            choices
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    };
    let choice: ObjectChoice = object.parse()?;

    let render_start = Instant::now();
    let output = if args.show_mask {
        session.render_mask(&choice)?
    } else {
        let radius = session.config().blur_range.clamp(args.blur_strength);
        session.render(&choice, BlurStrength::new(radius)?)?
    };
    tracing::debug!("Render took {:.1}ms", render_start.elapsed().as_secs_f64() * 1000.0);

    output
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!("Wrote {}", args.output.display());

    Ok(())
}
