use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glowrs::{catalog, config, storage, ParamChannel, PipelineConfig, TryOnPipeline, ZoneGroup};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "glowrs")]
#[command(version, about = "AR makeup try-on with live shade compositing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SelectionArgs {
    /// Start from a saved look (flags below override it)
    #[arg(long)]
    look: Option<String>,
    /// Lip shade, `#RRGGBB` or `transparent`
    #[arg(long)]
    lips: Option<String>,
    /// Cheek shade
    #[arg(long)]
    cheeks: Option<String>,
    /// Brow shade
    #[arg(long)]
    brows: Option<String>,
    /// Brow product name; pencils draw stronger
    #[arg(long)]
    brow_product: Option<String>,
    /// Contour shade
    #[arg(long)]
    contour: Option<String>,
    /// Foundation shade
    #[arg(long)]
    foundation: Option<String>,
    /// Intensity 0..1 applied to every zone
    #[arg(long)]
    intensity: Option<f32>,
    /// Hide the makeup overlay (bare camera passthrough)
    #[arg(long)]
    no_makeup: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a live try-on session
    Try {
        /// Number of frames to stream before stopping
        #[arg(short, long, default_value_t = 300)]
        frames: u32,
        /// Write the final composited frame to this PNG
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Capture one composited frame to a PNG
    Snapshot {
        /// Output path (defaults into the configured export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// List catalog finishes, products, and shades for a zone
    Catalog {
        /// lips, cheeks, brows, contour, or foundation
        group: String,
        /// Finish tier for lips/cheeks
        #[arg(long)]
        finish: Option<String>,
    },
    /// Save the selection given by flags under a name
    SaveLook {
        name: String,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// List saved looks
    Looks,
    /// Remove all saved looks
    Purge,
    /// Open config file in editor
    Config,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(None)?;

    match cli.command {
        Commands::Try {
            frames,
            output,
            selection,
        } => try_on(&cfg, frames, output, &selection),
        Commands::Snapshot { output, selection } => snapshot(&cfg, output, &selection),
        Commands::Catalog { group, finish } => list_catalog(&group, finish.as_deref()),
        Commands::SaveLook { name, selection } => save_look(&name, &selection),
        Commands::Looks => list_looks(),
        Commands::Purge => purge_looks(),
        Commands::Config => open_config(),
    }
}

fn pipeline_config(cfg: &config::Config) -> PipelineConfig {
    PipelineConfig {
        camera: cfg.camera.clone(),
        width: cfg.width,
        height: cfg.height,
        model: cfg.model.clone(),
        min_confidence: cfg.min_confidence,
    }
}

/// Apply a saved look and then the individual shade flags to the channel.
fn apply_selection(channel: &ParamChannel, args: &SelectionArgs) -> Result<()> {
    if let Some(name) = &args.look {
        let record = storage::find_record(None, name)?
            .with_context(|| format!("no saved look named {name:?}"))?;
        channel.replace(record.to_selection()?);
    }

    let zones = [
        (ZoneGroup::Lips, &args.lips),
        (ZoneGroup::Cheeks, &args.cheeks),
        (ZoneGroup::Brows, &args.brows),
        (ZoneGroup::Contour, &args.contour),
        (ZoneGroup::Foundation, &args.foundation),
    ];
    for (group, shade) in zones {
        if let Some(shade) = shade {
            channel
                .set_zone_color(group, shade)
                .with_context(|| format!("invalid shade for {group:?}"))?;
            if let Some(intensity) = args.intensity {
                channel.set_zone_intensity(group, intensity);
            }
        } else if let Some(intensity) = args.intensity {
            channel.set_zone_intensity(group, intensity);
        }
    }
    if let Some(product) = &args.brow_product {
        channel.set_brow_product(product);
    }
    if args.no_makeup {
        channel.set_visibility(false);
    }
    Ok(())
}

fn try_on(
    cfg: &config::Config,
    frames: u32,
    output: Option<PathBuf>,
    selection: &SelectionArgs,
) -> Result<()> {
    let channel = ParamChannel::default();
    apply_selection(&channel, selection)?;

    let mut pipeline = TryOnPipeline::new(pipeline_config(cfg), channel);
    pipeline.start().context("cannot start AR session")?;
    info!("Streaming {} frames from {}", frames, cfg.camera);

    let mut rendered = 0u32;
    for i in 0..frames {
        match pipeline.step() {
            Ok(true) => rendered += 1,
            Ok(false) => {}
            Err(e) => warn!("Frame {}: {:#}", i + 1, e),
        }
    }
    info!("Composited a face on {}/{} frames", rendered, frames);

    if let Some(path) = output {
        let bytes = pipeline.screenshot().context("encoding final frame")?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    pipeline.stop();
    Ok(())
}

fn snapshot(cfg: &config::Config, output: Option<PathBuf>, selection: &SelectionArgs) -> Result<()> {
    let channel = ParamChannel::default();
    apply_selection(&channel, selection)?;

    let mut pipeline = TryOnPipeline::new(pipeline_config(cfg), channel);
    pipeline.start().context("cannot start AR session")?;

    // Give the tracker a few frames to lock on before capturing.
    let max_attempts = 30;
    let mut got_face = false;
    for i in 0..max_attempts {
        match pipeline.step() {
            Ok(true) => {
                info!("Frame {}: face tracked", i + 1);
                got_face = true;
                break;
            }
            Ok(false) => {}
            Err(e) => warn!("Frame {}: {:#}", i + 1, e),
        }
    }
    if !got_face {
        warn!("No face tracked after {max_attempts} frames; capturing the bare passthrough");
    }

    let path = output.unwrap_or_else(|| {
        cfg.export_dir
            .join(format!("tryon-{}.png", uuid::Uuid::new_v4()))
    });
    let bytes = pipeline.screenshot().context("encoding snapshot")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    info!("✓ Snapshot saved to {}", path.display());

    pipeline.stop();
    Ok(())
}

fn parse_group(name: &str) -> Result<ZoneGroup> {
    match name.to_ascii_lowercase().as_str() {
        "lips" => Ok(ZoneGroup::Lips),
        "cheeks" => Ok(ZoneGroup::Cheeks),
        "brows" => Ok(ZoneGroup::Brows),
        "contour" => Ok(ZoneGroup::Contour),
        "foundation" => Ok(ZoneGroup::Foundation),
        other => anyhow::bail!("unknown zone group: {other}"),
    }
}

fn list_catalog(group: &str, finish: Option<&str>) -> Result<()> {
    let group = parse_group(group)?;
    let catalog = catalog::Catalog::load_default().context("loading shade catalog")?;

    let finishes = catalog.finishes(group);
    if !finishes.is_empty() && finish.is_none() {
        info!("Finishes: {}", finishes.join(", "));
        info!("Pass --finish to list products and shades");
        return Ok(());
    }

    for product in catalog.products(group, finish) {
        info!("{product}");
        if let Some(shades) = catalog.shades(group, finish, product) {
            for (name, shade) in shades {
                info!("  {name}: {}", shade.hex());
            }
        }
    }
    Ok(())
}

fn save_look(name: &str, selection: &SelectionArgs) -> Result<()> {
    let channel = ParamChannel::default();
    apply_selection(&channel, selection)?;
    let record = storage::LookRecord::from_selection(name, &channel.snapshot());
    storage::save_record(None, record).context("saving look")?;
    info!("✓ Look saved: {name}");
    Ok(())
}

fn list_looks() -> Result<()> {
    let records = storage::load_records(None).context("loading looks")?;
    if records.is_empty() {
        info!("No saved looks");
        return Ok(());
    }
    for record in records {
        info!(
            "{} — lips {} cheeks {} brows {} contour {} foundation {}",
            record.name,
            record.lips.shade,
            record.cheeks.shade,
            record.brows.shade,
            record.contour.shade,
            record.foundation.shade
        );
    }
    Ok(())
}

fn purge_looks() -> Result<()> {
    storage::purge(None).context("purging looks")?;
    info!("✓ All saved looks removed");
    Ok(())
}

fn open_config() -> Result<()> {
    let config_path = config::CONFIG_PATH.as_os_str();
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}
