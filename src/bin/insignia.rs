use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "insignia", version)]
struct Cli {
    /// Log debug events to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the render plan for a user as JSON.
    Plan(PlanArgs),
    /// Composite a portrait to PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Asset catalog JSON.
    #[arg(long)]
    catalog: PathBuf,

    /// User context JSON (`groups`, `user_badges`, `id_to_badge`).
    #[arg(long)]
    user: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Asset catalog JSON.
    #[arg(long)]
    catalog: PathBuf,

    /// User context JSON.
    #[arg(long)]
    user: PathBuf,

    /// Directory that catalog image keys are relative to.
    #[arg(long)]
    assets: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Also write the hit-regions as JSON.
    #[arg(long)]
    regions: Option<PathBuf>,

    /// Render config JSON; omitted fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Outline hit-regions on the output (also enabled by `INSIGNIA_DEBUG=1`).
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let catalog = insignia::AssetCatalog::from_path(&args.catalog)?;
    let user = insignia::UserContext::from_path(&args.user)?;
    let plan = insignia::select(&user, &catalog);
    let json = serde_json::to_string_pretty(&plan).context("serialize render plan")?;
    println!("{json}");
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let catalog = insignia::AssetCatalog::from_path(&args.catalog)?;
    let user = insignia::UserContext::from_path(&args.user)?;
    let config = match &args.config {
        Some(path) => insignia::RenderConfig::from_path(path)?,
        None => insignia::RenderConfig::default(),
    };
    let runtime_debug = args.debug
        || insignia::parse_debug_flag(std::env::var("INSIGNIA_DEBUG").ok().as_deref());

    let compositor = insignia::Compositor::new(
        Arc::new(insignia::ImageLoader::from_dir(&args.assets)),
        Arc::new(insignia::ExtensionResolver::default()),
        config,
    )
    .with_runtime_debug(runtime_debug);

    let mount = insignia::PortraitMount::new();
    match insignia::render_portrait(&mount, &user, &catalog, &compositor)? {
        insignia::RenderOutcome::Rendered {
            width,
            height,
            regions,
        } => {
            mount
                .with_displayed(|d| d.surface.save_png(&args.out))?
                .transpose()?;
            if let Some(path) = &args.regions {
                write_regions(path, &regions)?;
            }
            eprintln!(
                "wrote {} ({width}x{height}, {} regions)",
                args.out.display(),
                regions.len()
            );
        }
        insignia::RenderOutcome::NothingToShow => {
            eprintln!("nothing to show for this user");
        }
        insignia::RenderOutcome::Superseded => {
            eprintln!("render superseded");
        }
    }
    Ok(())
}

fn write_regions(path: &Path, regions: &[insignia::HitRegion]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(regions).context("serialize hit-regions")?;
    std::fs::write(path, json)
        .with_context(|| format!("write hit-regions '{}'", path.display()))?;
    Ok(())
}
