use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use playlist_iceberg::{
    AggregationMode, CatalogClient, FsCoverSource, HttpCoverSource, IcebergConfig, IcebergError,
    IcebergPipeline, RenderRequest, RoutedCoverSource, SnapshotCatalog, SpotifyClient,
    SpotifyCredentials, TierThresholdTable, format_table, parse_overrides, parse_table,
};

#[derive(Parser, Debug)]
#[command(name = "playlist-iceberg", version)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a playlist's iceberg chart as a PNG (at most 11 albums shown per tier).
    Render(RenderArgs),
    /// Print the effective tier threshold table.
    Tiers(TiersArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Playlist share link, e.g. https://open.spotify.com/playlist/<id>.
    #[arg(long)]
    playlist: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Background canvas image (overrides the config).
    #[arg(long)]
    base: Option<PathBuf>,

    /// How per-track popularity combines into an album score.
    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,

    /// Most distinct albums to admit.
    #[arg(long)]
    max_albums: Option<usize>,

    /// Full threshold table in tier order, e.g. `70,60,50,40,30,20,10,5,1` (sets the tier count).
    #[arg(long)]
    tiers: Option<String>,

    /// Threshold edits, e.g. `1=70,2=55`.
    #[arg(long)]
    threshold: Option<String>,

    /// Read the playlist from a JSON snapshot instead of the Spotify API.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Directory holding covers referenced by relative path.
    #[arg(long)]
    cover_root: Option<PathBuf>,

    /// Write the album table as JSON.
    #[arg(long)]
    table_json: Option<PathBuf>,

    /// Print the album table to stdout.
    #[arg(long)]
    print_table: bool,
}

#[derive(Parser, Debug)]
struct TiersArgs {
    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Full threshold table in tier order, e.g. `70,60,50,40,30,20,10,5,1` (sets the tier count).
    #[arg(long)]
    tiers: Option<String>,

    /// Threshold edits, e.g. `1=70,2=55`.
    #[arg(long)]
    threshold: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    /// Mean of per-track popularity.
    Mean,
    /// Album-level popularity from the catalog.
    Direct,
}

impl From<ModeChoice> for AggregationMode {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::Mean => AggregationMode::MeanOfSamples,
            ModeChoice::Direct => AggregationMode::DirectScore,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Tiers(args) => cmd_tiers(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(err: &anyhow::Error) -> u8 {
    let Some(err) = err.chain().find_map(|e| e.downcast_ref::<IcebergError>()) else {
        return 1;
    };
    match err {
        IcebergError::Validation(_) | IcebergError::Serde(_) => 2,
        IcebergError::Auth(_) => 3,
        IcebergError::NotFound(_) | IcebergError::Forbidden(_) => 4,
        IcebergError::TransientFetch(_) => 5,
        IcebergError::EmptyResult(_) => 6,
        IcebergError::AssetMissing(_) => 7,
        IcebergError::Image(_) | IcebergError::Other(_) => 1,
    }
}

fn load_config(
    path: Option<&Path>,
    tiers: Option<&str>,
    threshold: Option<&str>,
) -> anyhow::Result<IcebergConfig> {
    let mut config = match path {
        Some(p) => IcebergConfig::from_path(p)?,
        None => IcebergConfig::default(),
    };
    if let Some(table) = tiers {
        config.tiers = Some(parse_table(table)?);
    }
    if let Some(edits) = threshold {
        for (tier, value) in parse_overrides(edits)? {
            config
                .thresholds
                .insert(tier.to_string(), serde_json::Value::from(value));
        }
    }
    Ok(config)
}

fn cmd_tiers(args: TiersArgs) -> anyhow::Result<()> {
    let config = load_config(
        args.config.as_deref(),
        args.tiers.as_deref(),
        args.threshold.as_deref(),
    )?;
    let table: TierThresholdTable = config.threshold_table()?;
    println!("{:>4}  {:>9}", "Tier", "Threshold");
    for (tier, threshold) in table.tiers() {
        println!("{tier:>4}  {threshold:>9}");
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = load_config(
        args.config.as_deref(),
        args.tiers.as_deref(),
        args.threshold.as_deref(),
    )?;
    if let Some(base) = args.base {
        config.base_canvas = base;
    }
    if let Some(mode) = args.mode {
        config.aggregation = mode.into();
    }
    if let Some(max) = args.max_albums {
        config.max_albums = max;
    }
    if let Some(root) = args.cover_root {
        config.cover_root = Some(root);
    }

    // Reject bad input before credentials or network are touched.
    let request = RenderRequest::new(&args.playlist, &config)?;

    let catalog: Box<dyn CatalogClient> = match &args.snapshot {
        Some(path) => Box::new(SnapshotCatalog::from_path(path)?),
        None => {
            let credentials = SpotifyCredentials::from_env()?;
            Box::new(SpotifyClient::connect(&credentials)?)
        }
    };
    let covers = RoutedCoverSource::new(
        HttpCoverSource::new(config.cover_timeout())?,
        config.cover_root.clone().map(FsCoverSource::new),
    );
    let raster = playlist_iceberg::CpuRaster;

    let pipeline = IcebergPipeline::new(catalog.as_ref(), &covers, &raster);
    let output = pipeline.render(&request)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    output.image.save_png(&args.out)?;

    if let Some(path) = &args.table_json {
        let json = serde_json::to_vec_pretty(&output.table).context("serialize album table")?;
        std::fs::write(path, json)
            .with_context(|| format!("write album table '{}'", path.display()))?;
    }
    if args.print_table {
        print!("{}", format_table(&output.table));
    }

    let stats = output.stats;
    eprintln!(
        "wrote {} ({} albums, {} covers drawn, {} skipped)",
        args.out.display(),
        stats.albums,
        stats.covers_drawn,
        stats.covers_failed
    );
    Ok(())
}
