//! vistamap CLI - build map layers for a place from OpenStreetMap

mod geojson;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use vistamap_algorithms::pipeline::{build_layers, PipelineOptions};
use vistamap_algorithms::transform::TransformParams;
use vistamap_algorithms::vector::LayerStats;
use vistamap_core::{LayerMap, LayerSet, Query};
use vistamap_osm::{OsmSource, OsmSourceOptions};

/// Layers built when no `--layers` file is given.
const DEFAULT_LAYERS: &str = r#"{
    "perimeter": {},
    "streets": {
        "width": {
            "motorway": 5, "trunk": 5, "primary": 4.5, "secondary": 4,
            "tertiary": 3.5, "residential": 3, "service": 2, "unclassified": 2,
            "pedestrian": 2, "footway": 1
        }
    },
    "building": {"tags": {"building": true}, "union": false},
    "water": {"tags": {"natural": ["water", "bay"]}},
    "green": {"tags": {"landuse": ["grass", "park"], "leisure": ["park", "garden"]}}
}"#;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "vistamap")]
#[command(author, version, about = "Build map layers for a place from OpenStreetMap", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a query will be resolved
    Classify {
        /// Place name, OSM id (e.g. R175905) or "lat,lon"
        query: String,
    },
    /// Build the layers for a place and write them as GeoJSON
    Build {
        /// Place name, OSM id (e.g. R175905) or "lat,lon"
        query: String,
        /// Output GeoJSON file
        #[arg(short, long)]
        output: PathBuf,
        /// Radius in metres around the query point
        #[arg(short, long)]
        radius: Option<f64>,
        /// JSON file mapping layer names to options
        #[arg(short, long)]
        layers: Option<PathBuf>,
        /// Reuse layers from a previous output instead of fetching
        #[arg(long)]
        backup: Option<PathBuf>,
        #[command(flatten)]
        transform: TransformArgs,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print per-layer statistics of a GeoJSON output
    Stats {
        /// GeoJSON file written by `build`
        input: PathBuf,
    },
}

#[derive(clap::Args)]
struct TransformArgs {
    /// Move the map centroid to this x (projected units)
    #[arg(long, allow_hyphen_values = true)]
    x: Option<f64>,
    /// Move the map centroid to this y (projected units)
    #[arg(long, allow_hyphen_values = true)]
    y: Option<f64>,
    /// Horizontal scale factor
    #[arg(long)]
    scale_x: Option<f64>,
    /// Vertical scale factor
    #[arg(long)]
    scale_y: Option<f64>,
    /// Rotation in degrees, counter-clockwise
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<f64>,
}

impl From<TransformArgs> for TransformParams {
    fn from(args: TransformArgs) -> Self {
        TransformParams {
            x: args.x,
            y: args.y,
            scale_x: args.scale_x,
            scale_y: args.scale_y,
            rotation: args.rotation,
        }
    }
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Nominatim endpoint
    #[arg(long)]
    nominatim_url: Option<String>,
    /// Overpass interpreter endpoint
    #[arg(long)]
    overpass_url: Option<String>,
    /// User-Agent sent with every request
    #[arg(long)]
    user_agent: Option<String>,
    /// Per-request timeout in seconds
    #[arg(long, default_value = "180")]
    timeout: u64,
}

impl SourceArgs {
    fn into_options(self) -> OsmSourceOptions {
        let mut options = OsmSourceOptions::default();
        if let Some(url) = self.nominatim_url {
            options.nominatim_url = url;
        }
        if let Some(url) = self.overpass_url {
            options.overpass_url = url;
        }
        if let Some(agent) = self.user_agent {
            options.user_agent = agent;
        }
        options.request_timeout = Duration::from_secs(self.timeout);
        options
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn done(name: &str, path: &Path, elapsed: Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn read_layers(path: Option<&Path>) -> Result<LayerSet> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layers file {}", path.display()))?,
        None => DEFAULT_LAYERS.to_string(),
    };
    LayerSet::from_json_str(&json).context("Invalid layer options")
}

fn read_map(path: &Path) -> Result<LayerMap> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    geojson::value_to_layer_map(&value)
        .with_context(|| format!("{} is not a vistamap layer file", path.display()))
}

fn write_map(map: &LayerMap, path: &Path) -> Result<()> {
    let text = serde_json::to_string(&geojson::layer_map_to_value(map))?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

fn print_stats(map: &LayerMap) {
    println!("CRS: {}", map.crs());
    println!("{:<16} {:>14} {:>12} {:>9}", "layer", "area (m²)", "length (m)", "vertices");
    for (name, geometry) in map.iter() {
        let stats = LayerStats::of(geometry);
        println!(
            "{:<16} {:>14.1} {:>12.1} {:>9}",
            name, stats.area, stats.length, stats.vertices
        );
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Classify { query } => {
            let query = Query::parse(&query);
            println!("{}", query.kind());
        }

        Commands::Build {
            query,
            output,
            radius,
            layers,
            backup,
            transform,
            source,
        } => {
            let query = Query::parse(&query);
            let layers = read_layers(layers.as_deref())?;
            let backup = backup.as_deref().map(read_map).transpose()?;
            let source = OsmSource::new(source.into_options())
                .context("Failed to create the OpenStreetMap client")?;

            let options = PipelineOptions {
                radius,
                backup: backup.as_ref(),
                transform: transform.into(),
                postprocessing: None,
            };

            let start = Instant::now();
            let pb = spinner("Building layers...")?;
            let result = build_layers(&source, &query, &layers, &options);
            pb.finish_and_clear();
            let map = result.context("Failed to build layers")?;
            let elapsed = start.elapsed();

            write_map(&map, &output)?;
            done("Layers", &output, elapsed);
            if cli.verbose {
                print_stats(&map);
            }
        }

        Commands::Stats { input } => {
            let map = read_map(&input)?;
            print_stats(&map);
        }
    }

    Ok(())
}
