//! Command-line host for the facility registry.
//!
//! Loads a registry export, builds the record set and answers one query,
//! printing JSON on stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use medimap::{Config, CrsPreset, CsvSource, GeoPoint, RegionQuery, SnapshotCache};

#[derive(Parser, Debug)]
#[command(name = "medimap")]
#[command(about = "Query a medical facility registry by region or distance")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Registry export (CSV, optionally .gz). Overrides `source.path`
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Planar coordinate system of the export. Overrides `projection.crs`
    #[arg(long)]
    crs: Option<CrsPreset>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List cities with at least one active facility
    Cities,
    /// List districts of a city
    Districts { city: String },
    /// Facilities in a city and district
    Region { city: String, district: String },
    /// The k facilities closest to a point
    #[command(allow_negative_numbers = true)]
    Nearest {
        lat: f64,
        lon: f64,
        #[arg(short, default_value = "5")]
        k: usize,
    },
    /// Facilities within a radius (km) of a point
    #[command(allow_negative_numbers = true)]
    Radius { lat: f64, lon: f64, km: f64 },
    /// Pipeline counts: rows in, dropped and kept
    Summary,
}

#[derive(Serialize)]
struct RegionOutput<'a> {
    city: &'a str,
    district: &'a str,
    center: Option<GeoPoint>,
    records: Vec<&'a medimap::FacilityRecord>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(crs) = args.crs {
        config.projection.crs = crs;
    }

    let path = match args.file.as_ref().or(config.source.path.as_ref()) {
        Some(path) => path.clone(),
        None => bail!("No registry export given; pass --file or set source.path"),
    };

    let pipeline = config.pipeline();
    info!("Using {} with {}", path.display(), pipeline.crs);

    let cache = SnapshotCache::new();
    let set = cache
        .load(&CsvSource::from_path(&path), &pipeline)
        .with_context(|| format!("Failed to load registry {}", path.display()))?;

    match args.command {
        Command::Cities => print_json(&set.distinct_cities())?,
        Command::Districts { city } => print_json(&set.distinct_districts(&city))?,
        Command::Region { city, district } => match set.region_filter(&city, &district) {
            RegionQuery::Matches(records) => print_json(&RegionOutput {
                city: &city,
                district: &district,
                center: set.region_center(&city, &district),
                records,
            })?,
            RegionQuery::NoData { city, district } => {
                println!("No data: no active facilities registered in {} {}", city, district);
            }
        },
        Command::Nearest { lat, lon, k } => {
            let origin = GeoPoint::new(lat, lon);
            let neighbors = set.nearest_k(origin, k);
            if neighbors.is_empty() && k > 0 && !set.is_empty() {
                warn!("No results for origin ({}, {})", lat, lon);
            }
            print_json(&neighbors)?
        }
        Command::Radius { lat, lon, km } => {
            print_json(&set.within_radius(GeoPoint::new(lat, lon), km))?
        }
        Command::Summary => print_json(&set.report().summary())?,
    }

    Ok(())
}
