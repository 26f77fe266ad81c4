// cargo run --bin sky-snapshot -- --lat 30 --lon 10 --at 2024-05-29T12:30:00Z --svg /tmp/sky.svg overhead/test_fixtures/starlink_dtc.txt

use chrono::{DateTime, Utc};
use clap::Parser;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;

use overhead_lib::{
    catalog::{parse_and_filter, NameFilter},
    heading::normalize_heading,
    propagation::Sgp4Propagator,
    sampler::{sample, SamplerConfig},
    units::{Angle, Timestamp},
    view::{render_json, render_svg, render_text, ViewConfig},
};
use skytypes::prelude::ObserverLocation;

/// Sample a TLE file once at a given instant and render the result
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Observer latitude [deg]
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Observer longitude [deg]
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Observer altitude [m]
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    alt: f64,

    /// RFC 3339 instant to sample at, defaults to now
    #[arg(long)]
    at: Option<DateTime<Utc>>,

    /// Elevation threshold [deg]
    #[arg(long, default_value_t = 25.0, allow_negative_numbers = true)]
    min_elevation: f64,

    /// Device heading [deg]
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    heading: f64,

    /// Case-insensitive name substring to keep, may be repeated.
    /// Everything is kept when not provided.
    #[arg(short = 'f', long = "filter")]
    filters: Vec<String>,

    /// Sky map SVG output file path
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print a JSON snapshot instead of the text summary
    #[arg(long)]
    json: bool,

    /// Three-line element set file to read
    input: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    let observer = ObserverLocation::from_degrees_and_meters(opts.lat, opts.lon, opts.alt);
    if !observer.is_valid() {
        return Err(format!("Observer location {observer} is out of range").into());
    }
    let heading = normalize_heading(opts.heading).ok_or("Heading must be finite")?;
    let at = opts.at.map(Timestamp::from_utc).unwrap_or_else(Timestamp::now);

    let doc = fs::read_to_string(&opts.input)?;
    let catalog = parse_and_filter(&doc, &NameFilter::substrings(&opts.filters))?;

    let sampler = SamplerConfig {
        min_elevation: Angle::from_degrees(opts.min_elevation),
        ..Default::default()
    };
    let view = ViewConfig::from_sampler(150.0, &sampler);
    let s = sample(&catalog, &observer, at, &Sgp4Propagator, &sampler);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if opts.json {
        render_json(&s, &observer, heading, &view, &mut out)?;
    } else {
        render_text(&s, &observer, heading, &view, &mut out)?;
    }

    if let Some(path) = &opts.svg {
        let mut svg = BufWriter::new(File::create(path)?);
        render_svg(&s, heading, &view, &mut svg)?;
    }

    Ok(())
}
