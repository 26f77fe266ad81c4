use clap::Parser;
use std::{io, path::PathBuf, time::Duration};
use tokio::sync::watch;
use tracing::{debug, warn};
use url::Url;

use overhead_lib::{
    catalog::{CatalogSource, NameFilter},
    config::Config,
    heading::{normalize_heading, HeadingSource},
    interruptor::Interruptor,
    location::LocationSource,
    propagation::Sgp4Propagator,
    tracker::{Tracker, TrackerConfig},
    units::{Angle, Timestamp},
};
use skytypes::prelude::ObserverLocation;

#[derive(Parser, Debug)]
#[command(version, about = "Shows which tracked satellites are overhead, or when the next ones rise")]
struct Opts {
    /// Configuration toml file.
    ///
    /// Built-in defaults are used when not provided.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Observer latitude [deg], skips IP geolocation
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Observer longitude [deg]
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Observer altitude [m]
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    alt: Option<f64>,

    /// Read the element sets from a local TLE file instead of the network
    #[arg(long = "tle", conflicts_with = "catalog_url")]
    tle_path: Option<PathBuf>,

    /// Catalog endpoint returning three-line element sets
    #[arg(long)]
    catalog_url: Option<Url>,

    /// Elevation threshold [deg]
    #[arg(long, allow_negative_numbers = true)]
    min_elevation: Option<f64>,

    /// Keep only satellites whose name contains this (case-insensitive).
    /// May be repeated.
    #[arg(long = "filter", conflicts_with = "no_filter")]
    filters: Vec<String>,

    /// Track the whole catalog
    #[arg(long)]
    no_filter: bool,

    /// Fixed device heading [deg]
    #[arg(long, conflicts_with = "heading_stdin", allow_negative_numbers = true)]
    heading: Option<f64>,

    /// Read device headings from stdin, one per line
    #[arg(long)]
    heading_stdin: bool,

    /// Write the sky map SVG to this file after every pass
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print JSON snapshots instead of the text summary
    #[arg(long)]
    json: bool,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,
}

impl Opts {
    fn apply(&self, cfg: &mut TrackerConfig) {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            cfg.location_source = LocationSource::Fixed(ObserverLocation::from_degrees_and_meters(
                lat,
                lon,
                self.alt.unwrap_or(0.0),
            ));
        }
        if let Some(path) = &self.tle_path {
            cfg.catalog_source = CatalogSource::File(path.clone());
        }
        if let Some(url) = &self.catalog_url {
            cfg.catalog_source = CatalogSource::Http(url.clone());
        }
        if let Some(el) = self.min_elevation {
            cfg.sampler.min_elevation = Angle::from_degrees(el);
            cfg.view.min_elevation = cfg.sampler.min_elevation;
        }
        if self.no_filter {
            cfg.name_filter = NameFilter::default();
        } else if !self.filters.is_empty() {
            cfg.name_filter = NameFilter::substrings(&self.filters);
        }
        if let Some(path) = &self.svg {
            cfg.svg_output = Some(path.clone());
        }
        cfg.json |= self.json;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    let intr = Interruptor::new();
    intr.install_ctrlc_handler()?;

    let cfg = match &opts.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mut tracker_cfg = cfg.to_tracker_config()?;
    opts.apply(&mut tracker_cfg);
    debug!(?tracker_cfg, "Configuration");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let res = rt.block_on(run(opts, tracker_cfg, intr));
    // A pending stdin read would otherwise hold up shutdown
    rt.shutdown_timeout(Duration::from_millis(100));
    res
}

async fn run(
    opts: Opts,
    cfg: TrackerConfig,
    intr: Interruptor,
) -> Result<(), Box<dyn std::error::Error>> {
    let (heading_tx, mut heading_rx) = watch::channel(Angle::default());
    let heading_task = if opts.heading_stdin {
        Some(tokio::spawn(async move {
            if let Err(e) = HeadingSource::Stdin.run(heading_tx).await {
                warn!(err = %e, "Heading source failed");
            }
        }))
    } else {
        if let Some(h) = opts.heading {
            let heading = normalize_heading(h).ok_or("Heading must be a finite number of degrees")?;
            HeadingSource::Fixed(heading).run(heading_tx).await?;
        }
        None
    };
    // The starting heading is not a change
    heading_rx.borrow_and_update();

    let mut tracker = Tracker::new(cfg, Sgp4Propagator, io::stdout());
    let session = tracker.start(heading_rx).await?;

    if opts.once {
        tracker.sample_pass(&session, Timestamp::now()).await?;
    } else {
        tracker.track(session, &intr).await?;
    }

    if let Some(task) = heading_task {
        task.abort();
    }
    Ok(())
}
