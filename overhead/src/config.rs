use serde::Deserialize;
use skytypes::prelude::ObserverLocation;
use std::{fs, path::Path, path::PathBuf, time::Duration};
use thiserror::Error;
use url::Url;

use crate::{
    catalog::{CatalogSource, NameFilter},
    location::LocationSource,
    sampler::SamplerConfig,
    tracker::TrackerConfig,
    units::{Angle, Time},
    view::ViewConfig,
};

pub const DEFAULT_CATALOG_URL: &str =
    "https://celestrak.org/NORAD/elements/gp.php?GROUP=starlink&FORMAT=tle";
pub const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json/?fields=status,lat,lon";
pub const DEFAULT_NAME_FILTER: &[&str] = &["dtc"];
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAP_RADIUS: f64 = 150.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid duration for '{key}': {source}")]
    Duration {
        key: &'static str,
        source: humantime::DurationError,
    },

    #[error("Invalid name filter pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub catalog_url: Option<Url>,
    pub catalog_file: Option<PathBuf>,
    /// humantime duration, e.g. "30m"
    pub refresh_interval: Option<String>,
    /// humantime duration, e.g. "5s"
    pub sample_interval: Option<String>,
    pub geolocation_url: Option<Url>,
    pub map_radius: Option<f64>,
    pub svg_output: Option<PathBuf>,
    pub filter: Option<Filter>,
    pub sampler: Option<Sampler>,
    pub observer: Option<Observer>,
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Filter {
    pub substrings: Vec<String>,
    pub pattern: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Sampler {
    /// Degrees
    pub min_elevation: Option<f64>,
    pub scan_start: Option<String>,
    pub scan_step: Option<String>,
    pub scan_horizon: Option<String>,
    pub scan_record_limit: Option<usize>,
    pub max_upcoming: Option<usize>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Observer {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters, 0 when absent
    pub altitude: Option<f64>,
}

fn duration(key: &'static str, value: Option<&String>, default: Duration) -> Result<Duration, ConfigError> {
    match value {
        Some(s) => humantime::parse_duration(s).map_err(|source| ConfigError::Duration { key, source }),
        None => Ok(default),
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str_checked(&content)
    }

    /// Parses and validates, so that a config that loads also converts
    pub fn from_str_checked(s: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(s)?;
        cfg.to_tracker_config()?;
        Ok(cfg)
    }

    pub fn sampler_config(&self) -> Result<SamplerConfig, ConfigError> {
        let dflt = SamplerConfig::default();
        let Some(s) = &self.sampler else {
            return Ok(dflt);
        };
        let as_time = |key, value: Option<&String>, default: Time| {
            duration(key, value, Duration::from_secs_f64(default.as_secs())).map(Time::from_std_duration)
        };
        let cfg = SamplerConfig {
            min_elevation: s
                .min_elevation
                .map(Angle::from_degrees)
                .unwrap_or(dflt.min_elevation),
            scan_start: as_time("scan-start", s.scan_start.as_ref(), dflt.scan_start)?,
            scan_step: as_time("scan-step", s.scan_step.as_ref(), dflt.scan_step)?,
            scan_horizon: as_time("scan-horizon", s.scan_horizon.as_ref(), dflt.scan_horizon)?,
            scan_record_limit: s.scan_record_limit.unwrap_or(dflt.scan_record_limit),
            max_upcoming: s.max_upcoming.unwrap_or(dflt.max_upcoming),
        };

        let el = cfg.min_elevation.as_degrees();
        if !(-90.0..90.0).contains(&el) {
            return Err(ConfigError::Invalid(format!(
                "sampler min-elevation {el} must be within [-90, 90)"
            )));
        }
        if cfg.scan_step.as_secs() <= 0.0 {
            return Err(ConfigError::Invalid("sampler scan-step must be non-zero".to_owned()));
        }
        if cfg.scan_horizon.as_secs() < cfg.scan_start.as_secs() {
            return Err(ConfigError::Invalid(
                "sampler scan-horizon must not precede scan-start".to_owned(),
            ));
        }
        Ok(cfg)
    }

    pub fn name_filter(&self) -> Result<NameFilter, ConfigError> {
        match &self.filter {
            None => Ok(NameFilter::substrings(DEFAULT_NAME_FILTER)),
            Some(f) => {
                let filter = NameFilter::substrings(&f.substrings);
                Ok(match &f.pattern {
                    Some(p) => filter.with_pattern(p)?,
                    None => filter,
                })
            }
        }
    }

    pub fn catalog_source(&self) -> Result<CatalogSource, ConfigError> {
        match (&self.catalog_url, &self.catalog_file) {
            (Some(_), Some(_)) => Err(ConfigError::Invalid(
                "catalog-url and catalog-file are mutually exclusive".to_owned(),
            )),
            (Some(url), None) => Ok(CatalogSource::Http(url.clone())),
            (None, Some(path)) => Ok(CatalogSource::File(path.clone())),
            (None, None) => Ok(CatalogSource::Http(Url::parse(DEFAULT_CATALOG_URL)?)),
        }
    }

    pub fn location_source(&self) -> Result<LocationSource, ConfigError> {
        match &self.observer {
            Some(o) => {
                let loc = ObserverLocation::from_degrees_and_meters(
                    o.latitude,
                    o.longitude,
                    o.altitude.unwrap_or(0.0),
                );
                if !loc.is_valid() {
                    return Err(ConfigError::Invalid(format!("observer location {loc} is out of range")));
                }
                Ok(LocationSource::Fixed(loc))
            }
            None => Ok(LocationSource::IpLookup(match &self.geolocation_url {
                Some(url) => url.clone(),
                None => Url::parse(DEFAULT_GEOLOCATION_URL)?,
            })),
        }
    }

    pub fn to_tracker_config(&self) -> Result<TrackerConfig, ConfigError> {
        let sampler = self.sampler_config()?;
        let sample_interval = duration(
            "sample-interval",
            self.sample_interval.as_ref(),
            DEFAULT_SAMPLE_INTERVAL,
        )?;
        let refresh_interval = duration(
            "refresh-interval",
            self.refresh_interval.as_ref(),
            DEFAULT_REFRESH_INTERVAL,
        )?;
        if sample_interval.is_zero() || refresh_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "sample-interval and refresh-interval must be non-zero".to_owned(),
            ));
        }
        let map_radius = self.map_radius.unwrap_or(DEFAULT_MAP_RADIUS);
        if map_radius.is_nan() || map_radius <= 0.0 {
            return Err(ConfigError::Invalid(format!("map-radius {map_radius} must be positive")));
        }

        Ok(TrackerConfig {
            catalog_source: self.catalog_source()?,
            name_filter: self.name_filter()?,
            location_source: self.location_source()?,
            view: ViewConfig::from_sampler(map_radius, &sampler),
            sampler,
            sample_interval,
            refresh_interval,
            svg_output: self.svg_output.clone(),
            json: false,
        })
    }
}
