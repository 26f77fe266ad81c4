use serde::Deserialize;
use skytypes::prelude::ObserverLocation;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LocationUnavailable {
    #[error("Geolocation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geolocation endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Geolocation response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Geolocation response has no latitude/longitude")]
    MissingCoordinates,

    #[error("Observer location {0} is out of range")]
    OutOfRange(ObserverLocation),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    Fixed(ObserverLocation),
    /// IP geolocation service returning `{"lat": .., "lon": ..}` JSON
    IpLookup(Url),
}

impl LocationSource {
    pub async fn acquire(&self) -> Result<ObserverLocation, LocationUnavailable> {
        let location = match self {
            LocationSource::Fixed(loc) => *loc,
            LocationSource::IpLookup(url) => {
                debug!(%url, "Looking up observer location");
                let client = reqwest::Client::builder()
                    .timeout(LOOKUP_TIMEOUT)
                    .build()?;
                let resp = client.get(url.clone()).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(LocationUnavailable::Status(status));
                }
                parse_ip_lookup(&resp.text().await?)?
            }
        };
        if !location.is_valid() {
            return Err(LocationUnavailable::OutOfRange(location));
        }
        info!(%location, "Acquired observer location");
        Ok(location)
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    #[serde(alias = "latitude")]
    lat: Option<f64>,
    #[serde(alias = "longitude")]
    lon: Option<f64>,
    #[serde(alias = "altitude")]
    alt: Option<f64>,
}

/// Accepts `lat`/`lon` or `latitude`/`longitude` keys, altitude defaults to 0
pub fn parse_ip_lookup(body: &str) -> Result<ObserverLocation, LocationUnavailable> {
    let resp: IpLookupResponse = serde_json::from_str(body)?;
    match (resp.lat, resp.lon) {
        (Some(lat), Some(lon)) => Ok(ObserverLocation::from_degrees_and_meters(
            lat,
            lon,
            resp.alt.unwrap_or(0.0),
        )),
        _ => Err(LocationUnavailable::MissingCoordinates),
    }
}
