use derive_more::Display;
use serde::Serialize;

/// Geodetic observer position
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display, Serialize)]
#[display(
    fmt = "{{lat: {}, lon: {}, alt: {}}}",
    "latitude_deg",
    "longitude_deg",
    "altitude_m"
)]
pub struct ObserverLocation {
    /// WGS-84 latitude [deg]
    pub latitude_deg: f64,
    /// WGS-84 longitude [deg]
    pub longitude_deg: f64,
    /// Height above the ellipsoid [m]
    pub altitude_m: f64,
}

impl ObserverLocation {
    pub fn from_degrees_and_meters(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    pub fn latitude_radians(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn longitude_radians(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    /// Latitude within [-90, 90], longitude within [-180, 360] and everything finite
    pub fn is_valid(&self) -> bool {
        self.latitude_deg.is_finite()
            && self.longitude_deg.is_finite()
            && self.altitude_m.is_finite()
            && (-90.0..=90.0).contains(&self.latitude_deg)
            && (-180.0..=360.0).contains(&self.longitude_deg)
    }
}
