//! Polar sky map projection.
//!
//! Zenith is the center of the map and the horizon its rim. The map is
//! counter-rotated by the device heading so that whatever the device points
//! at is "up". Coordinates are screen coordinates relative to the center,
//! y grows downwards.

use serde::Serialize;

use crate::units::Angle;

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub fn distance_from_center(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn offset(&self, cx: f64, cy: f64) -> MapPoint {
        MapPoint {
            x: self.x + cx,
            y: self.y + cy,
        }
    }
}

/// Radial distance from the center for an elevation, clamped to the map
pub fn radius_for_elevation(elevation: Angle, map_radius: f64) -> f64 {
    let el = elevation.as_degrees().clamp(0.0, 90.0);
    map_radius * (1.0 - el / 90.0)
}

pub fn project(azimuth: Angle, elevation: Angle, heading: Angle, map_radius: f64) -> MapPoint {
    let r = radius_for_elevation(elevation, map_radius);
    let theta = (azimuth - heading).as_radians();
    MapPoint {
        x: r * theta.sin(),
        y: -r * theta.cos(),
    }
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Nearest point of the 16-point compass rose
pub fn compass_label(azimuth: Angle) -> &'static str {
    let sector = (azimuth.as_degrees().rem_euclid(360.0) / 22.5).round() as usize;
    COMPASS_POINTS[sector % COMPASS_POINTS.len()]
}
