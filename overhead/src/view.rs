//! Human-readable renderings of a sample: a text summary, an SVG sky map
//! and a JSON snapshot.

use chrono::Local;
use serde::Serialize;
use skytypes::prelude::ObserverLocation;
use std::io;

use crate::{
    projector::{compass_label, project, radius_for_elevation, MapPoint},
    sampler::{Sample, SampleStatus, SamplerConfig},
    units::{Angle, Timestamp},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    /// Horizon radius of the sky map in SVG user units
    pub map_radius: f64,
    pub min_elevation: Angle,
    /// Used only for the "nothing within ..." message
    pub scan_horizon_minutes: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self::from_sampler(150.0, &SamplerConfig::default())
    }
}

impl ViewConfig {
    pub fn from_sampler(map_radius: f64, sampler: &SamplerConfig) -> Self {
        ViewConfig {
            map_radius,
            min_elevation: sampler.min_elevation,
            scan_horizon_minutes: sampler.scan_horizon.as_minutes(),
        }
    }
}

pub fn render_text<W: io::Write>(
    sample: &Sample<'_>,
    observer: &ObserverLocation,
    heading: Angle,
    config: &ViewConfig,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "{}  observer {}  heading {}", sample.at, observer, heading)?;
    match sample.status() {
        SampleStatus::Waiting => writeln!(out, "Waiting for catalog data")?,
        SampleStatus::Overhead => {
            writeln!(
                out,
                "{} overhead (above {}):",
                sample.visible.len(),
                config.min_elevation
            )?;
            for v in sample.visible.iter() {
                let az = Angle::from_degrees(v.look.azimuth_deg);
                writeln!(
                    out,
                    "  {:<28} el {:>5.1}°  az {:>5.1}° {:<3}  {:>6.0} km",
                    v.record.designation,
                    v.look.elevation_deg,
                    v.look.azimuth_deg,
                    compass_label(az),
                    v.look.range_km,
                )?;
            }
        }
        SampleStatus::NextPasses => {
            writeln!(out, "Nothing overhead. Next passes:")?;
            for p in sample.upcoming.iter() {
                writeln!(
                    out,
                    "  {:<28} in {:>3} min ({})",
                    p.record.designation,
                    p.minutes_until,
                    p.at.as_utc().with_timezone(&Local).format("%H:%M local"),
                )?;
            }
        }
        SampleStatus::Clear => writeln!(
            out,
            "Nothing overhead or rising within the next {:.0} min",
            config.scan_horizon_minutes
        )?,
    }
    Ok(())
}

const SVG_MARGIN: f64 = 28.0;
const DOT_RADIUS: f64 = 4.0;

fn xml_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn ring<W: io::Write>(out: &mut W, c: f64, r: f64, class: &str) -> io::Result<()> {
    writeln!(
        out,
        r#"  <circle class="{class}" cx="{c:.1}" cy="{c:.1}" r="{r:.1}" fill="none" stroke="gray"/>"#
    )
}

/// Sky map centered on zenith, north rotated by the heading
pub fn render_svg<W: io::Write>(
    sample: &Sample<'_>,
    heading: Angle,
    config: &ViewConfig,
    out: &mut W,
) -> io::Result<()> {
    let radius = config.map_radius;
    let c = radius + SVG_MARGIN;
    let size = 2.0 * c;

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size:.0}" height="{size:.0}" viewBox="0 0 {size:.0} {size:.0}">"#
    )?;
    writeln!(out, "  <title>{}</title>", sample.at)?;

    ring(out, c, radius, "horizon")?;
    for el in [30.0, 60.0] {
        ring(out, c, radius_for_elevation(Angle::from_degrees(el), radius), "elevation")?;
    }
    writeln!(
        out,
        r#"  <circle class="threshold" cx="{c:.1}" cy="{c:.1}" r="{:.1}" fill="none" stroke="orange" stroke-dasharray="4 4"/>"#,
        radius_for_elevation(config.min_elevation, radius)
    )?;

    for (label, az) in [("N", 0.0), ("E", 90.0), ("S", 180.0), ("W", 270.0)] {
        let p = project(
            Angle::from_degrees(az),
            Angle::from_degrees(0.0),
            heading,
            radius + SVG_MARGIN / 2.0,
        )
        .offset(c, c);
        writeln!(
            out,
            r#"  <text class="compass" x="{:.1}" y="{:.1}" text-anchor="middle" dominant-baseline="middle">{label}</text>"#,
            p.x, p.y
        )?;
    }

    for v in sample.visible.iter() {
        let p = project(
            Angle::from_degrees(v.look.azimuth_deg),
            Angle::from_degrees(v.look.elevation_deg),
            heading,
            radius,
        )
        .offset(c, c);
        writeln!(
            out,
            r#"  <circle class="satellite" cx="{:.1}" cy="{:.1}" r="{DOT_RADIUS}" fill="steelblue"/>"#,
            p.x, p.y
        )?;
        writeln!(
            out,
            r#"  <text class="designation" x="{:.1}" y="{:.1}" font-size="10">{}</text>"#,
            p.x + DOT_RADIUS + 2.0,
            p.y,
            xml_escape(&v.record.designation)
        )?;
    }

    writeln!(out, "</svg>")
}

#[derive(Debug, Serialize)]
struct VisibleSnapshot<'a> {
    designation: &'a str,
    azimuth_deg: f64,
    elevation_deg: f64,
    range_km: f64,
    compass: &'static str,
    map: MapPoint,
}

#[derive(Debug, Serialize)]
struct UpcomingSnapshot<'a> {
    designation: &'a str,
    at: Timestamp,
    minutes_until: i64,
}

#[derive(Debug, Serialize)]
struct Snapshot<'a> {
    at: Timestamp,
    status: SampleStatus,
    observer: &'a ObserverLocation,
    heading_deg: Angle,
    catalog_records: usize,
    visible: Vec<VisibleSnapshot<'a>>,
    upcoming: Vec<UpcomingSnapshot<'a>>,
}

pub fn render_json<W: io::Write>(
    sample: &Sample<'_>,
    observer: &ObserverLocation,
    heading: Angle,
    config: &ViewConfig,
    out: &mut W,
) -> serde_json::Result<()> {
    let snapshot = Snapshot {
        at: sample.at,
        status: sample.status(),
        observer,
        heading_deg: heading,
        catalog_records: sample.evaluated,
        visible: sample
            .visible
            .iter()
            .map(|v| VisibleSnapshot {
                designation: &v.record.designation,
                azimuth_deg: v.look.azimuth_deg,
                elevation_deg: v.look.elevation_deg,
                range_km: v.look.range_km,
                compass: compass_label(Angle::from_degrees(v.look.azimuth_deg)),
                map: project(
                    Angle::from_degrees(v.look.azimuth_deg),
                    Angle::from_degrees(v.look.elevation_deg),
                    heading,
                    config.map_radius,
                ),
            })
            .collect(),
        upcoming: sample
            .upcoming
            .iter()
            .map(|p| UpcomingSnapshot {
                designation: &p.record.designation,
                at: p.at,
                minutes_until: p.minutes_until,
            })
            .collect(),
    };
    serde_json::to_writer(out, &snapshot)
}
