//! Which catalog objects are overhead right now, or when the next ones rise.

use ordered_float::OrderedFloat;
use serde::Serialize;
use skytypes::prelude::*;
use std::{cmp::Reverse, collections::HashSet};
use tracing::{debug, trace};

use crate::{
    propagation::Propagator,
    topocentric::look_angle,
    units::{Angle, Time, Timestamp},
};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SamplerConfig {
    /// Objects must be strictly above this elevation to count as visible
    pub min_elevation: Angle,
    /// First forward-scan offset from the sample instant
    pub scan_start: Time,
    pub scan_step: Time,
    /// Last forward-scan offset, inclusive
    pub scan_horizon: Time,
    /// Only this many leading catalog records are forward-scanned
    pub scan_record_limit: usize,
    pub max_upcoming: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            min_elevation: Angle::from_degrees(25.0),
            scan_start: Time::from_minutes(1.0),
            scan_step: Time::from_minutes(2.0),
            scan_horizon: Time::from_minutes(180.0),
            scan_record_limit: 100,
            max_upcoming: 5,
        }
    }
}

impl SamplerConfig {
    pub fn clears(&self, look: &LookAngle) -> bool {
        look.elevation_deg > self.min_elevation.as_degrees()
    }

    /// Forward-scan offsets, `scan_start` through `scan_horizon` inclusive
    pub fn scan_offsets(&self) -> impl Iterator<Item = Time> + '_ {
        // Tolerates float error when the horizon is an exact multiple of the step
        const SLACK_SECS: f64 = 1e-6;
        let horizon = self.scan_horizon.as_secs() + SLACK_SECS;
        let steps = if self.scan_step.as_secs() > 0.0 && self.scan_start.as_secs() <= horizon {
            ((horizon - self.scan_start.as_secs()) / self.scan_step.as_secs()).floor() as usize + 1
        } else if self.scan_start.as_secs() <= horizon {
            1
        } else {
            0
        };
        (0..steps).map(move |i| self.scan_start + self.scan_step * i as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibleEntry<'a> {
    pub record: &'a CatalogRecord,
    pub look: LookAngle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingPass<'a> {
    pub record: &'a CatalogRecord,
    /// Instant the object first clears the elevation threshold
    pub at: Timestamp,
    pub minutes_until: i64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SampleStatus {
    /// No catalog records loaded yet, or none retained by the filter
    Waiting,
    Overhead,
    NextPasses,
    /// Nothing rises within the scan horizon
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample<'a> {
    pub at: Timestamp,
    /// Number of catalog records this sample was computed against
    pub evaluated: usize,
    /// Descending elevation, catalog order among equal elevations
    pub visible: Vec<VisibleEntry<'a>>,
    /// Ascending `minutes_until`, populated only when nothing is visible
    pub upcoming: Vec<UpcomingPass<'a>>,
}

impl<'a> Sample<'a> {
    pub fn status(&self) -> SampleStatus {
        if self.evaluated == 0 {
            SampleStatus::Waiting
        } else if !self.visible.is_empty() {
            SampleStatus::Overhead
        } else if !self.upcoming.is_empty() {
            SampleStatus::NextPasses
        } else {
            SampleStatus::Clear
        }
    }
}

fn look_at<P: Propagator + ?Sized>(
    propagator: &P,
    record: &CatalogRecord,
    observer: &ObserverLocation,
    t: &Timestamp,
) -> Option<LookAngle> {
    match propagator.propagate(record, t) {
        Ok(pos) => Some(look_angle(observer, &pos, t)),
        Err(e) => {
            trace!(err = %e, "Skipping record");
            None
        }
    }
}

pub fn sample<'a, P: Propagator + ?Sized>(
    catalog: &'a [CatalogRecord],
    observer: &ObserverLocation,
    now: Timestamp,
    propagator: &P,
    config: &SamplerConfig,
) -> Sample<'a> {
    let mut visible: Vec<VisibleEntry<'a>> = catalog
        .iter()
        .filter_map(|record| {
            let look = look_at(propagator, record, observer, &now)?;
            config
                .clears(&look)
                .then_some(VisibleEntry { record, look })
        })
        .collect();
    visible.sort_by_key(|e| Reverse(OrderedFloat(e.look.elevation_deg)));

    let upcoming = if visible.is_empty() {
        scan_upcoming(catalog, observer, now, propagator, config)
    } else {
        Vec::new()
    };

    debug!(
        records = catalog.len(),
        visible = visible.len(),
        upcoming = upcoming.len(),
        "Sampled catalog"
    );

    Sample {
        at: now,
        evaluated: catalog.len(),
        visible,
        upcoming,
    }
}

fn scan_upcoming<'a, P: Propagator + ?Sized>(
    catalog: &'a [CatalogRecord],
    observer: &ObserverLocation,
    now: Timestamp,
    propagator: &P,
    config: &SamplerConfig,
) -> Vec<UpcomingPass<'a>> {
    let mut upcoming = Vec::new();
    if config.max_upcoming == 0 {
        return upcoming;
    }
    let candidates = &catalog[..catalog.len().min(config.scan_record_limit)];
    let mut found: HashSet<&str> = HashSet::new();

    'scan: for offset in config.scan_offsets() {
        let t = now + offset;
        for record in candidates {
            if found.contains(record.designation.as_str()) {
                continue;
            }
            let Some(look) = look_at(propagator, record, observer, &t) else {
                continue;
            };
            if config.clears(&look) {
                found.insert(record.designation.as_str());
                upcoming.push(UpcomingPass {
                    record,
                    at: t,
                    minutes_until: offset.as_minutes().round() as i64,
                });
                if upcoming.len() >= config.max_upcoming {
                    break 'scan;
                }
            }
        }
    }

    upcoming.sort_by_key(|p| p.minutes_until);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        propagation::{PropagationError, Sgp4Propagator},
        topocentric::tests::teme_seen_from_null_island,
    };
    use std::collections::HashMap;

    #[derive(Debug, Copy, Clone)]
    enum Track {
        Fixed { azimuth: f64, elevation: f64 },
        /// Below the horizon until the given minute, then at 40° elevation
        RisesAt { minute: f64 },
        Fails,
    }

    struct FakePropagator {
        t0: Timestamp,
        tracks: HashMap<String, Track>,
    }

    impl FakePropagator {
        fn new(t0: Timestamp, tracks: &[(&str, Track)]) -> Self {
            Self {
                t0,
                tracks: tracks
                    .iter()
                    .map(|(n, t)| (n.to_string(), *t))
                    .collect(),
            }
        }
    }

    impl Propagator for FakePropagator {
        fn propagate(
            &self,
            record: &CatalogRecord,
            at: &Timestamp,
        ) -> Result<EciPosition, PropagationError> {
            let track = self.tracks.get(&record.designation).copied().unwrap_or(Track::Fails);
            let (azimuth, elevation) = match track {
                Track::Fixed { azimuth, elevation } => (azimuth, elevation),
                Track::RisesAt { minute } => {
                    if (*at - self.t0).as_minutes() >= minute {
                        (180.0, 40.0)
                    } else {
                        (180.0, -10.0)
                    }
                }
                Track::Fails => {
                    return Err(PropagationError::Propagation {
                        designation: record.designation.clone(),
                        reason: "decayed".to_string(),
                    })
                }
            };
            Ok(teme_seen_from_null_island(azimuth, elevation, 800.0, at))
        }
    }

    fn t0() -> Timestamp {
        Timestamp::from_ymd_hms(2024, 5, 29, 12, 0, 0).unwrap()
    }

    fn null_island() -> ObserverLocation {
        ObserverLocation::from_degrees_and_meters(0.0, 0.0, 0.0)
    }

    fn records(names: &[&str]) -> Vec<CatalogRecord> {
        names
            .iter()
            .map(|n| CatalogRecord::new(*n, "1 00000U", "2 00000"))
            .collect()
    }

    fn names<'a>(visible: &[VisibleEntry<'a>]) -> Vec<&'a str> {
        visible.iter().map(|v| v.record.designation.as_str()).collect()
    }

    #[test]
    fn empty_catalog_is_waiting() {
        let s = sample(&[], &null_island(), t0(), &Sgp4Propagator, &SamplerConfig::default());
        assert!(s.visible.is_empty());
        assert!(s.upcoming.is_empty());
        assert_eq!(s.status(), SampleStatus::Waiting);
    }

    #[test]
    fn visible_sorted_by_descending_elevation() {
        let cat = records(&["LOW", "HIGH", "MID", "BELOW"]);
        let prop = FakePropagator::new(
            t0(),
            &[
                ("LOW", Track::Fixed { azimuth: 10.0, elevation: 30.0 }),
                ("HIGH", Track::Fixed { azimuth: 200.0, elevation: 80.0 }),
                ("MID", Track::Fixed { azimuth: 100.0, elevation: 55.0 }),
                ("BELOW", Track::Fixed { azimuth: 300.0, elevation: 20.0 }),
            ],
        );
        let s = sample(&cat, &null_island(), t0(), &prop, &SamplerConfig::default());
        assert_eq!(names(&s.visible), vec!["HIGH", "MID", "LOW"]);
        assert!(s.upcoming.is_empty());
        assert_eq!(s.status(), SampleStatus::Overhead);
        assert!(s.visible.windows(2).all(|w| w[0].look.elevation_deg >= w[1].look.elevation_deg));
    }

    #[test]
    fn equal_elevations_keep_catalog_order() {
        let cat = records(&["B", "A", "C"]);
        let same = Track::Fixed { azimuth: 45.0, elevation: 60.0 };
        let prop = FakePropagator::new(t0(), &[("B", same), ("A", same), ("C", same)]);
        let s = sample(&cat, &null_island(), t0(), &prop, &SamplerConfig::default());
        assert_eq!(names(&s.visible), vec!["B", "A", "C"]);
    }

    #[test]
    fn threshold_is_strict_and_configurable() {
        let cat = records(&["A", "B"]);
        let prop = FakePropagator::new(
            t0(),
            &[
                ("A", Track::Fixed { azimuth: 0.0, elevation: 10.0 }),
                ("B", Track::Fixed { azimuth: 0.0, elevation: -5.0 }),
            ],
        );
        let horizon = SamplerConfig {
            min_elevation: Angle::from_degrees(0.0),
            ..Default::default()
        };
        let s = sample(&cat, &null_island(), t0(), &prop, &horizon);
        assert_eq!(names(&s.visible), vec!["A"]);

        let s = sample(&cat, &null_island(), t0(), &prop, &SamplerConfig::default());
        assert!(s.visible.is_empty());
    }

    #[test]
    fn propagation_failures_are_isolated() {
        let cat = records(&["BROKEN", "OK", "ALSO-BROKEN"]);
        let prop = FakePropagator::new(
            t0(),
            &[
                ("BROKEN", Track::Fails),
                ("OK", Track::Fixed { azimuth: 90.0, elevation: 45.0 }),
                ("ALSO-BROKEN", Track::Fails),
            ],
        );
        let s = sample(&cat, &null_island(), t0(), &prop, &SamplerConfig::default());
        assert_eq!(names(&s.visible), vec!["OK"]);
        assert_eq!(s.evaluated, 3);
    }

    #[test]
    fn upcoming_passes_sorted_and_capped() {
        let cat = records(&["LATE", "SOON", "NEVER", "MIDWAY", "A", "B", "C", "D"]);
        let prop = FakePropagator::new(
            t0(),
            &[
                ("LATE", Track::RisesAt { minute: 120.0 }),
                ("SOON", Track::RisesAt { minute: 4.0 }),
                ("NEVER", Track::Fixed { azimuth: 0.0, elevation: -30.0 }),
                ("MIDWAY", Track::RisesAt { minute: 60.0 }),
                ("A", Track::RisesAt { minute: 150.0 }),
                ("B", Track::RisesAt { minute: 160.0 }),
                ("C", Track::RisesAt { minute: 170.0 }),
                ("D", Track::RisesAt { minute: 175.0 }),
            ],
        );
        let s = sample(&cat, &null_island(), t0(), &prop, &SamplerConfig::default());
        assert!(s.visible.is_empty());
        assert_eq!(s.status(), SampleStatus::NextPasses);

        let got: Vec<(&str, i64)> = s
            .upcoming
            .iter()
            .map(|p| (p.record.designation.as_str(), p.minutes_until))
            .collect();
        // Offsets are 1, 3, 5, ... so each pass is reported at the first odd minute after rising
        assert_eq!(
            got,
            vec![("SOON", 5), ("MIDWAY", 61), ("LATE", 121), ("A", 151), ("B", 161)]
        );
        assert_eq!(s.upcoming[0].at, t0() + Time::from_minutes(5.0));
    }

    #[test]
    fn upcoming_is_unique_per_designation() {
        let cat = records(&["DUP", "DUP", "OTHER"]);
        let prop = FakePropagator::new(
            t0(),
            &[
                ("DUP", Track::RisesAt { minute: 10.0 }),
                ("OTHER", Track::RisesAt { minute: 20.0 }),
            ],
        );
        let s = sample(&cat, &null_island(), t0(), &prop, &SamplerConfig::default());
        let designations: Vec<&str> = s.upcoming.iter().map(|p| p.record.designation.as_str()).collect();
        assert_eq!(designations, vec!["DUP", "OTHER"]);
    }

    #[test]
    fn nothing_within_horizon_is_clear() {
        let cat = records(&["LATER"]);
        let prop = FakePropagator::new(t0(), &[("LATER", Track::RisesAt { minute: 181.0 })]);
        let s = sample(&cat, &null_island(), t0(), &prop, &SamplerConfig::default());
        assert!(s.upcoming.is_empty());
        assert_eq!(s.status(), SampleStatus::Clear);
    }

    #[test]
    fn scan_is_limited_to_leading_records() {
        let cat = records(&["FIRST", "SECOND"]);
        let prop = FakePropagator::new(
            t0(),
            &[
                ("FIRST", Track::Fixed { azimuth: 0.0, elevation: -30.0 }),
                ("SECOND", Track::RisesAt { minute: 2.0 }),
            ],
        );
        let cfg = SamplerConfig {
            scan_record_limit: 1,
            ..Default::default()
        };
        let s = sample(&cat, &null_island(), t0(), &prop, &cfg);
        assert!(s.upcoming.is_empty());
    }

    #[test]
    fn scan_offsets_include_horizon() {
        let cfg = SamplerConfig::default();
        let offsets: Vec<f64> = cfg.scan_offsets().map(|t| t.as_minutes()).collect();
        assert_eq!(offsets.len(), 90);
        approx::assert_relative_eq!(offsets[0], 1.0);
        approx::assert_relative_eq!(*offsets.last().unwrap(), 179.0, epsilon = 1e-9);

        let cfg = SamplerConfig {
            scan_start: Time::from_minutes(0.0),
            scan_step: Time::from_minutes(3.0),
            scan_horizon: Time::from_minutes(9.0),
            ..Default::default()
        };
        assert_eq!(cfg.scan_offsets().count(), 4);
    }

    #[test]
    fn real_catalog_sample_holds_invariants() {
        let doc = include_str!("../test_fixtures/starlink_dtc.txt");
        let (_, cat) = elset::parse_catalog(doc).unwrap();
        let observer = ObserverLocation::from_degrees_and_meters(30.0, 10.0, 0.0);
        let cfg = SamplerConfig::default();
        let mut rng = oorandom::Rand64::new(7);

        for _ in 0..8 {
            let now = t0() + Time::from_minutes(rng.rand_float() * 600.0);
            let a = sample(&cat, &observer, now, &Sgp4Propagator, &cfg);
            let b = sample(&cat, &observer, now, &Sgp4Propagator, &cfg);
            assert_eq!(a, b);

            assert!(a.visible.iter().all(|v| v.look.elevation_deg > 25.0));
            assert!(a.visible.windows(2).all(|w| w[0].look.elevation_deg >= w[1].look.elevation_deg));
            assert!(a.upcoming.len() <= 5);
            assert!(a.upcoming.windows(2).all(|w| w[0].minutes_until <= w[1].minutes_until));
            let unique: HashSet<&str> = a.upcoming.iter().map(|p| p.record.designation.as_str()).collect();
            assert_eq!(unique.len(), a.upcoming.len());
            assert!(a.visible.is_empty() || a.upcoming.is_empty());
        }
    }
}
