use skytypes::prelude::*;
use thiserror::Error;

use crate::units::Timestamp;

/// Orbit propagation for a single catalog record.
///
/// Implementations report elements that can't be propagated at the
/// requested instant (decayed, malformed, ...) as errors; callers treat
/// those as a skip for that record only.
pub trait Propagator {
    fn propagate(&self, record: &CatalogRecord, at: &Timestamp)
        -> Result<EciPosition, PropagationError>;
}

impl<P: Propagator + ?Sized> Propagator for &P {
    fn propagate(
        &self,
        record: &CatalogRecord,
        at: &Timestamp,
    ) -> Result<EciPosition, PropagationError> {
        (**self).propagate(record, at)
    }
}

#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("Invalid element set for '{designation}': {reason}")]
    Elements { designation: String, reason: String },

    #[error("Instant is outside the propagation range of '{designation}'")]
    Epoch { designation: String },

    #[error("Propagation of '{designation}' failed: {reason}")]
    Propagation { designation: String, reason: String },

    #[error("Propagation of '{designation}' produced a non-finite position")]
    NonFinite { designation: String },
}

/// SGP4/SDP4 via the `sgp4` crate, TEME output in km
#[derive(Debug, Copy, Clone, Default)]
pub struct Sgp4Propagator;

impl Propagator for Sgp4Propagator {
    fn propagate(
        &self,
        record: &CatalogRecord,
        at: &Timestamp,
    ) -> Result<EciPosition, PropagationError> {
        let elements = sgp4::Elements::from_tle(
            Some(record.designation.clone()),
            record.line1.as_bytes(),
            record.line2.as_bytes(),
        )
        .map_err(|e| PropagationError::Elements {
            designation: record.designation.clone(),
            reason: e.to_string(),
        })?;

        let constants =
            sgp4::Constants::from_elements(&elements).map_err(|e| PropagationError::Elements {
                designation: record.designation.clone(),
                reason: e.to_string(),
            })?;

        let minutes = elements
            .datetime_to_minutes_since_epoch(&at.as_utc().naive_utc())
            .map_err(|_| PropagationError::Epoch {
                designation: record.designation.clone(),
            })?;

        let prediction =
            constants
                .propagate(minutes)
                .map_err(|e| PropagationError::Propagation {
                    designation: record.designation.clone(),
                    reason: e.to_string(),
                })?;

        let pos = EciPosition::from_km(prediction.position);
        if pos.is_finite() {
            Ok(pos)
        } else {
            Err(PropagationError::NonFinite {
                designation: record.designation.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn iss() -> CatalogRecord {
        CatalogRecord::new(
            "ISS (ZARYA)",
            "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927",
            "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537",
        )
    }

    #[test]
    fn propagates_near_epoch() {
        let t = Timestamp::from_ymd_hms(2008, 9, 20, 13, 0, 0).unwrap();
        let pos = Sgp4Propagator.propagate(&iss(), &t).unwrap();
        let radius = pos.pos_km.norm();
        // Low earth orbit, roughly 350 km up in 2008
        assert!(radius > 6600.0 && radius < 6900.0, "radius {radius}");
    }

    #[test]
    fn deterministic() {
        let t = Timestamp::from_ymd_hms(2008, 9, 20, 13, 0, 0).unwrap();
        let a = Sgp4Propagator.propagate(&iss(), &t).unwrap();
        let b = Sgp4Propagator.propagate(&iss(), &t).unwrap();
        assert_relative_eq!(a.pos_km, b.pos_km);
    }

    #[test]
    fn malformed_elements_are_an_error() {
        let bad = CatalogRecord::new("JUNK", "1 not an element line", "2 neither is this");
        let t = Timestamp::from_ymd_hms(2008, 9, 20, 13, 0, 0).unwrap();
        let err = Sgp4Propagator.propagate(&bad, &t).unwrap_err();
        assert!(matches!(err, PropagationError::Elements { .. }));
    }
}
