use derive_more::Display;

/// Earth-centered inertial (TEME) position
#[derive(Copy, Clone, PartialEq, Debug, Default, Display)]
#[display(fmt = "{{pos_km: {}}}", "pos_km")]
pub struct EciPosition {
    /// Position, [km]
    pub pos_km: na::Vector3<f64>,
}

impl EciPosition {
    pub fn from_km(pos: [f64; 3]) -> Self {
        Self {
            pos_km: na::Vector3::new(pos[0], pos[1], pos[2]),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pos_km.iter().all(|c| c.is_finite())
    }
}
