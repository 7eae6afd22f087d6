//! Steering-law selection (SPEC_FULL.md section 4): a tagged enum replaces
//! the original's numeric type switch, so invalid combinations of
//! parameters are unrepresentable rather than checked at runtime.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use nalgebra::Vector3;

use crate::curve::Curve;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Control {
    /// Open-loop pitchover followed by a prograde hold, used from liftoff
    /// until dynamic pressure has dropped enough to hand off to closed-loop
    /// guidance.
    GravityTurn {
        pitchover_angle_deg: f64,
        pitchover_velocity: f64,
    },
    /// Pitch commanded directly from a time-indexed program curve, azimuth
    /// held fixed.
    PitchProgram { program: Curve, azimuth_deg: f64 },
    /// Planar Powered Explicit Guidance targeting a circular orbit at
    /// `target_altitude_m`.
    Peg {
        target_altitude_m: f64,
        azimuth_deg: f64,
        major_cycle_s: f64,
    },
    /// Unified Powered Flight Guidance, targeting an arbitrary orbital
    /// state.
    Upfg {
        target: UpfgTarget,
        major_cycle_s: f64,
    },
    /// No active steering law; the vehicle drifts ballistically for
    /// `length_s` before the next phase (or end of run) takes over.
    Coast { length_s: f64 },
}

/// Target orbital state for UPFG (SPEC_FULL.md section 3): a target
/// radius, the unit normal of the target orbital plane, and the desired
/// speed/flight-path angle at arrival.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UpfgTarget {
    pub radius_m: f64,
    #[cfg_attr(feature = "serde", serde(with = "vector3_serde"))]
    pub normal_unit: Vector3<f64>,
    pub velocity_mag_mps: f64,
    pub flight_path_angle_deg: f64,
}

#[cfg(feature = "serde")]
mod vector3_serde {
    use nalgebra::Vector3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Vector3<f64>, s: S) -> Result<S::Ok, S::Error> {
        [v.x, v.y, v.z].serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vector3<f64>, D::Error> {
        let [x, y, z] = <[f64; 3]>::deserialize(d)?;
        Ok(Vector3::new(x, y, z))
    }
}
