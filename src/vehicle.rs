//! Vehicle parameters (SPEC_FULL.md section 3) — immutable for the duration
//! of a run.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::errors::SimError;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleParams {
    /// Initial (wet) mass at `et = 0`, kg.
    pub m0: f64,
    /// Vacuum specific impulse, s.
    pub i1: f64,
    /// Sea-level specific impulse, s.
    pub i0: f64,
    /// Mass flow rate, kg/s.
    pub dm: f64,
    /// Maximum burn duration, s.
    pub mt: f64,
    /// Pre-release ground burn applied once at initialization, s.
    pub et: f64,
    /// Aerodynamic reference area, m^2.
    pub ra: f64,
    /// Drag coefficient vs. airspeed (m/s).
    pub dc: Curve,
}

impl VehicleParams {
    /// Fails fast on parameter combinations the integrator's
    /// `N = floor(mt/dt) + 1` buffer sizing and division-by-mass both
    /// assume can't happen.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.m0 <= 0.0 {
            return Err(SimError::InvalidVehicleParams(format!(
                "m0 must be positive, got {}",
                self.m0
            )));
        }
        if self.dm <= 0.0 {
            return Err(SimError::InvalidVehicleParams(format!(
                "dm must be positive, got {}",
                self.dm
            )));
        }
        if self.mt <= 0.0 {
            return Err(SimError::InvalidVehicleParams(format!(
                "mt must be positive, got {}",
                self.mt
            )));
        }
        if self.et < 0.0 || self.et >= self.mt {
            return Err(SimError::InvalidVehicleParams(format!(
                "et ({}) must be in [0, mt) where mt = {}",
                self.et, self.mt
            )));
        }
        if self.dc.is_empty() {
            return Err(SimError::EmptyCurve);
        }
        Ok(())
    }

    /// Specific impulse interpolated by the atmospheric pressure ratio `p`
    /// (1.0 at sea level, 0.0 in vacuum). Note the curve convention this
    /// formula assumes: `p = 1` yields `i1`, `p = 0` yields `i0` — the
    /// inverse of the "i1 is vacuum, i0 is sea level" naming. Preserved
    /// literally; see DESIGN.md for the open-question resolution.
    pub fn isp(&self, pressure_ratio: f64) -> f64 {
        (self.i1 - self.i0) * pressure_ratio + self.i0
    }

    /// Apply the pre-release ground burn once at initialization:
    /// `m0 -= et*dm`, `mt -= et`.
    pub fn after_ground_burn(&self) -> VehicleParams {
        VehicleParams {
            m0: self.m0 - self.et * self.dm,
            mt: self.mt - self.et,
            et: 0.0,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_vehicle() -> VehicleParams {
        VehicleParams {
            m0: 1000.0,
            i1: 320.0,
            i0: 280.0,
            dm: 5.0,
            mt: 120.0,
            et: 0.0,
            ra: 1.0,
            dc: Curve::constant(0.3),
        }
    }

    #[test]
    fn validate_accepts_sane_vehicle() {
        assert!(test_vehicle().validate().is_ok());
    }

    #[test]
    fn validate_rejects_nonpositive_mass_flow() {
        let mut v = test_vehicle();
        v.dm = 0.0;
        assert!(v.validate().is_err());
    }

    #[test]
    fn validate_rejects_et_past_mt() {
        let mut v = test_vehicle();
        v.et = v.mt;
        assert!(v.validate().is_err());
    }

    #[test]
    fn isp_follows_the_documented_pressure_ratio_convention() {
        let v = test_vehicle();
        assert_eq!(v.isp(1.0), v.i1);
        assert_eq!(v.isp(0.0), v.i0);
    }

    #[test]
    fn ground_burn_consumes_mass_and_time() {
        let v = test_vehicle();
        let mut burned = v.clone();
        burned.et = 10.0;
        let after = burned.after_ground_burn();
        assert_eq!(after.m0, v.m0 - 10.0 * v.dm);
        assert_eq!(after.mt, v.mt - 10.0);
        assert_eq!(after.et, 0.0);
    }
}
