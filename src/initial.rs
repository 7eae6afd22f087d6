//! Initial conditions (SPEC_FULL.md section 3): either a launch pad
//! position/time, or a mid-flight state vector for runs that start from an
//! existing trajectory.

use nalgebra::Vector3;

use crate::context::SimContext;
use crate::errors::SimError;

#[derive(Debug, Clone, Copy)]
pub enum InitialConditions {
    /// Vehicle sits at rest on the pad at the given geodetic position;
    /// `r`/`v` are derived at t=0 from the body's rotation.
    Launch {
        longitude_deg: f64,
        latitude_deg: f64,
        altitude_m: f64,
    },
    /// Vehicle is already airborne with a known ECI state at time `time`.
    InFlight {
        time: f64,
        r: Vector3<f64>,
        v: Vector3<f64>,
    },
}

impl InitialConditions {
    /// Resolve to an ECI `(t0, r0, v0)` triple.
    pub fn resolve(&self, ctx: &SimContext) -> (f64, Vector3<f64>, Vector3<f64>) {
        match *self {
            InitialConditions::InFlight { time, r, v } => (time, r, v),
            InitialConditions::Launch {
                longitude_deg,
                latitude_deg,
                altitude_m,
            } => {
                let lon = longitude_deg.to_radians();
                let lat = latitude_deg.to_radians();
                let radius = ctx.r_body + altitude_m;
                let r = Vector3::new(
                    radius * lat.cos() * lon.cos(),
                    radius * lat.cos() * lon.sin(),
                    radius * lat.sin(),
                );
                let v = crate::environment::surface_speed_init(&r, ctx.r_body);
                (0.0, r, v)
            }
        }
    }

    /// Legacy bridge from the original numeric type-code input: `0` for a
    /// launch pad position, `1` for an in-flight state vector.
    pub fn from_type_code(
        code: i32,
        longitude_deg: f64,
        latitude_deg: f64,
        altitude_m: f64,
        time: f64,
        r: Vector3<f64>,
        v: Vector3<f64>,
    ) -> Result<Self, SimError> {
        match code {
            0 => Ok(InitialConditions::Launch {
                longitude_deg,
                latitude_deg,
                altitude_m,
            }),
            1 => Ok(InitialConditions::InFlight { time, r, v }),
            other => Err(SimError::InvalidInitialType(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn launch_resolves_to_surface_point() {
        let ctx = SimContext::earth();
        let ic = InitialConditions::Launch {
            longitude_deg: 0.0,
            latitude_deg: 0.0,
            altitude_m: 0.0,
        };
        let (t0, r, v) = ic.resolve(&ctx);
        assert_eq!(t0, 0.0);
        assert_abs_diff_eq!(r.norm(), ctx.r_body, epsilon = 1e-3);
        assert!(v.norm() > 0.0);
    }

    #[test]
    fn in_flight_passes_through_unchanged() {
        let ctx = SimContext::earth();
        let r = Vector3::new(6_500_000.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 7_600.0, 0.0);
        let ic = InitialConditions::InFlight { time: 42.0, r, v };
        let (t0, r0, v0) = ic.resolve(&ctx);
        assert_eq!(t0, 42.0);
        assert_eq!(r0, r);
        assert_eq!(v0, v);
    }

    #[test]
    fn from_type_code_rejects_unknown_codes() {
        let r = Vector3::zeros();
        let v = Vector3::zeros();
        assert!(InitialConditions::from_type_code(2, 0.0, 0.0, 0.0, 0.0, r, v).is_err());
    }

    #[test]
    fn from_type_code_maps_zero_to_launch() {
        let r = Vector3::zeros();
        let v = Vector3::zeros();
        let ic = InitialConditions::from_type_code(0, 10.0, 20.0, 100.0, 0.0, r, v).unwrap();
        assert!(matches!(ic, InitialConditions::Launch { .. }));
    }
}
