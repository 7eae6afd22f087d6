use crate::curve::Curve;
use crate::environment::standard_atmosphere_curves;

// ---------------------------------------------------------------------------
// Simulation-wide constants, passed down rather than stored at module scope
// ---------------------------------------------------------------------------

/// Standard gravity, m/s^2. Used for Isp -> mass-flow conversions.
pub const G0: f64 = 9.80665;

/// Earth gravitational parameter, m^3/s^2.
pub const MU_EARTH: f64 = 3.986_004_418e14;

/// Earth mean equatorial radius, m.
pub const R_EARTH: f64 = 6_378_137.0;

/// Read-only context threaded through every guidance/physics call.
///
/// Re-entrant: build one of these per run, never reach for the constants
/// above directly from inside the integrator or guidance code, so that the
/// simulator stays trivially testable on non-Earth bodies.
#[derive(Debug, Clone)]
pub struct SimContext {
    pub mu: f64,
    pub g0: f64,
    pub r_body: f64,
    pub atm_pressure: Curve,
    pub atm_temperature: Curve,
}

impl SimContext {
    pub fn new(mu: f64, g0: f64, r_body: f64, atm_pressure: Curve, atm_temperature: Curve) -> Self {
        Self {
            mu,
            g0,
            r_body,
            atm_pressure,
            atm_temperature,
        }
    }

    /// Earth context using a bundled ISA-derived pressure/temperature table.
    ///
    /// The real atmosphere/drag tables a production deployment loads from
    /// disk are out of scope; this sampled ISA curve exists so the crate is
    /// runnable and testable standalone.
    pub fn earth() -> Self {
        let (pressure, temperature) = standard_atmosphere_curves();
        Self::new(MU_EARTH, G0, R_EARTH, pressure, temperature)
    }
}
