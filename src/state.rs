//! Per-step simulation record and run-level results (SPEC_FULL.md section
//! 5). `SimState` is what the integrator advances each tick; `Results`
//! (plus its `Plots`/`Orbit` sub-records) is what [`crate::runner`] hands
//! back once the run terminates.

use nalgebra::Vector3;

use crate::orbital::KeplerianElements;

/// Engine status. The discriminants are fixed integers (not renumbered by
/// variant order) so callers that log or serialize the code can rely on a
/// stable mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFlag {
    /// No active guidance; thrust direction is whatever was last commanded.
    Unguided = -1,
    /// Burn ended because the vehicle ran out of propellant.
    FuelDepletion = 0,
    /// Nominal, still burning.
    Running = 1,
    /// Guidance requested cutoff (target reached).
    GuidanceCutoff = 2,
    /// Cutoff triggered by a velocity-overshoot safety check.
    VelocityOvershootCutoff = 3,
}

impl EngineFlag {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// One integration step's worth of vehicle state.
#[derive(Debug, Clone, Copy)]
pub struct SimState {
    pub t: f64,
    pub r: Vector3<f64>,
    pub v: Vector3<f64>,
    pub m: f64,
    pub thrust: f64,
    pub accel: Vector3<f64>,
    /// Dynamic pressure, Pa.
    pub q: f64,
    pub pitch_deg: f64,
    pub yaw_deg: f64,
    /// Pitch/yaw of the velocity vector relative to the surface frame.
    pub angle_pitch_srf_deg: f64,
    pub angle_yaw_srf_deg: f64,
    /// Pitch/yaw of the velocity vector relative to the orbital frame.
    pub angle_pitch_obt_deg: f64,
    pub angle_yaw_obt_deg: f64,
    pub engine_flag: EngineFlag,
}

/// PEG's internal state trace, recorded alongside `SimState` when the
/// active control law is [`crate::control::Control::Peg`] and debug
/// aggregation is enabled.
#[derive(Debug, Clone, Copy)]
pub struct PegDebugStep {
    pub t: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub time_to_go: f64,
}

/// UPFG's internal state trace (abbreviated: the full reference keeps on
/// the order of fifty fields per major cycle; this keeps the ones that
/// matter for post-flight analysis and test assertions).
#[derive(Debug, Clone, Copy)]
pub struct UpfgDebugStep {
    pub t: f64,
    pub time_to_go: f64,
    pub v_go: Vector3<f64>,
    pub r_d: Vector3<f64>,
    pub r_grav: Vector3<f64>,
}

/// Plot-friendly time series extracted from the full state trace, matching
/// SPEC_FULL.md section 6's `Plots` record: `{t, r, rmag, v, vy, vt, vmag,
/// F, a, q, pitch, yaw, angle_ps, angle_ys, angle_po, angle_yo}`.
#[derive(Debug, Clone, Default)]
pub struct Plots {
    pub t: Vec<f64>,
    pub r: Vec<Vector3<f64>>,
    /// `|r|`, m.
    pub rmag: Vec<f64>,
    /// Altitude above the body's reference radius, m — a convenience
    /// derived from `rmag` that isn't itself one of section 6's named
    /// series, kept because the rest of the crate (atmosphere/drag
    /// lookups) works in altitude rather than geocentric radius.
    pub altitude_m: Vec<f64>,
    pub v: Vec<Vector3<f64>>,
    /// Radial (vertical) component of velocity, m/s.
    pub vy: Vec<f64>,
    /// Circumferential (horizontal, in-plane) component of velocity, m/s.
    pub vt: Vec<f64>,
    /// `|v|`, m/s.
    pub vmag: Vec<f64>,
    /// Thrust magnitude, N.
    pub thrust_n: Vec<f64>,
    /// Thrust acceleration magnitude, m/s^2.
    pub accel_mps2: Vec<f64>,
    pub dynamic_pressure_pa: Vec<f64>,
    pub mass_kg: Vec<f64>,
    pub pitch_deg: Vec<f64>,
    pub yaw_deg: Vec<f64>,
    pub angle_pitch_srf_deg: Vec<f64>,
    pub angle_yaw_srf_deg: Vec<f64>,
    pub angle_pitch_obt_deg: Vec<f64>,
    pub angle_yaw_obt_deg: Vec<f64>,
}

impl Plots {
    pub fn push(&mut self, s: &SimState, r_body: f64) {
        let rnc = crate::frames::circum_frame(&s.r, &s.v);

        self.t.push(s.t);
        self.r.push(s.r);
        self.rmag.push(s.r.norm());
        self.altitude_m.push(s.r.norm() - r_body);
        self.v.push(s.v);
        self.vy.push(s.v.dot(&rnc.radial));
        self.vt.push(s.v.dot(&rnc.circum));
        self.vmag.push(s.v.norm());
        self.thrust_n.push(s.thrust);
        self.accel_mps2.push(s.accel.norm());
        self.dynamic_pressure_pa.push(s.q);
        self.mass_kg.push(s.m);
        self.pitch_deg.push(s.pitch_deg);
        self.yaw_deg.push(s.yaw_deg);
        self.angle_pitch_srf_deg.push(s.angle_pitch_srf_deg);
        self.angle_yaw_srf_deg.push(s.angle_yaw_srf_deg);
        self.angle_pitch_obt_deg.push(s.angle_pitch_obt_deg);
        self.angle_yaw_obt_deg.push(s.angle_yaw_obt_deg);
    }
}

/// `get_max_value` (SPEC_FULL.md section 6): index and value of the largest
/// entry in `series`. Used by [`crate::runner::run`] to locate max-Q from
/// the assembled dynamic-pressure trace. Returns `(0, f64::MIN)` for an
/// empty series rather than panicking — the orchestrator always calls this
/// with at least the initial state's sample.
pub fn get_max_value(series: &[f64]) -> (usize, f64) {
    let mut best_idx = 0;
    let mut best_val = f64::MIN;
    for (i, &v) in series.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = i;
        }
    }
    (best_idx, best_val)
}

/// Orbital elements at burnout, plus the max-Q event recorded along the way.
#[derive(Debug, Clone, Copy)]
pub struct Orbit {
    pub elements: KeplerianElements,
    pub max_q_pa: f64,
    pub max_q_time_s: f64,
}

/// The full result of a [`crate::runner::run`] call. Scalar field names
/// follow SPEC_FULL.md section 6 (`Altitude_km`, `Apoapsis`, `Periapsis`,
/// `Velocity`, `VelocityY`, `VelocityT`, `LostGravity`, `LostDrag`,
/// `LostTotal`, `BurnTimeLeft`, `ENG`), snake-cased; `maxQv`/`maxQt` live on
/// `orbit` alongside the Keplerian elements they were computed with.
#[derive(Debug, Clone)]
pub struct Results {
    pub states: Vec<SimState>,
    pub plots: Plots,
    pub orbit: Orbit,
    /// Final altitude above the body's reference radius, km.
    pub altitude_km: f64,
    /// Final apoapsis altitude, km.
    pub apoapsis_km: f64,
    /// Final periapsis altitude, km.
    pub periapsis_km: f64,
    /// Final `|v|`, m/s.
    pub velocity_mps: f64,
    /// Final radial (vertical) velocity component, m/s.
    pub velocity_y_mps: f64,
    /// Final circumferential velocity component, m/s.
    pub velocity_t_mps: f64,
    /// Integrated gravity-loss delta-v, m/s.
    pub lost_gravity_mps: f64,
    /// Integrated drag-loss delta-v, m/s.
    pub lost_drag_mps: f64,
    /// `lost_gravity_mps + lost_drag_mps`, m/s.
    pub lost_total_mps: f64,
    /// Remaining burn duration at termination, s (0 if propellant ran out
    /// or cutoff happened after the nominal burn time).
    pub burn_time_left_s: f64,
    pub peg_debug: Option<Vec<PegDebugStep>>,
    pub upfg_debug: Option<Vec<UpfgDebugStep>>,
    pub final_engine_flag: EngineFlag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_flag_codes_are_stable() {
        assert_eq!(EngineFlag::Unguided.code(), -1);
        assert_eq!(EngineFlag::FuelDepletion.code(), 0);
        assert_eq!(EngineFlag::Running.code(), 1);
        assert_eq!(EngineFlag::GuidanceCutoff.code(), 2);
        assert_eq!(EngineFlag::VelocityOvershootCutoff.code(), 3);
    }

    #[test]
    fn plots_push_tracks_altitude_above_body_radius() {
        let mut plots = Plots::default();
        let s = SimState {
            t: 1.0,
            r: Vector3::new(6_471_000.0, 0.0, 0.0),
            v: Vector3::new(0.0, 100.0, 0.0),
            m: 1000.0,
            thrust: 0.0,
            accel: Vector3::zeros(),
            q: 50.0,
            pitch_deg: 90.0,
            yaw_deg: 0.0,
            angle_pitch_srf_deg: 0.0,
            angle_yaw_srf_deg: 0.0,
            angle_pitch_obt_deg: 0.0,
            angle_yaw_obt_deg: 0.0,
            engine_flag: EngineFlag::Running,
        };
        plots.push(&s, 6_371_000.0);
        assert_eq!(plots.altitude_m[0], 100_000.0);
        assert_eq!(plots.rmag[0], 6_471_000.0);
        assert_eq!(plots.dynamic_pressure_pa[0], 50.0);
        assert_eq!(plots.vmag[0], 100.0);
        assert_eq!(plots.vt[0], 100.0);
        assert_eq!(plots.vy[0], 0.0);
    }

    #[test]
    fn get_max_value_finds_index_and_value() {
        let series = [1.0, 5.0, 3.0, 9.0, 2.0];
        assert_eq!(get_max_value(&series), (3, 9.0));
    }

    #[test]
    fn get_max_value_on_empty_series() {
        let series: [f64; 0] = [];
        let (idx, val) = get_max_value(&series);
        assert_eq!(idx, 0);
        assert_eq!(val, f64::MIN);
    }
}
