//! Planar Powered Explicit Guidance (C4, SPEC_FULL.md section 4.4).
//!
//! `peg_update` solves for the linear-tangent steering coefficients
//! `(A, B)` and time-to-go `T` in closed form given a trial `T`: the
//! thrust-integral moments `L`/`J` below make the terminal-radius and
//! terminal-radial-velocity constraints linear in `(A, B)`, so they solve
//! exactly as a 2x2 system; `T` itself is refined by a scalar Newton
//! iteration matching the accumulated velocity moment `L(T)` against the
//! planar velocity-to-go magnitude needed to reach the target circular
//! speed. `original_source` for this module's reference implementation
//! (Vector000/PEGAS) was not available in the retrieval pack, so this is a
//! from-first-principles derivation of the same two-point boundary-value
//! problem rather than a port — see DESIGN.md.

use crate::context::SimContext;
use crate::frames::circum_frame;
use crate::state::EngineFlag;

use super::{StepCommand, SteeringInputs};

#[derive(Debug, Clone, Copy)]
pub struct PegState {
    pub a: f64,
    pub b: f64,
    /// Time-to-go predicted at the last major cycle.
    pub t: f64,
    /// Time elapsed since the last major cycle.
    pub lc: f64,
    initialized: bool,
}

impl PegState {
    pub fn new() -> Self {
        PegState {
            a: 0.0,
            b: 0.0,
            t: 0.0,
            lc: 0.0,
            initialized: false,
        }
    }
}

/// Velocity integral of thrust acceleration from 0 to `t`, for constant
/// mass flow (`a(s) = ve/(tau - s)`, `tau = m/dm`).
fn l_moment(ve: f64, tau: f64, t: f64) -> f64 {
    ve * (tau / (tau - t)).ln()
}

/// Position integral of `l_moment`, i.e. `integral_0^t L(s) ds`.
fn j_moment(ve: f64, tau: f64, t: f64) -> f64 {
    ve * t - (tau - t) * l_moment(ve, tau, t)
}

/// Solve for `(A, B)` given a trial `T`, exactly satisfying the terminal
/// radius and terminal radial-velocity constraints for that `T`.
fn solve_ab(
    r: f64,
    vy: f64,
    target_radius: f64,
    tau: f64,
    ve: f64,
    g_eff: f64,
    t: f64,
) -> (f64, f64) {
    let l = l_moment(ve, tau, t);
    let j = j_moment(ve, tau, t);

    // d/dT of l_moment(ve, tau, T), used as the "moment" coefficient on B
    // in the velocity equation: integral_0^T a(s)*s ds = tau*L(T) - ve*T.
    let i1 = tau * l - ve * t;
    let k1 = tau * j - ve * t * t / 2.0;

    // [ l,  i1 ] [A]   [ -vy + g_eff*T                          ]
    // [ j,  k1 ] [B] = [ target_radius - r - vy*T + 0.5*g_eff*T^2 ]
    let rhs_a = -vy + g_eff * t;
    let rhs_b = target_radius - r - vy * t + 0.5 * g_eff * t * t;

    let det = l * k1 - i1 * j;
    if det.abs() < 1e-12 {
        return (1.0, 0.0);
    }
    let a = (rhs_a * k1 - i1 * rhs_b) / det;
    let b = (l * rhs_b - rhs_a * j) / det;
    (a, b)
}

/// Newton-refine `(A, B, T)` so that the terminal radius equals
/// `target_radius` and the terminal radial velocity is zero.
pub fn peg_update(
    ctx: &SimContext,
    r: f64,
    vt: f64,
    vy: f64,
    target_radius: f64,
    thrust_accel: f64,
    ve: f64,
    t_prev: f64,
) -> (f64, f64, f64) {
    let tau = (ve / thrust_accel.max(1e-9)).max(1.0);
    let g_eff = ctx.mu / (r * r) - vt * vt / r;
    let v_target = (ctx.mu / target_radius).sqrt();
    let vgo_mag = ((v_target - vt).powi(2) + vy * vy).sqrt();

    let mut t = if t_prev > 0.0 && t_prev < tau {
        t_prev
    } else {
        tau * 0.5
    };

    for _ in 0..20 {
        let t_clamped = t.clamp(1.0, tau * 0.999);
        let l = l_moment(ve, tau, t_clamped);
        let f = l - vgo_mag;
        let dl_dt = ve / (tau - t_clamped);
        if dl_dt.abs() < 1e-12 {
            break;
        }
        let step = f / dl_dt;
        let next = (t_clamped - step).clamp(1.0, tau * 0.999);
        if (next - t_clamped).abs() < 1e-6 {
            t = next;
            break;
        }
        t = next;
    }

    let (a, b) = solve_ab(r, vy, target_radius, tau, ve, g_eff, t);
    (a, b, t)
}

/// Small, bounded proportional correction applied between major cycles so
/// the commanded thrust direction keeps tracking the zero-radial-velocity
/// target as the vehicle drifts from the trajectory the last major cycle
/// was solved against.
fn minor_cycle_bias(vy: f64, thrust_accel: f64) -> f64 {
    (-vy / thrust_accel.max(1e-6)).clamp(-0.05, 0.05)
}

pub fn step(
    state: &mut PegState,
    inputs: &SteeringInputs,
    target_altitude_m: f64,
    azimuth_deg: f64,
    major_cycle_s: f64,
) -> StepCommand {
    let target_radius = inputs.ctx.r_body + target_altitude_m;
    let rnc = circum_frame(&inputs.r, &inputs.v);
    let r = inputs.r.norm();
    let vy = inputs.v.dot(&rnc.radial);
    let vt = inputs.v.dot(&rnc.circum);

    if !state.initialized || state.lc >= major_cycle_s - inputs.dt {
        let (a, b, t) = peg_update(
            inputs.ctx,
            r,
            vt,
            vy,
            target_radius,
            inputs.thrust_accel,
            inputs.ve,
            state.t,
        );
        state.a = a;
        state.b = b;
        state.t = t;
        state.lc = 0.0;
        state.initialized = true;
        tracing::debug!(t = inputs.t, a, b, time_to_go = t, "peg major cycle");
    } else {
        state.lc += inputs.dt;
    }

    let c = minor_cycle_bias(vy, inputs.thrust_accel);
    let arg = (state.a - state.b * state.lc + c).clamp(-1.0, 1.0);
    let pitch_deg = arg.acos().to_degrees();
    let yaw_deg = 90.0 - azimuth_deg;

    let cutoff = if state.t - state.lc < inputs.dt {
        Some(EngineFlag::GuidanceCutoff)
    } else {
        None
    };

    StepCommand {
        pitch_deg,
        yaw_deg,
        cutoff,
        thrust_off: false,
    }
}
