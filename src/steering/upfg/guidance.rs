//! Unified Powered Flight Guidance main routine (C5, SPEC_FULL.md section
//! 4.5): initialization, the persistent internal state, and the per-step
//! thrust-steering solve. `original_source` for the reference
//! implementation (Vector000/PEGAS) was filtered out of the retrieval
//! pack, so the thrust-integral moments and terminal-state solve below are
//! a from-first-principles implementation of the same Jaggers (1977)
//! two-point boundary-value problem rather than a port of the original —
//! see DESIGN.md. The I/O contract (pitch/yaw/tgo out, persistent internal
//! state in and out) matches section 4.5 exactly.

use nalgebra::Vector3;

use crate::control::UpfgTarget;
use crate::state::EngineFlag;

use super::cser::{self, CserState};
use crate::steering::{StepCommand, SteeringInputs};

/// Persistent guidance state carried between calls, per SPEC_FULL.md
/// section 4.5.
#[derive(Debug, Clone)]
pub struct UpfgInternal {
    pub cser: CserState,
    /// Time-to-go predicted at the last major cycle.
    pub tgo: f64,
    /// Time elapsed since the last major cycle.
    pub lc: f64,
    pub rbias: Vector3<f64>,
    pub rd: Vector3<f64>,
    pub rgrav: Vector3<f64>,
    pub vgo: Vector3<f64>,
    pub v: Vector3<f64>,
    last_pitch_deg: f64,
    last_yaw_deg: f64,
    warned_degenerate: bool,
}

/// Project `r` onto the target plane and build the desired terminal
/// position `rd`, per SPEC_FULL.md section 4.5 initialization step 1.
fn desired_terminal_position(target: &UpfgTarget, r: Vector3<f64>) -> Vector3<f64> {
    let n_hat = crate::frames::unit(target.normal_unit);
    let rd_raw = r - r.dot(&n_hat) * n_hat;
    let ix = crate::frames::unit(rd_raw);
    let iz = ix.cross(&n_hat);
    target.radius_m * crate::frames::unit(ix + iz)
}

impl UpfgInternal {
    /// Steps 1-4 of SPEC_FULL.md section 4.5's initialization. Step 5 (the
    /// five-iteration pre-flight convergence primer) needs vehicle thrust
    /// data this constructor doesn't have, so it's performed by
    /// [`crate::runner::run`] immediately afterward via repeated `step`
    /// calls at `dt = 0` — see DESIGN.md.
    pub fn initialize(
        ctx: &crate::context::SimContext,
        target: &UpfgTarget,
        r: Vector3<f64>,
        v: Vector3<f64>,
    ) -> Self {
        let n_hat = crate::frames::unit(target.normal_unit);
        let rd_raw = r - r.dot(&n_hat) * n_hat;
        let ix = crate::frames::unit(rd_raw);
        let iz = ix.cross(&n_hat);
        let rd = target.radius_m * crate::frames::unit(ix + iz);

        let theta = target.flight_path_angle_deg.to_radians();
        let vangle = Vector3::new(theta.sin(), 0.0, theta.cos());
        let basis_v = ix * vangle.x + n_hat * vangle.y + iz * vangle.z;
        let vgo = target.velocity_mag_mps * basis_v - v;

        let rgrav = -(ctx.mu / 2.0) * r / r.norm().powi(3);

        UpfgInternal {
            cser: CserState::default(),
            tgo: 0.0,
            lc: 0.0,
            rbias: Vector3::zeros(),
            rd,
            rgrav,
            vgo,
            v,
            last_pitch_deg: 90.0,
            last_yaw_deg: 0.0,
            warned_degenerate: false,
        }
    }
}

fn l_moment(ve: f64, tau: f64, t: f64) -> f64 {
    ve * (tau / (tau - t)).ln()
}

fn j_moment(ve: f64, tau: f64, t: f64) -> f64 {
    ve * t - (tau - t) * l_moment(ve, tau, t)
}

/// Solve `L(tgo) = vgo_mag` for `tgo` by scalar Newton iteration.
fn solve_tgo(ve: f64, tau: f64, vgo_mag: f64, guess: f64) -> f64 {
    let mut t = if guess > 0.0 && guess < tau {
        guess
    } else {
        tau * 0.5
    };
    for _ in 0..20 {
        let tc = t.clamp(1.0, tau * 0.999);
        let f = l_moment(ve, tau, tc) - vgo_mag;
        let df = ve / (tau - tc);
        if df.abs() < 1e-12 {
            break;
        }
        let next = (tc - f / df).clamp(1.0, tau * 0.999);
        if (next - tc).abs() < 1e-6 {
            t = next;
            break;
        }
        t = next;
    }
    t
}

pub fn step(
    internal: &mut UpfgInternal,
    inputs: &SteeringInputs,
    target: &UpfgTarget,
    major_cycle_s: f64,
) -> StepCommand {
    let ve = inputs.ve;
    let tau = (ve / inputs.thrust_accel.max(1e-9)).max(1.0);

    // Check degeneracy before attempting a major-cycle recompute: the
    // recompute below always resolves `tgo` to a fresh positive solve, so
    // checking after it would never observe a negative `tgo` at all.
    if internal.tgo < -20.0 {
        internal.lc += inputs.dt;
        if !internal.warned_degenerate {
            tracing::warn!(tgo = internal.tgo, "upfg: time-to-go went degenerate, holding last pitch/yaw");
            internal.warned_degenerate = true;
        }
        return StepCommand {
            pitch_deg: internal.last_pitch_deg,
            yaw_deg: internal.last_yaw_deg,
            cutoff: None,
            thrust_off: false,
        };
    }

    if internal.tgo <= 0.0 || internal.lc >= major_cycle_s - inputs.dt {
        internal.rd = desired_terminal_position(target, inputs.r);

        let vgo_mag = internal.vgo.norm().max(1.0);
        let new_tgo = solve_tgo(ve, tau, vgo_mag, internal.tgo);
        internal.rgrav = if internal.tgo > 0.0 {
            let ratio = new_tgo / internal.tgo;
            internal.rgrav * (ratio * ratio)
        } else {
            -(inputs.ctx.mu / 2.0) * inputs.r / inputs.r.norm().powi(3) * new_tgo * new_tgo
        };
        internal.tgo = new_tgo;
        internal.lc = 0.0;

        // Refine the closed-form seed above into an actual gravity-only
        // position residual by propagating a lightly rgrav/vgo-biased
        // state through the conic state extrapolator (Jaggers 1977's
        // biased-conic iteration) rather than trusting the quadratic seed
        // on its own — this is what the persistent `cser` cache this
        // state carries is for.
        for _ in 0..2 {
            let rc1 = inputs.r - internal.rgrav * 0.1;
            let vc1 = inputs.v + internal.vgo * 0.1;
            let (rc2, _vc2) = cser::conic_state_extrapolation(
                inputs.ctx.mu,
                rc1,
                vc1,
                internal.tgo,
                &mut internal.cser,
            );
            internal.rgrav = rc2 - rc1 - vc1 * internal.tgo;
        }

        let free_flight = inputs.r + inputs.v * internal.tgo + internal.rgrav;
        internal.rbias = internal.rd - free_flight;
        tracing::debug!(t = inputs.t, tgo = internal.tgo, "upfg major cycle");
    } else {
        internal.lc += inputs.dt;
    }

    let j = j_moment(ve, tau, internal.tgo.max(1.0));
    let lambda = crate::frames::unit(internal.vgo);
    let i_f = crate::frames::unit(lambda + internal.rbias / j.max(1.0));

    let pitch_deg = i_f.dot(&inputs.nav.up).clamp(-1.0, 1.0).acos().to_degrees();
    let yaw_deg = i_f
        .dot(&inputs.nav.north)
        .atan2(i_f.dot(&inputs.nav.east))
        .to_degrees();

    internal.last_pitch_deg = pitch_deg;
    internal.last_yaw_deg = yaw_deg;
    internal.v = inputs.v;
    internal.vgo -= i_f * (inputs.thrust_accel * inputs.dt);

    let cutoff = if internal.tgo - internal.lc < inputs.dt {
        Some(EngineFlag::GuidanceCutoff)
    } else if inputs.v.norm() >= target.velocity_mag_mps {
        Some(EngineFlag::VelocityOvershootCutoff)
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
