//! Fixed-step explicit Euler integrator with a semi-implicit position
//! update (C6, SPEC_FULL.md section 4.6). Deliberately not the teacher's
//! RK4: the original this crate implements fixes this exact ten-step
//! algorithm, losses-tracking included, so a faster/more-accurate method
//! would change the numbers a caller compares against.

use nalgebra::Vector3;

use crate::context::SimContext;
use crate::curve::approx_from_curve;
use crate::environment::{air_density, surface_speed};
use crate::frames::{circum_frame, navball_frame, unit, NavballFrame, RncFrame};
use crate::state::EngineFlag;
use crate::vehicle::VehicleParams;

/// The step's worth of vehicle state the orchestrator advances, plus the
/// accumulated loss bookkeeping the results record needs.
#[derive(Debug, Clone, Copy)]
pub struct IntegratorState {
    pub t: f64,
    pub r: Vector3<f64>,
    pub v: Vector3<f64>,
    pub m: f64,
    pub g_loss: f64,
    pub d_loss: f64,
}

/// Everything one step's-worth of derived quantities, returned alongside
/// the advanced state so the orchestrator can fold them into the
/// `Plots`/`SimState` record without recomputing them.
#[derive(Debug, Clone, Copy)]
pub struct StepDerived {
    pub nav: NavballFrame,
    pub rnc: RncFrame,
    pub thrust: f64,
    pub accel: Vector3<f64>,
    pub q: f64,
    pub ang_p_srf_deg: f64,
    pub ang_y_srf_deg: f64,
    pub ang_p_obt_deg: f64,
    pub ang_y_obt_deg: f64,
}

/// Advance `state` by one fixed step `dt` under the commanded
/// `pitch_deg`/`yaw_deg`, per the ten-step algorithm in SPEC_FULL.md
/// section 4.6. `thrust_off` forces thrust (and mass flow) to zero, as
/// coast mode requires.
pub fn step(
    ctx: &SimContext,
    vehicle: &VehicleParams,
    state: &IntegratorState,
    pitch_deg: f64,
    yaw_deg: f64,
    thrust_off: bool,
    dt: f64,
) -> (IntegratorState, StepDerived) {
    let r = state.r;
    let v = state.v;
    let m = state.m;

    let nav = navball_frame(&r, &v);
    let rnc = circum_frame(&r, &v);

    let altitude_km = (r.norm() - ctx.r_body) / 1000.0;
    let pressure_ratio = approx_from_curve(altitude_km, &ctx.atm_pressure);

    let isp = vehicle.isp(pressure_ratio);
    let (thrust, accel_mag) = if thrust_off {
        (0.0, 0.0)
    } else {
        let f = isp * ctx.g0 * vehicle.dm;
        (f, f / m)
    };
    let acv = accel_mag * nav.make_vector(pitch_deg, yaw_deg);

    let r_norm = r.norm();
    let gravity = ctx.mu * r / r_norm.powi(3);
    let g_loss = state.g_loss + gravity.norm() * dt;

    let v_surface = surface_speed(&r, &nav, ctx.r_body);
    let v_air = v - v_surface;
    let v_air_mag = v_air.norm().max(1.0);

    let cd = approx_from_curve(v_air_mag, &vehicle.dc);
    let temperature_k = approx_from_curve(altitude_km, &ctx.atm_temperature) + 273.15;
    let rho = air_density(pressure_ratio * 101_325.0, temperature_k);
    let q = 0.5 * rho * v_air_mag * v_air_mag;
    let drag_accel = vehicle.ra * cd * q / m;
    let d_loss = state.d_loss + drag_accel * dt;

    let v_next = v + (acv - gravity) * dt - drag_accel * unit(v_air) * dt;
    let r_next = r + v_next * dt;

    let nav_next = navball_frame(&r_next, &v_next);
    let v_surface_next = surface_speed(&r_next, &nav_next, ctx.r_body);
    let v_air_next = v_next - v_surface_next;
    let v_air_next_mag = v_air_next.norm().max(1.0);
    let v_air_next_unit = v_air_next / v_air_next_mag;

    let ang_p_srf_deg = v_air_next_unit.dot(&nav_next.up).clamp(-1.0, 1.0).acos().to_degrees();
    let ang_y_srf_deg = v_air_next_unit.dot(&nav_next.east).clamp(-1.0, 1.0).acos().to_degrees();
    let v_next_unit = unit(v_next);
    let ang_p_obt_deg = v_next_unit.dot(&nav_next.up).clamp(-1.0, 1.0).acos().to_degrees();
    let ang_y_obt_deg = v_next_unit.dot(&nav_next.east).clamp(-1.0, 1.0).acos().to_degrees();

    let m_next = if thrust_off { m } else { (m - vehicle.dm * dt).max(0.0) };

    let next_state = IntegratorState {
        t: state.t + dt,
        r: r_next,
        v: v_next,
        m: m_next,
        g_loss,
        d_loss,
    };

    let derived = StepDerived {
        nav: nav_next,
        rnc,
        thrust,
        accel: acv,
        q,
        ang_p_srf_deg,
        ang_y_srf_deg,
        ang_p_obt_deg,
        ang_y_obt_deg,
    };

    (next_state, derived)
}

/// Reasons the main loop stops advancing; mirrors [`EngineFlag`] plus a
/// plain "ran out of buffer" case for the orchestrator's own bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Engine(EngineFlag),
    BufferExhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> VehicleParams {
        VehicleParams {
            m0: 10_000.0,
            i1: 320.0,
            i0: 280.0,
            dm: 30.0,
            mt: 120.0,
            et: 0.0,
            ra: 5.0,
            dc: crate::curve::Curve::constant(0.3),
        }
    }

    #[test]
    fn mass_decreases_while_thrusting() {
        let ctx = SimContext::earth();
        let v = vehicle();
        let state = IntegratorState {
            t: 0.0,
            r: Vector3::new(ctx.r_body, 0.0, 0.0),
            v: Vector3::new(0.0, 400.0, 0.0),
            m: v.m0,
            g_loss: 0.0,
            d_loss: 0.0,
        };
        let (next, _) = step(&ctx, &v, &state, 0.0, 0.0, false, 0.1);
        assert!(next.m < state.m);
    }

    #[test]
    fn mass_unchanged_during_coast() {
        let ctx = SimContext::earth();
        let v = vehicle();
        let state = IntegratorState {
            t: 0.0,
            r: Vector3::new(ctx.r_body + 300_000.0, 0.0, 0.0),
            v: Vector3::new(0.0, 7_700.0, 0.0),
            m: v.m0,
            g_loss: 0.0,
            d_loss: 0.0,
        };
        let (next, derived) = step(&ctx, &v, &state, 0.0, 0.0, true, 1.0);
        assert_eq!(next.m, state.m);
        assert_eq!(derived.thrust, 0.0);
    }

    #[test]
    fn losses_are_nondecreasing() {
        let ctx = SimContext::earth();
        let v = vehicle();
        let mut state = IntegratorState {
            t: 0.0,
            r: Vector3::new(ctx.r_body, 0.0, 0.0),
            v: Vector3::new(0.0, 400.0, 0.0),
            m: v.m0,
            g_loss: 0.0,
            d_loss: 0.0,
        };
        for _ in 0..20 {
            let (next, _) = step(&ctx, &v, &state, 5.0, 0.0, false, 0.1);
            assert!(next.g_loss >= state.g_loss);
            assert!(next.d_loss >= state.d_loss);
            state = next;
        }
    }

    #[test]
    fn coasting_conserves_specific_orbital_energy() {
        let ctx = SimContext::earth();
        let v = vehicle();
        let r0 = ctx.r_body + 300_000.0;
        let speed = (ctx.mu / r0).sqrt();
        let mut state = IntegratorState {
            t: 0.0,
            r: Vector3::new(r0, 0.0, 0.0),
            v: Vector3::new(0.0, speed, 0.0),
            m: v.m0,
            g_loss: 0.0,
            d_loss: 0.0,
        };
        let energy0 = 0.5 * state.v.norm_squared() - ctx.mu / state.r.norm();
        for _ in 0..200 {
            let (next, _) = step(&ctx, &v, &state, 0.0, 0.0, true, 0.5);
            state = next;
        }
        let energy1 = 0.5 * state.v.norm_squared() - ctx.mu / state.r.norm();
        assert!((energy1 - energy0).abs() / energy0.abs() < 1e-3);
    }
}
