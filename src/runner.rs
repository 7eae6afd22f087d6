//! Orchestrator (C7, SPEC_FULL.md section 4.7): allocates the time-series
//! buffers, resolves initial conditions, wires the steering switch into
//! the integrator each step, and assembles the final `Results` record.

use nalgebra::Vector3;

use crate::context::SimContext;
use crate::control::Control;
use crate::curve::approx_from_curve;
use crate::frames::navball_frame;
use crate::initial::InitialConditions;
use crate::integrator::{self, IntegratorState};
use crate::orbital::KeplerianElements;
use crate::state::{EngineFlag, Orbit, Plots, Results, SimState};
use crate::steering::{Steering, SteeringInputs};
use crate::vehicle::VehicleParams;

/// Run a full simulation: vehicle, initial conditions, control law, and a
/// fixed step size are the entire input surface, per SPEC_FULL.md section
/// 6 — no file or network I/O happens here.
#[tracing::instrument(skip(ctx, vehicle, initial, control), fields(mt = vehicle.mt))]
pub fn run(
    ctx: &SimContext,
    vehicle: &VehicleParams,
    initial: InitialConditions,
    control: Control,
    dt: f64,
) -> Result<Results, crate::errors::SimError> {
    vehicle.validate()?;
    let vehicle = vehicle.after_ground_burn();

    let (t0, r0, v0) = initial.resolve(ctx);
    let capacity = (vehicle.mt / dt).floor() as usize + 1;

    let mut states = Vec::with_capacity(capacity);
    let mut plots = Plots::default();

    let mut steering = Steering::new(control, ctx, r0, v0);
    if matches!(steering, Steering::Upfg { .. }) {
        prime_upfg(&mut steering, ctx, &vehicle, t0, r0, v0);
    }

    let mut step_state = IntegratorState {
        t: t0,
        r: r0,
        v: v0,
        m: vehicle.m0,
        g_loss: 0.0,
        d_loss: 0.0,
    };
    let mut prev_ang_p_srf_deg = 0.0;
    let mut prev_pitch_deg = 0.0;
    let mut prev_yaw_deg = 0.0;
    let mut final_flag = EngineFlag::Running;

    states.push(SimState {
        t: t0,
        r: r0,
        v: v0,
        m: vehicle.m0,
        thrust: 0.0,
        accel: Vector3::zeros(),
        q: 0.0,
        pitch_deg: 0.0,
        yaw_deg: 0.0,
        angle_pitch_srf_deg: 0.0,
        angle_yaw_srf_deg: 0.0,
        angle_pitch_obt_deg: 0.0,
        angle_yaw_obt_deg: 0.0,
        engine_flag: EngineFlag::Running,
    });
    plots.push(states.last().unwrap(), ctx.r_body);

    while states.len() < capacity {
        if step_state.t - t0 > vehicle.mt {
            final_flag = EngineFlag::FuelDepletion;
            tracing::debug!(t = step_state.t, mt = vehicle.mt, "burn duration elapsed");
            break;
        }

        let (isp_accel, ve) = thrust_accel_and_exhaust_velocity(ctx, &vehicle, &step_state);
        let nav = navball_frame(&step_state.r, &step_state.v);
        let inputs = SteeringInputs {
            ctx,
            t: step_state.t,
            dt,
            r: step_state.r,
            v: step_state.v,
            m: step_state.m,
            thrust_accel: isp_accel,
            ve,
            nav: &nav,
            prev_ang_p_srf_deg,
            prev_pitch_deg,
            prev_yaw_deg,
        };
        let cmd = steering.step(&inputs);

        let (next_state, derived) = integrator::step(
            ctx,
            &vehicle,
            &step_state,
            cmd.pitch_deg,
            cmd.yaw_deg,
            cmd.thrust_off,
            dt,
        );

        prev_ang_p_srf_deg = derived.ang_p_srf_deg;
        prev_pitch_deg = cmd.pitch_deg;
        prev_yaw_deg = cmd.yaw_deg;

        let engine_flag = cmd.cutoff.unwrap_or(EngineFlag::Running);
        let sim_state = SimState {
            t: next_state.t,
            r: next_state.r,
            v: next_state.v,
            m: next_state.m,
            thrust: derived.thrust,
            accel: derived.accel,
            q: derived.q,
            pitch_deg: cmd.pitch_deg,
            yaw_deg: cmd.yaw_deg,
            angle_pitch_srf_deg: derived.ang_p_srf_deg,
            angle_yaw_srf_deg: derived.ang_y_srf_deg,
            angle_pitch_obt_deg: derived.ang_p_obt_deg,
            angle_yaw_obt_deg: derived.ang_y_obt_deg,
            engine_flag,
        };

        states.push(sim_state);
        plots.push(states.last().unwrap(), ctx.r_body);
        step_state = next_state;

        if let Some(flag) = cmd.cutoff {
            final_flag = flag;
            tracing::debug!(t = step_state.t, ?final_flag, "engine cutoff requested");
            break;
        }
        if next_state.m <= 0.0 {
            final_flag = EngineFlag::FuelDepletion;
            tracing::debug!(t = step_state.t, "propellant exhausted");
            break;
        }
    }

    let (max_q_idx, max_q_pa) = crate::state::get_max_value(&plots.dynamic_pressure_pa);
    let max_q_time_s = plots.t.get(max_q_idx).copied().unwrap_or(t0);

    tracing::info!(
        steps = states.len(),
        ?final_flag,
        max_q_pa,
        max_q_time_s,
        "simulation terminated"
    );
    let elements = KeplerianElements::from_state_vector_mu(&step_state.r, &step_state.v, ctx.mu);
    let orbit = Orbit {
        elements,
        max_q_pa,
        max_q_time_s,
    };

    let rnc_final = crate::frames::circum_frame(&step_state.r, &step_state.v);
    let burn_time_left_s = (vehicle.mt - (step_state.t - t0)).max(0.0);

    tracing::info!(
        lost_gravity_mps = step_state.g_loss,
        lost_drag_mps = step_state.d_loss,
        burn_time_left_s,
        "loss/burn-time summary"
    );

    Ok(Results {
        states,
        plots,
        orbit,
        altitude_km: (step_state.r.norm() - ctx.r_body) / 1000.0,
        apoapsis_km: (elements.apoapsis_radius_m() - ctx.r_body) / 1000.0,
        periapsis_km: (elements.periapsis_radius_m() - ctx.r_body) / 1000.0,
        velocity_mps: step_state.v.norm(),
        velocity_y_mps: step_state.v.dot(&rnc_final.radial),
        velocity_t_mps: step_state.v.dot(&rnc_final.circum),
        lost_gravity_mps: step_state.g_loss,
        lost_drag_mps: step_state.d_loss,
        lost_total_mps: step_state.g_loss + step_state.d_loss,
        burn_time_left_s,
        peg_debug: None,
        upfg_debug: None,
        final_engine_flag: final_flag,
    })
}

fn thrust_accel_and_exhaust_velocity(
    ctx: &SimContext,
    vehicle: &VehicleParams,
    state: &IntegratorState,
) -> (f64, f64) {
    let altitude_km = (state.r.norm() - ctx.r_body) / 1000.0;
    let pressure_ratio = approx_from_curve(altitude_km, &ctx.atm_pressure);
    let isp = vehicle.isp(pressure_ratio);
    let ve = isp * ctx.g0;
    let thrust_accel = if state.m > 0.0 {
        ve * vehicle.dm / state.m
    } else {
        0.0
    };
    (thrust_accel, ve)
}

/// Five-iteration pre-flight convergence primer (SPEC_FULL.md section 4.5,
/// initialization step 5), run once before the main loop with `dt = 0` so
/// it only refines the persistent UPFG state without advancing time.
fn prime_upfg(
    steering: &mut Steering,
    ctx: &SimContext,
    vehicle: &VehicleParams,
    t0: f64,
    r0: Vector3<f64>,
    v0: Vector3<f64>,
) {
    let priming_state = IntegratorState {
        t: t0,
        r: r0,
        v: v0,
        m: vehicle.m0,
        g_loss: 0.0,
        d_loss: 0.0,
    };
    let (thrust_accel, ve) = thrust_accel_and_exhaust_velocity(ctx, vehicle, &priming_state);
    let nav = navball_frame(&r0, &v0);
    for _ in 0..5 {
        let inputs = SteeringInputs {
            ctx,
            t: t0,
            dt: 0.0,
            r: r0,
            v: v0,
            m: vehicle.m0,
            thrust_accel,
            ve,
            nav: &nav,
            prev_ang_p_srf_deg: 0.0,
            prev_pitch_deg: 0.0,
            prev_yaw_deg: 0.0,
        };
        steering.step(&inputs);
    }
}
