//! Runs the S2 "gravity turn liftoff" scenario from SPEC_FULL.md section 8
//! and logs a summary. Demo only — real deployments call
//! [`ascent_guidance_sim::runner::run`] directly with their own vehicle
//! and atmosphere data.

use ascent_guidance_sim::control::Control;
use ascent_guidance_sim::curve::Curve;
use ascent_guidance_sim::initial::InitialConditions;
use ascent_guidance_sim::vehicle::VehicleParams;
use ascent_guidance_sim::SimContext;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let ctx = SimContext::earth();

    let vehicle = VehicleParams {
        m0: 50_000.0,
        i1: 320.0,
        i0: 280.0,
        dm: 150.0,
        mt: 180.0,
        et: 0.0,
        ra: 3.0,
        dc: Curve::new(vec![(0.0, 0.2), (300.0, 0.6), (1_000.0, 0.3)]),
    };

    let initial = InitialConditions::Launch {
        longitude_deg: 0.0,
        latitude_deg: 0.0,
        altitude_m: 0.0,
    };

    let control = Control::GravityTurn {
        pitchover_angle_deg: 5.0,
        pitchover_velocity: 50.0,
    };

    let results = ascent_guidance_sim::run(&ctx, &vehicle, initial, control, 0.1)?;

    tracing::info!(
        steps = results.states.len(),
        altitude_km = results.altitude_km,
        apoapsis_km = results.apoapsis_km,
        periapsis_km = results.periapsis_km,
        speed_mps = results.velocity_mps,
        max_q_pa = results.orbit.max_q_pa,
        max_q_time_s = results.orbit.max_q_time_s,
        lost_gravity_mps = results.lost_gravity_mps,
        lost_drag_mps = results.lost_drag_mps,
        lost_total_mps = results.lost_total_mps,
        engine_flag = ?results.final_engine_flag,
        "ascent run complete",
    );

    Ok(())
}
