//! Coast steering (SPEC_FULL.md section 4.3): thrust forced to zero,
//! steering commands held at whatever the vehicle last pointed, for
//! `length_s` seconds before the orchestrator's loop moves on.

use crate::state::EngineFlag;

use super::{StepCommand, SteeringInputs};

/// Persistent state: the absolute sim time coast started at, latched on
/// the first call so elapsed coast duration can be measured against
/// `length_s` regardless of what `t` the vehicle entered coast at.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoastState {
    start_t: Option<f64>,
}

impl CoastState {
    pub fn new() -> Self {
        CoastState { start_t: None }
    }
}

pub fn step(state: &mut CoastState, inputs: &SteeringInputs, length_s: f64) -> StepCommand {
    let start_t = *state.start_t.get_or_insert(inputs.t);
    let elapsed = inputs.t - start_t;

    // No active guidance to request a cutoff, so coast's own clock is what
    // ends the phase: unguided flight, not a guidance- or overshoot-style
    // cutoff.
    let cutoff = if elapsed + inputs.dt >= length_s {
        Some(EngineFlag::Unguided)
    } else {
        None
    };

    StepCommand {
        pitch_deg: inputs.prev_pitch_deg,
        yaw_deg: inputs.prev_yaw_deg,
        cutoff,
        thrust_off: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimContext;
    use crate::frames::navball_frame;
    use nalgebra::Vector3;

    fn inputs_at<'a>(ctx: &'a SimContext, nav: &'a crate::frames::NavballFrame, t: f64, dt: f64) -> SteeringInputs<'a> {
        SteeringInputs {
            ctx,
            t,
            dt,
            r: Vector3::new(ctx.r_body, 0.0, 0.0),
            v: Vector3::new(0.0, 7_600.0, 0.0),
            m: 500.0,
            thrust_accel: 0.0,
            ve: 0.0,
            nav,
            prev_ang_p_srf_deg: 33.0,
            prev_pitch_deg: 12.0,
            prev_yaw_deg: 5.0,
        }
    }

    #[test]
    fn forces_thrust_off() {
        let ctx = SimContext::earth();
        let r = Vector3::new(ctx.r_body, 0.0, 0.0);
        let v = Vector3::new(0.0, 7_600.0, 0.0);
        let nav = navball_frame(&r, &v);
        let inputs = inputs_at(&ctx, &nav, 0.0, 1.0);
        let mut state = CoastState::new();
        let cmd = step(&mut state, &inputs, 5_400.0);
        assert!(cmd.thrust_off);
        assert_eq!(cmd.pitch_deg, 12.0);
        assert_eq!(cmd.yaw_deg, 5.0);
    }

    #[test]
    fn holds_cutoff_until_length_s_elapses() {
        let ctx = SimContext::earth();
        let r = Vector3::new(ctx.r_body, 0.0, 0.0);
        let v = Vector3::new(0.0, 7_600.0, 0.0);
        let nav = navball_frame(&r, &v);
        let mut state = CoastState::new();
        let dt = 1.0;

        // First call latches the start time; plenty of coast time left.
        let cmd = step(&mut state, &inputs_at(&ctx, &nav, 100.0, dt), 10.0);
        assert_eq!(cmd.cutoff, None);

        // Advance to just shy of length_s: still running.
        let cmd = step(&mut state, &inputs_at(&ctx, &nav, 108.0, dt), 10.0);
        assert_eq!(cmd.cutoff, None);

        // One more step would cross length_s (elapsed 9 + dt 1 >= 10): cut.
        let cmd = step(&mut state, &inputs_at(&ctx, &nav, 109.0, dt), 10.0);
        assert_eq!(cmd.cutoff, Some(EngineFlag::Unguided));
    }
}
