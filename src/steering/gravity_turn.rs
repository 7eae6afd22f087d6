//! Three-state gravity-turn steering (SPEC_FULL.md section 4.3), grounded
//! on the teacher's `gnc_mod::guidance::guidance_pitch` three-phase pitch
//! program, generalized into an explicit state machine with
//! vehicle-supplied thresholds instead of the teacher's hardcoded times.

use super::{StepCommand, SteeringInputs};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GravityTurnState {
    /// `pitch = 0` (straight up); waiting for `v . up >= pitchover_velocity`.
    Vertical,
    /// Ramping `pitch` toward `pitchover_angle_deg` at `dt` degrees/step.
    PitchingOver { pitch_deg: f64 },
    /// Thrust held aligned with the surface-relative velocity vector.
    ProgradeHold,
}

impl GravityTurnState {
    pub fn new() -> Self {
        GravityTurnState::Vertical
    }
}

pub fn step(
    state: &mut GravityTurnState,
    inputs: &SteeringInputs,
    pitchover_angle_deg: f64,
    pitchover_velocity: f64,
) -> StepCommand {
    let up_speed = inputs.v.dot(&inputs.nav.up);

    let prev_state = *state;
    *state = match *state {
        GravityTurnState::Vertical => {
            if up_speed >= pitchover_velocity {
                GravityTurnState::PitchingOver { pitch_deg: 0.0 }
            } else {
                GravityTurnState::Vertical
            }
        }
        GravityTurnState::PitchingOver { pitch_deg } => {
            let next = (pitch_deg + inputs.dt).min(pitchover_angle_deg);
            if inputs.prev_ang_p_srf_deg > pitchover_angle_deg {
                GravityTurnState::ProgradeHold
            } else {
                GravityTurnState::PitchingOver { pitch_deg: next }
            }
        }
        GravityTurnState::ProgradeHold => GravityTurnState::ProgradeHold,
    };
    if std::mem::discriminant(&prev_state) != std::mem::discriminant(state) {
        tracing::debug!(t = inputs.t, ?prev_state, next_state = ?*state, "gravity-turn state transition");
    }

    let pitch_deg = match *state {
        GravityTurnState::Vertical => 0.0,
        GravityTurnState::PitchingOver { pitch_deg } => pitch_deg,
        GravityTurnState::ProgradeHold => inputs.prev_ang_p_srf_deg,
    };

    StepCommand::running(pitch_deg, 0.0)
}
