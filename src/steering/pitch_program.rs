//! Open-loop pitch program steering (SPEC_FULL.md section 4.3): pitch is
//! read straight off a time-indexed curve, azimuth held fixed.

use crate::curve::{approx_from_curve, Curve};

use super::{StepCommand, SteeringInputs};

pub fn step(inputs: &SteeringInputs, program: &Curve, azimuth_deg: f64) -> StepCommand {
    let pitch_deg = approx_from_curve(inputs.t, program);
    let yaw_deg = 90.0 - azimuth_deg;
    StepCommand::running(pitch_deg, yaw_deg)
}
