//! Steering modes (C3-C5): gravity turn, pitch program, PEG, UPFG, and
//! coast. Each mode owns whatever persistent state it needs between steps;
//! [`Steering`] wraps the active [`crate::control::Control`] selection plus
//! that state and is what [`crate::runner`] drives once per integration
//! step.

pub mod coast;
pub mod gravity_turn;
pub mod peg;
pub mod pitch_program;
pub mod upfg;

use nalgebra::Vector3;

use crate::context::SimContext;
use crate::control::Control;
use crate::frames::NavballFrame;
use crate::state::EngineFlag;

/// Everything a steering mode needs to know about the current instant.
pub struct SteeringInputs<'a> {
    pub ctx: &'a SimContext,
    pub t: f64,
    pub dt: f64,
    pub r: Vector3<f64>,
    pub v: Vector3<f64>,
    pub m: f64,
    pub thrust_accel: f64,
    pub ve: f64,
    pub nav: &'a NavballFrame,
    /// Surface-relative pitch angle from the previous step, `ang_p_srf`,
    /// needed by the gravity-turn state machine's transition conditions.
    pub prev_ang_p_srf_deg: f64,
    /// Pitch/yaw actually commanded on the previous step, independent of
    /// whichever steering law was active then. Coast mode holds these
    /// rather than `prev_ang_p_srf_deg` (which is a velocity-relative
    /// angle, not a commanded one).
    pub prev_pitch_deg: f64,
    pub prev_yaw_deg: f64,
}

/// What a steering mode commands for this step.
#[derive(Debug, Clone, Copy)]
pub struct StepCommand {
    pub pitch_deg: f64,
    pub yaw_deg: f64,
    /// `None` keeps the engine running; `Some(flag)` requests the main loop
    /// terminate with that flag after this step.
    pub cutoff: Option<EngineFlag>,
    /// Forces thrust to zero this step (coast mode).
    pub thrust_off: bool,
}

impl StepCommand {
    fn running(pitch_deg: f64, yaw_deg: f64) -> Self {
        StepCommand {
            pitch_deg,
            yaw_deg,
            cutoff: None,
            thrust_off: false,
        }
    }
}

/// The active steering law plus its mutable internal state.
pub enum Steering {
    GravityTurn {
        control: crate::control::Control,
        state: gravity_turn::GravityTurnState,
    },
    PitchProgram {
        control: crate::control::Control,
    },
    Peg {
        control: crate::control::Control,
        state: peg::PegState,
    },
    Upfg {
        control: crate::control::Control,
        state: Box<upfg::UpfgInternal>,
    },
    Coast {
        control: crate::control::Control,
        state: coast::CoastState,
    },
}

impl Steering {
    pub fn new(control: Control, ctx: &SimContext, r: Vector3<f64>, v: Vector3<f64>) -> Self {
        match control {
            Control::GravityTurn { .. } => Steering::GravityTurn {
                control,
                state: gravity_turn::GravityTurnState::new(),
            },
            Control::PitchProgram { .. } => Steering::PitchProgram { control },
            Control::Peg { .. } => Steering::Peg {
                control,
                state: peg::PegState::new(),
            },
            Control::Upfg { target, .. } => {
                let internal = upfg::UpfgInternal::initialize(ctx, &target, r, v);
                Steering::Upfg {
                    control,
                    state: Box::new(internal),
                }
            }
            Control::Coast { .. } => Steering::Coast {
                control,
                state: coast::CoastState::new(),
            },
        }
    }

    pub fn step(&mut self, inputs: &SteeringInputs) -> StepCommand {
        match self {
            Steering::GravityTurn { control, state } => {
                let Control::GravityTurn {
                    pitchover_angle_deg,
                    pitchover_velocity,
                } = control
                else {
                    unreachable!()
                };
                gravity_turn::step(state, inputs, *pitchover_angle_deg, *pitchover_velocity)
            }
            Steering::PitchProgram { control } => {
                let Control::PitchProgram { program, azimuth_deg } = control else {
                    unreachable!()
                };
                pitch_program::step(inputs, program, *azimuth_deg)
            }
            Steering::Peg { control, state } => {
                let Control::Peg {
                    target_altitude_m,
                    azimuth_deg,
                    major_cycle_s,
                } = control
                else {
                    unreachable!()
                };
                peg::step(state, inputs, *target_altitude_m, *azimuth_deg, *major_cycle_s)
            }
            Steering::Upfg { control, state } => {
                let Control::Upfg { target, major_cycle_s } = control else {
                    unreachable!()
                };
                upfg::step(state, inputs, target, *major_cycle_s)
            }
            Steering::Coast { control, state } => {
                let Control::Coast { length_s } = control else {
                    unreachable!()
                };
                coast::step(state, inputs, *length_s)
            }
        }
    }
}
