//! Deterministic, non-retried failure modes (SPEC_FULL.md section 7).

use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Only reachable through the legacy numeric bridge
    /// [`crate::initial::InitialConditions::from_type_code`] — constructing
    /// [`crate::initial::InitialConditions`] directly is statically
    /// exhaustive over {Launch, InFlight}.
    #[error("invalid initial condition type code: {0} (expected 0 or 1)")]
    InvalidInitialType(i32),

    /// `r_xy x v_xy` vanished (polar launch with zero horizontal velocity).
    /// The orchestrator's hot path never raises this — it always falls back
    /// to the tie-break axis via [`crate::frames::navball_frame`]. This
    /// variant exists for [`crate::frames::checked_navball_frame`], for
    /// callers that want to detect the degenerate case explicitly.
    #[error("degenerate navball frame: r_xy x v_xy == 0 at r={r:?}, v={v:?}")]
    DegenerateFrame { r: Vector3<f64>, v: Vector3<f64> },

    #[error("invalid vehicle parameters: {0}")]
    InvalidVehicleParams(String),

    #[error("empty lookup table passed to approx_from_curve")]
    EmptyCurve,
}
