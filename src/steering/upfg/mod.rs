//! Unified Powered Flight Guidance (C5): conic-state extrapolation plus the
//! main guidance solve, split the way the reference keeps them as separate
//! concerns.

pub mod cser;
mod guidance;

pub use guidance::{step, UpfgInternal};
