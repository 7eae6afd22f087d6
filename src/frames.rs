//! Vector/frame utilities (C1): the navball and circumferential (RNC) local
//! frames, rebuilt every step from the current `(r, v)`.

use nalgebra::Vector3;

use crate::errors::SimError;

/// `v/|v|` if `|v| > 0`, else `v` unchanged (never panics on a zero vector).
pub fn unit(v: Vector3<f64>) -> Vector3<f64> {
    let n = v.norm();
    if n > 0.0 {
        v / n
    } else {
        v
    }
}

/// Right-handed local basis: radial up, geographic-ish north, east.
///
/// Rows are named rather than stored as a raw 3x3 matrix so that callers
/// read `nav.up`, `nav.east`, etc. instead of indexing into a matrix whose
/// row order has to be remembered.
#[derive(Debug, Clone, Copy)]
pub struct NavballFrame {
    pub up: Vector3<f64>,
    pub north: Vector3<f64>,
    pub east: Vector3<f64>,
}

/// Circumferential frame: radial / orbit-normal / circumferential (prograde
/// in-plane direction).
#[derive(Debug, Clone, Copy)]
pub struct RncFrame {
    pub radial: Vector3<f64>,
    pub normal: Vector3<f64>,
    pub circum: Vector3<f64>,
}

/// Tie-break axis used whenever `r_xy x v_xy` is too small to normalize
/// (polar launch, or any instant with zero horizontal velocity). See the
/// open question in SPEC_FULL.md section 9: resolved to ECI +x.
const POLE_TIE_BREAK: Vector3<f64> = Vector3::new(1.0, 0.0, 0.0);
const DEGENERACY_EPS: f64 = 1e-9;

fn horizontal(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v.x, v.y, 0.0)
}

/// Horizontal component of the tie-break axis, Gram-Schmidt'd against
/// `up` so it's always a valid (unit, perpendicular-to-`up`) substitute
/// for a horizontal reference direction — used whenever `r_xy` itself is
/// too small to normalize (the literal pole), not just when `r_xy x v_xy`
/// is degenerate. Falls back to ECI +y if `up` happens to line up with
/// the +x tie-break axis too.
fn tie_break_horizontal(up: Vector3<f64>) -> Vector3<f64> {
    let candidate = POLE_TIE_BREAK - up * POLE_TIE_BREAK.dot(&up);
    if candidate.norm() > DEGENERACY_EPS {
        unit(candidate)
    } else {
        unit(Vector3::new(0.0, 1.0, 0.0) - up * up.y)
    }
}

/// Build the navball frame from `(r, v)`, silently falling back to the
/// tie-break axis when `r_xy x v_xy` is degenerate — which covers both a
/// true polar position (`r_xy` itself is zero) and a non-polar position
/// with purely vertical velocity (`v_xy` is zero, e.g. vertical liftoff).
pub fn navball_frame(r: &Vector3<f64>, v: &Vector3<f64>) -> NavballFrame {
    let up = unit(*r);
    let r_xy = horizontal(r);
    let v_xy = horizontal(v);
    let cross = r_xy.cross(&v_xy);

    let east = if cross.norm() > DEGENERACY_EPS {
        let pseudo_north = unit(cross);
        unit(pseudo_north.cross(&unit(r_xy)))
    } else {
        // Either `r_xy` or `v_xy` vanished, so there's no velocity heading
        // to derive `east` from at all — `r_xy_hat` would itself be the
        // zero vector at the literal pole, which is exactly the bug this
        // branch exists to avoid. Fall back directly to a horizontal
        // reference axis instead of routing through `r_xy_hat`.
        tie_break_horizontal(up)
    };
    let north = up.cross(&east);

    NavballFrame { up, north, east }
}

/// Same as [`navball_frame`] but returns an error instead of silently
/// tie-breaking when the frame is degenerate. Useful for callers (and
/// tests) that want to detect the polar/zero-horizontal-velocity case
/// explicitly rather than rely on the orchestrator's always-on fallback.
pub fn checked_navball_frame(r: &Vector3<f64>, v: &Vector3<f64>) -> Result<NavballFrame, SimError> {
    let r_xy = horizontal(r);
    let v_xy = horizontal(v);
    if r_xy.cross(&v_xy).norm() <= DEGENERACY_EPS {
        return Err(SimError::DegenerateFrame { r: *r, v: *v });
    }
    Ok(navball_frame(r, v))
}

/// Build the circumferential (RNC) frame from `(r, v)`.
pub fn circum_frame(r: &Vector3<f64>, v: &Vector3<f64>) -> RncFrame {
    let radial = unit(*r);
    let normal = unit(r.cross(v));
    let circum = normal.cross(&radial);
    RncFrame {
        radial,
        normal,
        circum,
    }
}

/// Construct a unit thrust direction from a local frame and pitch/yaw
/// commands (degrees). Pitch 0 = straight up/radial (`row1`); yaw 0 = due
/// east/circumferential (`row3`); yaw 90 = due north (`row2`).
pub fn make_vector(row1: Vector3<f64>, row2: Vector3<f64>, row3: Vector3<f64>, pitch_deg: f64, yaw_deg: f64) -> Vector3<f64> {
    let p = pitch_deg.to_radians();
    let y = yaw_deg.to_radians();
    row1 * p.cos() + row2 * (p.sin() * y.sin()) + row3 * (p.sin() * y.cos())
}

impl NavballFrame {
    /// Thrust direction built directly from this frame's rows.
    pub fn make_vector(&self, pitch_deg: f64, yaw_deg: f64) -> Vector3<f64> {
        make_vector(self.up, self.north, self.east, pitch_deg, yaw_deg)
    }

    /// Dot product rotating an RNC-frame circumferential command into this
    /// navball frame's east row, per the Design Notes in SPEC_FULL.md.
    pub fn rnc_to_east_rotation(&self, rnc: &RncFrame) -> f64 {
        rnc.circum.dot(&self.east)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_orthonormal(rows: [Vector3<f64>; 3]) {
        for row in &rows {
            assert_abs_diff_eq!(row.norm(), 1.0, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(rows[0].dot(&rows[1]), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rows[1].dot(&rows[2]), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rows[0].dot(&rows[2]), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn navball_frame_is_orthonormal() {
        let r = Vector3::new(6_471_000.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 7_800.0, 1_200.0);
        let nav = navball_frame(&r, &v);
        assert_orthonormal([nav.up, nav.north, nav.east]);
    }

    #[test]
    fn circum_frame_is_orthonormal() {
        let r = Vector3::new(6_471_000.0, 1_000_000.0, 200_000.0);
        let v = Vector3::new(-500.0, 7_800.0, 900.0);
        let rnc = circum_frame(&r, &v);
        assert_orthonormal([rnc.radial, rnc.normal, rnc.circum]);
    }

    #[test]
    fn degenerate_frame_falls_back_to_tie_break() {
        // Straight over the pole with purely vertical velocity: r_xy x v_xy = 0.
        let r = Vector3::new(0.0, 0.0, 6_471_000.0);
        let v = Vector3::new(0.0, 0.0, 100.0);
        let nav = navball_frame(&r, &v);
        assert!(nav.up.iter().all(|c| c.is_finite()));
        assert!(nav.north.iter().all(|c| c.is_finite()));
        assert!(nav.east.iter().all(|c| c.is_finite()));
        assert_orthonormal([nav.up, nav.north, nav.east]);
    }

    #[test]
    fn vertical_liftoff_on_the_tie_break_meridian_is_orthonormal() {
        // Pure-radial velocity at the longitude the tie-break axis itself
        // points along: r_xy and v_xy are both non-zero but parallel, so
        // r_xy x v_xy is still degenerate and `east` can't be derived from
        // `pseudo_north x r_xy_hat` (both would collapse onto the same
        // axis). This is the common gravity-turn-liftoff case, not just
        // the literal pole.
        let r = Vector3::new(6_471_000.0, 0.0, 0.0);
        let v = Vector3::new(50.0, 0.0, 0.0);
        let nav = navball_frame(&r, &v);
        assert!(nav.east.iter().all(|c| c.is_finite()));
        assert_orthonormal([nav.up, nav.north, nav.east]);
    }

    #[test]
    fn checked_navball_frame_reports_degeneracy() {
        let r = Vector3::new(0.0, 0.0, 6_471_000.0);
        let v = Vector3::new(0.0, 0.0, 100.0);
        assert!(checked_navball_frame(&r, &v).is_err());

        let r2 = Vector3::new(6_471_000.0, 0.0, 0.0);
        let v2 = Vector3::new(0.0, 7_800.0, 0.0);
        assert!(checked_navball_frame(&r2, &v2).is_ok());
    }

    #[test]
    fn pitch_zero_yaw_zero_is_radial() {
        let up = Vector3::new(1.0, 0.0, 0.0);
        let north = Vector3::new(0.0, 0.0, 1.0);
        let east = Vector3::new(0.0, 1.0, 0.0);
        let dir = make_vector(up, north, east, 0.0, 0.0);
        assert_abs_diff_eq!((dir - up).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn pitch_90_yaw_zero_is_east() {
        let up = Vector3::new(1.0, 0.0, 0.0);
        let north = Vector3::new(0.0, 0.0, 1.0);
        let east = Vector3::new(0.0, 1.0, 0.0);
        let dir = make_vector(up, north, east, 90.0, 0.0);
        assert_abs_diff_eq!((dir - east).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn pitch_90_yaw_90_is_north() {
        let up = Vector3::new(1.0, 0.0, 0.0);
        let north = Vector3::new(0.0, 0.0, 1.0);
        let east = Vector3::new(0.0, 1.0, 0.0);
        let dir = make_vector(up, north, east, 90.0, 90.0);
        assert_abs_diff_eq!((dir - north).norm(), 0.0, epsilon = 1e-9);
    }
}
