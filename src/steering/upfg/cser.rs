//! Conic state extrapolation: propagates a two-body state `(r, v)` forward
//! by `dt` seconds using the universal-variable formulation of Kepler's
//! equation, so UPFG can predict where the vehicle would end up under
//! gravity alone. The cached `{dtcp, xcp, a, d, e}` record seeds the next
//! Newton solve from the previous converged universal anomaly, since
//! consecutive major cycles ask for nearly the same `dt`.

use nalgebra::Vector3;

/// Cached conic-propagation state, reused across consecutive calls that
/// extrapolate by a similar `dt` so the Newton solve below converges in a
/// couple of iterations instead of starting cold.
#[derive(Debug, Clone, Copy, Default)]
pub struct CserState {
    /// `dt` the cached solution was converged for.
    pub dtcp: f64,
    /// Converged universal anomaly.
    pub xcp: f64,
    /// Reciprocal semi-major axis (`alpha`) at the last solve.
    pub a: f64,
    /// Lagrange coefficient `f` at the last solve.
    pub d: f64,
    /// Lagrange coefficient `g` at the last solve.
    pub e: f64,
}

fn stumpff_c(z: f64) -> f64 {
    if z > 1e-8 {
        let sz = z.sqrt();
        (1.0 - sz.cos()) / z
    } else if z < -1e-8 {
        let sz = (-z).sqrt();
        (sz.cosh() - 1.0) / (-z)
    } else {
        0.5
    }
}

fn stumpff_s(z: f64) -> f64 {
    if z > 1e-8 {
        let sz = z.sqrt();
        (sz - sz.sin()) / (z * sz)
    } else if z < -1e-8 {
        let sz = (-z).sqrt();
        (sz.sinh() - sz) / ((-z) * sz)
    } else {
        1.0 / 6.0
    }
}

/// Propagate `(r0, v0)` by `dt` under two-body gravity (parameter `mu`),
/// returning the extrapolated `(r, v)`. Updates `cached` in place.
pub fn conic_state_extrapolation(
    mu: f64,
    r0: Vector3<f64>,
    v0: Vector3<f64>,
    dt: f64,
    cached: &mut CserState,
) -> (Vector3<f64>, Vector3<f64>) {
    let r0mag = r0.norm();
    let v0mag = v0.norm();
    let vr0 = r0.dot(&v0) / r0mag;
    let sqrt_mu = mu.sqrt();
    let alpha = 2.0 / r0mag - v0mag * v0mag / mu;

    let mut x = if (cached.dtcp - dt).abs() < 1.0 && cached.xcp != 0.0 {
        cached.xcp
    } else {
        sqrt_mu * alpha * dt
    };

    for _ in 0..50 {
        let z = alpha * x * x;
        let c = stumpff_c(z);
        let s = stumpff_s(z);

        let f = r0mag * vr0 / sqrt_mu * x * x * c + (1.0 - alpha * r0mag) * x.powi(3) * s
            + r0mag * x
            - sqrt_mu * dt;
        let df = r0mag * vr0 / sqrt_mu * x * (1.0 - alpha * x * x * s)
            + (1.0 - alpha * r0mag) * x * x * c
            + r0mag;

        if df.abs() < 1e-12 {
            break;
        }
        let dx = f / df;
        x -= dx;
        if dx.abs() < 1e-8 {
            break;
        }
    }

    let z = alpha * x * x;
    let c = stumpff_c(z);
    let s = stumpff_s(z);

    let f = 1.0 - x * x / r0mag * c;
    let g = dt - x.powi(3) / sqrt_mu * s;
    let r = r0 * f + v0 * g;
    let rmag = r.norm();

    let gdot = 1.0 - x * x / rmag * c;
    let fdot = sqrt_mu / (rmag * r0mag) * x * (z * s - 1.0);
    let v = r0 * fdot + v0 * gdot;

    *cached = CserState {
        dtcp: dt,
        xcp: x,
        a: alpha,
        d: f,
        e: g,
    };

    (r, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MU_EARTH;
    use approx::assert_abs_diff_eq;

    #[test]
    fn propagating_a_circular_orbit_preserves_radius() {
        let r0 = Vector3::new(6_771_000.0, 0.0, 0.0);
        let speed = (MU_EARTH / r0.norm()).sqrt();
        let v0 = Vector3::new(0.0, speed, 0.0);
        let mut cached = CserState::default();
        let (r, v) = conic_state_extrapolation(MU_EARTH, r0, v0, 600.0, &mut cached);
        assert_abs_diff_eq!(r.norm(), r0.norm(), epsilon = 1.0);
        assert_abs_diff_eq!(v.norm(), speed, epsilon = 1e-3);
    }

    #[test]
    fn propagating_zero_time_is_identity() {
        let r0 = Vector3::new(6_771_000.0, 100_000.0, 0.0);
        let v0 = Vector3::new(-100.0, 7_500.0, 50.0);
        let mut cached = CserState::default();
        let (r, v) = conic_state_extrapolation(MU_EARTH, r0, v0, 0.0, &mut cached);
        assert_abs_diff_eq!((r - r0).norm(), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!((v - v0).norm(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn cached_state_seeds_a_nearby_solve() {
        let r0 = Vector3::new(6_771_000.0, 0.0, 0.0);
        let speed = (MU_EARTH / r0.norm()).sqrt();
        let v0 = Vector3::new(0.0, speed, 0.0);
        let mut cached = CserState::default();
        conic_state_extrapolation(MU_EARTH, r0, v0, 600.0, &mut cached);
        assert_eq!(cached.dtcp, 600.0);
        let (r2, _) = conic_state_extrapolation(MU_EARTH, r0, v0, 601.0, &mut cached);
        assert!(r2.norm().is_finite());
    }
}
