//! Environment model (C2): interpolated atmosphere plus Earth's
//! surface-rotation velocity. The tabulated data itself (real
//! pressure/temperature/drag curves) is an out-of-scope external provider;
//! [`standard_atmosphere_curves`] exists only so this crate is runnable and
//! testable standalone, sampling the same ISA 1976 model the teacher crate
//! used for its own atmosphere module.

use nalgebra::Vector3;

use crate::curve::Curve;
use crate::frames::{navball_frame, NavballFrame};

const R_AIR: f64 = 287.052_87; // specific gas constant for dry air, J/(kg*K)
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Ideal-gas density from pressure (Pa) and temperature (K).
pub fn air_density(pressure_pa: f64, temperature_k: f64) -> f64 {
    if temperature_k <= 0.0 {
        return 0.0;
    }
    pressure_pa / (R_AIR * temperature_k)
}

/// Earth's surface-rotation velocity at the vehicle's latitude, expressed
/// along the navball frame's `east` row. Magnitude `2*pi*R*cos(lat)/86400`.
pub fn surface_speed(r: &Vector3<f64>, nav: &NavballFrame, r_body: f64) -> Vector3<f64> {
    let lat = (r.z / r.norm()).clamp(-1.0, 1.0).asin();
    let mag = 2.0 * std::f64::consts::PI * r_body * lat.cos() / SECONDS_PER_DAY;
    nav.east * mag
}

/// Same as [`surface_speed`] but for a position with no velocity yet
/// (pre-launch): builds a stand-in frame from a dummy tangent obtained by
/// rotating `r` 90 degrees CCW about the z axis, then calling
/// [`navball_frame`] as usual. Only valid away from the poles — see
/// SPEC_FULL.md section 9.
pub fn surface_speed_init(r: &Vector3<f64>, r_body: f64) -> Vector3<f64> {
    let dummy_tangent = Vector3::new(-r.y, r.x, 0.0);
    let nav = navball_frame(r, &dummy_tangent);
    surface_speed(r, &nav, r_body)
}

/// ISA 1976 standard atmosphere, sampled every kilometer from 0 to 100 km,
/// stored as (pressure ratio p/p0, temperature K) curves vs. altitude (km).
/// This is the bundled default for [`crate::context::SimContext::earth`];
/// a real deployment supplies its own tables from its vehicle database.
pub fn standard_atmosphere_curves() -> (Curve, Curve) {
    let mut pressure_pts = Vec::with_capacity(101);
    let mut temperature_pts = Vec::with_capacity(101);
    for km in 0..=100 {
        let alt_m = km as f64 * 1000.0;
        let (p_ratio, t_k) = isa_sample(alt_m);
        pressure_pts.push((km as f64, p_ratio));
        temperature_pts.push((km as f64, t_k));
    }
    (Curve::new(pressure_pts), Curve::new(temperature_pts))
}

/// ISA 1976 piecewise temperature/pressure profile, 0-86 km, extended with
/// an exponential tail above. Returns (pressure ratio to sea level, K).
fn isa_sample(altitude_m: f64) -> (f64, f64) {
    const G0: f64 = 9.80665;
    const T0: f64 = 288.15;
    const P0: f64 = 101_325.0;

    let h = altitude_m.max(0.0);

    let (temperature, pressure) = if h < 11_000.0 {
        gradient_layer(h, 0.0, T0, -0.0065, P0)
    } else if h < 20_000.0 {
        isothermal_layer(h, 11_000.0, 216.65, 22_632.1)
    } else if h < 32_000.0 {
        gradient_layer(h, 20_000.0, 216.65, 0.001, 5_474.89)
    } else if h < 47_000.0 {
        gradient_layer(h, 32_000.0, 228.65, 0.0028, 868.019)
    } else if h < 51_000.0 {
        isothermal_layer(h, 47_000.0, 270.65, 110.906)
    } else if h < 71_000.0 {
        gradient_layer(h, 51_000.0, 270.65, -0.0028, 66.9389)
    } else if h < 86_000.0 {
        gradient_layer(h, 71_000.0, 214.65, -0.002, 3.956_42)
    } else {
        let t = 186.87;
        let p = 0.3734 * (-0.000_15 * (h - 86_000.0)).exp();
        (t, p.max(0.0))
    };

    (pressure / P0, temperature)
}

fn gradient_layer(h: f64, h_base: f64, t_base: f64, lapse: f64, p_base: f64) -> (f64, f64) {
    const G0: f64 = 9.80665;
    let t = t_base + lapse * (h - h_base);
    let p = p_base * (t / t_base).powf(-G0 / (lapse * R_AIR));
    (t, p)
}

fn isothermal_layer(h: f64, h_base: f64, t: f64, p_base: f64) -> (f64, f64) {
    const G0: f64 = 9.80665;
    let p = p_base * ((-G0 / (R_AIR * t)) * (h - h_base)).exp();
    (t, p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::R_EARTH;
    use approx::assert_abs_diff_eq;

    #[test]
    fn density_matches_ideal_gas_at_sea_level() {
        let rho = air_density(101_325.0, 288.15);
        assert_abs_diff_eq!(rho, 1.225, epsilon = 0.001);
    }

    #[test]
    fn zero_temperature_gives_zero_density() {
        assert_eq!(air_density(101_325.0, 0.0), 0.0);
    }

    #[test]
    fn surface_speed_matches_formula_at_equator() {
        let r = Vector3::new(R_EARTH, 0.0, 0.0);
        let v = Vector3::new(0.0, 100.0, 0.0);
        let nav = navball_frame(&r, &v);
        let speed = surface_speed(&r, &nav, R_EARTH);
        let expected = 2.0 * std::f64::consts::PI * R_EARTH / SECONDS_PER_DAY;
        assert_abs_diff_eq!(speed.norm(), expected, epsilon = 1e-6);
    }

    #[test]
    fn surface_speed_vanishes_at_pole() {
        let r = Vector3::new(0.0, 0.0, R_EARTH);
        let speed = surface_speed_init(&r, R_EARTH);
        assert_abs_diff_eq!(speed.norm(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn surface_speed_scales_with_cos_latitude() {
        let r_equator = Vector3::new(R_EARTH, 0.0, 0.0);
        let lat_45 = 45.0_f64.to_radians();
        let r_45 = Vector3::new(R_EARTH * lat_45.cos(), 0.0, R_EARTH * lat_45.sin());

        let v_eq = surface_speed_init(&r_equator, R_EARTH).norm();
        let v_45 = surface_speed_init(&r_45, R_EARTH).norm();
        assert_abs_diff_eq!(v_45, v_eq * lat_45.cos(), epsilon = 1e-6);
    }

    #[test]
    fn standard_atmosphere_sea_level_is_standard() {
        let (pressure, temperature) = standard_atmosphere_curves();
        let p0 = crate::curve::approx_from_curve(0.0, &pressure);
        let t0 = crate::curve::approx_from_curve(0.0, &temperature);
        assert_abs_diff_eq!(p0, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(t0, 288.15, epsilon = 0.1);
    }

    #[test]
    fn standard_atmosphere_pressure_decreases_with_altitude() {
        let (pressure, _) = standard_atmosphere_curves();
        let p0 = crate::curve::approx_from_curve(0.0, &pressure);
        let p50 = crate::curve::approx_from_curve(50.0, &pressure);
        assert!(p50 < p0);
    }
}
