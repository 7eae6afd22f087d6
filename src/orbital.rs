//! Keplerian orbital elements (section 5's `Orbit` output): conversion
//! to/from ECI state vectors, adapted from the teacher's orbital module with
//! field names matching SPEC_FULL.md's glossary (SMA/ECC/INC/LAN/AOP/TAN).

use nalgebra::Vector3;

use crate::context::MU_EARTH;

/// Classical Keplerian orbital elements (angles in radians).
#[derive(Debug, Clone, Copy)]
pub struct KeplerianElements {
    /// Semi-major axis, m.
    pub sma: f64,
    /// Eccentricity (0 = circular).
    pub ecc: f64,
    /// Inclination, rad.
    pub inc: f64,
    /// Longitude/right ascension of ascending node, rad.
    pub lan: f64,
    /// Argument of periapsis, rad.
    pub aop: f64,
    /// True anomaly, rad.
    pub tan: f64,
}

impl KeplerianElements {
    /// Convert to an ECI state vector using Earth's `mu`.
    pub fn to_state_vector(&self) -> (Vector3<f64>, Vector3<f64>) {
        self.to_state_vector_mu(MU_EARTH)
    }

    pub fn to_state_vector_mu(&self, mu: f64) -> (Vector3<f64>, Vector3<f64>) {
        let p = self.sma * (1.0 - self.ecc * self.ecc);
        let r_pqw = p / (1.0 + self.ecc * self.tan.cos());

        let r_pqw_vec = Vector3::new(r_pqw * self.tan.cos(), r_pqw * self.tan.sin(), 0.0);

        let sqrt_mu_p = (mu / p).sqrt();
        let v_pqw_vec = Vector3::new(
            -sqrt_mu_p * self.tan.sin(),
            sqrt_mu_p * (self.ecc + self.tan.cos()),
            0.0,
        );

        let cos_lan = self.lan.cos();
        let sin_lan = self.lan.sin();
        let cos_aop = self.aop.cos();
        let sin_aop = self.aop.sin();
        let cos_inc = self.inc.cos();
        let sin_inc = self.inc.sin();

        let rot = |v: &Vector3<f64>| -> Vector3<f64> {
            Vector3::new(
                (cos_lan * cos_aop - sin_lan * sin_aop * cos_inc) * v.x
                    + (-cos_lan * sin_aop - sin_lan * cos_aop * cos_inc) * v.y,
                (sin_lan * cos_aop + cos_lan * sin_aop * cos_inc) * v.x
                    + (-sin_lan * sin_aop + cos_lan * cos_aop * cos_inc) * v.y,
                (sin_aop * sin_inc) * v.x + (cos_aop * sin_inc) * v.y,
            )
        };

        (rot(&r_pqw_vec), rot(&v_pqw_vec))
    }

    /// Convert an ECI state vector to Keplerian elements, using Earth's `mu`.
    pub fn from_state_vector(pos: &Vector3<f64>, vel: &Vector3<f64>) -> Self {
        Self::from_state_vector_mu(pos, vel, MU_EARTH)
    }

    pub fn from_state_vector_mu(pos: &Vector3<f64>, vel: &Vector3<f64>, mu: f64) -> Self {
        let r = pos.norm();
        let v = vel.norm();

        let h = pos.cross(vel);
        let h_mag = h.norm();

        let n = Vector3::new(-h.y, h.x, 0.0);
        let n_mag = n.norm();

        let e_vec = ((v * v - mu / r) * pos - pos.dot(vel) * vel) / mu;
        let ecc = e_vec.norm();

        let energy = 0.5 * v * v - mu / r;
        let sma = if ecc.abs() < 1.0 - 1e-10 {
            -mu / (2.0 * energy)
        } else {
            h_mag * h_mag / (mu * (1.0 - ecc * ecc).abs())
        };

        let inc = (h.z / h_mag).clamp(-1.0, 1.0).acos();

        let lan = if n_mag > 1e-10 {
            let raw = (n.x / n_mag).clamp(-1.0, 1.0).acos();
            if n.y < 0.0 {
                2.0 * std::f64::consts::PI - raw
            } else {
                raw
            }
        } else {
            0.0
        };

        let aop = if n_mag > 1e-10 && ecc > 1e-10 {
            let cos_aop = (n.dot(&e_vec) / (n_mag * ecc)).clamp(-1.0, 1.0);
            let w = cos_aop.acos();
            if e_vec.z < 0.0 {
                2.0 * std::f64::consts::PI - w
            } else {
                w
            }
        } else {
            0.0
        };

        let tan = if ecc > 1e-10 {
            let cos_nu = (e_vec.dot(pos) / (ecc * r)).clamp(-1.0, 1.0);
            let nu = cos_nu.acos();
            if pos.dot(vel) < 0.0 {
                2.0 * std::f64::consts::PI - nu
            } else {
                nu
            }
        } else {
            0.0
        };

        KeplerianElements {
            sma,
            ecc,
            inc,
            lan,
            aop,
            tan,
        }
    }

    /// Orbital period for an elliptical orbit, s.
    pub fn period(&self) -> f64 {
        self.period_mu(MU_EARTH)
    }

    pub fn period_mu(&self, mu: f64) -> f64 {
        2.0 * std::f64::consts::PI * (self.sma.powi(3) / mu).sqrt()
    }

    /// Apoapsis radius, m (`sma * (1 + ecc)`).
    pub fn apoapsis_radius_m(&self) -> f64 {
        self.sma * (1.0 + self.ecc)
    }

    /// Periapsis radius, m (`sma * (1 - ecc)`).
    pub fn periapsis_radius_m(&self) -> f64 {
        self.sma * (1.0 - self.ecc)
    }

    /// A circular orbit at the given altitude above Earth's equatorial
    /// radius and inclination.
    pub fn circular(altitude_m: f64, inc_rad: f64) -> Self {
        KeplerianElements {
            sma: crate::context::R_EARTH + altitude_m,
            ecc: 0.0,
            inc: inc_rad,
            lan: 0.0,
            aop: 0.0,
            tan: 0.0,
        }
    }
}
