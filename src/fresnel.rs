//! Fresnel equations for a single planar interface.
//!
//! This module implements the amplitude reflection and transmission
//! coefficients at the boundary between two isotropic media. Both refractive
//! indices and ray angles are complex, so the same formulas cover absorbing
//! media and evanescent transmission beyond the critical angle.
//!
//! The Fresnel calculations provide:
//! - Reflection and transmission coefficients for s and p polarizations
//! - Transmission back through an interface, which differs from transmission into it
//! - Power reflectance and transmittance for energy-balance checks
//! - Diagonal Jones matrix representation for both polarizations at once
//!
//! # Formulation
//!
//! Coefficients are written in terms of the normal wavevector components
//! `n cos(θ)` rather than the `sin(θ_i ± θ_t)` / `tan(θ_i ± θ_t)` forms. The
//! cosine form has no removable singularity at normal incidence or at
//! `θ_i + θ_t = 0`.

use nalgebra::{Complex, Matrix2, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(test)]
mod tests {

    use super::*;
    use crate::snell::get_theta_t;

    fn c(re: f64) -> Complex<f64> {
        Complex::new(re, 0.0)
    }

    fn energy_balance(pol: Polarization, n1: f64, n2: f64, theta_i_deg: f64) -> f64 {
        let theta_i = c(theta_i_deg.to_radians());
        let theta_t = get_theta_t(theta_i, c(n1), c(n2));
        let interface = Interface::new(c(n1), c(n2), theta_i, theta_t);
        interface.reflectance(pol) + interface.transmittance(pol)
    }

    #[test]
    fn energy_conservation_15_degrees() {
        for pol in Polarization::BOTH {
            let energy = energy_balance(pol, 1.0, 1.5, 15.0);
            assert!((energy - 1.0).abs() < 1e-12, "{}: {}", pol, energy);
        }
    }

    #[test]
    fn energy_conservation_below_critical_angle() {
        for pol in Polarization::BOTH {
            for theta in [0.0, 10.0, 30.0, 45.0, 60.0, 75.0, 89.0] {
                let energy = energy_balance(pol, 1.0, 3.8, theta);
                assert!((energy - 1.0).abs() < 1e-12, "{} at {}: {}", pol, theta, energy);
            }
            for theta in [0.0, 20.0, 40.0] {
                let energy = energy_balance(pol, 1.5, 1.0, theta);
                assert!((energy - 1.0).abs() < 1e-12, "{} at {}: {}", pol, theta, energy);
            }
        }
    }

    #[test]
    fn normal_incidence_reflection() {
        let interface = Interface::new(c(1.0), c(1.5), c(0.0), c(0.0));
        let r_s = interface.reflection_into(Polarization::Senkrecht);
        let r_p = interface.reflection_into(Polarization::Parallel);
        assert!((r_s - c(-0.2)).norm() < 1e-15);
        assert!((r_p - c(0.2)).norm() < 1e-15);
        assert!((interface.reflectance(Polarization::Senkrecht) - 0.04).abs() < 1e-15);
    }

    #[test]
    fn parallel_vanishes_at_brewster() {
        let theta_b = crate::snell::brewster_angle(1.0, 1.45);
        let theta_i = c(theta_b);
        let theta_t = get_theta_t(theta_i, c(1.0), c(1.45));
        let r_p = Polarization::Parallel.reflection(c(1.0), c(1.45), theta_i, theta_t);
        assert!(r_p.norm() < 1e-12, "r_p: {}", r_p);
    }

    #[test]
    fn total_internal_reflection_is_unit_magnitude() {
        let theta_i = c(60.0_f64.to_radians());
        let theta_t = get_theta_t(theta_i, c(1.5), c(1.0));
        for pol in Polarization::BOTH {
            let r = pol.reflection(c(1.5), c(1.0), theta_i, theta_t);
            assert!((r.norm() - 1.0).abs() < 1e-12, "{}: {}", pol, r);
        }
    }

    #[test]
    fn transmission_back_differs_from_into() {
        let theta_i = c(40.0_f64.to_radians());
        let theta_t = get_theta_t(theta_i, c(1.0), c(2.0));
        let interface = Interface::new(c(1.0), c(2.0), theta_i, theta_t);
        for pol in Polarization::BOTH {
            let t_into = interface.transmission_into(pol);
            let t_back = interface.transmission_back(pol);
            assert!((t_into - t_back).norm() > 1e-3);
            // Stokes relation: t t' = 1 - r^2
            let r = interface.reflection_into(pol);
            assert!((t_into * t_back - (c(1.0) - r * r)).norm() < 1e-12);
        }
    }

    #[test]
    fn jones_matrices_hold_both_polarizations() {
        let theta_i = c(0.5);
        let theta_t = get_theta_t(theta_i, c(1.0), c(1.5));
        let interface = Interface::new(c(1.0), c(1.5), theta_i, theta_t);
        let r = refl(c(1.0), c(1.5), theta_i, theta_t);
        let t = refr(c(1.0), c(1.5), theta_i, theta_t);
        assert_eq!(r[(0, 0)], interface.reflection_into(Polarization::Parallel));
        assert_eq!(r[(1, 1)], interface.reflection_into(Polarization::Senkrecht));
        assert_eq!(t[(0, 0)], interface.transmission_into(Polarization::Parallel));
        assert_eq!(t[(1, 1)], interface.transmission_into(Polarization::Senkrecht));
        assert_eq!(r[(0, 1)], c(0.0));
    }
}

/// Linear polarization state relative to the plane of incidence.
///
/// Linear optics of isotropic media admits exactly these two eigenstates, so
/// the coefficient formulas are dispatched with a `match` rather than through
/// a trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarization {
    /// Electric field perpendicular to the plane of incidence (s, TE)
    Senkrecht,
    /// Electric field within the plane of incidence (p, TM)
    Parallel,
}

impl Polarization {
    pub const BOTH: [Polarization; 2] = [Polarization::Senkrecht, Polarization::Parallel];

    /// Amplitude reflection coefficient for light travelling from `n_i` into `n_t`.
    ///
    /// - s: `(n_i cosθ_i − n_t cosθ_t) / (n_i cosθ_i + n_t cosθ_t)`
    /// - p: `(n_t cosθ_i − n_i cosθ_t) / (n_t cosθ_i + n_i cosθ_t)`
    pub fn reflection(
        self,
        n_i: Complex<f64>,
        n_t: Complex<f64>,
        theta_i: Complex<f64>,
        theta_t: Complex<f64>,
    ) -> Complex<f64> {
        let cti = theta_i.cos();
        let ctt = theta_t.cos();
        match self {
            Polarization::Senkrecht => (n_i * cti - n_t * ctt) / (n_i * cti + n_t * ctt),
            Polarization::Parallel => (n_t * cti - n_i * ctt) / (n_t * cti + n_i * ctt),
        }
    }

    /// Amplitude transmission coefficient for light travelling from `n_i` into `n_t`.
    ///
    /// For transmission back through the same interface swap both the indices
    /// and the angles; the result is not the same coefficient.
    pub fn transmission(
        self,
        n_i: Complex<f64>,
        n_t: Complex<f64>,
        theta_i: Complex<f64>,
        theta_t: Complex<f64>,
    ) -> Complex<f64> {
        let cti = theta_i.cos();
        let ctt = theta_t.cos();
        match self {
            Polarization::Senkrecht => (2.0 * n_i * cti) / (n_i * cti + n_t * ctt),
            Polarization::Parallel => (2.0 * n_i * cti) / (n_t * cti + n_i * ctt),
        }
    }
}

impl fmt::Display for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarization::Senkrecht => write!(f, "s"),
            Polarization::Parallel => write!(f, "p"),
        }
    }
}

/// A planar boundary between two media, seen from the incidence side.
///
/// **Context**: The stack combiner needs three coefficients per boundary:
/// reflection into the boundary, transmission into the lower medium and
/// transmission back out of it. Keeping the indices and angles together
/// guarantees the back-transmission uses exactly the swapped arguments.
///
/// **How it Works**: Stores `(n_i, n_t, θ_i, θ_t)` by value and evaluates
/// the [`Polarization`] formulas on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interface {
    pub n_i: Complex<f64>,
    pub n_t: Complex<f64>,
    pub theta_i: Complex<f64>,
    pub theta_t: Complex<f64>,
}

impl Interface {
    pub fn new(
        n_i: Complex<f64>,
        n_t: Complex<f64>,
        theta_i: Complex<f64>,
        theta_t: Complex<f64>,
    ) -> Self {
        Self {
            n_i,
            n_t,
            theta_i,
            theta_t,
        }
    }

    pub fn reflection_into(&self, pol: Polarization) -> Complex<f64> {
        pol.reflection(self.n_i, self.n_t, self.theta_i, self.theta_t)
    }

    pub fn transmission_into(&self, pol: Polarization) -> Complex<f64> {
        pol.transmission(self.n_i, self.n_t, self.theta_i, self.theta_t)
    }

    pub fn transmission_back(&self, pol: Polarization) -> Complex<f64> {
        pol.transmission(self.n_t, self.n_i, self.theta_t, self.theta_i)
    }

    /// Power reflectance `|r|²`.
    pub fn reflectance(&self, pol: Polarization) -> f64 {
        self.reflection_into(pol).norm_sqr()
    }

    /// Power transmittance `|t|² · Re(n_t cosθ_t) / Re(n_i cosθ_i)`.
    ///
    /// Exact for lossless media; beyond the critical angle the real part of
    /// `n_t cosθ_t` vanishes and so does the transmitted power.
    pub fn transmittance(&self, pol: Polarization) -> f64 {
        let flux_t = (self.n_t * self.theta_t.cos()).re;
        let flux_i = (self.n_i * self.theta_i.cos()).re;
        self.transmission_into(pol).norm_sqr() * flux_t / flux_i
    }
}

/// Computes Fresnel reflection coefficients for both polarizations.
///
/// Returns the diagonal Jones matrix `diag(r_p, r_s)`, ready to multiply a
/// field amplitude vector ordered (parallel, perpendicular).
///
/// # Example
/// ```rust
/// use num_complex::Complex64;
/// use thinfilm::fresnel;
///
/// let one = Complex64::new(1.0, 0.0);
/// let glass = Complex64::new(1.5, 0.0);
/// let zero = Complex64::new(0.0, 0.0);
/// let jones = fresnel::refl(one, glass, zero, zero);
/// assert!((jones[(0, 0)].re - 0.2).abs() < 1e-12);
/// ```
pub fn refl(
    n1: Complex<f64>,
    n2: Complex<f64>,
    theta_i: Complex<f64>,
    theta_t: Complex<f64>,
) -> Matrix2<Complex<f64>> {
    let f11 = Polarization::Parallel.reflection(n1, n2, theta_i, theta_t);
    let f22 = Polarization::Senkrecht.reflection(n1, n2, theta_i, theta_t);
    Matrix2::from_diagonal(&Vector2::new(f11, f22))
}

/// Computes Fresnel transmission coefficients for both polarizations.
///
/// Returns the diagonal Jones matrix `diag(t_p, t_s)`.
pub fn refr(
    n1: Complex<f64>,
    n2: Complex<f64>,
    theta_i: Complex<f64>,
    theta_t: Complex<f64>,
) -> Matrix2<Complex<f64>> {
    let f11 = Polarization::Parallel.transmission(n1, n2, theta_i, theta_t);
    let f22 = Polarization::Senkrecht.transmission(n1, n2, theta_i, theta_t);
    Matrix2::from_diagonal(&Vector2::new(f11, f22))
}
