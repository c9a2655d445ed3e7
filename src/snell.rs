//! Generalized Snell's law for complex refractive indices.
//!
//! This module propagates the ray angle through every interface of a planar
//! stack. Angles are complex throughout so that absorbing media and the
//! evanescent regime beyond the critical angle yield finite values instead of
//! NaN.
//!
//! The implementation provides:
//! - Transmitted angle at a single interface via the complex arcsine
//! - A restartable cascade of transmitted angles through an ordered stack
//! - Critical and Brewster angles for real-index interfaces
//!
//! # Mathematical Foundation
//!
//! At every interface the tangential wavevector is conserved:
//! `n_i sin(θ_i) = n_t sin(θ_t)`, so `n sin(θ)` is invariant across the whole
//! stack. Of the two angles sharing a given sine, the transmitted angle is
//! the one describing a forward wave: `n_t cos(θ_t)` has positive imaginary
//! part (decaying under the `n + iκ` absorption convention), or positive real
//! part when it is real to within rounding.

use nalgebra::Complex;
use std::f64::consts::PI;
use std::iter::FusedIterator;

/// Imaginary parts of `n cos(θ)` below this are treated as rounding noise.
pub const FORWARD_EPSILON: f64 = 100.0 * f64::EPSILON;


/// Computes the transmitted angle at a single interface.
///
/// **Context**: Real-valued `asin` returns NaN once `n_i sin(θ_i) / n_t`
/// leaves `[-1, 1]`, which happens past the critical angle and for absorbing
/// media. Total internal reflection and frustrated transmission through thin
/// low-index films are physical, so the transmitted angle is kept complex.
///
/// **How it Works**: Forms `sin(θ_t) = n_i sin(θ_i) / n_t` and takes the
/// principal complex arcsine. If that branch describes a backward or growing
/// wave, the supplementary angle `π - θ_t` is returned instead, which has the
/// same sine. No guard is applied at grazing incidence; the result there is
/// whatever the floating-point arithmetic produces.
///
/// # Example
/// ```rust
/// use num_complex::Complex64;
/// use thinfilm::snell::get_theta_t;
///
/// let theta_t = get_theta_t(Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0), Complex64::new(1.5, 0.0));
/// assert_eq!(theta_t.re, 0.0);
/// ```
pub fn get_theta_t(theta_i: Complex<f64>, n_i: Complex<f64>, n_t: Complex<f64>) -> Complex<f64> {
    if n_i == n_t {
        return theta_i;
    }
    let theta_t = (theta_i.sin() * n_i / n_t).asin();
    if is_forward(n_t, theta_t) {
        theta_t
    } else {
        Complex::new(PI, 0.0) - theta_t
    }
}

/// Whether `theta` in a medium of index `n` describes a forward (decaying or
/// outgoing) wave.
pub fn is_forward(n: Complex<f64>, theta: Complex<f64>) -> bool {
    let ncos = n * theta.cos();
    if ncos.im.abs() > FORWARD_EPSILON {
        ncos.im > 0.0
    } else {
        ncos.re > 0.0
    }
}

/// Ordered transmitted angles through a stack, one per interface.
///
/// Produced by [`cascade`]. Each step feeds the previous transmitted angle
/// back in as the next incidence angle. The iterator borrows the index list
/// read-only and can be cloned to replay the sequence.
#[derive(Debug, Clone)]
pub struct TransmissionAngles<'a> {
    indices: &'a [Complex<f64>],
    theta: Complex<f64>,
    position: usize,
}

impl Iterator for TransmissionAngles<'_> {
    type Item = Complex<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        let n_t = *self.indices.get(self.position + 1)?;
        let n_i = self.indices[self.position];
        self.theta = get_theta_t(self.theta, n_i, n_t);
        self.position += 1;
        Some(self.theta)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.indices.len().saturating_sub(self.position + 1);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TransmissionAngles<'_> {}

impl FusedIterator for TransmissionAngles<'_> {}

/// Applies Snell's law across every interface of `indices`.
///
/// `indices` runs from the cover (incidence medium) to the substrate, and
/// `theta_0` is the incidence angle in the cover. The returned iterator
/// yields `indices.len() - 1` transmitted angles, the last one being the
/// angle in the substrate.
pub fn cascade(theta_0: Complex<f64>, indices: &[Complex<f64>]) -> TransmissionAngles<'_> {
    TransmissionAngles {
        indices,
        theta: theta_0,
        position: 0,
    }
}

/// Critical angle for light passing from `n_i` into `n_t`, if one exists.
pub fn critical_angle(n_i: f64, n_t: f64) -> Option<f64> {
    (n_t < n_i).then(|| (n_t / n_i).asin())
}

/// Brewster angle, where the parallel reflection coefficient vanishes.
pub fn brewster_angle(n_i: f64, n_t: f64) -> f64 {
    (n_t / n_i).atan()
}
