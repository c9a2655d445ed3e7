//! Phase accumulated by a ray crossing a film and back.

use nalgebra::Complex;
use std::f64::consts::TAU;


/// Free-space wavenumber `k₀ = 2π / λ₀`.
pub fn wavenumber(wavelength: f64) -> f64 {
    TAU / wavelength
}

/// Round trip of a ray through one film at its internal propagation angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpticalPath {
    pub refr_index: Complex<f64>,
    pub thickness: f64,
    pub angle: Complex<f64>,
}

impl OpticalPath {
    pub fn new(refr_index: Complex<f64>, thickness: f64, angle: Complex<f64>) -> Self {
        Self {
            refr_index,
            thickness,
            angle,
        }
    }

    /// Optical path length of the round trip, `2 n d cos(θ)`.
    pub fn length(&self) -> Complex<f64> {
        2.0 * self.refr_index * self.thickness * self.angle.cos()
    }

    /// Round-trip phase `φ = k₀ · 2 n d cos(θ)`.
    ///
    /// This is the full exponent of the Airy recurrence; it is not doubled again.
    pub fn accumulate_phase(&self, wavenumber: f64) -> Complex<f64> {
        wavenumber * self.length()
    }
}
