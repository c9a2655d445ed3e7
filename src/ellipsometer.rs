//! Ellipsometric response of a film stack.
//!
//! This module ties the angle cascade, the Fresnel coefficients and the
//! Airy fold together. For each wavelength (or incidence angle) it computes
//! the composite reflection coefficients of both polarizations and converts
//! their ratio into the ellipsometric angles.
//!
//! The ellipsometer provides:
//! - Composite s and p reflection of a stack at one wavelength
//! - ψ and Δ from the ratio `ρ = r_p / r_s = tan(ψ) e^{iΔ}`
//! - Wavelength sweeps evaluated in parallel across samples
//! - Incidence-angle sweeps at a fixed wavelength
//! - The one-call [`ellipsometry`] entry point over parallel film lists
//!
//! All angles are in radians. Wavelengths and thicknesses share one length
//! unit, whichever the caller chooses.

use nalgebra::{Complex, Matrix2, Vector2};
use ndarray::Array1;
use rayon::prelude::*;
use std::f64::consts::{PI, TAU};

use crate::combine::stack_reflection;
use crate::error::{Error, Result};
use crate::fresnel::Polarization;
use crate::path::{wavenumber, OpticalPath};
use crate::result::{Sweep, SweepAxis};
use crate::snell::{self, FORWARD_EPSILON};
use crate::stack::{RefrIndex, Stack};


/// Composite reflection coefficients of a whole stack at one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflection {
    pub senkrecht: Complex<f64>,
    pub parallel: Complex<f64>,
}

impl Reflection {
    pub fn get(&self, pol: Polarization) -> Complex<f64> {
        match pol {
            Polarization::Senkrecht => self.senkrecht,
            Polarization::Parallel => self.parallel,
        }
    }

    /// `ρ = r_p / r_s`
    pub fn ratio(&self) -> Complex<f64> {
        self.parallel / self.senkrecht
    }

    /// `(ψ, Δ)` of this reflection; NaN when `r_s` is zero (see [`psi_delta`]).
    pub fn psi_delta(&self) -> (f64, f64) {
        psi_delta(self.senkrecht, self.parallel)
    }

    /// Reflection Jones matrix `diag(r_p, r_s)`.
    pub fn jones(&self) -> Matrix2<Complex<f64>> {
        Matrix2::from_diagonal(&Vector2::new(self.parallel, self.senkrecht))
    }
}

/// Converts the two composite reflections into `(ψ, Δ)`.
///
/// `ψ = atan(|r_p / r_s|)` lies in `[0, π/2)` and `Δ = arg(r_p / r_s)` in `(−π, π]`.
/// The ratio is undefined when `r_s` vanishes, for instance at a bare
/// interface between matched media, and both angles are then NaN.
pub fn psi_delta(senkrecht: Complex<f64>, parallel: Complex<f64>) -> (f64, f64) {
    let ratio = parallel / senkrecht;
    let delta = match ratio.arg() {
        delta if delta <= -PI => delta + TAU,
        delta => delta,
    };
    (ratio.norm().atan(), delta)
}

fn check_wavelength(wavelength: f64) -> Result<()> {
    if wavelength.is_finite() && wavelength > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidWavelength(wavelength))
    }
}

/// A stack illuminated at a fixed angle of incidence.
///
/// **Context**: Swept-wavelength measurements evaluate the same stack and
/// angle many times. The ellipsometer borrows the stack read-only so it can
/// be shared across worker threads and reused between sweeps.
///
/// **How it Works**: For each sample, collects the stack's refractive
/// indices, cascades the incidence angle through them, computes each film's
/// round-trip phase and folds both polarizations with the Airy recurrence.
#[derive(Debug, Clone, Copy)]
pub struct Ellipsometer<'a> {
    pub stack: &'a Stack,
    pub incident_angle: f64,
}

impl<'a> Ellipsometer<'a> {
    /// `incident_angle` is the angle of incidence in the cover, in radians.
    pub fn new(stack: &'a Stack, incident_angle: f64) -> Self {
        Self {
            stack,
            incident_angle,
        }
    }

    /// Composite reflection at a single wavelength.
    ///
    /// Tabulated refractive indices must hold exactly one sample.
    pub fn reflection(&self, wavelength: f64) -> Result<Reflection> {
        check_wavelength(wavelength)?;
        self.stack.check_samples(1)?;
        Ok(evaluate(self.stack, self.incident_angle, wavelength, 0))
    }

    pub fn psi_delta(&self, wavelength: f64) -> Result<(f64, f64)> {
        Ok(self.reflection(wavelength)?.psi_delta())
    }

    /// Evaluates every wavelength in `wavelengths`.
    ///
    /// Samples are independent and evaluated in parallel; the result keeps
    /// the input order. Tabulated refractive indices are indexed in lockstep
    /// with `wavelengths`. Either every sample succeeds or the call fails.
    pub fn sweep(&self, wavelengths: &Array1<f64>) -> Result<Sweep> {
        for &wavelength in wavelengths {
            check_wavelength(wavelength)?;
        }
        self.stack.check_samples(wavelengths.len())?;

        tracing::debug!(
            films = self.stack.num_films(),
            samples = wavelengths.len(),
            incident_angle = self.incident_angle,
            "sweeping wavelength"
        );

        let reflections: Vec<Reflection> = wavelengths
            .to_vec()
            .into_par_iter()
            .enumerate()
            .map(|(sample, wavelength)| evaluate(self.stack, self.incident_angle, wavelength, sample))
            .collect();

        Ok(Sweep::from_reflections(
            SweepAxis::Wavelength,
            wavelengths.clone(),
            &reflections,
        ))
    }
}

/// Evaluates both polarizations for one sample of an already validated stack.
fn evaluate(stack: &Stack, incident_angle: f64, wavelength: f64, sample: usize) -> Reflection {
    let refr_indices = stack.refr_indices_at(sample);
    let theta_0 = Complex::new(incident_angle, 0.0);
    let angles: Vec<Complex<f64>> = std::iter::once(theta_0)
        .chain(snell::cascade(theta_0, &refr_indices))
        .collect();

    let k0 = wavenumber(wavelength);
    let phases: Vec<Complex<f64>> = refr_indices[1..]
        .iter()
        .zip(&angles[1..])
        .zip(stack.thicknesses())
        .map(|((&n, &theta), d)| OpticalPath::new(n, d, theta).accumulate_phase(k0))
        .collect();

    let complex_angles = angles.iter().filter(|theta| theta.im.abs() > FORWARD_EPSILON).count();
    if complex_angles > 0 {
        tracing::debug!(wavelength, sample, complex_angles, "evanescent or absorbing layers");
    }
    tracing::trace!(wavelength, sample, "evaluated sample");

    Reflection {
        senkrecht: stack_reflection(Polarization::Senkrecht, &refr_indices, &angles, &phases),
        parallel: stack_reflection(Polarization::Parallel, &refr_indices, &angles, &phases),
    }
}

/// Evaluates a stack at one wavelength over a range of incidence angles.
///
/// Useful for bare-interface reflectance curves around the Brewster and
/// critical angles as well as for full stacks.
pub fn angle_sweep(stack: &Stack, wavelength: f64, incident_angles: &Array1<f64>) -> Result<Sweep> {
    check_wavelength(wavelength)?;
    stack.check_samples(1)?;

    tracing::debug!(
        films = stack.num_films(),
        samples = incident_angles.len(),
        wavelength,
        "sweeping incidence angle"
    );

    let reflections: Vec<Reflection> = incident_angles
        .to_vec()
        .into_par_iter()
        .map(|angle| evaluate(stack, angle, wavelength, 0))
        .collect();

    Ok(Sweep::from_reflections(
        SweepAxis::IncidentAngle,
        incident_angles.clone(),
        &reflections,
    ))
}

/// Computes `(ψ, Δ)` for every wavelength of a film stack.
///
/// `film_refr_indices` and `film_thicknesses` describe the films from the
/// cover side down and must have equal length; an empty pair of lists is the
/// bare substrate. The caller's lists are only read.
///
/// # Example
/// ```rust
/// use ndarray::array;
/// use thinfilm::ellipsometry;
///
/// let wavelengths = array![500.0, 600.0, 700.0];
/// let (psi, delta) = ellipsometry(
///     &wavelengths,
///     65.0_f64.to_radians(),
///     &[3.8.into(), 1.45.into()],
///     &[220.0, 3000.0],
///     3.8.into(),
///     1.0.into(),
/// )
/// .unwrap();
/// assert_eq!(psi.len(), 3);
/// assert_eq!(delta.len(), 3);
/// ```
pub fn ellipsometry(
    wavelengths: &Array1<f64>,
    incident_angle: f64,
    film_refr_indices: &[RefrIndex],
    film_thicknesses: &[f64],
    substrate_refr_index: RefrIndex,
    cover_refr_index: RefrIndex,
) -> Result<(Array1<f64>, Array1<f64>)> {
    let stack = Stack::from_parts(
        film_refr_indices,
        film_thicknesses,
        substrate_refr_index,
        cover_refr_index,
    )?;
    let sweep = Ellipsometer::new(&stack, incident_angle).sweep(wavelengths)?;
    Ok((sweep.psi, sweep.delta))
}
