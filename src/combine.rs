//! Airy (Fabry–Pérot) combination of a film stack into one reflection coefficient.
//!
//! This module folds the per-interface Fresnel coefficients and per-film
//! round-trip phases of a stack into a single composite reflection
//! coefficient for one polarization. The fold starts at the deepest
//! interface and moves outward, so each film combines its upper interface
//! with the already combined response of everything beneath it.
//!
//! The combination provides:
//! - A single Airy step for one film over an arbitrary lower response
//! - An iterative substrate-to-cover fold with no recursion depth limit
//! - Assembly of the fold inputs from indices, angles and phases
//!
//! # Recurrence
//!
//! For a film with upper interface coefficients `r`, `t`, `t'` and round-trip
//! phase `φ`, over a lower response `r_out`:
//!
//! `r_combined = r + t · r_out · t' / (e^{-iφ} + r · r_out)`
//!
//! evaluated as `r + t · r_out · t' · e^{iφ} / (1 + r · r_out · e^{iφ})` so that
//! the exponential decays inside absorbing films.
//!
//! A film of zero thickness has `φ = 0` and reduces to the plain two-interface
//! combination, which makes it optically invisible.

use itertools::Itertools;
use nalgebra::Complex;

use crate::fresnel::{Interface, Polarization};


/// Coefficients of one film: its upper interface and its round-trip phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilmTerm {
    pub reflection_into: Complex<f64>,
    pub transmission_into: Complex<f64>,
    pub transmission_back: Complex<f64>,
    pub phase: Complex<f64>,
}

impl FilmTerm {
    /// Takes the coefficients of `interface` (the film's upper boundary) for `pol`.
    pub fn new(interface: &Interface, pol: Polarization, phase: Complex<f64>) -> Self {
        Self {
            reflection_into: interface.reflection_into(pol),
            transmission_into: interface.transmission_into(pol),
            transmission_back: interface.transmission_back(pol),
            phase,
        }
    }
}

/// One Airy step: the film described by `term` over a lower response `reflection_out_of`.
///
/// Evaluates `r + t · r_out · t' · e^{iφ} / (1 + r · r_out · e^{iφ})`, which is
/// `r + t · r_out · t' / (e^{-iφ} + r · r_out)` multiplied through by `e^{iφ}`.
/// In an absorbing film `Im φ > 0`, so `e^{iφ}` decays with thickness and an
/// opaque film tends to the bare reflection `r` instead of overflowing.
pub fn film_reflection(reflection_out_of: Complex<f64>, term: &FilmTerm) -> Complex<f64> {
    let round_trip = (Complex::<f64>::i() * term.phase).exp();
    let numerator = term.transmission_into * reflection_out_of * term.transmission_back * round_trip;
    let denominator = 1.0 + term.reflection_into * reflection_out_of * round_trip;
    term.reflection_into + numerator / denominator
}

/// Folds `terms` (ordered cover side first) over the deepest interface reflection.
///
/// **Context**: Each film's multiple-beam interference depends on the full
/// response beneath it, so the films must be combined strictly from the
/// substrate outward.
///
/// **How it Works**: Iterates `terms` in reverse, carrying the combined
/// reflection as the accumulator, initialised with the reflection at the
/// last film-to-substrate boundary. With no films the result is that
/// boundary's reflection.
pub fn combine(substrate_reflection: Complex<f64>, terms: &[FilmTerm]) -> Complex<f64> {
    terms
        .iter()
        .rev()
        .fold(substrate_reflection, film_reflection)
}

/// Composite reflection of a whole stack for one polarization.
///
/// `refr_indices` and `angles` run from cover to substrate (`angles[0]` is the
/// incidence angle), and `phases` holds one round-trip phase per film. Fewer
/// than two media have no interface and give NaN.
pub fn stack_reflection(
    pol: Polarization,
    refr_indices: &[Complex<f64>],
    angles: &[Complex<f64>],
    phases: &[Complex<f64>],
) -> Complex<f64> {
    debug_assert_eq!(refr_indices.len(), angles.len());
    debug_assert_eq!(refr_indices.len(), phases.len() + 2);

    let interfaces: Vec<Interface> = refr_indices
        .iter()
        .zip(angles)
        .tuple_windows()
        .map(|((&n_i, &theta_i), (&n_t, &theta_t))| Interface::new(n_i, n_t, theta_i, theta_t))
        .collect();

    let Some((substrate, films)) = interfaces.split_last() else {
        return Complex::new(f64::NAN, f64::NAN);
    };
    let terms: Vec<FilmTerm> = films
        .iter()
        .zip(phases)
        .map(|(interface, &phase)| FilmTerm::new(interface, pol, phase))
        .collect();

    combine(substrate.reflection_into(pol), &terms)
}
