//! Description of a stratified stack of planar media.
//!
//! A stack is ordered from the incidence side: the semi-infinite cover,
//! zero or more films of finite thickness, and the semi-infinite substrate.
//! Stacks are immutable values; every computation walks them read-only, so
//! the same stack can be evaluated any number of times.
//!
//! Refractive indices are either constant or tabulated by the caller with
//! one value per wavelength sample (dispersion curves are computed outside
//! this crate).

use nalgebra::Complex;
use ndarray::Array1;

use crate::error::{Error, Result};


/// Refractive index of one layer, `n + iκ` with `κ ≥ 0` for absorbing media.
#[derive(Debug, Clone, PartialEq)]
pub enum RefrIndex {
    /// Same index at every wavelength
    Constant(Complex<f64>),
    /// One index per wavelength sample, supplied by the caller
    Dispersive(Array1<Complex<f64>>),
}

impl RefrIndex {
    /// Index at wavelength sample `sample`.
    ///
    /// Tabulated indices must have been checked with [`Stack::check_samples`].
    ///
    /// # Panics
    ///
    /// Panics if the index is tabulated and `sample` is out of range.
    pub fn at(&self, sample: usize) -> Complex<f64> {
        match self {
            RefrIndex::Constant(n) => *n,
            RefrIndex::Dispersive(values) => values[sample],
        }
    }

    /// Number of tabulated samples, or `None` for a constant index.
    pub fn samples(&self) -> Option<usize> {
        match self {
            RefrIndex::Constant(_) => None,
            RefrIndex::Dispersive(values) => Some(values.len()),
        }
    }
}

impl From<f64> for RefrIndex {
    fn from(n: f64) -> Self {
        RefrIndex::Constant(Complex::new(n, 0.0))
    }
}

impl From<Complex<f64>> for RefrIndex {
    fn from(n: Complex<f64>) -> Self {
        RefrIndex::Constant(n)
    }
}

impl From<Array1<Complex<f64>>> for RefrIndex {
    fn from(values: Array1<Complex<f64>>) -> Self {
        RefrIndex::Dispersive(values)
    }
}

impl From<Vec<Complex<f64>>> for RefrIndex {
    fn from(values: Vec<Complex<f64>>) -> Self {
        RefrIndex::Dispersive(Array1::from(values))
    }
}

impl From<Array1<f64>> for RefrIndex {
    fn from(values: Array1<f64>) -> Self {
        RefrIndex::Dispersive(values.mapv(|n| Complex::new(n, 0.0)))
    }
}

/// A layer of finite thickness, in the same length unit as the wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct Film {
    pub refr_index: RefrIndex,
    pub thickness: f64,
}

impl Film {
    pub fn new(refr_index: impl Into<RefrIndex>, thickness: f64) -> Self {
        Self {
            refr_index: refr_index.into(),
            thickness,
        }
    }
}

/// Cover, films and substrate, ordered from the incidence side.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub cover: RefrIndex,
    pub films: Vec<Film>,
    pub substrate: RefrIndex,
}

impl Stack {
    /// A single interface between cover and substrate.
    pub fn bare(cover: impl Into<RefrIndex>, substrate: impl Into<RefrIndex>) -> Self {
        Self {
            cover: cover.into(),
            films: Vec::new(),
            substrate: substrate.into(),
        }
    }

    /// Builds a stack from films that are already paired with their thicknesses.
    pub fn new(cover: impl Into<RefrIndex>, films: Vec<Film>, substrate: impl Into<RefrIndex>) -> Result<Self> {
        for (film, layer) in films.iter().enumerate() {
            if !(layer.thickness.is_finite() && layer.thickness >= 0.0) {
                return Err(Error::NegativeThickness {
                    film,
                    thickness: layer.thickness,
                });
            }
        }
        Ok(Self {
            cover: cover.into(),
            films,
            substrate: substrate.into(),
        })
    }

    /// Builds a stack from parallel lists of film indices and thicknesses.
    ///
    /// The caller's lists are only read. An empty film list gives the bare
    /// interface.
    pub fn from_parts(
        film_refr_indices: &[RefrIndex],
        film_thicknesses: &[f64],
        substrate: RefrIndex,
        cover: RefrIndex,
    ) -> Result<Self> {
        if film_refr_indices.len() != film_thicknesses.len() {
            return Err(Error::ShapeMismatch {
                indices: film_refr_indices.len(),
                thicknesses: film_thicknesses.len(),
            });
        }
        let films = film_refr_indices
            .iter()
            .zip(film_thicknesses)
            .map(|(n, &d)| Film::new(n.clone(), d))
            .collect();
        Self::new(cover, films, substrate)
    }

    /// Number of media including cover and substrate.
    pub fn num_layers(&self) -> usize {
        self.films.len() + 2
    }

    pub fn num_films(&self) -> usize {
        self.films.len()
    }

    /// All media from cover to substrate.
    pub fn layers(&self) -> impl Iterator<Item = &RefrIndex> {
        std::iter::once(&self.cover)
            .chain(self.films.iter().map(|film| &film.refr_index))
            .chain(std::iter::once(&self.substrate))
    }

    pub fn thicknesses(&self) -> impl Iterator<Item = f64> + '_ {
        self.films.iter().map(|film| film.thickness)
    }

    /// Refractive indices from cover to substrate at one wavelength sample.
    ///
    /// # Panics
    ///
    /// Panics if a tabulated layer has no value at `sample`; call
    /// [`Stack::check_samples`] first.
    pub fn refr_indices_at(&self, sample: usize) -> Vec<Complex<f64>> {
        self.layers().map(|n| n.at(sample)).collect()
    }

    pub fn is_dispersive(&self) -> bool {
        self.layers().any(|n| n.samples().is_some())
    }

    /// Checks every tabulated index has exactly `samples` values.
    pub fn check_samples(&self, samples: usize) -> Result<()> {
        for (layer, n) in self.layers().enumerate() {
            match n.samples() {
                Some(actual) if actual != samples => {
                    return Err(Error::DispersionMismatch {
                        layer,
                        expected: samples,
                        actual,
                    })
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// The same stack seen from the substrate side.
    pub fn reversed(&self) -> Stack {
        Stack {
            cover: self.substrate.clone(),
            films: self.films.iter().rev().cloned().collect(),
            substrate: self.cover.clone(),
        }
    }
}
