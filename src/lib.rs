//! Ellipsometric response of stratified thin-film stacks.
//!
//! A stack is a semi-infinite cover, any number of planar films and a
//! semi-infinite substrate. The crate cascades Snell's law through the
//! stack, evaluates the Fresnel coefficients of every interface and folds
//! them from the substrate outward with the Airy multiple-beam recurrence.
//! The composite s and p reflections give the ellipsometric angles
//! `tan(ψ) e^{iΔ} = r_p / r_s`.

pub mod combine;
pub mod ellipsometer;
pub mod error;
pub mod fresnel;
pub mod path;
pub mod result;
pub mod settings;
pub mod snell;
pub mod stack;

pub use ellipsometer::{angle_sweep, ellipsometry, Ellipsometer, Reflection};
pub use error::{Error, Result};
pub use fresnel::Polarization;
pub use result::{Sweep, SweepAxis};
pub use stack::{Film, RefrIndex, Stack};
