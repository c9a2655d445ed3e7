use ndarray::Array1;
use num_complex::Complex64;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use thinfilm::{fresnel::Interface, snell, Polarization, RefrIndex, Stack};

fn to_py_err(err: thinfilm::Error) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Refractive index of one layer as passed from Python: a (complex) number,
/// or a sequence holding one value per wavelength.
#[derive(FromPyObject)]
enum LayerRefrIndex {
    Constant(Complex64),
    Dispersive(Vec<Complex64>),
}

impl From<LayerRefrIndex> for RefrIndex {
    fn from(n: LayerRefrIndex) -> Self {
        match n {
            LayerRefrIndex::Constant(n) => n.into(),
            LayerRefrIndex::Dispersive(values) => values.into(),
        }
    }
}

fn build_stack(
    film_refr_indices: Vec<LayerRefrIndex>,
    film_thicknesses: &[f64],
    substrate_refr_index: LayerRefrIndex,
    cover_refr_index: LayerRefrIndex,
) -> PyResult<Stack> {
    let indices: Vec<RefrIndex> = film_refr_indices.into_iter().map(RefrIndex::from).collect();
    Stack::from_parts(
        &indices,
        film_thicknesses,
        substrate_refr_index.into(),
        cover_refr_index.into(),
    )
    .map_err(to_py_err)
}

/// Ellipsometric angles (psi, delta) in radians for each wavelength.
///
/// `film_refr_indices` and `film_thicknesses` list the films from the cover
/// side down. Thicknesses share the length unit of the wavelengths. Any
/// refractive index may be a sequence with one value per wavelength.
#[pyfunction]
#[pyo3(signature = (wavelengths, incident_angle, film_refr_indices, film_thicknesses, substrate_refr_index, cover_refr_index=LayerRefrIndex::Constant(Complex64::new(1.0, 0.0))))]
fn ellipsometry(
    wavelengths: Vec<f64>,
    incident_angle: f64,
    film_refr_indices: Vec<LayerRefrIndex>,
    film_thicknesses: Vec<f64>,
    substrate_refr_index: LayerRefrIndex,
    cover_refr_index: LayerRefrIndex,
) -> PyResult<(Vec<f64>, Vec<f64>)> {
    let stack = build_stack(
        film_refr_indices,
        &film_thicknesses,
        substrate_refr_index,
        cover_refr_index,
    )?;
    let sweep = thinfilm::Ellipsometer::new(&stack, incident_angle)
        .sweep(&Array1::from(wavelengths))
        .map_err(to_py_err)?;
    Ok((sweep.psi.to_vec(), sweep.delta.to_vec()))
}

/// Power reflectances (R_s, R_p) of a stack for each wavelength.
#[pyfunction]
#[pyo3(signature = (wavelengths, incident_angle, film_refr_indices, film_thicknesses, substrate_refr_index, cover_refr_index=LayerRefrIndex::Constant(Complex64::new(1.0, 0.0))))]
fn reflectance(
    wavelengths: Vec<f64>,
    incident_angle: f64,
    film_refr_indices: Vec<LayerRefrIndex>,
    film_thicknesses: Vec<f64>,
    substrate_refr_index: LayerRefrIndex,
    cover_refr_index: LayerRefrIndex,
) -> PyResult<(Vec<f64>, Vec<f64>)> {
    let stack = build_stack(
        film_refr_indices,
        &film_thicknesses,
        substrate_refr_index,
        cover_refr_index,
    )?;
    let sweep = thinfilm::Ellipsometer::new(&stack, incident_angle)
        .sweep(&Array1::from(wavelengths))
        .map_err(to_py_err)?;
    Ok((
        sweep.reflectance(Polarization::Senkrecht).to_vec(),
        sweep.reflectance(Polarization::Parallel).to_vec(),
    ))
}

/// Complex transmission angle into medium `n_t` for incidence `theta_i` from `n_i`.
#[pyfunction]
fn transmission_angle(theta_i: Complex64, n_i: Complex64, n_t: Complex64) -> Complex64 {
    snell::get_theta_t(theta_i, n_i, n_t)
}

/// Fresnel coefficients (r_s, r_p, t_s, t_p) of one interface.
#[pyfunction]
fn fresnel_coefficients(
    n_i: Complex64,
    n_t: Complex64,
    theta_i: Complex64,
) -> (Complex64, Complex64, Complex64, Complex64) {
    let theta_t = snell::get_theta_t(theta_i, n_i, n_t);
    let interface = Interface::new(n_i, n_t, theta_i, theta_t);
    (
        interface.reflection_into(Polarization::Senkrecht),
        interface.reflection_into(Polarization::Parallel),
        interface.transmission_into(Polarization::Senkrecht),
        interface.transmission_into(Polarization::Parallel),
    )
}

/// Thin-film ellipsometry implemented in Rust.
#[pymodule]
#[pyo3(name = "_thinfilm_py")]
fn thinfilm_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ellipsometry, m)?)?;
    m.add_function(wrap_pyfunction!(reflectance, m)?)?;
    m.add_function(wrap_pyfunction!(transmission_angle, m)?)?;
    m.add_function(wrap_pyfunction!(fresnel_coefficients, m)?)?;
    Ok(())
}
