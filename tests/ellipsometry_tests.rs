use approx::assert_abs_diff_eq;
use nalgebra::{Complex, Matrix2, Vector2};
use ndarray::{array, Array1};
use std::f64::consts::TAU;

use thinfilm::{ellipsometry, settings, Ellipsometer, Film, Polarization, RefrIndex, Stack};

// Tolerance on the summed squared residuals of tan(psi) and cos(delta)
const RESIDUAL_TOL: f64 = 1e-4;
// Tolerance on a single sample
const SAMPLE_TOL: f64 = 1e-9;

/// Reflection coefficients `(r_s, r_p)` from the product of the films'
/// characteristic matrices, independent of the Airy recurrence.
fn characteristic_matrix_reflection(
    wavelength: f64,
    theta_0: f64,
    cover: Complex<f64>,
    films: &[(Complex<f64>, f64)],
    substrate: Complex<f64>,
) -> (Complex<f64>, Complex<f64>) {
    let k0 = TAU / wavelength;
    let s = cover * theta_0.sin();
    // normal wavevector component n cos(theta), forward branch
    let kz = |n: Complex<f64>| {
        let kz = (n * n - s * s).sqrt();
        if kz.im < 0.0 {
            -kz
        } else {
            kz
        }
    };
    let i = Complex::<f64>::i();
    let one = Complex::new(1.0, 0.0);

    let reflection = |admittance: &dyn Fn(Complex<f64>) -> Complex<f64>| {
        let mut total: Matrix2<Complex<f64>> = Matrix2::identity();
        for &(n, d) in films {
            let delta = k0 * kz(n) * d;
            let eta = admittance(n);
            let layer = Matrix2::new(
                delta.cos(),
                -i * delta.sin() / eta,
                -i * eta * delta.sin(),
                delta.cos(),
            );
            total *= layer;
        }
        let bc = total * Vector2::new(one, admittance(substrate));
        let eta_0 = admittance(cover);
        (eta_0 * bc[0] - bc[1]) / (eta_0 * bc[0] + bc[1])
    };

    let r_s = reflection(&|n| kz(n));
    // the admittance form of r_p has the opposite sign to ours
    let r_p = -reflection(&|n| n * n / kz(n));
    (r_s, r_p)
}

fn compare_with_reference(
    wavelengths: &Array1<f64>,
    theta_0: f64,
    cover: Complex<f64>,
    films: &[(Complex<f64>, f64)],
    substrate: Complex<f64>,
) {
    let indices: Vec<RefrIndex> = films.iter().map(|&(n, _)| n.into()).collect();
    let thicknesses: Vec<f64> = films.iter().map(|&(_, d)| d).collect();
    let (psi, delta) = ellipsometry(
        wavelengths,
        theta_0,
        &indices,
        &thicknesses,
        substrate.into(),
        cover.into(),
    )
    .unwrap();

    let mut residual = 0.0;
    for (k, &wavelength) in wavelengths.iter().enumerate() {
        let (r_s, r_p) = characteristic_matrix_reflection(wavelength, theta_0, cover, films, substrate);
        let rho = r_p / r_s;
        let tan_psi = rho.norm();
        let cos_delta = rho.re / rho.norm();
        let sin_delta = rho.im / rho.norm();

        let d_tan = psi[k].tan() - tan_psi;
        let d_cos = delta[k].cos() - cos_delta;
        residual += d_tan * d_tan + d_cos * d_cos;
        assert_abs_diff_eq!(psi[k].tan(), tan_psi, epsilon = SAMPLE_TOL);
        assert_abs_diff_eq!(delta[k].cos(), cos_delta, epsilon = SAMPLE_TOL);
        assert_abs_diff_eq!(delta[k].sin(), sin_delta, epsilon = SAMPLE_TOL);
    }
    assert!(residual < RESIDUAL_TOL, "residual: {}", residual);
}

fn c(re: f64) -> Complex<f64> {
    Complex::new(re, 0.0)
}

#[test]
fn silicon_on_insulator_regression() {
    let wavelengths = Array1::linspace(500.0, 999.0, 500);
    compare_with_reference(
        &wavelengths,
        65.0_f64.to_radians(),
        c(1.0),
        &[(c(3.8), 220.0), (c(1.45), 3000.0)],
        c(3.8),
    );
}

#[test]
fn absorbing_stack_regression() {
    let wavelengths = Array1::linspace(300.0, 800.0, 101);
    compare_with_reference(
        &wavelengths,
        70.0_f64.to_radians(),
        c(1.0),
        &[(Complex::new(2.0, 0.1), 80.0), (c(1.46), 150.0)],
        Complex::new(3.9, 0.02),
    );
}

#[test]
fn evanescent_gap_regression() {
    // glass cover beyond the critical angle of the air gap
    let wavelengths = Array1::linspace(400.0, 700.0, 31);
    compare_with_reference(
        &wavelengths,
        50.0_f64.to_radians(),
        c(1.5),
        &[(c(1.0), 200.0), (c(2.1), 120.0)],
        c(1.5),
    );
}

#[test]
fn zero_thickness_film_is_invisible() {
    let wavelengths = array![450.0, 633.0, 800.0];
    let theta_0 = 30.0_f64.to_radians();
    let (psi, delta) = ellipsometry(&wavelengths, theta_0, &[3.8.into()], &[0.0], 1.45.into(), 1.0.into()).unwrap();
    let (bare_psi, bare_delta) = ellipsometry(&wavelengths, theta_0, &[], &[], 1.45.into(), 1.0.into()).unwrap();
    for k in 0..wavelengths.len() {
        assert_abs_diff_eq!(psi[k], bare_psi[k], epsilon = 1e-12);
        assert_abs_diff_eq!(delta[k], bare_delta[k], epsilon = 1e-12);
    }
}

#[test]
fn opaque_absorbing_film_hides_substrate() {
    let wavelengths = array![450.0, 500.0, 550.0];
    let film = Complex::new(0.5, 3.0);
    let (psi, delta) = ellipsometry(&wavelengths, 0.6, &[film.into()], &[20_000.0], 1.5.into(), 1.0.into()).unwrap();
    let (bare_psi, bare_delta) = ellipsometry(&wavelengths, 0.6, &[], &[], film.into(), 1.0.into()).unwrap();
    for k in 0..wavelengths.len() {
        assert!(psi[k].is_finite() && delta[k].is_finite());
        assert_abs_diff_eq!(psi[k], bare_psi[k], epsilon = 1e-12);
        assert_abs_diff_eq!(delta[k], bare_delta[k], epsilon = 1e-12);
    }
}

#[test]
fn lossless_reflectance_is_reciprocal() {
    let stack = Stack::new(1.0, vec![Film::new(2.0, 100.0), Film::new(1.46, 300.0)], 1.5).unwrap();
    let reversed = stack.reversed();
    let wavelengths = Array1::linspace(400.0, 900.0, 51);
    let front = Ellipsometer::new(&stack, 0.0).sweep(&wavelengths).unwrap();
    let back = Ellipsometer::new(&reversed, 0.0).sweep(&wavelengths).unwrap();
    for pol in Polarization::BOTH {
        let (front, back) = (front.reflectance(pol), back.reflectance(pol));
        for k in 0..wavelengths.len() {
            assert_abs_diff_eq!(front[k], back[k], epsilon = 1e-12);
        }
    }
}

#[test]
fn palindromic_stack_is_reciprocal() {
    let stack = Stack::new(
        1.45,
        vec![
            Film::new(Complex::new(2.0, 0.05), 80.0),
            Film::new(3.8, 40.0),
            Film::new(Complex::new(2.0, 0.05), 80.0),
        ],
        1.45,
    )
    .unwrap();
    let reversed = stack.reversed();
    assert_eq!(reversed, stack);

    let wavelengths = Array1::linspace(450.0, 850.0, 41);
    let front = Ellipsometer::new(&stack, 0.7).sweep(&wavelengths).unwrap();
    let back = Ellipsometer::new(&reversed, 0.7).sweep(&wavelengths).unwrap();
    assert_eq!(front, back);
}

#[test]
fn dispersive_sweep_matches_constant_samples() {
    let wavelengths = array![400.0, 500.0, 600.0, 700.0];
    let film: Array1<Complex<f64>> = array![
        Complex::new(2.10, 0.05),
        Complex::new(2.05, 0.02),
        Complex::new(2.02, 0.01),
        Complex::new(2.00, 0.0)
    ];
    let substrate = array![4.0, 3.9, 3.85, 3.8];
    let (psi, delta) = ellipsometry(
        &wavelengths,
        1.2,
        &[film.clone().into()],
        &[60.0],
        substrate.clone().into(),
        1.0.into(),
    )
    .unwrap();

    for k in 0..wavelengths.len() {
        let stack = Stack::new(1.0, vec![Film::new(film[k], 60.0)], substrate[k]).unwrap();
        let (single_psi, single_delta) = Ellipsometer::new(&stack, 1.2).psi_delta(wavelengths[k]).unwrap();
        assert_eq!(psi[k], single_psi);
        assert_eq!(delta[k], single_delta);
    }
}

#[test]
fn dispersion_shape_is_checked() {
    let err = ellipsometry(
        &array![400.0, 500.0],
        1.0,
        &[array![2.0, 2.1, 2.2].into()],
        &[60.0],
        3.8.into(),
        1.0.into(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        thinfilm::Error::DispersionMismatch {
            layer: 1,
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn default_config_matches_direct_call() {
    let settings = settings::load_default_config().unwrap();
    let sweep = settings.run().unwrap();
    assert_eq!(sweep.len(), 500);

    let wavelengths = Array1::linspace(500.0, 999.0, 500);
    let (psi, delta) = ellipsometry(
        &wavelengths,
        65.0_f64.to_radians(),
        &[3.8.into(), 1.45.into()],
        &[220.0, 3000.0],
        3.8.into(),
        1.0.into(),
    )
    .unwrap();
    for k in 0..wavelengths.len() {
        assert_abs_diff_eq!(sweep.psi[k], psi[k], epsilon = 1e-12);
        assert_abs_diff_eq!(sweep.delta[k], delta[k], epsilon = 1e-12);
    }
}
