use std::fmt;
use std::io::Write;

use anyhow::Result;
use nalgebra::Complex;
use ndarray::Array1;
use serde::Serialize;

use crate::ellipsometer::Reflection;
use crate::fresnel::Polarization;


/// Quantity varied across the samples of a [`Sweep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepAxis {
    /// Free-space wavelength, in the caller's length unit
    Wavelength,
    /// Angle of incidence in the cover, in radians
    IncidentAngle,
}

impl SweepAxis {
    fn label(&self) -> &'static str {
        match self {
            SweepAxis::Wavelength => "wavelength",
            SweepAxis::IncidentAngle => "incident_angle_deg",
        }
    }
}

/// Composite reflections and ellipsometric angles over a set of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    pub axis: SweepAxis,
    /// Wavelengths, or incidence angles in radians
    pub values: Array1<f64>,
    pub senkrecht: Array1<Complex<f64>>,
    pub parallel: Array1<Complex<f64>>,
    pub psi: Array1<f64>,
    pub delta: Array1<f64>,
}

/// One sample of a [`Sweep`], as written to JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub value: f64,
    pub psi: f64,
    pub delta: f64,
    pub r_s: Complex<f64>,
    pub r_p: Complex<f64>,
}

#[derive(Serialize)]
struct SweepJson {
    axis: SweepAxis,
    rows: Vec<SweepRow>,
}

impl Sweep {
    pub fn from_reflections(axis: SweepAxis, values: Array1<f64>, reflections: &[Reflection]) -> Self {
        let senkrecht: Array1<Complex<f64>> = reflections.iter().map(|r| r.senkrecht).collect();
        let parallel: Array1<Complex<f64>> = reflections.iter().map(|r| r.parallel).collect();
        let (psi, delta): (Vec<f64>, Vec<f64>) = reflections.iter().map(Reflection::psi_delta).unzip();
        Self {
            axis,
            values,
            senkrecht,
            parallel,
            psi: Array1::from(psi),
            delta: Array1::from(delta),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn tan_psi(&self) -> Array1<f64> {
        self.psi.mapv(f64::tan)
    }

    pub fn cos_delta(&self) -> Array1<f64> {
        self.delta.mapv(f64::cos)
    }

    /// Power reflectance `|r|²` of the whole stack.
    pub fn reflectance(&self, pol: Polarization) -> Array1<f64> {
        match pol {
            Polarization::Senkrecht => self.senkrecht.mapv(|r| r.norm_sqr()),
            Polarization::Parallel => self.parallel.mapv(|r| r.norm_sqr()),
        }
    }

    /// Sample values in the unit named by the axis label (angles in degrees).
    fn labelled_values(&self) -> Array1<f64> {
        match self.axis {
            SweepAxis::Wavelength => self.values.clone(),
            SweepAxis::IncidentAngle => self.values.mapv(f64::to_degrees),
        }
    }

    pub fn rows(&self) -> Vec<SweepRow> {
        (0..self.len())
            .map(|i| SweepRow {
                value: self.values[i],
                psi: self.psi[i],
                delta: self.delta[i],
                r_s: self.senkrecht[i],
                r_p: self.parallel[i],
            })
            .collect()
    }

    /// Write a whitespace separated table, one row per sample.
    ///
    /// Columns: axis value, ψ and Δ in degrees, tan ψ, cos Δ, R_s, R_p.
    /// Incidence angles are written in degrees.
    pub fn writeup<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(
            writer,
            "# {} psi_deg delta_deg tan_psi cos_delta R_s R_p",
            self.axis.label()
        )?;

        let tan_psi = self.tan_psi();
        let cos_delta = self.cos_delta();
        let r_s = self.reflectance(Polarization::Senkrecht);
        let r_p = self.reflectance(Polarization::Parallel);
        let values = self.labelled_values();
        for i in 0..self.len() {
            writeln!(
                writer,
                "{} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
                values[i],
                self.psi[i].to_degrees(),
                self.delta[i].to_degrees(),
                tan_psi[i],
                cos_delta[i],
                r_s[i],
                r_p[i],
            )?;
        }

        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&SweepJson {
            axis: self.axis,
            rows: self.rows(),
        })
    }
}

impl fmt::Display for Sweep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.labelled_values();
        let first = values.first().copied().unwrap_or(f64::NAN);
        let last = values.last().copied().unwrap_or(f64::NAN);
        write!(
            f,
            "Sweep:
  - Axis: {}
  - Samples: {}
  - Range: {:.6} to {:.6}
  ",
            self.axis.label(),
            self.len(),
            first,
            last,
        )
    }
}
