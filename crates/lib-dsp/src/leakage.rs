//! Leakage correction between a target and a reference signal.
//!
//! All strategies remove a linear contribution of the reference `Y`
//! (`M x T`) from the target `X` (`N x T`). They differ in how the
//! `N x M` weights are obtained; instantaneous orthogonalization works
//! sample by sample on analytic signals instead.

use crate::error::{DspError, DspResult};
use lib_types::{InverseOperator, LeakageMethod, Signal};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayD, ArrayView2, Axis, Ix2, Zip};
use num_complex::Complex64;
use rayon::prelude::*;

/// Relative singular-value cutoff for the pseudo-inverse.
const PINV_RCOND: f64 = 1e-15;

/// Remove the reference's contribution from the target.
///
/// The result has the target's shape. It is real only when both inputs are
/// real.
pub fn correct_leakage(target: &Signal, reference: &Signal, method: &LeakageMethod) -> DspResult<Signal> {
    let (nchan, nref) = check_pair(target, reference)?;
    tracing::debug!(method = %method.kind(), nchan, nref, "Correcting leakage");

    match method {
        LeakageMethod::Gcs { inverse, source } => {
            if nref != 1 {
                return Err(DspError::LengthMismatch {
                    what: "reference channels",
                    expected: 1,
                    actual: nref,
                });
            }
            let beta = gcs_weights(inverse, *source)?;
            if beta.len() != nchan {
                return Err(DspError::LengthMismatch {
                    what: "target channels",
                    expected: beta.len(),
                    actual: nchan,
                });
            }
            subtract_projection(target, reference, &beta.insert_axis(Axis(1)))
        }
        LeakageMethod::OrthStatic => {
            let beta = static_weights(target, reference)?;
            subtract_projection(target, reference, &beta)
        }
        LeakageMethod::OrthInstantaneous => {
            let (Signal::Complex(x), Signal::Complex(y)) = (target, reference) else {
                return Err(DspError::RequiresComplex(
                    "instantaneous orthogonalization needs analytic target and reference".into(),
                ));
            };
            let z = orthogonalize_instantaneous(matrix(x)?, matrix(y)?);
            Ok(Signal::complex(z))
        }
        LeakageMethod::Custom { beta } => {
            if beta.dim() != (nchan, nref) {
                return Err(DspError::Type(lib_types::TypeError::ShapeMismatch {
                    name: "beta",
                    expected: (nchan, nref),
                    actual: beta.dim(),
                }));
            }
            subtract_projection(target, reference, beta)
        }
    }
}

/// Channel weights of the geometric correction for a 1-based `source`.
///
/// The inverse operator applied to the source's topography gives the spread
/// of that source over all sources; it is scaled to 1 at the source itself.
pub fn gcs_weights(inverse: &InverseOperator, source: usize) -> DspResult<Array1<f64>> {
    let topography = inverse.topography(source).ok_or(DspError::IndexOutOfRange {
        name: "source",
        index: source,
        max: inverse.nsource(),
    })?;
    let beta = inverse.invop().dot(&topography);
    let own = beta[source - 1];
    if own == 0.0 || !own.is_finite() {
        return Err(DspError::NumericalInstability(format!(
            "inverse operator gives weight {own} at source {source}"
        )));
    }
    Ok(beta / own)
}

/// Least-squares weights `(X Yᵀ) pinv(Y Yᵀ)` on the real parts.
pub fn static_weights(target: &Signal, reference: &Signal) -> DspResult<Array2<f64>> {
    let x = target.real_part();
    let y = reference.real_part();
    let x = matrix(&x)?;
    let y = matrix(&y)?;

    let cross = x.dot(&y.t());
    let gram = y.dot(&y.t());
    Ok(cross.dot(&pseudo_inverse(gram.view())?))
}

/// `Z = 0.5 (X - conj(X) * sum(Y^2) / sum(|Y|^2))`, per time sample.
///
/// Samples where the reference has no energy leave the target halved.
pub fn orthogonalize_instantaneous(x: ArrayView2<'_, Complex64>, y: ArrayView2<'_, Complex64>) -> Array2<Complex64> {
    let ratio: Vec<Complex64> = (0..y.ncols())
        .into_par_iter()
        .map(|t| {
            let col = y.column(t);
            let power: f64 = col.iter().map(|v| v.norm_sqr()).sum();
            if power == 0.0 {
                return Complex64::new(0.0, 0.0);
            }
            col.iter().map(|v| v * v).sum::<Complex64>() / power
        })
        .collect();
    let ratio = Array1::from(ratio);

    let mut z = Array2::<Complex64>::zeros(x.raw_dim());
    Zip::from(z.axis_iter_mut(Axis(1)))
        .and(x.axis_iter(Axis(1)))
        .and(&ratio)
        .for_each(|mut zc, xc, &r| {
            zc.iter_mut()
                .zip(xc.iter())
                .for_each(|(zv, xv)| *zv = 0.5 * (xv - xv.conj() * r));
        });
    z
}

/// Moore-Penrose pseudo-inverse through the SVD. An empty matrix inverts to
/// the empty transpose.
pub fn pseudo_inverse(a: ArrayView2<'_, f64>) -> DspResult<Array2<f64>> {
    let (rows, cols) = a.dim();
    if rows == 0 || cols == 0 {
        return Ok(Array2::zeros((cols, rows)));
    }
    let m = DMatrix::from_fn(rows, cols, |i, j| a[[i, j]]);
    let svd = m.svd(true, true);
    let cutoff = PINV_RCOND * svd.singular_values.max();
    let pinv = svd
        .pseudo_inverse(cutoff)
        .map_err(|e| DspError::NumericalInstability(e.to_string()))?;
    Ok(Array2::from_shape_fn((cols, rows), |(i, j)| pinv[(i, j)]))
}

/// `X - beta Y`, staying real when both inputs are real.
fn subtract_projection(target: &Signal, reference: &Signal, beta: &Array2<f64>) -> DspResult<Signal> {
    match (target, reference) {
        (Signal::Real(x), Signal::Real(y)) => {
            let z = &matrix(x)? - &beta.dot(&matrix(y)?);
            Ok(Signal::real(z))
        }
        _ => {
            let x = target.to_complex();
            let y = reference.to_complex();
            let beta = beta.mapv(|b| Complex64::new(b, 0.0));
            let z = &matrix(&x)? - &beta.dot(&matrix(&y)?);
            Ok(Signal::complex(z))
        }
    }
}

fn matrix<A>(a: &ArrayD<A>) -> DspResult<ArrayView2<'_, A>> {
    a.view().into_dimensionality::<Ix2>().map_err(|_| DspError::AxisCount {
        expected: "2",
        actual: a.ndim(),
    })
}

/// Both signals 2-axis with a shared time length; returns `(N, M)`.
fn check_pair(target: &Signal, reference: &Signal) -> DspResult<(usize, usize)> {
    for s in [target, reference] {
        if s.ndim() != 2 {
            return Err(DspError::AxisCount {
                expected: "2",
                actual: s.ndim(),
            });
        }
    }
    if target.time_len() != reference.time_len() {
        return Err(DspError::LengthMismatch {
            what: "time axis",
            expected: target.time_len(),
            actual: reference.time_len(),
        });
    }
    Ok((target.shape()[0], reference.shape()[0]))
}
