// src/quantum/unitary.rs
//! Dense unitary helpers used for synthesis and verification.
//!
//! Matrices follow the big-endian convention: for a gate on targets
//! `[t0, t1, ...]`, `t0` is the most significant bit of the row index, and
//! qubit 0 is the most significant bit of a full register.

use std::f64::consts::{PI, TAU};

use ndarray::Array2;
use num_complex::Complex64;

/// Absolute tolerance for matrix comparisons.
pub const ATOL: f64 = 1e-10;

pub fn identity(dim: usize) -> Array2<Complex64> {
    Array2::eye(dim)
}

/// Conjugate transpose.
pub fn adjoint(matrix: &Array2<Complex64>) -> Array2<Complex64> {
    matrix.t().mapv(|x| x.conj())
}

/// Kronecker product `a ⊗ b`; `a` acts on the more significant qubits.
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (a_rows, a_cols) = a.dim();
    let (b_rows, b_cols) = b.dim();
    let mut out = Array2::zeros((a_rows * b_rows, a_cols * b_cols));
    for ((i, j), &x) in a.indexed_iter() {
        for ((k, l), &y) in b.indexed_iter() {
            out[[i * b_rows + k, j * b_cols + l]] = x * y;
        }
    }
    out
}

/// Largest entry of `U†U - I` in absolute value.
pub fn unitarity_deviation(matrix: &Array2<Complex64>) -> f64 {
    let product = adjoint(matrix).dot(matrix);
    let eye = identity(matrix.nrows());
    (&product - &eye)
        .iter()
        .fold(0.0, |worst, x| f64::max(worst, x.norm()))
}

pub fn is_unitary(matrix: &Array2<Complex64>, tolerance: f64) -> bool {
    matrix.is_square() && unitarity_deviation(matrix) < tolerance
}

/// Determinant by Gaussian elimination with partial pivoting.
pub fn determinant(matrix: &Array2<Complex64>) -> Complex64 {
    let n = matrix.nrows();
    let mut a = matrix.clone();
    let mut det = Complex64::new(1.0, 0.0);

    for k in 0..n {
        let pivot = (k..n)
            .max_by(|&i, &j| a[[i, k]].norm().total_cmp(&a[[j, k]].norm()))
            .unwrap_or(k);
        if a[[pivot, k]].norm() == 0.0 {
            return Complex64::new(0.0, 0.0);
        }
        if pivot != k {
            for j in 0..n {
                a.swap([k, j], [pivot, j]);
            }
            det = -det;
        }

        det *= a[[k, k]];
        for i in k + 1..n {
            let factor = a[[i, k]] / a[[k, k]];
            for j in k..n {
                let delta = factor * a[[k, j]];
                a[[i, j]] -= delta;
            }
        }
    }
    det
}

/// Average gate fidelity between two unitaries of dimension `d`:
/// `(d + |Tr(A†B)|²) / (d(d + 1))`. Equals 1 iff they agree up to phase.
pub fn trace_fidelity(target: &Array2<Complex64>, actual: &Array2<Complex64>) -> f64 {
    let d = target.nrows() as f64;
    let trace: Complex64 = adjoint(target).dot(actual).diag().sum();
    (d + trace.norm_sqr()) / (d * (d + 1.0))
}

/// `a == e^{iφ} b` for some global phase `φ`, entry-wise within `tolerance`.
pub fn equal_up_to_global_phase(
    a: &Array2<Complex64>,
    b: &Array2<Complex64>,
    tolerance: f64,
) -> bool {
    if a.dim() != b.dim() {
        return false;
    }

    let pivot = b
        .indexed_iter()
        .max_by(|(_, x), (_, y)| x.norm().total_cmp(&y.norm()))
        .map(|(index, _)| index);
    let Some(pivot) = pivot else {
        return true;
    };
    if b[pivot].norm() < tolerance {
        return a.iter().all(|x| x.norm() < tolerance);
    }

    let phase = a[pivot] / b[pivot];
    if (phase.norm() - 1.0).abs() > tolerance {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x - phase * y).norm() < tolerance)
}

/// Whether a matrix is a multiple of the identity of unit modulus.
pub fn is_identity_up_to_phase(matrix: &Array2<Complex64>, tolerance: f64) -> bool {
    equal_up_to_global_phase(matrix, &identity(matrix.nrows()), tolerance)
}

/// Expand a gate acting on `targets` to a `total`-qubit register.
///
/// Target order is significant: `targets[0]` addresses the most significant
/// bit of the gate matrix.
pub fn embed(gate: &Array2<Complex64>, targets: &[usize], total: usize) -> Array2<Complex64> {
    let dim = 1 << total;
    let width = targets.len();
    let bit = |index: usize, qubit: usize| (index >> (total - 1 - qubit)) & 1;

    let mut full = Array2::zeros((dim, dim));
    for i in 0..dim {
        for j in 0..dim {
            let spectators_match = (0..total)
                .filter(|q| !targets.contains(q))
                .all(|q| bit(i, q) == bit(j, q));
            if !spectators_match {
                continue;
            }

            let mut sub_i = 0;
            let mut sub_j = 0;
            for (k, &q) in targets.iter().enumerate() {
                sub_i |= bit(i, q) << (width - 1 - k);
                sub_j |= bit(j, q) << (width - 1 - k);
            }
            full[[i, j]] = gate[[sub_i, sub_j]];
        }
    }
    full
}

/// Wrap an angle into `[-π, π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Distance between two angles on the circle.
pub fn angle_distance(a: f64, b: f64) -> f64 {
    wrap_angle(a - b).abs()
}
