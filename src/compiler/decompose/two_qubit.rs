//! Two-qubit synthesis over `{Rx, Rz, CZ}`.
//!
//! Product unitaries `A ⊗ B` need no entangler. Unitaries that are
//! block-diagonal with respect to either qubit (CX, CZ, CY, controlled
//! rotations and phases, diagonal gates) are written as `C(V)·(I ⊗ W0)`;
//! the controlled part is diagonalised as
//! `C(V) = (I ⊗ W)·(P(λa) ⊗ I)·CP(μ)·(I ⊗ W†)`, and `CP(μ)` costs one CZ
//! when `μ = π`, none when `μ = 0`, and two otherwise.
//!
//! Everything else (SWAP, iSWAP, generic unitaries) goes through the KAK
//! form `U ∝ K1·exp(i(a·XX + b·YY + c·ZZ))·K2` with local `K1` and `K2`,
//! and the canonical middle factor costs three CZ.

use std::f64::consts::{FRAC_PI_2, PI};

use ndarray::{array, s, Array1, Array2};
use num_complex::Complex64;

use super::euler::{euler_rotations, EulerBasis};
use crate::compiler::instruction::{GateKind, Instruction};
use crate::error::DecomposeError;
use crate::quantum::gate::{ParametrizedGate, QuantumGate, StandardGate};
use crate::quantum::gate::constants::{I, ONE, ZERO};
use crate::quantum::unitary::{
    adjoint, angle_distance, determinant, embed, identity, is_identity_up_to_phase, kron, ATOL,
};

/// Tolerance for recognising the local factors of a KAK form.
const KAK_ATOL: f64 = 1e-8;

/// Tolerance for accepting a diagonalization of `M2`.
const DIAGONAL_ATOL: f64 = 1e-9;

/// Weights mixing the real and imaginary parts of `M2` into one real
/// symmetric matrix. Both parts commute, so almost any mix shares their
/// eigenvectors; the next pair is tried when a mix is degenerate.
const MIXES: [(f64, f64); 4] = [
    (1.2602066112249388, 0.22317849046722027),
    (0.3, 1.7),
    (-0.8, 0.45),
    (1.0, -1.3),
];

/// Eigenvalues of `XX`, `YY` and `ZZ` on the columns of [`magic_basis`].
const XX_SIGNS: [f64; 4] = [1.0, -1.0, 1.0, -1.0];
const YY_SIGNS: [f64; 4] = [-1.0, 1.0, 1.0, -1.0];
const ZZ_SIGNS: [f64; 4] = [1.0, 1.0, -1.0, -1.0];

const JACOBI_SWEEPS: usize = 64;

/// Accumulates single-qubit factors per local slot and emits them as Euler
/// rotations whenever an entangler forces an ordering.
struct LocalCircuit {
    pending: [Array2<Complex64>; 2],
    ops: Vec<Instruction>,
    basis: EulerBasis,
}

impl LocalCircuit {
    fn new(basis: EulerBasis) -> Self {
        LocalCircuit {
            pending: [identity(2), identity(2)],
            ops: Vec::new(),
            basis,
        }
    }

    /// Apply `gate` on `slot` after everything already queued there.
    fn apply(&mut self, slot: usize, gate: &Array2<Complex64>) {
        self.pending[slot] = gate.dot(&self.pending[slot]);
    }

    fn entangle(&mut self) {
        self.flush(0);
        self.flush(1);
        self.ops.push(Instruction::cz(0, 1));
    }

    fn flush(&mut self, slot: usize) {
        let gate = std::mem::replace(&mut self.pending[slot], identity(2));
        if is_identity_up_to_phase(&gate, ATOL) {
            return;
        }
        for (kind, angle) in euler_rotations(&gate, self.basis) {
            self.ops.push(Instruction::rotation(kind, angle, slot));
        }
    }

    fn finish(mut self) -> Vec<Instruction> {
        self.flush(0);
        self.flush(1);
        self.ops
    }
}

/// Synthesize a 4x4 unitary. Returned instructions target local slots 0/1.
pub(crate) fn synthesize(
    matrix: &Array2<Complex64>,
    basis: EulerBasis,
) -> Result<Vec<Instruction>, DecomposeError> {
    if let Some((a, b)) = split_product(matrix, ATOL) {
        let mut circuit = LocalCircuit::new(basis);
        circuit.apply(0, &a);
        circuit.apply(1, &b);
        return Ok(circuit.finish());
    }

    if let Some((w0, w1)) = block_diagonal(matrix) {
        return Ok(controlled(&w0, &w1, basis));
    }

    if let Some((w0, w1)) = block_diagonal(&swap_qubits(matrix)) {
        let ops = controlled(&w0, &w1, basis)
            .into_iter()
            .map(|mut op| {
                for slot in op.targets.iter_mut() {
                    *slot = 1 - *slot;
                }
                op
            })
            .collect();
        return Ok(ops);
    }

    general(matrix, basis)
}

/// Unitary of a local two-slot sequence.
pub(crate) fn local_unitary(ops: &[Instruction]) -> Array2<Complex64> {
    ops.iter().fold(identity(4), |acc, op| {
        embed(&op.matrix(), &op.targets, 2).dot(&acc)
    })
}

/// `U = C(W1·W0†)·(I ⊗ W0)` with the control on slot 0.
fn controlled(w0: &Array2<Complex64>, w1: &Array2<Complex64>, basis: EulerBasis) -> Vec<Instruction> {
    let v = w1.dot(&adjoint(w0));
    let (w, lambda_a, lambda_b) = diagonalize(&v);
    let mu = lambda_b - lambda_a;

    let mut circuit = LocalCircuit::new(basis);
    circuit.apply(1, &adjoint(&w).dot(w0));

    if angle_distance(mu, PI) < ATOL {
        circuit.entangle();
    } else if angle_distance(mu, 0.0) >= ATOL {
        // CP(μ) = (P(μ/2) ⊗ P(μ/2))·CX·(I ⊗ P(-μ/2))·CX, with CX = (I ⊗ H)·CZ·(I ⊗ H)
        let h = StandardGate::H.matrix();
        circuit.apply(1, &h);
        circuit.entangle();
        circuit.apply(1, &h);
        circuit.apply(1, &ParametrizedGate::Phase(-mu / 2.0).matrix());
        circuit.apply(1, &h);
        circuit.entangle();
        circuit.apply(1, &h);
        circuit.apply(0, &ParametrizedGate::Phase(mu / 2.0).matrix());
        circuit.apply(1, &ParametrizedGate::Phase(mu / 2.0).matrix());
    }

    circuit.apply(0, &ParametrizedGate::Phase(lambda_a).matrix());
    circuit.apply(1, &w);
    circuit.finish()
}

/// Factor `U = A ⊗ B` if possible.
fn split_product(
    matrix: &Array2<Complex64>,
    tolerance: f64,
) -> Option<(Array2<Complex64>, Array2<Complex64>)> {
    let block = |i: usize, j: usize| matrix.slice(s![2 * i..2 * i + 2, 2 * j..2 * j + 2]).to_owned();
    let frobenius = |m: &Array2<Complex64>| m.iter().map(|x| x.norm_sqr()).sum::<f64>();

    // the largest block is a well-conditioned multiple of B
    let (bi, bj) = [(0, 0), (0, 1), (1, 0), (1, 1)]
        .into_iter()
        .max_by(|&(a, b), &(c, d)| frobenius(&block(a, b)).total_cmp(&frobenius(&block(c, d))))?;
    let weight = frobenius(&block(bi, bj));
    // scaled so that B is unitary whenever U is
    let scale = (weight / 2.0).sqrt();
    let b = block(bi, bj).mapv(|x| x / scale);

    let mut a: Array2<Complex64> = Array2::zeros((2, 2));
    for i in 0..2 {
        for j in 0..2 {
            let overlap: Complex64 = block(i, j)
                .iter()
                .zip(b.iter())
                .map(|(x, y)| y.conj() * x)
                .sum();
            a[[i, j]] = overlap / 2.0;
        }
    }

    let rebuilt = kron(&a, &b);
    let matches = rebuilt
        .iter()
        .zip(matrix.iter())
        .all(|(x, y)| (x - y).norm() < tolerance);
    matches.then_some((a, b))
}

/// Diagonal blocks of `U` if the off-diagonal blocks vanish (slot 0 control).
fn block_diagonal(matrix: &Array2<Complex64>) -> Option<(Array2<Complex64>, Array2<Complex64>)> {
    let off_diagonal = matrix
        .slice(s![0..2, 2..4])
        .iter()
        .chain(matrix.slice(s![2..4, 0..2]).iter())
        .all(|x| x.norm() < ATOL);
    off_diagonal.then(|| {
        (
            matrix.slice(s![0..2, 0..2]).to_owned(),
            matrix.slice(s![2..4, 2..4]).to_owned(),
        )
    })
}

/// `SWAP · U · SWAP`.
fn swap_qubits(matrix: &Array2<Complex64>) -> Array2<Complex64> {
    let swap = StandardGate::SWAP.matrix();
    swap.dot(matrix).dot(&swap)
}

/// Spectral decomposition of a 2x2 unitary: `V = W·diag(e^{iλa}, e^{iλb})·W†`.
fn diagonalize(v: &Array2<Complex64>) -> (Array2<Complex64>, f64, f64) {
    let (a, b, c, d) = (v[[0, 0]], v[[0, 1]], v[[1, 0]], v[[1, 1]]);
    let half_trace = (a + d) / 2.0;
    let det = a * d - b * c;
    let disc = (half_trace * half_trace - det).sqrt();
    let first = half_trace + disc;
    let second = half_trace - disc;

    if disc.norm() < ATOL {
        return (identity(2), first.arg(), second.arg());
    }

    // either column of V - λ·I spans the eigenvector; take the larger one
    let candidates = [(b, first - a), (first - d, c)];
    let (x, y) = candidates
        .into_iter()
        .max_by(|p, q| (p.0.norm_sqr() + p.1.norm_sqr()).total_cmp(&(q.0.norm_sqr() + q.1.norm_sqr())))
        .unwrap_or((Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)));
    let norm = (x.norm_sqr() + y.norm_sqr()).sqrt();
    let (x, y) = (x / norm, y / norm);

    let w = ndarray::array![[x, -y.conj()], [y, x.conj()]];
    (w, first.arg(), second.arg())
}

/// Any 4x4 unitary with three entanglers, through its KAK form.
fn general(matrix: &Array2<Complex64>, basis: EulerBasis) -> Result<Vec<Instruction>, DecomposeError> {
    let kak = Kak::new(matrix)?;
    let not_local = || {
        DecomposeError::UnsupportedStructure(
            "KAK factor is not a product of single-qubit gates".to_string(),
        )
    };
    let (left_0, left_1) = split_product(&kak.left, KAK_ATOL).ok_or_else(not_local)?;
    let (right_0, right_1) = split_product(&kak.right, KAK_ATOL).ok_or_else(not_local)?;
    let [a, b, c] = kak.coefficients;

    let h = StandardGate::H.matrix();
    let rz = |theta: f64| ParametrizedGate::Rz(theta).matrix();
    let ry = |theta: f64| ParametrizedGate::Ry(theta).matrix();

    let mut circuit = LocalCircuit::new(basis);
    circuit.apply(0, &right_0);
    circuit.apply(1, &right_1);

    // exp(i(a·XX + b·YY + c·ZZ)) = CX(1,0)·CX(0,1)·CX(1,0) with local
    // rotations in between, each CX a CZ conjugated by H on its target
    circuit.apply(1, &rz(-FRAC_PI_2));
    circuit.apply(0, &h);
    circuit.entangle();
    circuit.apply(0, &h);
    circuit.apply(0, &rz(-2.0 * c - FRAC_PI_2));
    circuit.apply(1, &ry(FRAC_PI_2 + 2.0 * a));
    circuit.apply(1, &h);
    circuit.entangle();
    circuit.apply(1, &h);
    circuit.apply(1, &ry(-2.0 * b - FRAC_PI_2));
    circuit.apply(0, &h);
    circuit.entangle();
    circuit.apply(0, &h);
    circuit.apply(0, &rz(FRAC_PI_2));

    circuit.apply(0, &left_0);
    circuit.apply(1, &left_1);
    Ok(circuit.finish())
}

/// `U ∝ left · exp(i(a·XX + b·YY + c·ZZ)) · right` with local `left` and
/// `right`.
struct Kak {
    left: Array2<Complex64>,
    coefficients: [f64; 3],
    right: Array2<Complex64>,
}

impl Kak {
    fn new(matrix: &Array2<Complex64>) -> Result<Self, DecomposeError> {
        let scale = determinant(matrix).powf(-0.25);
        let special = matrix.mapv(|x| x * scale);
        let magic = magic_basis();
        let magic_inv = adjoint(&magic).mapv(|x| x / 2.0);

        // local gates are real orthogonal in the magic basis, so M2 = P·D·Pᵀ
        // with real orthogonal P and unimodular diagonal D
        let up = magic_inv.dot(&special).dot(&magic);
        let m2 = up.t().dot(&up);
        let (mut p, d) = MIXES
            .iter()
            .find_map(|&(re, im)| {
                let mixed = m2.mapv(|x| re * x.re + im * x.im);
                let p = symmetric_eigenvectors(&mixed).mapv(|x| Complex64::new(x, 0.0));
                let d: Array1<Complex64> = p.t().dot(&m2).dot(&p).diag().to_owned();
                let rebuilt = p.dot(&Array2::from_diag(&d)).dot(&p.t());
                let diagonalized = rebuilt
                    .iter()
                    .zip(m2.iter())
                    .all(|(x, y)| (x - y).norm() < DIAGONAL_ATOL);
                diagonalized.then_some((p, d))
            })
            .ok_or_else(|| {
                DecomposeError::UnsupportedStructure(
                    "could not diagonalize M2 in the magic basis".to_string(),
                )
            })?;

        if determinant(&p).re < 0.0 {
            p.column_mut(3).mapv_inplace(|x| -x);
        }

        let mut phases: Vec<f64> = d.iter().map(|x| -x.arg() / 2.0).collect();
        phases[3] = -(phases[0] + phases[1] + phases[2]);
        let rotate: Array1<Complex64> =
            phases.iter().map(|&t| Complex64::from_polar(1.0, t)).collect();

        let left = magic.dot(&up.dot(&p).dot(&Array2::from_diag(&rotate))).dot(&magic_inv);
        let right = magic.dot(&p.t()).dot(&magic_inv);
        let coefficient =
            |signs: [f64; 4]| -signs.iter().zip(&phases).map(|(s, t)| s * t).sum::<f64>() / 4.0;

        Ok(Kak {
            left,
            coefficients: [coefficient(XX_SIGNS), coefficient(YY_SIGNS), coefficient(ZZ_SIGNS)],
            right,
        })
    }
}

/// Unnormalized magic basis `B` with `B·B† = 2I`.
fn magic_basis() -> Array2<Complex64> {
    array![
        [ONE, I, ZERO, ZERO],
        [ZERO, ZERO, I, ONE],
        [ZERO, ZERO, I, -ONE],
        [ONE, -I, ZERO, ZERO],
    ]
}

/// Eigenvectors, as columns, of a real symmetric matrix by cyclic Jacobi
/// rotations.
fn symmetric_eigenvectors(matrix: &Array2<f64>) -> Array2<f64> {
    let n = matrix.nrows();
    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);

    for _ in 0..JACOBI_SWEEPS {
        let off_diagonal: f64 = a
            .indexed_iter()
            .filter(|((i, j), _)| i != j)
            .map(|(_, x)| x * x)
            .sum();
        if off_diagonal < 1e-30 {
            break;
        }

        for p in 0..n - 1 {
            for q in p + 1..n {
                if a[[p, q]] == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * a[[p, q]]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let cos = 1.0 / (t * t + 1.0).sqrt();
                let sin = t * cos;

                for k in 0..n {
                    let (kp, kq) = (a[[k, p]], a[[k, q]]);
                    a[[k, p]] = cos * kp - sin * kq;
                    a[[k, q]] = sin * kp + cos * kq;
                }
                for k in 0..n {
                    let (pk, qk) = (a[[p, k]], a[[q, k]]);
                    a[[p, k]] = cos * pk - sin * qk;
                    a[[q, k]] = sin * pk + cos * qk;
                }
                for k in 0..n {
                    let (kp, kq) = (v[[k, p]], v[[k, q]]);
                    v[[k, p]] = cos * kp - sin * kq;
                    v[[k, q]] = sin * kp + cos * kq;
                }
            }
        }
    }
    v
}

/// Number of entangling instructions in a local sequence.
pub(crate) fn entangler_count(ops: &[Instruction]) -> usize {
    ops.iter().filter(|op| op.kind == GateKind::Entangle).count()
}
