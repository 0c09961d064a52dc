//! Unitary decomposition into the `{Rx, Rz, CZ}` basis.
//!
//! Lowering consumes decomposers through [`UnitaryDecomposer`]; the bundled
//! [`BasisDecomposer`] covers single-qubit gates and the controlled/product
//! family of two-qubit gates.

pub mod euler;
mod two_qubit;

use ndarray::Array2;
use num_complex::Complex64;
use tracing::trace;

use crate::compiler::instruction::Instruction;
use crate::error::DecomposeError;
use crate::quantum::unitary::{trace_fidelity, unitarity_deviation};

pub use euler::{euler_rotations, params_zxz, params_zyz, EulerAngles, EulerBasis};

/// Tolerance on unitarity of incoming matrices.
const UNITARY_TOLERANCE: f64 = 1e-8;

/// Numerical slack granted when comparing against a fidelity target.
const FIDELITY_SLACK: f64 = 1e-9;

/// Service that rewrites a gate matrix over local qubit slots.
///
/// Returned instructions address local slots (`0` for single-qubit gates,
/// `0` or `1` for two-qubit gates); slot `k` is the gate's `k`-th target.
pub trait UnitaryDecomposer {
    fn decompose_single_qubit(
        &self,
        matrix: &Array2<Complex64>,
        basis: EulerBasis,
    ) -> Result<Vec<Instruction>, DecomposeError>;

    /// Decompose with `CZ` as the entangler, reaching at least `fidelity`.
    fn decompose_two_qubit(
        &self,
        matrix: &Array2<Complex64>,
        fidelity: f64,
        basis: EulerBasis,
    ) -> Result<Vec<Instruction>, DecomposeError>;
}

/// Euler synthesis for one qubit, controlled-structure synthesis for two.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasisDecomposer;

impl BasisDecomposer {
    pub fn new() -> Self {
        BasisDecomposer
    }
}

impl UnitaryDecomposer for BasisDecomposer {
    fn decompose_single_qubit(
        &self,
        matrix: &Array2<Complex64>,
        basis: EulerBasis,
    ) -> Result<Vec<Instruction>, DecomposeError> {
        check_unitary(matrix, 2)?;
        Ok(euler_rotations(matrix, basis)
            .into_iter()
            .map(|(kind, angle)| Instruction::rotation(kind, angle, 0))
            .collect())
    }

    fn decompose_two_qubit(
        &self,
        matrix: &Array2<Complex64>,
        fidelity: f64,
        basis: EulerBasis,
    ) -> Result<Vec<Instruction>, DecomposeError> {
        check_unitary(matrix, 4)?;
        let ops = two_qubit::synthesize(matrix, basis)?;

        let achieved = trace_fidelity(matrix, &two_qubit::local_unitary(&ops));
        if achieved < fidelity - FIDELITY_SLACK {
            return Err(DecomposeError::FidelityNotReached {
                achieved,
                target: fidelity,
            });
        }
        trace!(
            entanglers = two_qubit::entangler_count(&ops),
            instructions = ops.len(),
            achieved,
            "synthesized two-qubit unitary"
        );
        Ok(ops)
    }
}

fn check_unitary(matrix: &Array2<Complex64>, dim: usize) -> Result<(), DecomposeError> {
    let (rows, cols) = matrix.dim();
    if rows != dim || cols != dim {
        return Err(DecomposeError::InvalidShape {
            expected: dim,
            rows,
            cols,
        });
    }

    let deviation = unitarity_deviation(matrix);
    if deviation > UNITARY_TOLERANCE {
        return Err(DecomposeError::NotUnitary { deviation });
    }
    Ok(())
}
