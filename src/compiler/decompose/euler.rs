//! One-qubit Euler-angle synthesis.

use std::f64::consts::FRAC_PI_2;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::compiler::instruction::GateKind;
use crate::quantum::gate::{QuantumGate, StandardGate};
use crate::quantum::unitary::wrap_angle;

/// Axis pattern of a three-rotation decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EulerBasis {
    /// `Rz · Rx · Rz`
    #[default]
    Zxz,
    /// `Rx · Rz · Rx`
    Xzx,
}

/// `U = e^{i·phase} Rz(phi) Ry(theta) Rz(lambda)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    pub theta: f64,
    pub phi: f64,
    pub lambda: f64,
    pub phase: f64,
}

/// ZYZ angles of a 2x2 unitary.
pub fn params_zyz(matrix: &Array2<Complex64>) -> EulerAngles {
    let det = matrix[[0, 0]] * matrix[[1, 1]] - matrix[[0, 1]] * matrix[[1, 0]];
    let coeff = det.sqrt().inv();
    let phase = -coeff.arg();

    let theta = 2.0 * (coeff * matrix[[1, 0]]).norm().atan2((coeff * matrix[[0, 0]]).norm());
    let phi_plus_lambda = (coeff * matrix[[1, 1]]).arg();
    let phi_minus_lambda = (coeff * matrix[[1, 0]]).arg();

    EulerAngles {
        theta,
        phi: phi_plus_lambda + phi_minus_lambda,
        lambda: phi_plus_lambda - phi_minus_lambda,
        phase,
    }
}

/// ZXZ angles: `U = e^{i·phase} Rz(phi) Rx(theta) Rz(lambda)`.
pub fn params_zxz(matrix: &Array2<Complex64>) -> EulerAngles {
    let zyz = params_zyz(matrix);
    EulerAngles {
        phi: zyz.phi + FRAC_PI_2,
        lambda: zyz.lambda - FRAC_PI_2,
        ..zyz
    }
}

/// Rotations reproducing `matrix` up to global phase, in time order.
///
/// Always three rotations; angles are wrapped to `[-π, π)` but zero
/// rotations are kept.
pub fn euler_rotations(matrix: &Array2<Complex64>, basis: EulerBasis) -> [(GateKind, f64); 3] {
    match basis {
        EulerBasis::Zxz => {
            let angles = params_zxz(matrix);
            [
                (GateKind::RotateZ, wrap_angle(angles.lambda)),
                (GateKind::RotateX, wrap_angle(angles.theta)),
                (GateKind::RotateZ, wrap_angle(angles.phi)),
            ]
        }
        EulerBasis::Xzx => {
            // H Rz H = Rx, so the ZXZ angles of H·U·H are the XZX angles of U
            let h = StandardGate::H.matrix();
            let angles = params_zxz(&h.dot(matrix).dot(&h));
            [
                (GateKind::RotateX, wrap_angle(angles.lambda)),
                (GateKind::RotateZ, wrap_angle(angles.theta)),
                (GateKind::RotateX, wrap_angle(angles.phi)),
            ]
        }
    }
}
