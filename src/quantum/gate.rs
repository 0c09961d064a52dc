// src/quantum/gate.rs
//! Quantum gates of the input circuit model
//!
//! Gates are described by their unitary matrix. Lowering never inspects a
//! gate beyond its matrix, its name and the number of qubits it acts on, so
//! any type implementing [`QuantumGate`] can be compiled.

use std::fmt::Debug;

use ndarray::{array, Array2};
use num_complex::Complex64;

use super::unitary::{adjoint, identity};

/// Common complex numbers used in quantum gates
pub mod constants {
    use num_complex::Complex64;

    /// The imaginary unit i
    pub const I: Complex64 = Complex64::new(0.0, 1.0);

    pub const ONE: Complex64 = Complex64::new(1.0, 0.0);

    pub const ZERO: Complex64 = Complex64::new(0.0, 0.0);

    /// 1/sqrt(2)
    pub const FRAC_1_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;
}

use constants::*;

/// Trait for quantum gates
pub trait QuantumGate: Debug + Send + Sync {
    /// Returns the number of qubits this gate acts on
    fn qubit_count(&self) -> usize;

    /// Returns the matrix representation of this gate
    fn matrix(&self) -> Array2<Complex64>;

    /// Returns a display name for this gate
    fn name(&self) -> String;

    /// Create a clone of this gate
    fn clone_box(&self) -> Box<dyn QuantumGate>;

    /// Returns the adjoint (Hermitian conjugate) of this gate
    fn adjoint(&self) -> Box<dyn QuantumGate> {
        Box::new(CustomMatrixGate {
            matrix: adjoint(&self.matrix()),
            name: format!("{}†", self.name()),
            qubits: self.qubit_count(),
        })
    }

    /// Compares this gate with another gate by matrix
    fn equals(&self, other: &dyn QuantumGate) -> bool {
        let m1 = self.matrix();
        let m2 = other.matrix();
        m1.shape() == m2.shape()
            && m1.iter().zip(m2.iter()).all(|(a, b)| (a - b).norm() <= 1e-10)
    }
}

impl Clone for Box<dyn QuantumGate> {
    fn clone(&self) -> Box<dyn QuantumGate> {
        self.clone_box()
    }
}

impl PartialEq for Box<dyn QuantumGate> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other.as_ref())
    }
}

/// A generic gate defined by its matrix
#[derive(Debug, Clone)]
pub struct CustomMatrixGate {
    pub matrix: Array2<Complex64>,
    pub name: String,
    pub qubits: usize,
}

impl QuantumGate for CustomMatrixGate {
    fn qubit_count(&self) -> usize {
        self.qubits
    }

    fn matrix(&self) -> Array2<Complex64> {
        self.matrix.clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn clone_box(&self) -> Box<dyn QuantumGate> {
        Box::new(self.clone())
    }
}

/// Standard quantum gates (Pauli, Hadamard, etc.)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StandardGate {
    /// Identity on the given number of qubits
    I(usize),
    X,
    Y,
    Z,
    H,
    /// Phase gate (S gate)
    S,
    /// π/8 gate (T gate)
    T,
    CNOT,
    CZ,
    CY,
    SWAP,
    /// Controlled-controlled-X
    Toffoli,
}

impl QuantumGate for StandardGate {
    fn qubit_count(&self) -> usize {
        match self {
            StandardGate::I(n) => *n,
            StandardGate::X | StandardGate::Y | StandardGate::Z |
            StandardGate::H | StandardGate::S | StandardGate::T => 1,
            StandardGate::CNOT | StandardGate::CZ | StandardGate::CY |
            StandardGate::SWAP => 2,
            StandardGate::Toffoli => 3,
        }
    }

    fn matrix(&self) -> Array2<Complex64> {
        match self {
            StandardGate::I(n) => identity(1 << n),
            StandardGate::X => array![[ZERO, ONE], [ONE, ZERO]],
            StandardGate::Y => array![[ZERO, -I], [I, ZERO]],
            StandardGate::Z => array![[ONE, ZERO], [ZERO, -ONE]],
            StandardGate::H => {
                let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
                array![[h, h], [h, -h]]
            }
            StandardGate::S => array![[ONE, ZERO], [ZERO, I]],
            StandardGate::T => {
                array![[ONE, ZERO], [ZERO, Complex64::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2)]]
            }
            StandardGate::CNOT => controlled(&StandardGate::X.matrix()),
            StandardGate::CZ => controlled(&StandardGate::Z.matrix()),
            StandardGate::CY => controlled(&StandardGate::Y.matrix()),
            StandardGate::SWAP => array![
                [ONE, ZERO, ZERO, ZERO],
                [ZERO, ZERO, ONE, ZERO],
                [ZERO, ONE, ZERO, ZERO],
                [ZERO, ZERO, ZERO, ONE]
            ],
            StandardGate::Toffoli => {
                let mut matrix = identity(8);
                matrix[[6, 6]] = ZERO;
                matrix[[7, 7]] = ZERO;
                matrix[[6, 7]] = ONE;
                matrix[[7, 6]] = ONE;
                matrix
            }
        }
    }

    fn name(&self) -> String {
        match self {
            StandardGate::I(n) => format!("I({})", n),
            StandardGate::X => "X".to_string(),
            StandardGate::Y => "Y".to_string(),
            StandardGate::Z => "Z".to_string(),
            StandardGate::H => "H".to_string(),
            StandardGate::S => "S".to_string(),
            StandardGate::T => "T".to_string(),
            StandardGate::CNOT => "CNOT".to_string(),
            StandardGate::CZ => "CZ".to_string(),
            StandardGate::CY => "CY".to_string(),
            StandardGate::SWAP => "SWAP".to_string(),
            StandardGate::Toffoli => "Toffoli".to_string(),
        }
    }

    fn clone_box(&self) -> Box<dyn QuantumGate> {
        Box::new(self.clone())
    }
}

/// Parametrized quantum gates
#[derive(Clone, Debug, PartialEq)]
pub enum ParametrizedGate {
    /// Rotation around X-axis
    Rx(f64),
    /// Rotation around Y-axis
    Ry(f64),
    /// Rotation around Z-axis
    Rz(f64),
    /// Phase gate diag(1, e^{iθ})
    Phase(f64),
    /// General single-qubit unitary with Euler angles (θ, φ, λ)
    U3(f64, f64, f64),
    /// Controlled rotation around Z-axis
    CRz(f64),
    /// Controlled rotation around X-axis
    CRx(f64),
    /// Controlled phase gate
    CPhase(f64),
}

impl QuantumGate for ParametrizedGate {
    fn qubit_count(&self) -> usize {
        match self {
            ParametrizedGate::Rx(_) |
            ParametrizedGate::Ry(_) |
            ParametrizedGate::Rz(_) |
            ParametrizedGate::Phase(_) |
            ParametrizedGate::U3(..) => 1,
            ParametrizedGate::CRz(_) |
            ParametrizedGate::CRx(_) |
            ParametrizedGate::CPhase(_) => 2,
        }
    }

    fn matrix(&self) -> Array2<Complex64> {
        match *self {
            ParametrizedGate::Rx(theta) => {
                let cos = Complex64::new((theta / 2.0).cos(), 0.0);
                let sin = Complex64::new(0.0, -(theta / 2.0).sin());
                array![[cos, sin], [sin, cos]]
            }
            ParametrizedGate::Ry(theta) => {
                let cos = Complex64::new((theta / 2.0).cos(), 0.0);
                let sin = Complex64::new((theta / 2.0).sin(), 0.0);
                array![[cos, -sin], [sin, cos]]
            }
            ParametrizedGate::Rz(theta) => {
                array![
                    [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
                    [ZERO, Complex64::from_polar(1.0, theta / 2.0)]
                ]
            }
            ParametrizedGate::Phase(theta) => {
                array![[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, theta)]]
            }
            ParametrizedGate::U3(theta, phi, lambda) => {
                let cos = (theta / 2.0).cos();
                let sin = (theta / 2.0).sin();
                array![
                    [Complex64::new(cos, 0.0), -Complex64::from_polar(sin, lambda)],
                    [Complex64::from_polar(sin, phi), Complex64::from_polar(cos, phi + lambda)]
                ]
            }
            ParametrizedGate::CRz(theta) => controlled(&ParametrizedGate::Rz(theta).matrix()),
            ParametrizedGate::CRx(theta) => controlled(&ParametrizedGate::Rx(theta).matrix()),
            ParametrizedGate::CPhase(theta) => controlled(&ParametrizedGate::Phase(theta).matrix()),
        }
    }

    fn name(&self) -> String {
        match self {
            ParametrizedGate::Rx(theta) => format!("Rx({:.2})", theta),
            ParametrizedGate::Ry(theta) => format!("Ry({:.2})", theta),
            ParametrizedGate::Rz(theta) => format!("Rz({:.2})", theta),
            ParametrizedGate::Phase(theta) => format!("P({:.2})", theta),
            ParametrizedGate::U3(theta, phi, lambda) => {
                format!("U3({:.2}, {:.2}, {:.2})", theta, phi, lambda)
            }
            ParametrizedGate::CRz(theta) => format!("CRz({:.2})", theta),
            ParametrizedGate::CRx(theta) => format!("CRx({:.2})", theta),
            ParametrizedGate::CPhase(theta) => format!("CPhase({:.2})", theta),
        }
    }

    fn clone_box(&self) -> Box<dyn QuantumGate> {
        Box::new(self.clone())
    }

    fn adjoint(&self) -> Box<dyn QuantumGate> {
        match *self {
            ParametrizedGate::Rx(theta) => Box::new(ParametrizedGate::Rx(-theta)),
            ParametrizedGate::Ry(theta) => Box::new(ParametrizedGate::Ry(-theta)),
            ParametrizedGate::Rz(theta) => Box::new(ParametrizedGate::Rz(-theta)),
            ParametrizedGate::Phase(theta) => Box::new(ParametrizedGate::Phase(-theta)),
            ParametrizedGate::U3(theta, phi, lambda) => {
                Box::new(ParametrizedGate::U3(-theta, -lambda, -phi))
            }
            ParametrizedGate::CRz(theta) => Box::new(ParametrizedGate::CRz(-theta)),
            ParametrizedGate::CRx(theta) => Box::new(ParametrizedGate::CRx(-theta)),
            ParametrizedGate::CPhase(theta) => Box::new(ParametrizedGate::CPhase(-theta)),
        }
    }
}

/// `|0><0| ⊗ I + |1><1| ⊗ target`, control on the first qubit.
pub fn controlled(target: &Array2<Complex64>) -> Array2<Complex64> {
    let n = target.nrows();
    let mut matrix = identity(2 * n);
    matrix
        .slice_mut(ndarray::s![n.., n..])
        .assign(target);
    matrix
}
