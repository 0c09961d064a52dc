// src/quantum/mod.rs
//! Gate-level quantum circuits
//!
//! Gates are described by their unitary matrices; circuits are ordered gate
//! lists over a fixed qubit register. This is the input side of lowering.

pub mod circuit;
pub mod gate;
pub mod unitary;

pub use circuit::{CircuitBuilder, QuantumCircuit};
pub use gate::{CustomMatrixGate, ParametrizedGate, QuantumGate, StandardGate};

/// Re-export commonly used types and traits
pub mod prelude {
    pub use super::{CustomMatrixGate, ParametrizedGate, QuantumGate, StandardGate};
    pub use super::{CircuitBuilder, QuantumCircuit};
}
