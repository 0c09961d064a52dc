// src/quantum/circuit.rs
//! Gate-list circuits: the input to lowering and the shape of its output.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{CompileError, CompileResult};
use crate::quantum::gate::{ParametrizedGate, QuantumGate, StandardGate};
use crate::quantum::unitary::{embed, identity};

/// A quantum circuit consisting of a sequence of gates
#[derive(Debug, Clone)]
pub struct QuantumCircuit {
    pub gates: Vec<(Box<dyn QuantumGate>, Vec<usize>)>,
    pub qubit_count: usize,
    /// Classical bits are carried through compilation untouched.
    pub clbit_count: usize,
}

impl QuantumCircuit {
    /// Create a new empty quantum circuit
    pub fn new(qubit_count: usize) -> Self {
        Self::with_clbits(qubit_count, 0)
    }

    pub fn with_clbits(qubit_count: usize, clbit_count: usize) -> Self {
        QuantumCircuit {
            gates: Vec::new(),
            qubit_count,
            clbit_count,
        }
    }

    /// Append a gate applied to `qubits`, in the gate's own qubit order.
    pub fn add_gate(&mut self, gate: Box<dyn QuantumGate>, qubits: &[usize]) -> CompileResult<()> {
        for &q in qubits {
            if q >= self.qubit_count {
                return Err(CompileError::QubitOutOfRange {
                    qubit: q,
                    qubit_count: self.qubit_count,
                });
            }
        }

        if gate.qubit_count() != qubits.len() {
            return Err(CompileError::TargetCountMismatch {
                gate: gate.name(),
                expected: gate.qubit_count(),
                got: qubits.len(),
            });
        }

        for (i, q) in qubits.iter().enumerate() {
            if qubits[..i].contains(q) {
                return Err(CompileError::DuplicateTarget {
                    gate: gate.name(),
                    qubit: *q,
                });
            }
        }

        self.gates.push((gate, qubits.to_vec()));
        Ok(())
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Unitary of the whole register, gates applied in list order.
    ///
    /// Dense `2^n × 2^n`; meant for checking small circuits.
    pub fn unitary(&self) -> Array2<Complex64> {
        self.gates
            .iter()
            .fold(identity(1 << self.qubit_count), |acc, (gate, qubits)| {
                embed(&gate.matrix(), qubits, self.qubit_count).dot(&acc)
            })
    }
}

/// Fluent construction of a [`QuantumCircuit`]
pub struct CircuitBuilder {
    circuit: QuantumCircuit,
}

impl CircuitBuilder {
    /// Create a new circuit builder
    pub fn new(qubit_count: usize) -> Self {
        CircuitBuilder {
            circuit: QuantumCircuit::new(qubit_count),
        }
    }

    pub fn with_clbits(qubit_count: usize, clbit_count: usize) -> Self {
        CircuitBuilder {
            circuit: QuantumCircuit::with_clbits(qubit_count, clbit_count),
        }
    }

    /// Build the quantum circuit
    pub fn build(self) -> QuantumCircuit {
        self.circuit
    }

    pub fn add_gate<G: QuantumGate + 'static>(&mut self, gate: G, qubits: &[usize]) -> CompileResult<()> {
        self.circuit.add_gate(Box::new(gate), qubits)
    }

    /// Add a Hadamard gate
    pub fn h(&mut self, qubit: usize) -> CompileResult<()> {
        self.add_gate(StandardGate::H, &[qubit])
    }

    /// Add a Pauli-X gate
    pub fn x(&mut self, qubit: usize) -> CompileResult<()> {
        self.add_gate(StandardGate::X, &[qubit])
    }

    pub fn rx(&mut self, theta: f64, qubit: usize) -> CompileResult<()> {
        self.add_gate(ParametrizedGate::Rx(theta), &[qubit])
    }

    pub fn rz(&mut self, theta: f64, qubit: usize) -> CompileResult<()> {
        self.add_gate(ParametrizedGate::Rz(theta), &[qubit])
    }

    /// Add a CNOT gate
    pub fn cx(&mut self, control: usize, target: usize) -> CompileResult<()> {
        self.add_gate(StandardGate::CNOT, &[control, target])
    }

    pub fn cz(&mut self, a: usize, b: usize) -> CompileResult<()> {
        self.add_gate(StandardGate::CZ, &[a, b])
    }
}
