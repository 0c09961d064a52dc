//! Error types for lowering and optimization.

use thiserror::Error;

use crate::compiler::instruction::{GateKind, InstructionId};

/// Failures reported by a [`UnitaryDecomposer`](crate::compiler::decompose::UnitaryDecomposer).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecomposeError {
    #[error("expected a {expected}x{expected} matrix, got {rows}x{cols}")]
    InvalidShape {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("matrix is not unitary (deviation {deviation:.3e})")]
    NotUnitary { deviation: f64 },

    #[error("unsupported two-qubit structure: {0}")]
    UnsupportedStructure(String),

    #[error("synthesis reached fidelity {achieved:.12}, below the target {target}")]
    FidelityNotReached { achieved: f64, target: f64 },

    #[error("decomposition targets local slot {slot}, but the gate only has {available}")]
    SlotOutOfRange { slot: usize, available: usize },
}

/// Errors surfaced by circuit construction, basis lowering and the optimizer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("gate {gate} acts on {arity} qubits; only 1- and 2-qubit gates can be lowered")]
    UnsupportedGateArity { gate: String, arity: usize },

    #[error("decomposition of {gate} failed: {source}")]
    DecomposerFailure {
        gate: String,
        #[source]
        source: DecomposeError,
    },

    #[error("malformed instruction {id}: {kind:?} on {targets:?} ({reason})")]
    MalformedSequence {
        id: InstructionId,
        kind: GateKind,
        targets: Vec<usize>,
        reason: &'static str,
    },

    #[error("qubit index {qubit} out of range for a {qubit_count}-qubit register")]
    QubitOutOfRange { qubit: usize, qubit_count: usize },

    #[error("gate {gate} acts on {expected} qubits, but {got} targets were given")]
    TargetCountMismatch {
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("qubit {qubit} appears more than once in the targets of {gate}")]
    DuplicateTarget { gate: String, qubit: usize },

    #[error("wire history refers to instruction {0}, which is not in the sequence")]
    StaleWireTag(InstructionId),
}

pub type CompileResult<T> = Result<T, CompileError>;
