//! Lowering to the `{Rx, Rz, CZ}` basis and peephole optimization.
//!
//! [`Compiler`] ties the two stages together: a circuit is lowered through
//! a [`UnitaryDecomposer`] into an [`InstructionSequence`], then the
//! [`CircuitOptimizer`] removes identity rotations, cancels adjacent `CZ`
//! pairs and fuses same-axis rotations.

pub mod decompose;
pub mod instruction;
pub mod lowering;
pub mod optimizer;
pub mod passes;
pub mod sequence;
pub mod wire;

use rayon::prelude::*;
use tracing::info;

pub use decompose::{BasisDecomposer, EulerBasis, UnitaryDecomposer};
pub use instruction::{GateKind, Instruction, InstructionId, FULL_TURN};
pub use lowering::{lower_to_basis, LoweringOptions};
pub use optimizer::{CircuitOptimizer, OptimizationPattern, OptimizationReport};
pub use sequence::InstructionSequence;
pub use wire::{WireHistory, WireTag};

use crate::error::CompileResult;
use crate::quantum::circuit::QuantumCircuit;

/// Lowering followed by optimization.
#[derive(Debug, Clone, Default)]
pub struct Compiler<D = BasisDecomposer> {
    decomposer: D,
    lowering: LoweringOptions,
    optimizer: CircuitOptimizer,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: UnitaryDecomposer> Compiler<D> {
    /// Compile with a custom decomposer.
    pub fn with_decomposer(decomposer: D) -> Self {
        Compiler {
            decomposer,
            lowering: LoweringOptions::default(),
            optimizer: CircuitOptimizer::default(),
        }
    }

    #[must_use]
    pub fn with_optimizer(mut self, optimizer: CircuitOptimizer) -> Self {
        self.optimizer = optimizer;
        self
    }

    #[must_use]
    pub fn with_lowering_options(mut self, options: LoweringOptions) -> Self {
        self.lowering = options;
        self
    }

    pub fn decomposer(&self) -> &D {
        &self.decomposer
    }

    pub fn optimizer(&self) -> &CircuitOptimizer {
        &self.optimizer
    }

    /// Lower `circuit` and optimize the result.
    pub fn compile(&self, circuit: &QuantumCircuit) -> CompileResult<Compilation> {
        let mut sequence = lower_to_basis(circuit, &self.decomposer, &self.lowering)?;
        let lowered_len = sequence.len();
        let report = self.optimizer.optimize(&mut sequence)?;
        info!(gates = circuit.gate_count(), lowered_len, optimized = sequence.len(), "compiled circuit");
        Ok(Compilation {
            sequence,
            report,
            lowered_len,
        })
    }

    /// Compile independent circuits in parallel. Results keep input order.
    pub fn compile_many(&self, circuits: &[QuantumCircuit]) -> Vec<CompileResult<Compilation>>
    where
        D: Sync,
    {
        circuits.par_iter().map(|circuit| self.compile(circuit)).collect()
    }
}

/// Output of [`Compiler::compile`].
#[derive(Debug, Clone)]
pub struct Compilation {
    pub sequence: InstructionSequence,
    pub report: OptimizationReport,
    /// Length of the sequence straight after lowering.
    pub lowered_len: usize,
}

impl Compilation {
    pub fn to_circuit(&self) -> QuantumCircuit {
        self.sequence.to_circuit()
    }
}
