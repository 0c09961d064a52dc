//! Basis lowering: rewrite every gate of a circuit through a decomposer and
//! splice the results into one instruction sequence.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::decompose::{EulerBasis, UnitaryDecomposer};
use super::instruction::Instruction;
use super::sequence::InstructionSequence;
use crate::error::{CompileError, CompileResult, DecomposeError};
use crate::quantum::circuit::QuantumCircuit;

/// Options forwarded to the decomposer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoweringOptions {
    /// Minimum fidelity of every two-qubit decomposition.
    pub fidelity: f64,
    pub euler_basis: EulerBasis,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        LoweringOptions {
            fidelity: 1.0,
            euler_basis: EulerBasis::Zxz,
        }
    }
}

impl LoweringOptions {
    #[must_use]
    pub fn with_fidelity(mut self, fidelity: f64) -> Self {
        self.fidelity = fidelity;
        self
    }

    #[must_use]
    pub fn with_euler_basis(mut self, basis: EulerBasis) -> Self {
        self.euler_basis = basis;
        self
    }
}

/// Lower `circuit` to `{Rx, Rz, CZ}` instructions.
///
/// The output has the same qubit and classical-bit extent as the input.
/// Gates on more than two qubits fail with
/// [`CompileError::UnsupportedGateArity`]; decomposer errors are returned
/// as [`CompileError::DecomposerFailure`].
pub fn lower_to_basis<D>(
    circuit: &QuantumCircuit,
    decomposer: &D,
    options: &LoweringOptions,
) -> CompileResult<InstructionSequence>
where
    D: UnitaryDecomposer + ?Sized,
{
    let mut sequence = InstructionSequence::with_clbits(circuit.qubit_count, circuit.clbit_count);

    for (gate, positions) in &circuit.gates {
        let failure = |source| CompileError::DecomposerFailure {
            gate: gate.name(),
            source,
        };

        let local = match positions.len() {
            1 => decomposer
                .decompose_single_qubit(&gate.matrix(), options.euler_basis)
                .map_err(failure)?,
            2 => decomposer
                .decompose_two_qubit(&gate.matrix(), options.fidelity, options.euler_basis)
                .map_err(failure)?,
            arity => {
                return Err(CompileError::UnsupportedGateArity {
                    gate: gate.name(),
                    arity,
                })
            }
        };

        trace!(gate = %gate.name(), ?positions, emitted = local.len(), "lowered gate");
        for instruction in local {
            let remapped = remap(instruction, positions).map_err(failure)?;
            remapped.validate(sequence.next_id(), sequence.qubit_count())?;
            sequence.push(remapped)?;
        }
    }

    debug!(
        gates = circuit.gate_count(),
        instructions = sequence.len(),
        "lowered circuit to basis"
    );
    Ok(sequence)
}

/// Map local slots to the absolute qubits the lowered gate targeted.
fn remap(mut instruction: Instruction, positions: &[usize]) -> Result<Instruction, DecomposeError> {
    for slot in instruction.targets.iter_mut() {
        *slot = *positions.get(*slot).ok_or(DecomposeError::SlotOutOfRange {
            slot: *slot,
            available: positions.len(),
        })?;
    }
    Ok(instruction)
}
