//! Identity-rotation elimination.

use tracing::trace;

use crate::compiler::sequence::InstructionSequence;
use crate::error::CompileResult;

/// Remove rotations by exactly `0` or exactly one full turn.
///
/// The comparison is bit-exact against `0.0` and [`FULL_TURN`]; angles that
/// are merely close are left alone. Returns the number of removed
/// instructions.
///
/// [`FULL_TURN`]: crate::compiler::instruction::FULL_TURN
pub fn remove_identity_rotations(sequence: &mut InstructionSequence) -> CompileResult<usize> {
    let qubit_count = sequence.qubit_count();
    let mut victims = Vec::new();
    for (id, instruction) in sequence.entries() {
        instruction.validate(id, qubit_count)?;
        if instruction.is_identity_rotation() {
            trace!(%id, %instruction, "identity rotation");
            victims.push(id);
        }
    }

    for &id in &victims {
        sequence.remove(id);
    }
    sequence.compact();
    Ok(victims.len())
}
