//! Adjacent cancellation of self-inverse entangling gates.

use tracing::trace;

use crate::compiler::instruction::GateKind;
use crate::compiler::sequence::InstructionSequence;
use crate::compiler::wire::{WireHistory, WireTag};
use crate::error::CompileResult;

/// Result of [`cancel_adjacent_entanglers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    /// History of every surviving instruction, per wire.
    pub history: WireHistory,
    /// Number of removed entangler pairs.
    pub pairs: usize,
}

/// Remove pairs of `CZ` on the same qubit pair that are each other's direct
/// neighbour on both wires.
///
/// The scan keeps one stack of tags per wire. A `CZ` on `(a, b)` cancels
/// when the top of both stacks is the same earlier `CZ`; both are deleted
/// and that tag is popped, which re-exposes whatever preceded the pair so a
/// following `CZ` can cancel against it. Any other instruction on either
/// wire breaks adjacency. The returned history describes the sequence after
/// cancellation.
///
/// Every instruction is validated before the scan starts, so a malformed
/// sequence is returned untouched.
pub fn cancel_adjacent_entanglers(sequence: &mut InstructionSequence) -> CompileResult<Cancellation> {
    let qubit_count = sequence.qubit_count();
    for (id, instruction) in sequence.entries() {
        instruction.validate(id, qubit_count)?;
    }

    let mut history = WireHistory::new(qubit_count);
    let mut pairs = 0;

    for id in sequence.ids() {
        let Some(instruction) = sequence.get(id) else {
            continue;
        };
        let kind = instruction.kind;

        match kind {
            GateKind::Entangle => {
                let (a, b) = (instruction.targets[0], instruction.targets[1]);
                let partner = match (history.top(a), history.top(b)) {
                    (Some(top_a), Some(top_b))
                        if top_a.kind == GateKind::Entangle && top_a.id == top_b.id =>
                    {
                        Some(top_a.id)
                    }
                    _ => None,
                };

                match partner {
                    Some(earlier) => {
                        trace!(%earlier, later = %id, a, b, "cancelled entangler pair");
                        sequence.remove(id);
                        sequence.remove(earlier);
                        history.pop(a);
                        history.pop(b);
                        pairs += 1;
                    }
                    None => {
                        history.push(a, WireTag { kind, id });
                        history.push(b, WireTag { kind, id });
                    }
                }
            }
            GateKind::RotateX | GateKind::RotateZ => {
                let qubit = instruction.targets[0];
                history.push(qubit, WireTag { kind, id });
            }
        }
    }

    sequence.compact();
    Ok(Cancellation { history, pairs })
}
