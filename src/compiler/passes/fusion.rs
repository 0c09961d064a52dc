//! Fusion of consecutive same-axis rotations.

use std::collections::HashMap;
use std::f64::consts::TAU;

use tracing::trace;

use crate::compiler::instruction::InstructionId;
use crate::compiler::sequence::InstructionSequence;
use crate::compiler::wire::{WireHistory, WireTag};
use crate::error::{CompileError, CompileResult};

/// Round to two decimals, the resolution at which fused angles are compared
/// against a full turn.
fn round2(angle: f64) -> f64 {
    (angle * 100.0).round() / 100.0
}

/// Whether a fused rotation angle is a no-op.
///
/// The angle is reduced into `[0, 2π)` and rounded to two decimals; it is a
/// no-op when that lands on `0.00` or on `round2(2π) = 6.28`. The loose
/// tolerance absorbs the drift of numerically synthesized angles, so
/// `Rz(3.1408)·Rz(3.1416)` counts as a full turn.
pub fn is_fused_noop(angle: f64) -> bool {
    let reduced = round2(angle.rem_euclid(TAU));
    reduced == 0.0 || reduced == round2(TAU)
}

/// Merge runs of same-axis rotations that are adjacent on their wire.
///
/// `history` must describe `sequence` as it is now (see
/// [`cancel_adjacent_entanglers`](super::cancel_adjacent_entanglers) and
/// [`WireHistory::record`]). For every adjacent pair of tags with the same
/// rotation kind the later instruction takes the summed angle and the earlier
/// one is scheduled for deletion. If the sum is a no-op the later instruction
/// goes too, and its former neighbours are compared again. Summed angles and
/// deletions are staged while the wires are scanned and applied only once the
/// whole scan has succeeded, so an error leaves `sequence` untouched. Returns
/// the number of removed instructions.
pub fn fuse_rotations(sequence: &mut InstructionSequence, history: WireHistory) -> CompileResult<usize> {
    let mut fused: HashMap<InstructionId, f64> = HashMap::new();
    let mut victims = Vec::new();

    for (qubit, mut wire) in history.into_wires().into_iter().enumerate() {
        let mut i = 1;
        while i < wire.len() {
            let (earlier, later) = (wire[i - 1], wire[i]);
            if !(earlier.kind.is_rotation() && earlier.kind == later.kind) {
                i += 1;
                continue;
            }

            let sum =
                rotation_angle(sequence, &fused, earlier)? + rotation_angle(sequence, &fused, later)?;
            fused.insert(later.id, sum);
            victims.push(earlier.id);
            wire.remove(i - 1);
            trace!(qubit, earlier = %earlier.id, later = %later.id, sum, "fused rotations");

            if is_fused_noop(sum) {
                trace!(qubit, id = %later.id, sum, "fused rotation is a no-op");
                victims.push(later.id);
                wire.remove(i - 1);
                i = (i - 1).max(1);
            }
        }
    }

    for (id, angle) in fused {
        if let Some(instruction) = sequence.get_mut(id) {
            instruction.angle = angle;
        }
    }
    for &id in &victims {
        sequence.remove(id);
    }
    sequence.compact();
    Ok(victims.len())
}

/// Current angle behind `tag`, preferring a sum staged earlier in the scan.
fn rotation_angle(
    sequence: &InstructionSequence,
    fused: &HashMap<InstructionId, f64>,
    tag: WireTag,
) -> CompileResult<f64> {
    match sequence.get(tag.id) {
        Some(instruction) if instruction.kind == tag.kind => {
            Ok(fused.get(&tag.id).copied().unwrap_or(instruction.angle))
        }
        _ => Err(CompileError::StaleWireTag(tag.id)),
    }
}
