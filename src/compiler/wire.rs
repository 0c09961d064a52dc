//! Per-qubit execution history.

use super::instruction::{GateKind, InstructionId};
use super::sequence::InstructionSequence;
use crate::error::CompileResult;

/// One entry on a wire: which kind of gate touched the qubit, and which
/// instruction it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireTag {
    pub kind: GateKind,
    pub id: InstructionId,
}

/// One stack of [`WireTag`]s per qubit, in program order.
///
/// Tags store instruction ids rather than positions, so the history stays
/// valid after the sequence it was recorded from is compacted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireHistory {
    wires: Vec<Vec<WireTag>>,
}

impl WireHistory {
    pub fn new(qubit_count: usize) -> Self {
        WireHistory {
            wires: vec![Vec::new(); qubit_count],
        }
    }

    /// Record every live instruction of `sequence` without rewriting it.
    pub fn record(sequence: &InstructionSequence) -> CompileResult<Self> {
        let mut history = Self::new(sequence.qubit_count());
        for (id, instruction) in sequence.entries() {
            instruction.validate(id, sequence.qubit_count())?;
            for &qubit in &instruction.targets {
                history.push(qubit, WireTag { kind: instruction.kind, id });
            }
        }
        Ok(history)
    }

    pub fn qubit_count(&self) -> usize {
        self.wires.len()
    }

    pub fn push(&mut self, qubit: usize, tag: WireTag) {
        self.wires[qubit].push(tag);
    }

    pub fn pop(&mut self, qubit: usize) -> Option<WireTag> {
        self.wires[qubit].pop()
    }

    /// Most recent instruction seen on `qubit`.
    pub fn top(&self, qubit: usize) -> Option<&WireTag> {
        self.wires[qubit].last()
    }

    pub fn wire(&self, qubit: usize) -> &[WireTag] {
        &self.wires[qubit]
    }

    pub fn into_wires(self) -> Vec<Vec<WireTag>> {
        self.wires
    }
}
