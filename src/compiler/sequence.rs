//! The instruction sequence shared by lowering and every optimizer pass.
//!
//! Instructions live in an arena ordered by program position. Each one keeps
//! a permanent [`InstructionId`]; removal only marks a slot dead, and
//! [`InstructionSequence::compact`] drops dead slots in one sweep. Captured
//! ids therefore never go stale when earlier or later instructions are
//! removed, which is what lets the wire history survive cancellation.

use serde::{Deserialize, Serialize};

use super::instruction::{Instruction, InstructionId};
use crate::error::{CompileError, CompileResult};
use crate::quantum::circuit::QuantumCircuit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Slot {
    id: InstructionId,
    instruction: Instruction,
    live: bool,
}

/// Ordered, basis-restricted program over a fixed qubit register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionSequence {
    qubit_count: usize,
    clbit_count: usize,
    slots: Vec<Slot>,
    next_id: usize,
    dead: usize,
}

impl InstructionSequence {
    pub fn new(qubit_count: usize) -> Self {
        Self::with_clbits(qubit_count, 0)
    }

    pub fn with_clbits(qubit_count: usize, clbit_count: usize) -> Self {
        InstructionSequence {
            qubit_count,
            clbit_count,
            slots: Vec::new(),
            next_id: 0,
            dead: 0,
        }
    }

    /// Build a sequence from instructions in program order.
    pub fn from_instructions<I>(qubit_count: usize, instructions: I) -> CompileResult<Self>
    where
        I: IntoIterator<Item = Instruction>,
    {
        let mut sequence = Self::new(qubit_count);
        for instruction in instructions {
            sequence.push(instruction)?;
        }
        Ok(sequence)
    }

    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    pub fn clbit_count(&self) -> usize {
        self.clbit_count
    }

    /// Append an instruction at the end of the program.
    pub fn push(&mut self, instruction: Instruction) -> CompileResult<InstructionId> {
        if let Some(&qubit) = instruction.targets.iter().find(|&&q| q >= self.qubit_count) {
            return Err(CompileError::QubitOutOfRange {
                qubit,
                qubit_count: self.qubit_count,
            });
        }

        let id = self.next_id();
        self.next_id += 1;
        self.slots.push(Slot {
            id,
            instruction,
            live: true,
        });
        Ok(id)
    }

    /// Id the next pushed instruction will receive.
    pub fn next_id(&self) -> InstructionId {
        InstructionId(self.next_id)
    }

    /// Number of live instructions.
    pub fn len(&self) -> usize {
        self.slots.len() - self.dead
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live instructions in program order.
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.entries().map(|(_, instruction)| instruction)
    }

    /// Live instructions in program order, with their ids.
    pub fn entries(&self) -> impl Iterator<Item = (InstructionId, &Instruction)> + '_ {
        self.slots
            .iter()
            .filter(|slot| slot.live)
            .map(|slot| (slot.id, &slot.instruction))
    }

    pub fn ids(&self) -> Vec<InstructionId> {
        self.entries().map(|(id, _)| id).collect()
    }

    pub fn get(&self, id: InstructionId) -> Option<&Instruction> {
        self.slot(id).map(|at| &self.slots[at].instruction)
    }

    pub fn get_mut(&mut self, id: InstructionId) -> Option<&mut Instruction> {
        let at = self.slot(id)?;
        Some(&mut self.slots[at].instruction)
    }

    /// Current program position of a live instruction.
    pub fn position(&self, id: InstructionId) -> Option<usize> {
        let at = self.slot(id)?;
        Some(self.slots[..at].iter().filter(|slot| slot.live).count())
    }

    /// Mark an instruction dead. Returns `false` if it was not live.
    ///
    /// The slot stays in place until [`compact`](Self::compact), so every
    /// other id and the relative order of the survivors are unaffected.
    pub fn remove(&mut self, id: InstructionId) -> bool {
        match self.slot(id) {
            Some(at) => {
                self.slots[at].live = false;
                self.dead += 1;
                true
            }
            None => false,
        }
    }

    /// Drop every dead slot. Positions re-pack; ids are unchanged.
    pub fn compact(&mut self) {
        if self.dead > 0 {
            self.slots.retain(|slot| slot.live);
            self.dead = 0;
        }
    }

    /// Live instructions, cloned in program order.
    pub fn instructions(&self) -> Vec<Instruction> {
        self.iter().cloned().collect()
    }

    /// Convert into a circuit over `Rx`, `Rz` and `CZ` gates.
    pub fn to_circuit(&self) -> QuantumCircuit {
        let mut circuit = QuantumCircuit::with_clbits(self.qubit_count, self.clbit_count);
        for instruction in self.iter() {
            circuit.gates.push((instruction.to_gate(), instruction.targets.clone()));
        }
        circuit
    }

    // Ids grow with program order and compaction keeps that order, so the
    // slot of an id can be found by binary search.
    fn slot(&self, id: InstructionId) -> Option<usize> {
        self.slots
            .binary_search_by_key(&id, |slot| slot.id)
            .ok()
            .filter(|&at| self.slots[at].live)
    }
}

impl<'a> IntoIterator for &'a InstructionSequence {
    type Item = &'a Instruction;
    type IntoIter = Box<dyn Iterator<Item = &'a Instruction> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
