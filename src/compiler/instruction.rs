//! Basis-restricted instructions, the unit every optimizer pass rewrites.

use std::f64::consts::TAU;
use std::fmt;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};
use crate::quantum::gate::{ParametrizedGate, QuantumGate, StandardGate};

/// One full turn. Rotations by exactly this angle (or zero) are identities.
pub const FULL_TURN: f64 = TAU;

/// The three gate kinds of the target basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKind {
    RotateX,
    RotateZ,
    /// Controlled-Z, the self-inverse entangling gate.
    Entangle,
}

impl GateKind {
    pub fn is_rotation(self) -> bool {
        matches!(self, GateKind::RotateX | GateKind::RotateZ)
    }

    /// Number of targets an instruction of this kind must carry.
    pub fn arity(self) -> usize {
        match self {
            GateKind::RotateX | GateKind::RotateZ => 1,
            GateKind::Entangle => 2,
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GateKind::RotateX => "rx",
            GateKind::RotateZ => "rz",
            GateKind::Entangle => "cz",
        };
        f.write_str(name)
    }
}

/// Permanent identity of an instruction inside an
/// [`InstructionSequence`](super::sequence::InstructionSequence).
///
/// Ids are handed out in program order and never reused, so they stay valid
/// while other instructions are removed around them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstructionId(pub(crate) usize);

impl InstructionId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single applied basis gate.
///
/// `angle` is meaningful for rotations only and is kept at `0.0` for
/// entangling instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: GateKind,
    pub angle: f64,
    pub targets: Vec<usize>,
}

impl Instruction {
    pub fn rx(angle: f64, qubit: usize) -> Self {
        Self::rotation(GateKind::RotateX, angle, qubit)
    }

    pub fn rz(angle: f64, qubit: usize) -> Self {
        Self::rotation(GateKind::RotateZ, angle, qubit)
    }

    pub fn cz(a: usize, b: usize) -> Self {
        Instruction {
            kind: GateKind::Entangle,
            angle: 0.0,
            targets: vec![a, b],
        }
    }

    pub fn rotation(kind: GateKind, angle: f64, qubit: usize) -> Self {
        Instruction {
            kind,
            angle,
            targets: vec![qubit],
        }
    }

    /// Check that the target list agrees with the gate kind.
    ///
    /// Optimizer passes call this before trusting `targets`; a mismatch is a
    /// broken invariant, reported as [`CompileError::MalformedSequence`].
    pub fn validate(&self, id: InstructionId, qubit_count: usize) -> CompileResult<()> {
        let malformed = |reason| CompileError::MalformedSequence {
            id,
            kind: self.kind,
            targets: self.targets.clone(),
            reason,
        };

        if self.targets.len() != self.kind.arity() {
            return Err(malformed("target count does not match gate kind"));
        }
        if self.targets.iter().any(|&q| q >= qubit_count) {
            return Err(malformed("target outside the register"));
        }
        if self.kind == GateKind::Entangle && self.targets[0] == self.targets[1] {
            return Err(malformed("entangling gate on a single wire"));
        }
        Ok(())
    }

    /// Rotation by exactly zero or one full turn.
    pub fn is_identity_rotation(&self) -> bool {
        self.kind.is_rotation() && (self.angle == 0.0 || self.angle == FULL_TURN)
    }

    /// Matrix over this instruction's own targets.
    pub fn matrix(&self) -> Array2<Complex64> {
        self.to_gate().matrix()
    }

    /// The equivalent gate of the circuit model.
    pub fn to_gate(&self) -> Box<dyn QuantumGate> {
        match self.kind {
            GateKind::RotateX => Box::new(ParametrizedGate::Rx(self.angle)),
            GateKind::RotateZ => Box::new(ParametrizedGate::Rz(self.angle)),
            GateKind::Entangle => Box::new(StandardGate::CZ),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.kind.is_rotation() {
            write!(f, "({:.4})", self.angle)?;
        }
        for (i, qubit) in self.targets.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}q{}", sep, qubit)?;
        }
        Ok(())
    }
}
