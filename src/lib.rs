//! Basis lowering and peephole optimization for quantum circuits
//!
//! This crate rewrites gate-level circuits into the hardware basis
//! `{Rx, Rz, CZ}` through a pluggable unitary decomposer, and then shrinks
//! the result with three passes: identity-rotation elimination, adjacent
//! `CZ` cancellation and same-axis rotation fusion.

pub mod compiler;
pub mod error;
pub mod quantum;

// Create a prelude module for convenient imports
pub mod prelude {
    pub use crate::compiler::{
        BasisDecomposer, Compilation, Compiler, CircuitOptimizer, EulerBasis, GateKind,
        Instruction, InstructionId, InstructionSequence, LoweringOptions, OptimizationPattern,
        OptimizationReport, UnitaryDecomposer,
    };
    pub use crate::error::{CompileError, CompileResult, DecomposeError};
    pub use crate::quantum::prelude::*;
}

// Version and crate information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
