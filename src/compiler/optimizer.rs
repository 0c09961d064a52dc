//! Driver for the basis-level optimization passes.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::passes::{cancel_adjacent_entanglers, fuse_rotations, remove_identity_rotations};
use super::sequence::InstructionSequence;
use super::wire::WireHistory;
use crate::error::CompileResult;

/// Optimization patterns over `{Rx, Rz, CZ}` sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationPattern {
    /// Drop rotations by exactly `0` or `2π`
    RemoveIdentityRotations,
    /// Cancel `CZ` pairs that are adjacent on both wires
    CancelAdjacentEntanglers,
    /// Sum consecutive same-axis rotations on a wire
    FuseRotations,
    /// All optimizations
    All,
}

/// Runs the enabled passes in a fixed order: identity elimination, entangler
/// cancellation, then rotation fusion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircuitOptimizer {
    /// Which optimization patterns to apply
    patterns: Vec<OptimizationPattern>,
    /// Maximum number of optimization passes
    max_passes: usize,
}

impl Default for CircuitOptimizer {
    fn default() -> Self {
        CircuitOptimizer {
            patterns: vec![OptimizationPattern::All],
            max_passes: 1,
        }
    }
}

impl CircuitOptimizer {
    /// Create a new circuit optimizer with specific optimization patterns
    pub fn new(patterns: Vec<OptimizationPattern>, max_passes: usize) -> Self {
        CircuitOptimizer {
            patterns,
            max_passes: max_passes.max(1),
        }
    }

    /// Repeat the passes until a round removes nothing.
    #[must_use]
    pub fn until_fixed_point(mut self) -> Self {
        self.max_passes = usize::MAX;
        self
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Check if a pattern is enabled
    pub fn is_pattern_enabled(&self, pattern: OptimizationPattern) -> bool {
        self.patterns.contains(&pattern) || self.patterns.contains(&OptimizationPattern::All)
    }

    /// Optimize `sequence` in place.
    ///
    /// Every pass validates the instructions it reads and fails with
    /// [`CompileError::MalformedSequence`](crate::error::CompileError::MalformedSequence)
    /// before rewriting anything it cannot interpret. The sequence never
    /// grows. At least one pass runs, whatever `max_passes` was deserialized
    /// as.
    pub fn optimize(&self, sequence: &mut InstructionSequence) -> CompileResult<OptimizationReport> {
        let max_passes = self.max_passes.max(1);
        let mut report = OptimizationReport::new(sequence.len());

        while report.passes < max_passes {
            let before = sequence.len();
            self.run_pass(sequence, &mut report)?;
            report.passes += 1;
            debug!(pass = report.passes, before, after = sequence.len(), "optimization pass");

            if sequence.len() == before {
                break;
            }
        }

        report.gates_after = sequence.len();
        info!(
            before = report.gates_before,
            after = report.gates_after,
            passes = report.passes,
            "optimized instruction sequence"
        );
        Ok(report)
    }

    fn run_pass(&self, sequence: &mut InstructionSequence, report: &mut OptimizationReport) -> CompileResult<()> {
        if self.is_pattern_enabled(OptimizationPattern::RemoveIdentityRotations) {
            report.identity_rotations_removed += remove_identity_rotations(sequence)?;
        }

        let history = if self.is_pattern_enabled(OptimizationPattern::CancelAdjacentEntanglers) {
            let cancellation = cancel_adjacent_entanglers(sequence)?;
            report.entanglers_cancelled += 2 * cancellation.pairs;
            cancellation.history
        } else {
            WireHistory::record(sequence)?
        };

        if self.is_pattern_enabled(OptimizationPattern::FuseRotations) {
            report.rotations_fused_away += fuse_rotations(sequence, history)?;
        }
        Ok(())
    }
}

/// What an optimization run removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub gates_before: usize,
    pub gates_after: usize,
    pub identity_rotations_removed: usize,
    /// Individual `CZ` instructions removed, two per cancelled pair.
    pub entanglers_cancelled: usize,
    pub rotations_fused_away: usize,
    pub passes: usize,
}

impl OptimizationReport {
    fn new(gates_before: usize) -> Self {
        OptimizationReport {
            gates_before,
            gates_after: gates_before,
            ..Default::default()
        }
    }

    pub fn removed(&self) -> usize {
        self.gates_before - self.gates_after
    }

    /// Fraction of instructions removed, `0.0` for an empty input.
    pub fn reduction_ratio(&self) -> f64 {
        if self.gates_before == 0 {
            0.0
        } else {
            self.removed() as f64 / self.gates_before as f64
        }
    }
}
