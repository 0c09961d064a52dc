//optimizer_tests.rs

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::{FRAC_PI_4, PI, TAU};

    use basis_lower::compiler::passes::is_fused_noop;
    use basis_lower::compiler::{
        CircuitOptimizer, GateKind, Instruction, InstructionSequence, OptimizationPattern,
    };
    use basis_lower::error::CompileError;
    use basis_lower::quantum::unitary::equal_up_to_global_phase;

    fn sequence(qubits: usize, instructions: Vec<Instruction>) -> InstructionSequence {
        InstructionSequence::from_instructions(qubits, instructions).unwrap()
    }

    fn on_wire(sequence: &InstructionSequence, qubit: usize) -> Vec<Instruction> {
        sequence
            .iter()
            .filter(|i| i.targets.contains(&qubit))
            .cloned()
            .collect()
    }

    /// Random basis sequence; angles are multiples of π/4 when `grid` is set.
    fn random_sequence(rng: &mut StdRng, qubits: usize, len: usize, grid: bool) -> InstructionSequence {
        let mut seq = InstructionSequence::new(qubits);
        for _ in 0..len {
            let roll = rng.gen_range(0..10);
            let instruction = if roll < 3 {
                let a = rng.gen_range(0..qubits);
                let b = (a + rng.gen_range(1..qubits)) % qubits;
                Instruction::cz(a, b)
            } else {
                let angle = if grid {
                    FRAC_PI_4 * rng.gen_range(0..8) as f64
                } else {
                    rng.gen_range(-PI..PI)
                };
                let qubit = rng.gen_range(0..qubits);
                if roll < 7 {
                    Instruction::rz(angle, qubit)
                } else {
                    Instruction::rx(angle, qubit)
                }
            };
            seq.push(instruction).unwrap();
        }
        seq
    }

    #[test]
    fn test_adjacent_entanglers_cancel_completely() {
        let mut seq = sequence(2, vec![Instruction::cz(0, 1), Instruction::cz(0, 1)]);
        let report = CircuitOptimizer::default().optimize(&mut seq).unwrap();
        assert!(seq.is_empty());
        assert_eq!(report.entanglers_cancelled, 2);
    }

    #[test]
    fn test_activity_on_other_wires_does_not_block_cancellation() {
        let mut seq = sequence(
            3,
            vec![
                Instruction::cz(0, 1),
                Instruction::rx(0.4, 2),
                Instruction::cz(0, 1),
            ],
        );
        CircuitOptimizer::default().optimize(&mut seq).unwrap();
        assert_eq!(seq.instructions(), vec![Instruction::rx(0.4, 2)]);
    }

    #[test]
    fn test_intervening_rotation_blocks_cancellation() {
        let mut seq = sequence(
            2,
            vec![
                Instruction::cz(0, 1),
                Instruction::rz(0.7, 0),
                Instruction::cz(0, 1),
            ],
        );
        CircuitOptimizer::default().optimize(&mut seq).unwrap();
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_three_rotations_fuse_into_their_sum() {
        let (t1, t2, t3) = (0.3, 0.45, 1.1);
        let mut seq = sequence(
            2,
            vec![
                Instruction::rx(t1, 1),
                Instruction::rz(0.2, 0),
                Instruction::rx(t2, 1),
                Instruction::rx(t3, 1),
            ],
        );
        CircuitOptimizer::default().optimize(&mut seq).unwrap();

        let wire = on_wire(&seq, 1);
        assert_eq!(wire.len(), 1);
        assert_eq!(wire[0].kind, GateKind::RotateX);
        assert!((wire[0].angle - (t1 + t2 + t3)).abs() < 1e-12);
        assert_eq!(on_wire(&seq, 0), vec![Instruction::rz(0.2, 0)]);
    }

    #[test]
    fn test_rotations_summing_to_a_full_turn_vanish() {
        let mut seq = sequence(
            1,
            vec![
                Instruction::rz(2.0, 0),
                Instruction::rz(3.0, 0),
                Instruction::rz(TAU - 5.0 + 0.003, 0),
            ],
        );
        assert!(is_fused_noop(TAU + 0.003));
        let report = CircuitOptimizer::default().optimize(&mut seq).unwrap();
        assert!(seq.is_empty());
        assert_eq!(report.rotations_fused_away, 3);
    }

    #[test]
    fn test_identity_elimination_is_exact() {
        let mut seq = sequence(
            1,
            vec![
                Instruction::rz(0.0, 0),
                Instruction::rx(1e-12, 0),
                Instruction::rz(TAU, 0),
            ],
        );
        let optimizer = CircuitOptimizer::new(vec![OptimizationPattern::RemoveIdentityRotations], 1);
        let report = optimizer.optimize(&mut seq).unwrap();
        assert_eq!(report.identity_rotations_removed, 2);
        assert_eq!(seq.instructions(), vec![Instruction::rx(1e-12, 0)]);
    }

    #[test]
    fn test_length_never_increases() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let len = rng.gen_range(0..40);
            let mut seq = random_sequence(&mut rng, 4, len, false);
            let before = seq.len();
            let report = CircuitOptimizer::default().optimize(&mut seq).unwrap();
            assert!(seq.len() <= before);
            assert_eq!(report.gates_before, before);
            assert_eq!(report.gates_after, seq.len());
            assert_eq!(
                report.removed(),
                report.identity_rotations_removed
                    + report.entanglers_cancelled
                    + report.rotations_fused_away
            );
        }
    }

    #[test]
    fn test_optimization_preserves_the_unitary() {
        // grid angles keep every fused no-op an exact multiple of 2π
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let mut seq = random_sequence(&mut rng, 3, 30, true);
            let before = seq.to_circuit().unitary();
            CircuitOptimizer::default()
                .until_fixed_point()
                .optimize(&mut seq)
                .unwrap();
            let after = seq.to_circuit().unitary();
            assert!(equal_up_to_global_phase(&after, &before, 1e-8));
        }
    }

    #[test]
    fn test_optimized_sequences_are_fixed_points() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let mut seq = random_sequence(&mut rng, 3, 25, false);
            CircuitOptimizer::default()
                .until_fixed_point()
                .optimize(&mut seq)
                .unwrap();

            let settled = seq.instructions();
            let report = CircuitOptimizer::default().optimize(&mut seq).unwrap();
            assert_eq!(report.removed(), 0);
            assert_eq!(seq.instructions(), settled);
        }
    }

    #[test]
    fn test_malformed_sequence_is_rejected_before_rewriting() {
        let mut seq = InstructionSequence::new(2);
        seq.push(Instruction::rz(0.0, 0)).unwrap();
        seq.push(Instruction {
            kind: GateKind::Entangle,
            angle: 0.0,
            targets: vec![1, 1],
        })
        .unwrap();

        let before = seq.clone();
        let result = CircuitOptimizer::default().optimize(&mut seq);
        match result {
            Err(CompileError::MalformedSequence { kind, targets, .. }) => {
                assert_eq!(kind, GateKind::Entangle);
                assert_eq!(targets, vec![1, 1]);
            }
            other => panic!("expected a malformed sequence error, got {other:?}"),
        }
        assert_eq!(seq, before);
    }

    #[test]
    fn test_rotation_with_two_targets_is_malformed() {
        let mut seq = InstructionSequence::new(2);
        seq.push(Instruction {
            kind: GateKind::RotateX,
            angle: 0.5,
            targets: vec![0, 1],
        })
        .unwrap();
        let optimizer = CircuitOptimizer::new(vec![OptimizationPattern::FuseRotations], 1);
        assert!(matches!(
            optimizer.optimize(&mut seq),
            Err(CompileError::MalformedSequence { .. })
        ));
    }

    #[test]
    fn test_malformed_tail_does_not_cancel_earlier_pair() {
        let mut seq = InstructionSequence::new(2);
        seq.push(Instruction::cz(0, 1)).unwrap();
        seq.push(Instruction::cz(0, 1)).unwrap();
        seq.push(Instruction {
            kind: GateKind::RotateX,
            angle: 0.5,
            targets: vec![0, 1],
        })
        .unwrap();

        let before = seq.clone();
        let optimizer = CircuitOptimizer::new(vec![OptimizationPattern::CancelAdjacentEntanglers], 1);
        assert!(matches!(
            optimizer.optimize(&mut seq),
            Err(CompileError::MalformedSequence { .. })
        ));
        assert_eq!(seq.len(), 3);
        assert_eq!(seq, before);
    }

    #[test]
    fn test_deserialized_zero_passes_still_runs_once() {
        let optimizer: CircuitOptimizer =
            serde_json::from_str(r#"{"patterns": ["All"], "max_passes": 0}"#).unwrap();
        assert_eq!(optimizer.max_passes(), 0);

        let mut seq = sequence(2, vec![Instruction::cz(0, 1), Instruction::cz(0, 1)]);
        let report = optimizer.optimize(&mut seq).unwrap();
        assert_eq!(report.passes, 1);
        assert_eq!(report.entanglers_cancelled, 2);
        assert!(seq.is_empty());
    }
}
