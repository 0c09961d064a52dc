//lowering_tests.rs

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use num_complex::Complex64;
    use std::f64::consts::PI;

    use basis_lower::compiler::{
        lower_to_basis, BasisDecomposer, EulerBasis, GateKind, Instruction, InstructionSequence,
        LoweringOptions, UnitaryDecomposer,
    };
    use basis_lower::error::{CompileError, DecomposeError};
    use basis_lower::quantum::prelude::*;
    use basis_lower::quantum::unitary::{embed, equal_up_to_global_phase};

    /// Helper for checking that a lowered sequence implements its circuit
    fn assert_equivalent(circuit: &QuantumCircuit, sequence: &InstructionSequence) {
        let expected = circuit.unitary();
        let actual = sequence.to_circuit().unitary();
        assert!(
            equal_up_to_global_phase(&actual, &expected, 1e-8),
            "lowered sequence does not reproduce the circuit"
        );
    }

    fn mixed_circuit() -> QuantumCircuit {
        let mut circuit = QuantumCircuit::new(3);
        let gates: Vec<(Box<dyn QuantumGate>, Vec<usize>)> = vec![
            (Box::new(StandardGate::H), vec![0]),
            (Box::new(StandardGate::T), vec![2]),
            (Box::new(ParametrizedGate::U3(0.3, -1.2, 2.1)), vec![1]),
            (Box::new(StandardGate::CNOT), vec![0, 2]),
            (Box::new(StandardGate::CNOT), vec![2, 1]),
            (Box::new(StandardGate::CZ), vec![1, 0]),
            (Box::new(StandardGate::CY), vec![1, 2]),
            (Box::new(ParametrizedGate::CPhase(0.9)), vec![2, 0]),
            (Box::new(ParametrizedGate::CRz(-1.4)), vec![0, 1]),
            (Box::new(ParametrizedGate::Ry(0.5)), vec![2]),
            (Box::new(StandardGate::SWAP), vec![1, 2]),
            (Box::new(ParametrizedGate::CRx(0.6)), vec![2, 0]),
        ];
        for (gate, qubits) in gates {
            circuit.add_gate(gate, &qubits).unwrap();
        }
        circuit
    }

    #[test]
    fn test_lowered_instructions_respect_arity() {
        let circuit = mixed_circuit();
        let sequence =
            lower_to_basis(&circuit, &BasisDecomposer::new(), &LoweringOptions::default()).unwrap();

        assert!(!sequence.is_empty());
        for instruction in &sequence {
            match instruction.kind {
                GateKind::RotateX | GateKind::RotateZ => assert_eq!(instruction.targets.len(), 1),
                GateKind::Entangle => {
                    assert_eq!(instruction.targets.len(), 2);
                    assert_ne!(instruction.targets[0], instruction.targets[1]);
                }
            }
            assert!(instruction.targets.iter().all(|&q| q < 3));
        }
    }

    #[test]
    fn test_lowering_preserves_the_unitary() {
        let circuit = mixed_circuit();
        for basis in [EulerBasis::Zxz, EulerBasis::Xzx] {
            let options = LoweringOptions::default().with_euler_basis(basis);
            let sequence = lower_to_basis(&circuit, &BasisDecomposer::new(), &options).unwrap();
            assert_equivalent(&circuit, &sequence);
        }
    }

    #[test]
    fn test_single_qubit_gates_lower_to_three_rotations() {
        let mut builder = CircuitBuilder::new(1);
        builder.h(0).unwrap();
        let sequence =
            lower_to_basis(&builder.build(), &BasisDecomposer::new(), &LoweringOptions::default())
                .unwrap();

        let kinds: Vec<GateKind> = sequence.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![GateKind::RotateZ, GateKind::RotateX, GateKind::RotateZ]);
        for instruction in &sequence {
            assert!((instruction.angle - PI / 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lowered_cz_is_a_single_entangler() {
        let mut builder = CircuitBuilder::new(5);
        builder.cz(3, 4).unwrap();
        let sequence =
            lower_to_basis(&builder.build(), &BasisDecomposer::new(), &LoweringOptions::default())
                .unwrap();
        assert_eq!(sequence.instructions(), vec![Instruction::cz(3, 4)]);
    }

    #[test]
    fn test_three_qubit_gates_are_rejected() {
        let mut circuit = QuantumCircuit::new(3);
        circuit.add_gate(Box::new(StandardGate::Toffoli), &[0, 1, 2]).unwrap();

        let result = lower_to_basis(&circuit, &BasisDecomposer::new(), &LoweringOptions::default());
        assert_eq!(
            result,
            Err(CompileError::UnsupportedGateArity {
                gate: "Toffoli".to_string(),
                arity: 3
            })
        );
    }

    #[test]
    fn test_decomposer_errors_are_wrapped_unchanged() {
        let mut circuit = QuantumCircuit::new(2);
        let scaled = CustomMatrixGate {
            matrix: StandardGate::SWAP.matrix().mapv(|x| x * 0.5),
            name: "half-SWAP".to_string(),
            qubits: 2,
        };
        circuit.add_gate(Box::new(scaled), &[0, 1]).unwrap();

        match lower_to_basis(&circuit, &BasisDecomposer::new(), &LoweringOptions::default()) {
            Err(CompileError::DecomposerFailure { gate, source }) => {
                assert_eq!(gate, "half-SWAP");
                assert!(matches!(source, DecomposeError::NotUnitary { .. }));
            }
            other => panic!("expected a decomposer failure, got {other:?}"),
        }
    }

    #[test]
    fn test_swap_lowers_to_three_entanglers() {
        let mut circuit = QuantumCircuit::new(3);
        circuit.add_gate(Box::new(StandardGate::SWAP), &[2, 0]).unwrap();

        for basis in [EulerBasis::Zxz, EulerBasis::Xzx] {
            let options = LoweringOptions::default().with_euler_basis(basis);
            let sequence = lower_to_basis(&circuit, &BasisDecomposer::new(), &options).unwrap();
            assert_equivalent(&circuit, &sequence);

            let entanglers: Vec<&Instruction> =
                sequence.iter().filter(|i| i.kind == GateKind::Entangle).collect();
            assert_eq!(entanglers.len(), 3);
            for entangler in entanglers {
                let mut targets = entangler.targets.clone();
                targets.sort_unstable();
                assert_eq!(targets, vec![0, 2]);
            }
        }
    }

    #[test]
    fn test_unreachable_fidelity_is_reported() {
        let mut builder = CircuitBuilder::new(2);
        builder.cx(0, 1).unwrap();
        let options = LoweringOptions::default().with_fidelity(1.5);

        let result = lower_to_basis(&builder.build(), &BasisDecomposer::new(), &options);
        assert!(matches!(
            result,
            Err(CompileError::DecomposerFailure {
                source: DecomposeError::FidelityNotReached { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_classical_bits_are_carried_through() {
        let mut builder = CircuitBuilder::with_clbits(2, 4);
        builder.x(1).unwrap();
        let sequence =
            lower_to_basis(&builder.build(), &BasisDecomposer::new(), &LoweringOptions::default())
                .unwrap();
        assert_eq!(sequence.qubit_count(), 2);
        assert_eq!(sequence.clbit_count(), 4);

        let circuit = sequence.to_circuit();
        assert_eq!(circuit.qubit_count, 2);
        assert_eq!(circuit.clbit_count, 4);
    }

    /// Returns a canned local sequence regardless of the matrix.
    struct CannedDecomposer {
        single: Vec<Instruction>,
        double: Vec<Instruction>,
    }

    impl UnitaryDecomposer for CannedDecomposer {
        fn decompose_single_qubit(
            &self,
            _matrix: &Array2<Complex64>,
            _basis: EulerBasis,
        ) -> Result<Vec<Instruction>, DecomposeError> {
            Ok(self.single.clone())
        }

        fn decompose_two_qubit(
            &self,
            _matrix: &Array2<Complex64>,
            _fidelity: f64,
            _basis: EulerBasis,
        ) -> Result<Vec<Instruction>, DecomposeError> {
            Ok(self.double.clone())
        }
    }

    #[test]
    fn test_local_slots_map_to_gate_targets() {
        let decomposer = CannedDecomposer {
            single: vec![Instruction::rx(0.1, 0)],
            double: vec![Instruction::rz(0.5, 0), Instruction::cz(0, 1), Instruction::rx(0.2, 1)],
        };
        let mut builder = CircuitBuilder::new(4);
        builder.cx(3, 1).unwrap();
        builder.h(2).unwrap();

        let sequence =
            lower_to_basis(&builder.build(), &decomposer, &LoweringOptions::default()).unwrap();
        assert_eq!(
            sequence.instructions(),
            vec![
                Instruction::rz(0.5, 3),
                Instruction::cz(3, 1),
                Instruction::rx(0.2, 1),
                Instruction::rx(0.1, 2),
            ]
        );
    }

    #[test]
    fn test_decomposer_output_outside_the_gate_is_rejected() {
        let decomposer = CannedDecomposer {
            single: vec![Instruction::rz(0.3, 1)],
            double: Vec::new(),
        };
        let mut builder = CircuitBuilder::new(2);
        builder.h(0).unwrap();

        let result = lower_to_basis(&builder.build(), &decomposer, &LoweringOptions::default());
        assert!(matches!(
            result,
            Err(CompileError::DecomposerFailure {
                source: DecomposeError::SlotOutOfRange { slot: 1, available: 1 },
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_decomposer_output_is_rejected() {
        let decomposer = CannedDecomposer {
            single: vec![
                Instruction::rz(0.1, 0),
                Instruction {
                    kind: GateKind::Entangle,
                    angle: 0.0,
                    targets: vec![0, 0],
                },
            ],
            double: Vec::new(),
        };
        let mut builder = CircuitBuilder::new(1);
        builder.x(0).unwrap();

        let result = lower_to_basis(&builder.build(), &decomposer, &LoweringOptions::default());
        match result {
            Err(CompileError::MalformedSequence { id, kind, targets, .. }) => {
                // rejected before it was given a slot after the rotation
                assert_eq!(id.index(), 1);
                assert_eq!(kind, GateKind::Entangle);
                assert_eq!(targets, vec![0, 0]);
            }
            other => panic!("expected a malformed sequence error, got {other:?}"),
        }
    }

    #[test]
    fn test_embedding_of_lowered_cnot_matches_reversed_gate() {
        let mut builder = CircuitBuilder::new(2);
        builder.cx(1, 0).unwrap();
        let circuit = builder.build();
        let sequence =
            lower_to_basis(&circuit, &BasisDecomposer::new(), &LoweringOptions::default()).unwrap();

        let reversed = embed(&StandardGate::CNOT.matrix(), &[1, 0], 2);
        assert!(equal_up_to_global_phase(&sequence.to_circuit().unitary(), &reversed, 1e-8));
        assert_eq!(
            sequence.iter().filter(|i| i.kind == GateKind::Entangle).count(),
            1
        );
    }
}
