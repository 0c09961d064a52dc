//! Peephole passes over an [`InstructionSequence`](super::sequence::InstructionSequence).
//!
//! Each pass rewrites the sequence in place and compacts it before
//! returning, so no pass ever observes dead slots left by another.

pub mod cancellation;
pub mod fusion;
pub mod identity;

pub use cancellation::cancel_adjacent_entanglers;
pub use fusion::{fuse_rotations, is_fused_noop};
pub use identity::remove_identity_rotations;
