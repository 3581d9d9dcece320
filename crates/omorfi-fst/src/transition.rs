// Fixed-size records of the binary transducer sections.

use bytemuck::{Pod, Zeroable};

use crate::{StateId, SymbolId};

/// Section header (16 bytes), directly after the padded symbol table.
///
/// Layout:
/// - `start_state` (u32): index of the start state
/// - `state_count` (u32): number of states in the arena
/// - `transition_count` (u32): number of [`TransitionRecord`]s that follow
/// - `final_count` (u32): number of [`FinalRecord`]s after the transitions
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SectionHeader {
    pub start_state: u32,
    pub state_count: u32,
    pub transition_count: u32,
    pub final_count: u32,
}

/// One arc of the transducer (20 bytes).
///
/// Records may appear in any order in the file; the loader groups and sorts
/// them per source state.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TransitionRecord {
    pub source: u32,
    pub target: u32,
    pub input: u32,
    pub output: u32,
    pub weight: f32,
}

/// Marks `state` as accepting with the given final weight (8 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FinalRecord {
    pub state: u32,
    pub weight: f32,
}

const _: () = assert!(size_of::<SectionHeader>() == 16);
const _: () = assert!(size_of::<TransitionRecord>() == 20);
const _: () = assert!(size_of::<FinalRecord>() == 8);

/// In-memory transition, stored in the source state's slice of the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub input: SymbolId,
    pub output: SymbolId,
    pub target: StateId,
    pub weight: f32,
}

impl Transition {
    /// On-disk record for this transition leaving `source`.
    pub fn to_record(&self, source: StateId) -> TransitionRecord {
        TransitionRecord {
            source,
            target: self.target,
            input: self.input,
            output: self.output,
            weight: self.weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sizes() {
        assert_eq!(size_of::<SectionHeader>(), 16);
        assert_eq!(size_of::<TransitionRecord>(), 20);
        assert_eq!(size_of::<FinalRecord>(), 8);
    }

    #[test]
    fn zero_copy_cast_transition() {
        let mut raw = Vec::new();
        for v in [1u32, 2, 3, 4] {
            raw.extend_from_slice(&v.to_le_bytes());
        }
        raw.extend_from_slice(&1.5f32.to_le_bytes());

        let mut records = vec![TransitionRecord::zeroed(); 1];
        bytemuck::cast_slice_mut::<TransitionRecord, u8>(&mut records).copy_from_slice(&raw);
        let t = records[0];
        assert_eq!(t.source, 1);
        assert_eq!(t.target, 2);
        assert_eq!(t.input, 3);
        assert_eq!(t.output, 4);
        assert_eq!(t.weight, 1.5);
    }

    #[test]
    fn zero_copy_cast_final() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&7u32.to_le_bytes());
        raw.extend_from_slice(&(-0.25f32).to_le_bytes());
        let f: FinalRecord = bytemuck::pod_read_unaligned(&raw);
        assert_eq!(f.state, 7);
        assert_eq!(f.weight, -0.25);
    }
}
