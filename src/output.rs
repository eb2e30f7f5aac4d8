//! The finished assembly: data ready to hand to a writer.
//!
//! Building these views is the pipeline's job; turning them into `.ob` /
//! `.ent` / `.ext` files lives with whoever calls the pipeline. Keeping
//! that split means the core stays testable without touching a filesystem.

use crate::state::AssemblerState;
use crate::word::{Are, Word};

/// One word of the final memory image, tagged with its absolute address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryWord {
    pub address: i32,
    pub value: i32,
    pub are: Are,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub name: String,
    pub address: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternRecord {
    pub name: String,
    pub address: i32,
}

/// Everything a writer needs, already laid out in final memory order:
/// code first, data immediately after, both addressed from `IC_START`.
#[derive(Debug, Clone, Default)]
pub struct AssembledImage {
    pub memory: Vec<MemoryWord>,
    pub entries: Vec<EntryRecord>,
    pub externals: Vec<ExternRecord>,
}

impl AssembledImage {
    pub fn from_state(state: &AssemblerState) -> Self {
        let mut memory = Vec::with_capacity(state.code.len() + state.data.len());
        for (i, word) in state.code.iter().enumerate() {
            memory.push(word_at(word, crate::consts::IC_START + i as i32));
        }
        let data_start = crate::consts::IC_START + state.code.len() as i32;
        for (i, word) in state.data.iter().enumerate() {
            memory.push(word_at(word, data_start + i as i32));
        }

        let mut entries: Vec<EntryRecord> = state
            .symbols
            .entries()
            .map(|(name, sym)| EntryRecord { name: name.clone(), address: sym.address })
            .collect();
        entries.sort_by_key(|e| e.address);

        let mut externals: Vec<ExternRecord> = state
            .externals
            .iter()
            .map(|ext| ExternRecord { name: ext.name.clone(), address: ext.address })
            .collect();
        externals.sort_by_key(|e| e.address);

        AssembledImage { memory, entries, externals }
    }
}

fn word_at(word: &Word, address: i32) -> MemoryWord {
    MemoryWord { address, value: word.value, are: word.are }
}
