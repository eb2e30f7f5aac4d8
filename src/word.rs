//! The machine word: a 12-bit value plus its ARE marking.

/// Marking carried by every emitted word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Are {
    /// Absolute — the value is self-contained and needs no relocation.
    Absolute,
    /// Relocatable — the value is an address within this translation unit.
    Relocatable,
    /// External — the value must be resolved by a linker against another unit.
    External,
}

/// One 12-bit machine word as emitted into the code or data image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word {
    pub value: i32,
    pub are: Are,
}

impl Word {
    pub fn new(value: i32, are: Are) -> Self {
        Word { value, are }
    }

    pub fn absolute(value: i32) -> Self {
        Word::new(value, Are::Absolute)
    }
}
