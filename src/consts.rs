//! Fixed limits of the 12-bit machine and its assembler.
//!
//! These are invariants the rest of the pipeline (and its tests) depend
//! on, not configuration — see `AssemblerConfig` in [`crate::config`] for
//! the things that genuinely vary between runs.

/// Combined code + data words a translation unit may occupy.
pub const MAX_MEMORY: usize = 4096;
/// Source characters allowed on a single line, excluding the newline.
pub const MAX_LINE: usize = 80;
/// Characters allowed in a label name, excluding a trailing `:`.
pub const MAX_LABEL: usize = 31;
/// First address assigned to code; the image logically starts here.
pub const IC_START: i32 = 100;
/// Comment lines run from this character to the end of the line.
pub const COMMENT_CHAR: char = ';';
/// Smallest value storable in a 12-bit signed word / `.data` literal.
pub const MIN_NUMBER: i32 = -2048;
/// Largest value storable in a 12-bit signed word / `.data` literal.
pub const MAX_NUMBER: i32 = 2047;
