//! Pure string utilities shared by the pre-processor and both passes.
//!
//! These are deliberately dumb: no allocation beyond what the caller asks
//! for, no knowledge of line numbers or diagnostics. Tokenizing and
//! reserved-word classification live here so every stage agrees on what
//! counts as a label, mnemonic, register, or directive.

use crate::instructions::INSTRUCTION_TABLE;

pub const REGISTERS: [&str; 8] = ["r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7"];
pub const DIRECTIVES: [&str; 6] = [".data", ".string", ".entry", ".extern", "mcro", "mcroend"];

/// Advances past leading spaces and tabs (not newlines — callers only ever
/// see one line at a time, already stripped of its terminator).
pub fn skip_whitespace(s: &str) -> &str {
    s.trim_start_matches([' ', '\t'])
}

/// Skips leading whitespace, then returns the maximal run of non-whitespace
/// characters as `(token, rest)`. `rest` starts right where the token ends
/// (at the following whitespace or end of string) — it is not itself
/// whitespace-skipped, matching `get_token`'s C behavior of returning the
/// raw stopping point.
pub fn get_token(s: &str) -> (&str, &str) {
    let s = skip_whitespace(s);
    let end = s
        .find([' ', '\t'])
        .unwrap_or(s.len());
    (&s[..end], &s[end..])
}

/// True iff `s` is non-empty and every byte is an ASCII decimal digit.
/// No leading sign — sign handling is the caller's job (see
/// `.data` and immediate-operand parsing, which strip a sign themselves).
pub fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// True iff `s` is empty once leading whitespace is skipped.
pub fn is_empty(s: &str) -> bool {
    skip_whitespace(s).is_empty()
}

pub fn is_instruction(name: &str) -> bool {
    INSTRUCTION_TABLE.iter().any(|info| info.name == name)
}

pub fn is_register(name: &str) -> bool {
    REGISTERS.contains(&name)
}

pub fn is_directive(name: &str) -> bool {
    DIRECTIVES.contains(&name)
}

pub fn is_reserved_word(name: &str) -> bool {
    is_instruction(name) || is_register(name) || is_directive(name)
}

/// Strips everything from the first comment character onward.
pub fn strip_comment(line: &str) -> &str {
    match line.find(crate::consts::COMMENT_CHAR) {
        Some(idx) => &line[..idx],
        None => line,
    }
}
