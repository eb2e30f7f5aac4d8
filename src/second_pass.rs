//! Second pass: resolves `.entry` declarations and every operand the
//! first pass left pending.

use crate::error::Diagnostic;
use crate::lexer::{get_token, is_empty, skip_whitespace, strip_comment};
use crate::state::{AssemblerState, ExternalRef};
use crate::symbol::SymbolKind;
use crate::word::{Are, Word};

pub fn run(lines: &[String], state: &mut AssemblerState) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (idx, raw_line) in lines.iter().enumerate() {
        let line_no = (idx + 1) as u32;
        let content = strip_comment(raw_line);
        if is_empty(content) {
            continue;
        }
        let trimmed = skip_whitespace(content);
        let (first, rest) = get_token(trimmed);
        let rest = if let Some(label) = first.strip_suffix(':') {
            let _ = label;
            skip_whitespace(rest)
        } else {
            trimmed
        };
        let (directive, operand_text) = get_token(rest);
        if directive == ".entry" {
            let name = operand_text.trim();
            if let Err(message) = state.symbols.mark_entry(name) {
                diagnostics.push(Diagnostic::error(line_no, message));
            }
        }
    }

    let pending = std::mem::take(&mut state.unresolved);
    for op in pending {
        resolve_operand(op, state, &mut diagnostics);
    }

    diagnostics
}

fn resolve_operand(
    op: crate::state::UnresolvedOperand,
    state: &mut AssemblerState,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(symbol) = state.symbols.get(&op.label) else {
        diagnostics.push(Diagnostic::error(op.line, format!("undefined symbol '{}'", op.label)));
        return;
    };

    if op.relative {
        if symbol.kind == SymbolKind::External {
            diagnostics.push(Diagnostic::error(
                op.line,
                format!("'{}' is external and cannot be used in a relative operand", op.label),
            ));
            return;
        }
        let operand_address = crate::consts::IC_START + op.code_index as i32;
        let offset = symbol.address - operand_address;
        state.code[op.code_index] = Word::new(offset, Are::Absolute);
        return;
    }

    match symbol.kind {
        SymbolKind::External => {
            let address = crate::consts::IC_START + op.code_index as i32;
            state.code[op.code_index] = Word::new(0, Are::External);
            state.externals.push(ExternalRef { name: op.label.clone(), address });
        }
        SymbolKind::Code | SymbolKind::Data => {
            state.code[op.code_index] = Word::new(symbol.address, Are::Relocatable);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::UnresolvedOperand;

    #[test]
    fn entry_on_unknown_symbol_is_reported() {
        let lines: Vec<String> = vec![".entry GHOST".to_string()];
        let mut state = AssemblerState::new();
        let diags = run(&lines, &mut state);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn entry_marks_existing_symbol() {
        let lines: Vec<String> = vec![".entry LOOP".to_string()];
        let mut state = AssemblerState::new();
        state.symbols.insert("LOOP", 100, SymbolKind::Code);
        let diags = run(&lines, &mut state);
        assert!(diags.is_empty());
        assert!(state.symbols.get("LOOP").unwrap().is_entry);
    }

    #[test]
    fn direct_operand_resolves_to_relocatable_symbol_address() {
        let mut state = AssemblerState::new();
        state.symbols.insert("LOOP", 100, SymbolKind::Code);
        state.code.push(Word::new(0, Are::Relocatable));
        state.unresolved.push(UnresolvedOperand {
            code_index: 0,
            label: "LOOP".to_string(),
            relative: false,
            line: 1,
        });
        let diags = run(&[], &mut state);
        assert!(diags.is_empty());
        assert_eq!(state.code[0], Word::new(100, Are::Relocatable));
    }

    #[test]
    fn direct_operand_to_external_is_recorded_and_zeroed() {
        let mut state = AssemblerState::new();
        state.symbols.declare_extern("FOO");
        state.code.push(Word::new(0, Are::Relocatable));
        state.unresolved.push(UnresolvedOperand {
            code_index: 0,
            label: "FOO".to_string(),
            relative: false,
            line: 1,
        });
        let diags = run(&[], &mut state);
        assert!(diags.is_empty());
        assert_eq!(state.code[0].value, 0);
        assert_eq!(state.code[0].are, Are::External);
        assert_eq!(state.externals.len(), 1);
        assert_eq!(state.externals[0].name, "FOO");
    }

    #[test]
    fn relative_operand_to_external_is_rejected() {
        let mut state = AssemblerState::new();
        state.symbols.declare_extern("FOO");
        state.code.push(Word::new(0, Are::Relocatable));
        state.unresolved.push(UnresolvedOperand {
            code_index: 0,
            label: "FOO".to_string(),
            relative: true,
            line: 1,
        });
        let diags = run(&[], &mut state);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn relative_operand_resolves_to_offset_from_operand_address() {
        let mut state = AssemblerState::new();
        state.symbols.insert("LOOP", 100, SymbolKind::Code);
        state.code.push(Word::new(0, Are::Relocatable));
        state.unresolved.push(UnresolvedOperand {
            code_index: 0,
            label: "LOOP".to_string(),
            relative: true,
            line: 1,
        });
        let diags = run(&[], &mut state);
        assert!(diags.is_empty());
        assert_eq!(state.code[0], Word::new(100 - crate::consts::IC_START, Are::Absolute));
    }
}
