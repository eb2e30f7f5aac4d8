//! First pass: builds the symbol table and emits a partial code/data image.
//!
//! Direct and relative operands can't be encoded yet — the label they
//! name might be defined later in the file — so this pass leaves a
//! placeholder word and records an [`crate::state::UnresolvedOperand`]
//! for the second pass to fill in.

use crate::consts::{MAX_LINE, MAX_NUMBER, MIN_NUMBER};
use crate::error::Diagnostic;
use crate::instructions::{self, AddressingMode};
use crate::lexer::{get_token, is_empty, is_reserved_word, skip_whitespace, strip_comment};
use crate::state::{AssemblerState, UnresolvedOperand};
use crate::symbol::{InsertOutcome, SymbolKind};
use crate::word::{Are, Word};

pub fn run(lines: &[String]) -> (AssemblerState, Vec<Diagnostic>) {
    let mut state = AssemblerState::new();
    let mut diagnostics = Vec::new();
    let mut overflow_reported = false;

    for (idx, raw_line) in lines.iter().enumerate() {
        let line_no = (idx + 1) as u32;
        if raw_line.len() > MAX_LINE {
            diagnostics.push(Diagnostic::error(line_no, "line exceeds 80 characters"));
            continue;
        }
        let content = strip_comment(raw_line);
        if is_empty(content) {
            continue;
        }
        process_line(content, line_no, &mut state, &mut diagnostics, &mut overflow_reported);
    }

    state.symbols.relocate_data_symbols(state.ic);
    (state, diagnostics)
}

fn process_line(
    content: &str,
    line_no: u32,
    state: &mut AssemblerState,
    diagnostics: &mut Vec<Diagnostic>,
    overflow_reported: &mut bool,
) {
    let trimmed = skip_whitespace(content);
    let (first, rest) = get_token(trimmed);

    let (label, rest) = if let Some(name) = first.strip_suffix(':') {
        let rest = skip_whitespace(rest);
        match validate_label(name) {
            Ok(()) if state.symbols.contains(name) => {
                diagnostics.push(Diagnostic::error(line_no, format!("symbol '{name}' already defined")));
                (None, rest)
            }
            Ok(()) => (Some(name.to_string()), rest),
            Err(message) => {
                diagnostics.push(Diagnostic::error(line_no, message));
                (None, rest)
            }
        }
    } else {
        (None, trimmed)
    };

    if is_empty(rest) {
        diagnostics.push(Diagnostic::error(line_no, "label with no statement"));
        return;
    }

    let (directive_or_mnemonic, operand_text) = get_token(rest);

    match directive_or_mnemonic {
        ".data" => handle_data(label, operand_text, line_no, state, diagnostics, overflow_reported),
        ".string" => handle_string(label, operand_text, line_no, state, diagnostics, overflow_reported),
        ".extern" => handle_extern(label, operand_text, line_no, state, diagnostics),
        ".entry" => {
            if label.is_some() {
                diagnostics.push(Diagnostic::warning(line_no, "label before .entry is ignored"));
            }
            // Entry resolution happens in the second pass, once every
            // label in the file is known.
        }
        name if instructions::lookup(name).is_some() => {
            handle_instruction(label, name, operand_text, line_no, state, diagnostics, overflow_reported)
        }
        other => {
            diagnostics.push(Diagnostic::error(line_no, format!("unknown instruction or directive '{other}'")));
        }
    }
}

fn validate_label(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("empty label".to_string());
    }
    if name.len() > crate::consts::MAX_LABEL {
        return Err(format!(
            "label '{name}' exceeds the maximum length of {}",
            crate::consts::MAX_LABEL
        ));
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap();
    if !first.is_ascii_alphabetic() {
        return Err(format!("label '{name}' must start with a letter"));
    }
    if !chars.clone().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!("label '{name}' must contain only letters and digits"));
    }
    if is_reserved_word(name) {
        return Err(format!("'{name}' is a reserved word and cannot be used as a label"));
    }
    Ok(())
}

fn define_label(label: Option<String>, address: i32, kind: SymbolKind, state: &mut AssemblerState) {
    if let Some(name) = label {
        state.symbols.insert(&name, address, kind);
    }
}

fn check_overflow(state: &AssemblerState, additional: i32, line_no: u32, diagnostics: &mut Vec<Diagnostic>, overflow_reported: &mut bool) -> bool {
    if state.has_room_for(additional) {
        true
    } else {
        if !*overflow_reported {
            diagnostics.push(Diagnostic::error(line_no, "memory overflow: translation unit exceeds available memory"));
            *overflow_reported = true;
        }
        false
    }
}

fn parse_number_list(text: &str) -> Result<Vec<i32>, String> {
    let mut numbers = Vec::new();
    let mut rest = skip_whitespace(text);
    if rest.is_empty() {
        return Err(".data requires at least one number".to_string());
    }
    loop {
        rest = skip_whitespace(rest);
        if rest.is_empty() {
            return Err("trailing comma in .data list".to_string());
        }
        let bytes = rest.as_bytes();
        let mut i = 0;
        if bytes[0] == b'+' || bytes[0] == b'-' {
            i = 1;
        }
        let digits_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits_start {
            return Err(format!("invalid number in .data list near '{}'", &rest[..rest.len().min(10)]));
        }
        let token = &rest[..i];
        let value: i32 = token
            .parse()
            .map_err(|_| format!("invalid number in .data list: '{token}'"))?;
        if !(MIN_NUMBER..=MAX_NUMBER).contains(&value) {
            return Err(format!("number {value} out of range ({MIN_NUMBER}..={MAX_NUMBER})"));
        }
        numbers.push(value);
        rest = skip_whitespace(&rest[i..]);
        if rest.is_empty() {
            return Ok(numbers);
        }
        match rest.strip_prefix(',') {
            Some(after_comma) => rest = after_comma,
            None => return Err(format!("expected ',' between numbers near '{rest}'")),
        }
    }
}

fn handle_data(
    label: Option<String>,
    operand_text: &str,
    line_no: u32,
    state: &mut AssemblerState,
    diagnostics: &mut Vec<Diagnostic>,
    overflow_reported: &mut bool,
) {
    let numbers = match parse_number_list(operand_text) {
        Ok(numbers) => numbers,
        Err(message) => {
            diagnostics.push(Diagnostic::error(line_no, message));
            return;
        }
    };
    if !check_overflow(state, numbers.len() as i32, line_no, diagnostics, overflow_reported) {
        return;
    }
    define_label(label, state.dc, SymbolKind::Data, state);
    for value in numbers {
        state.data.push(Word::absolute(value));
        state.dc += 1;
    }
}

fn handle_string(
    label: Option<String>,
    operand_text: &str,
    line_no: u32,
    state: &mut AssemblerState,
    diagnostics: &mut Vec<Diagnostic>,
    overflow_reported: &mut bool,
) {
    let trimmed = operand_text.trim();
    if trimmed.len() < 2 || !trimmed.starts_with('"') || !trimmed.ends_with('"') {
        diagnostics.push(Diagnostic::error(line_no, ".string operand must be a quoted string"));
        return;
    }
    let text = &trimmed[1..trimmed.len() - 1];
    let word_count = text.chars().count() as i32 + 1;
    if !check_overflow(state, word_count, line_no, diagnostics, overflow_reported) {
        return;
    }
    define_label(label, state.dc, SymbolKind::Data, state);
    for ch in text.chars() {
        state.data.push(Word::absolute(ch as i32));
        state.dc += 1;
    }
    state.data.push(Word::absolute(0));
    state.dc += 1;
}

fn handle_extern(
    label: Option<String>,
    operand_text: &str,
    line_no: u32,
    state: &mut AssemblerState,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if label.is_some() {
        diagnostics.push(Diagnostic::warning(line_no, "label before .extern is ignored"));
    }
    let name = operand_text.trim();
    if let Err(message) = validate_label(name) {
        diagnostics.push(Diagnostic::error(line_no, message));
        return;
    }
    if let InsertOutcome::Rejected(message) = state.symbols.declare_extern(name) {
        diagnostics.push(Diagnostic::error(line_no, message));
    }
    state.ec += 1;
}

struct ParsedOperand {
    mode: AddressingMode,
    text: String,
}

fn split_operands(rest: &str, expected: u8) -> Result<Vec<String>, String> {
    let trimmed = rest.trim();
    if expected == 0 {
        if !trimmed.is_empty() {
            return Err("this instruction takes no operands".to_string());
        }
        return Ok(Vec::new());
    }
    if trimmed.is_empty() {
        return Err("missing operand".to_string());
    }
    let raw_parts: Vec<&str> = trimmed.split(',').collect();
    for part in &raw_parts {
        if part.trim().is_empty() {
            return Err("illegal comma in operand list".to_string());
        }
        if part.trim().split_whitespace().count() > 1 {
            return Err("missing comma between operands".to_string());
        }
    }
    if raw_parts.len() != expected as usize {
        return Err(format!(
            "expected {expected} operand(s), found {}",
            raw_parts.len()
        ));
    }
    Ok(raw_parts.iter().map(|p| p.trim().to_string()).collect())
}

fn validate_operand_shape(text: &str) -> Result<ParsedOperand, String> {
    let mode = instructions::infer_addressing_mode(text);
    match mode {
        AddressingMode::Immediate => {
            let body = &text[1..];
            let bytes = body.as_bytes();
            let mut i = 0;
            if !bytes.is_empty() && (bytes[0] == b'+' || bytes[0] == b'-') {
                i = 1;
            }
            let digits_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if digits_start == i || i != bytes.len() {
                return Err(format!("invalid immediate operand '{text}'"));
            }
            let value: i32 = body.parse().map_err(|_| format!("invalid immediate operand '{text}'"))?;
            if !(MIN_NUMBER..=MAX_NUMBER).contains(&value) {
                return Err(format!("immediate value {value} out of range"));
            }
            Ok(ParsedOperand { mode, text: text.to_string() })
        }
        AddressingMode::Register => Ok(ParsedOperand { mode, text: text.to_string() }),
        AddressingMode::Relative => {
            let label = &text[1..];
            validate_label(label).map_err(|_| format!("invalid relative operand '{text}'"))?;
            Ok(ParsedOperand { mode, text: text.to_string() })
        }
        AddressingMode::Direct => {
            validate_label(text).map_err(|_| format!("invalid operand '{text}'"))?;
            Ok(ParsedOperand { mode, text: text.to_string() })
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_instruction(
    label: Option<String>,
    name: &str,
    operand_text: &str,
    line_no: u32,
    state: &mut AssemblerState,
    diagnostics: &mut Vec<Diagnostic>,
    overflow_reported: &mut bool,
) {
    let info = instructions::lookup(name).expect("caller already checked this is a known mnemonic");

    let raw_operands = match split_operands(operand_text, info.num_operands) {
        Ok(parts) => parts,
        Err(message) => {
            diagnostics.push(Diagnostic::error(line_no, message));
            return;
        }
    };

    let mut operands = Vec::with_capacity(raw_operands.len());
    let mut bad = false;
    for raw in &raw_operands {
        match validate_operand_shape(raw) {
            Ok(op) => operands.push(op),
            Err(message) => {
                diagnostics.push(Diagnostic::error(line_no, message));
                bad = true;
            }
        }
    }
    if bad {
        return;
    }

    let (src, dest) = match operands.len() {
        2 => (Some(&operands[0]), Some(&operands[1])),
        1 => (None, Some(&operands[0])),
        _ => (None, None),
    };

    if let Some(op) = src {
        if !instructions::is_valid_src_mode(info, op.mode) {
            diagnostics.push(Diagnostic::error(line_no, format!("'{}' is not a valid source operand for {name}", op.text)));
            bad = true;
        }
    }
    if let Some(op) = dest {
        if !instructions::is_valid_dest_mode(info, op.mode) {
            diagnostics.push(Diagnostic::error(line_no, format!("'{}' is not a valid destination operand for {name}", op.text)));
            bad = true;
        }
    }
    if bad {
        return;
    }

    let word_count = 1 + operands.len() as i32;
    if !check_overflow(state, word_count, line_no, diagnostics, overflow_reported) {
        return;
    }

    define_label(label, state.ic, SymbolKind::Code, state);

    let src_bits = src.map(|op| op.mode as i32).unwrap_or(0);
    let dest_bits = dest.map(|op| op.mode as i32).unwrap_or(0);
    let opcode_word = (info.opcode as i32) << 8 | (info.funct as i32) << 4 | (src_bits << 2) | dest_bits;
    state.code.push(Word::absolute(opcode_word));
    state.ic += 1;

    for op in [src, dest].into_iter().flatten() {
        emit_operand_word(op, line_no, state);
    }
}

fn emit_operand_word(op: &ParsedOperand, line_no: u32, state: &mut AssemblerState) {
    match op.mode {
        AddressingMode::Immediate => {
            let value: i32 = op.text[1..].parse().expect("shape already validated");
            state.code.push(Word::absolute(value));
            state.ic += 1;
        }
        AddressingMode::Register => {
            let digit = op.text.as_bytes()[1] - b'0';
            state.code.push(Word::absolute(1 << digit));
            state.ic += 1;
        }
        AddressingMode::Relative => {
            let index = state.code.len();
            state.code.push(Word::new(0, Are::Relocatable));
            state.unresolved.push(UnresolvedOperand {
                code_index: index,
                label: op.text[1..].to_string(),
                relative: true,
                line: line_no,
            });
            state.ic += 1;
        }
        AddressingMode::Direct => {
            let index = state.code.len();
            state.code.push(Word::new(0, Are::Relocatable));
            state.unresolved.push(UnresolvedOperand {
                code_index: index,
                label: op.text.clone(),
                relative: false,
                line: line_no,
            });
            state.ic += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(str::to_string).collect()
    }

    #[test]
    fn over_length_line_is_reported_and_skipped() {
        let long_comment = ";".to_string() + &"x".repeat(MAX_LINE);
        let (state, diags) = run(&lines(&format!("stop {long_comment}\nstop\n")));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("exceeds 80 characters"));
        assert_eq!(state.ic, 1, "the over-length line must be skipped entirely, not partially assembled");
    }

    #[test]
    fn stop_alone_emits_one_word() {
        let (state, diags) = run(&lines("stop\n"));
        assert!(diags.is_empty());
        assert_eq!(state.ic, 1);
        assert_eq!(state.code[0].value, 15 << 8);
    }

    #[test]
    fn register_to_register_mov_emits_three_words() {
        let (state, diags) = run(&lines("mov r3, r5\nstop\n"));
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(state.ic, 4);
        assert_eq!(state.code[1].value, 1 << 3);
        assert_eq!(state.code[2].value, 1 << 5);
    }

    #[test]
    fn data_directive_defines_a_data_symbol_at_zero_before_relocation() {
        let (state, diags) = run(&lines("NUMS: .data 1, 2, 3\nstop\n"));
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(state.dc, 3);
        let sym = state.symbols.get("NUMS").unwrap();
        assert_eq!(sym.address, state.ic);
    }

    #[test]
    fn string_directive_appends_terminating_zero() {
        let (state, diags) = run(&lines(".string \"hi\"\n"));
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(state.dc, 3);
        assert_eq!(state.data[2].value, 0);
    }

    #[test]
    fn unknown_mnemonic_is_reported() {
        let (_, diags) = run(&lines("frobnicate r1\n"));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("unknown instruction"));
    }

    #[test]
    fn too_few_operands_is_reported() {
        let (_, diags) = run(&lines("mov r1\n"));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn direct_operand_is_left_unresolved_for_second_pass() {
        let (state, diags) = run(&lines("jmp LOOP\n"));
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(state.unresolved.len(), 1);
        assert_eq!(state.unresolved[0].label, "LOOP");
        assert!(!state.unresolved[0].relative);
    }

    #[test]
    fn extern_label_prefix_is_a_warning_not_an_error() {
        let (_, diags) = run(&lines("X: .extern FOO\n"));
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].is_error());
    }

    #[test]
    fn immediate_out_of_range_is_rejected() {
        let (_, diags) = run(&lines("mov #5000, r2\n"));
        assert_eq!(diags.len(), 1);
    }
}
