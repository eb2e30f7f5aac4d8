//! Macro expansion: turns a `.as` source into its `.am` expansion.
//!
//! A macro is a `mcro NAME` / `mcroend` block. Every line inside is
//! recorded verbatim; every later line that names the macro is replaced
//! by those lines in order. Macros do not nest and may not be redefined.

use crate::error::Diagnostic;
use crate::lexer::{get_token, is_empty, is_reserved_word, skip_whitespace, strip_comment};

struct Macro {
    lines: Vec<String>,
}

/// Expands all macros in `source`, returning the expanded line list (in
/// `.am` form) and any diagnostics raised along the way. Expansion
/// continues past a bad `mcro` line so later, unrelated errors are
/// still reported in the same run.
pub fn expand(source: &str) -> (Vec<String>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let mut macros: std::collections::HashMap<String, Macro> = std::collections::HashMap::new();
    let mut labels: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut output = Vec::new();

    enum Mode {
        Normal,
        Defining { name: String, lines: Vec<String> },
    }
    let mut mode = Mode::Normal;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = (idx + 1) as u32;
        let content = strip_comment(raw_line);
        if is_empty(content) {
            if let Mode::Defining { .. } = mode {
                // blank/comment lines inside a macro body are kept verbatim
            } else {
                continue;
            }
        }

        let trimmed = skip_whitespace(content);
        let (first, rest) = get_token(trimmed);

        match &mut mode {
            Mode::Defining { name, lines } => {
                if first == "mcroend" {
                    if !is_empty(rest) {
                        diagnostics.push(Diagnostic::error(line_no, "extra text after mcroend"));
                    }
                    let name = name.clone();
                    let lines = std::mem::take(lines);
                    macros.insert(name, Macro { lines });
                    mode = Mode::Normal;
                } else {
                    lines.push(raw_line.to_string());
                }
                continue;
            }
            Mode::Normal => {}
        }

        if first == "mcro" {
            let (name, after_name) = get_token(rest);
            if name.is_empty() {
                diagnostics.push(Diagnostic::error(line_no, "mcro directive missing a name"));
                mode = Mode::Defining { name: String::new(), lines: Vec::new() };
                continue;
            }
            if !is_empty(after_name) {
                diagnostics.push(Diagnostic::error(line_no, format!("extra text after macro name '{name}'")));
            }
            if is_reserved_word(name) {
                diagnostics.push(Diagnostic::error(
                    line_no,
                    format!("'{name}' is a reserved word and cannot be used as a macro name"),
                ));
            } else if macros.contains_key(name) {
                diagnostics.push(Diagnostic::error(line_no, format!("macro '{name}' already defined")));
            } else if labels.contains(name) {
                diagnostics.push(Diagnostic::error(
                    line_no,
                    format!("macro name '{name}' collides with a label already used in this file"),
                ));
            }
            mode = Mode::Defining { name: name.to_string(), lines: Vec::new() };
            continue;
        }

        if first == "mcroend" {
            diagnostics.push(Diagnostic::error(line_no, "mcroend with no matching mcro"));
            continue;
        }

        if let Some(label) = first.strip_suffix(':') {
            if macros.contains_key(label) {
                diagnostics.push(Diagnostic::error(
                    line_no,
                    format!("label '{label}' collides with a macro name"),
                ));
            }
            labels.insert(label.to_string());
        }

        if let Some(found) = macros.get(first) {
            output.extend(found.lines.iter().cloned());
        } else {
            output.push(raw_line.to_string());
        }
    }

    if let Mode::Defining { name, .. } = &mode {
        diagnostics.push(Diagnostic::error(
            source.lines().count() as u32,
            format!("macro '{name}' is missing a closing mcroend"),
        ));
    }

    (output, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_a_simple_macro_in_place() {
        let src = "mcro M\nadd r1, r2\nmcroend\nM\nstop\n";
        let (lines, diags) = expand(src);
        assert!(diags.is_empty());
        assert_eq!(lines, vec!["add r1, r2", "stop"]);
    }

    #[test]
    fn rejects_redefinition_of_a_macro() {
        let src = "mcro M\nstop\nmcroend\nmcro M\nstop\nmcroend\n";
        let (_, diags) = expand(src);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("already defined"));
    }

    #[test]
    fn rejects_label_colliding_with_macro_name() {
        let src = "mcro M\nstop\nmcroend\nM: add r1, r2\n";
        let (_, diags) = expand(src);
        assert!(diags.iter().any(|d| d.message.contains("collides with a macro name")));
    }

    #[test]
    fn reports_unterminated_macro() {
        let src = "mcro M\nstop\n";
        let (_, diags) = expand(src);
        assert!(diags.iter().any(|d| d.message.contains("missing a closing mcroend")));
    }

    #[test]
    fn rejects_extra_text_after_macro_name() {
        let src = "mcro M junk\nstop\nmcroend\n";
        let (_, diags) = expand(src);
        assert!(diags.iter().any(|d| d.message.contains("extra text after macro name")));
    }

    #[test]
    fn rejects_extra_text_after_mcroend() {
        let src = "mcro M\nstop\nmcroend junk\n";
        let (_, diags) = expand(src);
        assert!(diags.iter().any(|d| d.message.contains("extra text after mcroend")));
    }

    #[test]
    fn unexpanded_lines_pass_through_untouched() {
        let src = "LOOP: mov r1, r2\nstop\n";
        let (lines, diags) = expand(src);
        assert!(diags.is_empty());
        assert_eq!(lines, vec!["LOOP: mov r1, r2", "stop"]);
    }
}
