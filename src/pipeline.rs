//! Wires pre-processing and both passes into one run per translation unit.

use std::fs;
use std::path::Path;

use crate::error::{AssemblerError, Diagnostic};
use crate::output::AssembledImage;
use crate::state::AssemblerState;
use crate::{first_pass, preprocessor, second_pass};

pub struct AssemblyResult {
    /// `None` whenever any stage reported an error; diagnostics are
    /// still populated so the caller can print them.
    pub image: Option<AssembledImage>,
    pub expanded_source: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AssemblyResult {
    pub fn succeeded(&self) -> bool {
        self.image.is_some()
    }
}

fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

/// Runs the full pipeline over already-read source text. The second
/// pass only runs if the first pass produced zero errors — continuing
/// with a state the first pass gave up on would just relocate garbage.
pub fn assemble_source(source: &str) -> AssemblyResult {
    let (expanded, mut diagnostics) = preprocessor::expand(source);
    if has_errors(&diagnostics) {
        return AssemblyResult { image: None, expanded_source: expanded, diagnostics };
    }

    let (mut state, fp_diags): (AssemblerState, Vec<Diagnostic>) = first_pass::run(&expanded);
    diagnostics.extend(fp_diags);
    if has_errors(&diagnostics) {
        return AssemblyResult { image: None, expanded_source: expanded, diagnostics };
    }

    let sp_diags = second_pass::run(&expanded, &mut state);
    diagnostics.extend(sp_diags);
    if has_errors(&diagnostics) {
        return AssemblyResult { image: None, expanded_source: expanded, diagnostics };
    }

    let image = AssembledImage::from_state(&state);
    AssemblyResult { image: Some(image), expanded_source: expanded, diagnostics }
}

/// Reads `path` and runs [`assemble_source`] over it.
pub fn assemble_file(path: &Path) -> Result<AssemblyResult, AssemblerError> {
    let source = fs::read_to_string(path).map_err(|source| AssemblerError::CannotOpen {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(assemble_source(&source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_stop_program_assembles_cleanly() {
        let result = assemble_source("stop\n");
        assert!(result.succeeded());
        let image = result.image.unwrap();
        assert_eq!(image.memory.len(), 1);
    }

    #[test]
    fn register_move_then_stop() {
        let result = assemble_source("mov r3, r5\nstop\n");
        assert!(result.succeeded());
        assert_eq!(result.image.unwrap().memory.len(), 4);
    }

    #[test]
    fn first_pass_errors_prevent_second_pass_from_running() {
        let result = assemble_source("mov r9, r1\nstop\n");
        assert!(!result.succeeded());
        assert!(!result.diagnostics.is_empty());
    }

    #[test]
    fn data_directive_with_label_fixup_round_trips() {
        let result = assemble_source("mov LIST, r2\nLIST: .data 7, 8\nstop\n");
        assert!(result.succeeded(), "{:?}", result.diagnostics);
        let image = result.image.unwrap();
        assert_eq!(image.memory.len(), 3 + 2);
    }

    #[test]
    fn macro_is_expanded_before_first_pass_runs() {
        let src = "mcro CLEAR_ALL\nclr r1\nclr r2\nmcroend\nCLEAR_ALL\nstop\n";
        let result = assemble_source(src);
        assert!(result.succeeded(), "{:?}", result.diagnostics);
        assert_eq!(result.image.unwrap().memory.len(), 3);
    }

    #[test]
    fn external_reference_is_recorded_with_its_use_site() {
        let src = ".extern FOO\njmp FOO\nstop\n";
        let result = assemble_source(src);
        assert!(result.succeeded(), "{:?}", result.diagnostics);
        let image = result.image.unwrap();
        assert_eq!(image.externals.len(), 1);
        assert_eq!(image.externals[0].name, "FOO");
    }
}
