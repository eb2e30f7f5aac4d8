//! Renders [`Diagnostic`]s to the terminal and, optionally, to a log file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::Diagnostic;

/// Prints one diagnostic per line to stderr, prefixed with the source
/// file name so multi-file runs stay readable.
pub fn report(file_name: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{file_name}: {diagnostic}");
    }
}

/// Appends every diagnostic to `log_path`, one per line, preceded by
/// `file_name`. Failures to write the log are swallowed — a missing
/// log is not worth aborting an otherwise successful assembly over.
pub fn append_to_log(log_path: &Path, file_name: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    let file = OpenOptions::new().create(true).append(true).open(log_path);
    let mut file = match file {
        Ok(file) => file,
        Err(_) => return,
    };
    for diagnostic in diagnostics {
        let _ = writeln!(file, "{file_name}: {diagnostic}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostic;

    #[test]
    fn append_to_log_writes_one_line_per_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("asm12.log");
        let diags = vec![Diagnostic::error(3, "bad operand"), Diagnostic::warning(5, "ignored label")];
        append_to_log(&log_path, "prog.as", &diags);
        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("prog.as"));
    }

    #[test]
    fn append_to_log_is_a_no_op_for_no_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("asm12.log");
        append_to_log(&log_path, "prog.as", &[]);
        assert!(!log_path.exists());
    }
}
