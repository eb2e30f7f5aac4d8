//! Error and diagnostic types shared across the pipeline.
//!
//! Two different things are called "errors" here: per-line problems
//! that accumulate and are reported without stopping the pass (a
//! [`Diagnostic`]), and conditions that abort a stage outright (an
//! [`AssemblerError`]). A translation unit can survive any number of
//! the former and still fail the run; it cannot survive one of the latter.

use std::path::PathBuf;
use thiserror::Error;

/// Severity of a single reported [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single per-line problem found during pre-processing or a pass.
///
/// `line` is `None` only for file-level problems that have no source
/// line to point at (an unopenable file, for instance — those are
/// reported as [`AssemblerError`] instead and never become a `Diagnostic`).
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn error(line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            line,
            message: message.into(),
        }
    }

    pub fn warning(line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            line,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        write!(f, "{kind} on line {}: {}", self.line, self.message)
    }
}

/// Fatal, stage-aborting failures — file I/O, or a translation unit that
/// accumulated per-line errors and must not proceed to the next stage.
#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("cannot open file '{path}'")]
    CannotOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create file '{path}'")]
    CannotCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write to file '{path}'")]
    CannotWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stage (pre-processor, first pass, second pass) found one or more
    /// per-line errors. The diagnostics have already been reported; this
    /// just signals the caller that the pipeline must stop here.
    #[error("{0} error(s) in translation unit, assembly aborted")]
    SourceErrors(usize),
}

/// Errors from loading or saving [`crate::config::AssemblerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine configuration directory")]
    NoConfigDir,

    #[error("I/O error accessing configuration")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),
}
