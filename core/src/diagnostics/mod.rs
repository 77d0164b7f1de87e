//! Diagnostics collected while processing type descriptors.
//!
//! A [`Reporter`] gathers [`Diagnostic`]s and tags each one with the file
//! currently being processed. Registry and codec errors convert through
//! [`StError::to_diagnostic`].

use crate::error::StError;
use crate::{String, Vec, format, vec};
use alloc::string::ToString;
use core::fmt;
use tracing::{error, warn};

/// File name used when no file has been pushed.
pub const UNKNOWN_FILE: &str = "???";

/// Which part of the toolchain a diagnostic comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Unknown,
    /// A broken invariant inside the compiler itself.
    Internal,
    /// Malformed input handed to the compiler.
    Input,
    Lexer,
    Parser,
    CodeGen,
    Vm,
    Runtime,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Category::Unknown => "unknown",
            Category::Internal => "internal",
            Category::Input => "input",
            Category::Lexer => "lexer",
            Category::Parser => "parser",
            Category::CodeGen => "codegen",
            Category::Vm => "vm",
            Category::Runtime => "runtime",
            Category::Other => "other",
        };
        f.write_str(name)
    }
}

/// Severity level for diagnostics, least severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Note,
    Warning,
    /// Processing continues but cannot succeed.
    Error,
    /// Processing stops.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// Position in a source file, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: String,
    pub location: Option<Location>,
    pub severity: Severity,
    pub category: Category,
    /// Stable number identifying the kind of problem.
    pub number: i32,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    /// `file:line:column: severity[category number]: message`
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.file)?;
        if let Some(loc) = self.location {
            write!(f, ":{}:{}", loc.line, loc.column)?;
        }
        write!(
            f,
            ": {}[{} {}]: {}",
            self.severity, self.category, self.number, self.message
        )
    }
}

impl StError {
    /// Convert into a diagnostic attributed to `file`.
    pub fn to_diagnostic(&self, file: &str, location: Option<Location>) -> Diagnostic {
        Diagnostic {
            file: file.to_string(),
            location,
            severity: self.severity(),
            category: self.category(),
            number: self.number(),
            message: format!("{}", self),
        }
    }
}

/// Collects diagnostics, attributing each to the innermost pushed file.
#[derive(Debug, Clone)]
pub struct Reporter {
    files: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    pub fn new() -> Self {
        Self {
            files: vec![UNKNOWN_FILE.to_string()],
            diagnostics: Vec::new(),
        }
    }

    pub fn push_file_name(&mut self, name: &str) {
        self.files.push(name.to_string());
    }

    /// Leave the current file. The root entry is never removed.
    pub fn pop_file_name(&mut self) {
        if self.files.len() > 1 {
            self.files.pop();
        }
    }

    pub fn current_file(&self) -> &str {
        self.files.last().map_or(UNKNOWN_FILE, String::as_str)
    }

    pub fn report(
        &mut self,
        location: Option<Location>,
        severity: Severity,
        category: Category,
        number: i32,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            file: self.current_file().to_string(),
            location,
            severity,
            category,
            number,
            message: message.into(),
        };
        match severity {
            Severity::Fatal | Severity::Error => error!(%diagnostic, "reported"),
            Severity::Warning => warn!(%diagnostic, "reported"),
            Severity::Note => {}
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn report_st_error(&mut self, location: Option<Location>, err: &StError) {
        let diagnostic = err.to_diagnostic(self.current_file(), location);
        self.report(
            diagnostic.location,
            diagnostic.severity,
            diagnostic.category,
            diagnostic.number,
            diagnostic.message,
        );
    }

    pub fn count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Number of diagnostics at `severity` or worse.
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity >= severity)
            .count()
    }

    pub fn has_fatal(&self) -> bool {
        self.count_at_least(Severity::Fatal) > 0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}
