// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::model::Location;
use core::fmt;
use std::fmt::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    StructuralViolation,
    UnsupportedParameterType,
    AnnotationShapeError,
    UnsupportedExpressionForm,
    BaseResolutionError,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::StructuralViolation => "structural violation",
            DiagnosticKind::UnsupportedParameterType => "unsupported parameter type",
            DiagnosticKind::AnnotationShapeError => "annotation shape error",
            DiagnosticKind::UnsupportedExpressionForm => "unsupported expression form",
            DiagnosticKind::BaseResolutionError => "base resolution error",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal problem with one template class.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// `None` means unknown location.
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, location: Option<Location>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }

    /// Keeps a known location; otherwise takes `fallback`.
    pub fn or_location(mut self, fallback: Option<Location>) -> Self {
        self.location = self.location.or(fallback);
        self
    }

    /// `line:column: kind: message`, or `?:?` when the location is unknown.
    pub fn to_report_line(&self) -> String {
        match self.location {
            Some(location) => format!("{}: {}: {}", location, self.kind, self.message),
            None => format!("?:?: {}: {}", self.kind, self.message),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first_kind(&self) -> Option<DiagnosticKind> {
        self.0.first().map(|d| d.kind)
    }

    pub fn or_location(self, fallback: Option<Location>) -> Self {
        Diagnostics(self.0.into_iter().map(|d| d.or_location(fallback)).collect())
    }

    /// Preprocessor directives that make the C# compiler fail at each
    /// diagnostic's location.
    pub fn into_failure_marker(self) -> String {
        let mut marker = String::new();
        for diagnostic in self.0 {
            if let Some(location) = diagnostic.location {
                let _ = writeln!(marker, "#line {}", location.line);
            }

            // #error runs to the end of the line.
            let message = diagnostic.message.replace(['\r', '\n'], " ");
            let _ = writeln!(marker, "#error {}: {}", diagnostic.kind, message);

            if diagnostic.location.is_some() {
                marker.push_str("#line default\n");
            }
        }
        marker
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            f.write_str(&diagnostic.to_report_line())?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Diagnostics(vec![diagnostic])
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

pub struct Errors {
    diagnostics: Vec<Diagnostic>,
}

impl Errors {
    pub const fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn check(self) -> Result<(), Diagnostics> {
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(Diagnostics(self.diagnostics))
        }
    }

    pub fn add(&mut self, kind: DiagnosticKind, pos: Option<Location>, message: impl Into<String>) {
        self.push(Diagnostic::new(kind, pos, message));
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
