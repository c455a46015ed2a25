//! Diagnostics carried on every operation response.
//!
//! Diagnostics report user-correctable conditions (a read-only attribute set
//! in configuration, a state blob that no longer decodes) without aborting
//! the operation. A response whose diagnostics contain at least one error
//! must be treated as a failed operation by the host; partial results may
//! still be inspected for a best-effort message.

use serde::Serialize;

/// Severity of a single diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The operation failed from the user's point of view.
    Error,
    /// Advisory only; the operation result is still usable.
    Warning,
}

/// A single diagnostic message.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Severity of the condition.
    pub severity: Severity,
    /// Human-readable description.
    pub summary: String,
    /// Attribute the condition concerns, if it concerns one.
    pub attribute: Option<String>,
}

/// An ordered collection of diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostic {
    /// Creates an error diagnostic without an attribute path.
    #[must_use]
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            attribute: None,
        }
    }

    /// Creates a warning diagnostic without an attribute path.
    #[must_use]
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            attribute: None,
        }
    }

    /// Attaches the attribute this diagnostic concerns.
    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// The error raised when configuration sets a computed attribute.
    #[must_use]
    pub fn read_only_attribute(attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        Self::error(format!("\"{attribute}\" attribute is read-only")).with_attribute(attribute)
    }

    /// The error raised when a persisted state blob cannot be decoded.
    #[must_use]
    pub fn decode_error(summary: impl Into<String>) -> Self {
        Self::error(format!("Failed to decode prior state: {}", summary.into()))
    }
}

impl Diagnostics {
    /// Creates an empty diagnostics collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Appends a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns true if no diagnostics were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if at least one error-severity diagnostic is present.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// Iterates over the recorded diagnostics in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &self.attribute {
            Some(attribute) => write!(f, "{level}: {} ({attribute})", self.summary),
            None => write!(f, "{level}: {}", self.summary),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, diagnostic) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_no_errors() {
        let diags = Diagnostics::new();
        assert!(diags.is_empty());
        assert!(!diags.has_errors());
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::warning("something advisory"));
        assert!(!diags.has_errors());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_read_only_diagnostic_names_attribute() {
        let diag = Diagnostic::read_only_attribute("output");
        assert_eq!(diag.severity, Severity::Error);
        assert!(diag.summary.contains("attribute is read-only"));
        assert_eq!(diag.attribute.as_deref(), Some("output"));
    }
}
