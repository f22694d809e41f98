//! Diagnostics collected while decoding or flattening record batches.
//!
//! A batch never aborts on a bad row. The row is skipped and recorded as an
//! error; a row that was mapped with a substituted value (an operator that
//! could not be resolved, say) is recorded as a warning. Every issue is
//! categorized by the stable [`MappingError::code`](crate::MappingError::code)
//! or, for warnings, by what was substituted.
//!
//! # Example
//!
//! ```
//! use gridmap_core::diagnostics::{BatchDiagnostics, Severity};
//! use gridmap_core::MappingError;
//!
//! let mut diag = BatchDiagnostics::new();
//! diag.record_success();
//! diag.record_warning(1, "NodeInput 'n1'", "reference", "operator 42 not found");
//! diag.record_failure(2, "NodeInput 'n2'", &MappingError::parsing("uuid", "x", "bad length"));
//!
//! assert_eq!(diag.stats.processed, 2);
//! assert_eq!(diag.stats.skipped, 1);
//! assert_eq!(diag.issues.count(Severity::Warning), 1);
//! assert_eq!(diag.issues.count(Severity::Error), 1);
//! ```

use serde::Serialize;

use crate::MappingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The row was mapped with a substituted value.
    Warning,
    /// The row was skipped.
    Error,
}

impl Severity {
    fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// One thing that went wrong with one row.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Failure code, or `reference` for substituted references
    pub category: String,
    pub message: String,
    /// 1-based row within the batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Entity label or type name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            category: category.into(),
            message: message.into(),
            row: None,
            entity: None,
        }
    }

    /// An error issue for a mapping failure, categorized by its code.
    pub fn error(err: &MappingError) -> Self {
        Self {
            severity: Severity::Error,
            category: err.code().to_string(),
            message: err.to_string(),
            row: None,
            entity: None,
        }
    }

    /// Attach the row and entity label the issue belongs to.
    pub fn at(mut self, row: usize, entity: impl Into<String>) -> Self {
        self.row = Some(row);
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(row) = self.row {
            write!(f, "row {row}: ")?;
        }
        write!(f, "{} [{}] {}", self.severity.as_str(), self.category, self.message)?;
        if let Some(entity) = &self.entity {
            write!(f, " ({entity})")?;
        }
        Ok(())
    }
}

/// Issues in the order they were recorded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// E.g. `2 warnings, 1 error`.
    pub fn summary(&self) -> String {
        let counted = |severity: Severity| {
            let n = self.count(severity);
            let plural = if n == 1 { "" } else { "s" };
            (n > 0).then(|| format!("{n} {}{plural}", severity.as_str()))
        };
        let parts: Vec<String> = [Severity::Warning, Severity::Error]
            .into_iter()
            .filter_map(counted)
            .collect();
        if parts.is_empty() {
            "no issues".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Row counters for a batch decode or flatten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub processed: usize,
    pub succeeded: usize,
    pub skipped: usize,
}

/// Statistics plus issues for one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchDiagnostics {
    pub stats: BatchStats,
    pub issues: Diagnostics,
}

impl BatchDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.stats.processed += 1;
        self.stats.succeeded += 1;
    }

    /// Note a substitution on a row that was still mapped. Counters are
    /// untouched; call [`record_success`](Self::record_success) for the row.
    pub fn record_warning(
        &mut self,
        row: usize,
        entity: &str,
        category: &str,
        message: impl Into<String>,
    ) {
        self.issues
            .push(DiagnosticIssue::warning(category, message).at(row, entity));
    }

    /// Count a skipped row and keep its failure.
    pub fn record_failure(&mut self, row: usize, entity: &str, err: &MappingError) {
        self.stats.processed += 1;
        self.stats.skipped += 1;
        self.issues.push(DiagnosticIssue::error(err).at(row, entity));
    }

    pub fn summary(&self) -> String {
        format!(
            "{} rows, {} mapped, {} skipped ({})",
            self.stats.processed,
            self.stats.succeeded,
            self.stats.skipped,
            self.issues.summary()
        )
    }
}

impl std::fmt::Display for BatchDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for issue in &self.issues.issues {
            writeln!(f, "  {issue}")?;
        }
        Ok(())
    }
}
