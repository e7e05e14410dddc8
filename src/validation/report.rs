//! Diagnostics produced by checking a set of annotation intervals.
//!
//! Issues point at an interval (or one of its label configs) by position
//! and id, so the CLI can print them and scripts can filter on the code.

use serde::Serialize;
use std::fmt;

/// Every issue found in one validation pass, in discovery order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Issues that block export.
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// No errors; warnings allowed.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns true if any issue carries `code`.
    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    /// Issue messages in report order, for flat listings.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// One finding against an interval or the store.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,

    pub code: IssueCode,

    /// Message for humans; not stable.
    pub message: String,

    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
        context: IssueContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Error, code, message, context)
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

/// How bad an issue is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Suspicious but exportable.
    Warning,
    /// Data that breaks an invariant of the store or the export.
    Error,
}

/// Machine-readable issue kind. Serialized by variant name in JSON reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    // Time issues
    /// Start time is not before end time.
    InvalidTimeRange,
    /// A time is NaN or infinite.
    NonFiniteTime,
    /// Start time is below zero.
    NegativeStartTime,
    /// Interval ends after the recorded video duration.
    BeyondVideoDuration,

    // Label issues
    /// Interval has no labels at all.
    EmptyLabels,
    /// A label config has an empty id.
    EmptyLabelId,
    /// Intensity outside [0, 1].
    IntensityOutOfRange,
    /// The same label id appears twice in one interval.
    DuplicateLabel,
    /// Label id is not in the catalog and will be skipped on export.
    UnknownLabel,

    // Store issues
    /// Two intervals overlap (half-open test).
    OverlappingIntervals,
    /// Two intervals share an id.
    DuplicateIntervalId,
}

/// Where an issue was found. Indices are 0-based; `Display` shows them 1-based.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueContext {
    /// Issue with the store as a whole.
    Store,
    /// Issue with a specific interval (position in store order and id).
    Interval { index: usize, id: String },
    /// Issue with one label config of an interval.
    Label {
        interval: usize,
        id: String,
        label_index: usize,
    },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Store => write!(f, "store"),
            IssueContext::Interval { index, id } => {
                write!(f, "interval {} ({})", index + 1, id)
            }
            IssueContext::Label {
                interval,
                id,
                label_index,
            } => write!(f, "interval {} ({}), label {}", interval + 1, id, label_index + 1),
        }
    }
}
