//! Error codes for the GRAFCET diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E1xx` - Directive syntax and chart structure while building the AST
//! - `E2xx` - Structural validation
//!
//! Some codes are reported with [`Severity::Warning`](super::Severity); the
//! code identifies the rule, the severity decides whether it blocks.

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Syntax Errors (E1xx)
    // =========================================================================
    /// Malformed directive.
    ///
    /// The line starts with a known keyword but its arguments do not match
    /// the directive's grammar.
    E100,

    /// Unclosed divergence.
    ///
    /// The source ended while a `Divergence` was still open.
    E101,

    /// Misplaced structural directive.
    ///
    /// `Branch`, `EndBranch` or `EndDivergence` appeared outside a divergence,
    /// or an element was written inside a divergence but outside any branch.
    E102,

    /// Invalid action attribute.
    ///
    /// Unknown attribute key, unknown qualifier, or an unreadable duration.
    E103,

    /// Missing action duration.
    ///
    /// A time-based qualifier (`L`, `D`, `SD`, `DS`, `SL`) was given no duration.
    E104,

    /// Action without a step.
    ///
    /// `Action` or `LinkedFile` appeared before any step in its sequence.
    E105,

    /// Unrecognized line.
    ///
    /// The line does not start with a known directive keyword and is ignored.
    E106,

    // =========================================================================
    // Structure Errors (E2xx)
    // =========================================================================
    /// AND divergence not preceded by a transition.
    E200,

    /// OR divergence not preceded by a step.
    E201,

    /// Invalid AND branch.
    ///
    /// AND branches must start and end with a step.
    E202,

    /// Invalid OR branch.
    ///
    /// OR branches must start and end with a transition.
    E203,

    /// Too few branches.
    ///
    /// A divergence needs at least two branches.
    E204,

    /// Missing synchronizing transition.
    ///
    /// An AND convergence must be followed by the transition that fires
    /// once every branch has completed.
    E205,

    /// Redundant transition after OR convergence.
    ///
    /// OR branches already end with their own transitions.
    E206,

    /// Consecutive elements of the same kind.
    ///
    /// Two steps or two transitions directly follow each other.
    E207,

    /// Duplicate step number.
    E208,

    /// Duplicate transition number.
    E209,

    /// Undefined jump target.
    ///
    /// A jump names a step that is not declared above it.
    E210,

    /// No initial step.
    E211,

    /// Unparsable transition condition.
    ///
    /// The condition is compiled as written but always evaluates to false.
    E212,

    /// Unreachable element.
    ///
    /// An element directly follows a `Jump`, so nothing connects into it.
    E213,

    /// Chart does not start with a step.
    E214,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E101").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Syntax errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E106 => "E106",
            // Structure errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
            ErrorCode::E207 => "E207",
            ErrorCode::E208 => "E208",
            ErrorCode::E209 => "E209",
            ErrorCode::E210 => "E210",
            ErrorCode::E211 => "E211",
            ErrorCode::E212 => "E212",
            ErrorCode::E213 => "E213",
            ErrorCode::E214 => "E214",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Syntax errors
            ErrorCode::E100 => "malformed directive",
            ErrorCode::E101 => "unclosed divergence",
            ErrorCode::E102 => "misplaced structural directive",
            ErrorCode::E103 => "invalid action attribute",
            ErrorCode::E104 => "missing action duration",
            ErrorCode::E105 => "action without a step",
            ErrorCode::E106 => "unrecognized line",
            // Structure errors
            ErrorCode::E200 => "AND divergence must follow a transition",
            ErrorCode::E201 => "OR divergence must follow a step",
            ErrorCode::E202 => "invalid AND branch",
            ErrorCode::E203 => "invalid OR branch",
            ErrorCode::E204 => "too few branches",
            ErrorCode::E205 => "missing synchronizing transition",
            ErrorCode::E206 => "redundant transition",
            ErrorCode::E207 => "consecutive elements of the same kind",
            ErrorCode::E208 => "duplicate step number",
            ErrorCode::E209 => "duplicate transition number",
            ErrorCode::E210 => "undefined jump target",
            ErrorCode::E211 => "no initial step",
            ErrorCode::E212 => "unparsable condition",
            ErrorCode::E213 => "unreachable element",
            ErrorCode::E214 => "chart must start with a step",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E212.to_string(), "E212");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E101.description(), "unclosed divergence");
        assert_eq!(ErrorCode::E208.description(), "duplicate step number");
    }
}
