//! # GRAFCET Parser
//!
//! Parser and structural validator for the line-oriented GRAFCET chart
//! language. This crate turns source text into a validated [`ast::Program`];
//! layout and simulation live in the `grafcet` crate.
//!
//! ## Usage
//!
//! ```
//! # use grafcet_parser::{check, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         SFC "Door"
//!         Step 0 (Initial)
//!         Transition OPEN_BUTTON
//!         Step 1
//!         Action MOTOR_OPEN (N)
//!         Transition RE LIMIT_OPEN
//!         Jump 0
//!     "#;
//!
//!     let parsed = check(source)?;
//!     assert_eq!(parsed.program().sequence.len(), 5);
//!     Ok(())
//! }
//! ```
//!
//! ## Language
//!
//! | Directive                              | Meaning                                   |
//! |----------------------------------------|-------------------------------------------|
//! | `SFC "title"`                          | chart title                               |
//! | `Step <n> [(kind)] ["label"]`          | step; kind is Initial, Normal, Task, Macro |
//! | `Action <name> [(attributes)]`         | action on the most recent step            |
//! | `LinkedFile "name"`                    | sub-program of the most recent step       |
//! | `Transition [T<n>] <condition>`        | transition with receptivity               |
//! | `Jump <n>`                             | link back to an earlier step              |
//! | `Divergence AND\|OR`                   | open parallel or alternative branches     |
//! | `Branch` / `EndBranch`                 | delimit one branch                        |
//! | `EndDivergence` / `Converge`           | close the divergence                      |
//!
//! Blank lines and `//` comments are ignored.

mod builder;
pub mod error;
mod lexer;
mod parser;
mod parser_types;
mod span;
mod validate;

/// The chart syntax tree.
pub mod ast {
    pub use crate::parser_types::{
        Branch, DivergenceDecl, Element, JumpDecl, Program, Sequence, StepDecl, TransitionDecl,
    };
}

pub use span::{Span, Spanned};
pub use validate::validate;

use log::info;

use builder::Builder;
use error::{Diagnostic, DiagnosticCollector, ParseError};
use parser_types::Program;

/// A successfully parsed program and the warnings reported for it.
#[derive(Debug, Clone)]
pub struct Parsed {
    program: Program,
    warnings: Vec<Diagnostic>,
}

impl Parsed {
    pub(crate) fn new(program: Program, warnings: Vec<Diagnostic>) -> Self {
        Self { program, warnings }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Non-blocking diagnostics, in the order they were found.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_parts(self) -> (Program, Vec<Diagnostic>) {
        (self.program, self.warnings)
    }
}

/// Parse source text into a program without structural validation.
///
/// Fails with every syntax error found; unrecognized lines are reported as
/// warnings.
pub fn parse(source: &str) -> Result<Parsed, ParseError> {
    Builder::new().build(source)
}

/// Parse and validate source text.
///
/// This is the main entry point. It runs the whole front end:
///
/// 1. **Lex** - split into directive lines, drop comments
/// 2. **Parse** - read each directive
/// 3. **Build** - assemble the nested program and number transitions
/// 4. **Validate** - check GRAFCET structure
///
/// Any error-severity diagnostic fails the call; the returned error then
/// also carries the warnings. On success the warnings of every phase are
/// available through [`Parsed::warnings`].
pub fn check(source: &str) -> Result<Parsed, ParseError> {
    let (program, warnings) = parse(source)?.into_parts();

    let mut collector = DiagnosticCollector::new();
    collector.extend(warnings);
    collector.extend(validate(&program));
    let warnings = collector.finish()?;

    info!(
        elements = program.sequence.len(),
        warnings = warnings.len();
        "Chart checked"
    );
    Ok(Parsed::new(program, warnings))
}
