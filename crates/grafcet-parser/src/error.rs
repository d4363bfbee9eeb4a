//! Error and diagnostic system for the GRAFCET parser.
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning with an optional error code, labeled source
//! locations, help text and a sequence path. A failed parse wraps every
//! collected diagnostic in a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use grafcet_parser::error::{Diagnostic, ErrorCode};
//! # use grafcet_parser::Span;
//!
//! let diag = Diagnostic::error("step 3 is declared more than once")
//!     .with_code(ErrorCode::E208)
//!     .with_label(Span::new(100..106), "duplicate step")
//!     .with_secondary_label(Span::new(50..56), "first declared here")
//!     .with_help("give each step a unique number");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;
pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
