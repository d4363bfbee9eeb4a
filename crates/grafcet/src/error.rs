//! Error types for GRAFCET operations.
//!
//! This module provides the main error type [`GrafcetError`] which wraps
//! the error conditions that can occur while compiling or simulating a chart.

use std::io;

use thiserror::Error;

use grafcet_parser::error::ParseError;

use crate::expr::ExprError;

/// The main error type for GRAFCET operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the structured
/// diagnostics so that callers can render labelled snippets.
#[derive(Debug, Error)]
pub enum GrafcetError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Invalid expression: {0}")]
    Expression(#[from] ExprError),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Scenario error: {0}")]
    Scenario(String),
}

impl GrafcetError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
