//! Boolean expression language of transition conditions and action guards.
//!
//! # Syntax
//!
//! | Token                        | Meaning                                 | Precedence |
//! |------------------------------|-----------------------------------------|------------|
//! | `NOT`, `RE`, `FE`            | negation, rising edge, falling edge     | 4          |
//! | `>`, `>=`, `<`, `<=`         | numeric comparison                      | 3          |
//! | `AND`, `.`, `*`              | conjunction                             | 2          |
//! | `OR`, `+`                    | disjunction                             | 1          |
//! | `(` `)`                      | grouping                                |            |
//! | `TRUE`, `FALSE`              | boolean literals                        |            |
//! | `12`, `2.5`, `2s`, `250ms`   | numbers and time literals (in seconds)  |            |
//!
//! Keywords are case-insensitive, variable names are not. `.` must stand
//! alone between spaces since it also appears in names such as `X1.t`.
//!
//! # Evaluation
//!
//! Unknown variables read as `false`. `RE x` is true when `x` was false in
//! the previous variable map and is true now; `FE x` is the reverse. Edges
//! of compound operands such as `RE (A AND B)` are always false. Booleans
//! compare as `1` and `0`.
//!
//! [`evaluate`] fails closed: any expression that cannot be parsed or
//! evaluated yields `false`.
//!
//! ```
//! # use grafcet::{expr, value::{Value, Variables}};
//! let mut current = Variables::new();
//! current.insert("START".to_string(), Value::Bool(true));
//! current.insert("LEVEL".to_string(), Value::Number(75.0));
//! let previous = Variables::new();
//!
//! assert!(expr::evaluate("RE START AND LEVEL > 50", &current, &previous));
//! assert!(!expr::evaluate("START AND (LEVEL", &current, &previous));
//! assert!(expr::validate("START AND (LEVEL").is_err());
//! ```

mod eval;
mod postfix;
mod tokenize;

use std::str::FromStr;

use log::debug;
use thiserror::Error;

use crate::value::{Value, Variables};

use tokenize::Token;

/// Reasons an expression is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("expression is empty")]
    Empty,

    #[error("unbalanced parenthesis")]
    UnbalancedParenthesis,

    #[error("operator is missing an operand")]
    MissingOperand,

    #[error("operands are not joined by an operator")]
    MissingOperator,

    #[error("invalid number `{0}`")]
    InvalidNumber(String),
}

/// A parsed expression, ready to be evaluated repeatedly.
#[derive(Debug, Clone)]
pub struct Expression {
    text: String,
    postfix: Vec<Token>,
}

impl Expression {
    /// Parses `text` into postfix form.
    ///
    /// # Errors
    ///
    /// Returns an [`ExprError`] for empty input, unbalanced parentheses,
    /// operators without operands, dangling operands and malformed numbers.
    pub fn parse(text: &str) -> Result<Self, ExprError> {
        let tokens = tokenize::tokenize(text)?;
        let postfix = postfix::to_postfix(tokens)?;
        Ok(Self {
            text: text.to_string(),
            postfix,
        })
    }

    /// Source text of the expression.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Evaluates to a raw [`Value`].
    pub fn value(&self, current: &Variables, previous: &Variables) -> Result<Value, ExprError> {
        eval::evaluate(&self.postfix, current, previous)
    }

    /// Evaluates to a boolean, treating evaluation failures as `false`.
    pub fn evaluate(&self, current: &Variables, previous: &Variables) -> bool {
        match self.value(current, previous) {
            Ok(value) => value.is_truthy(),
            Err(err) => {
                debug!(expression = self.text.as_str(), err:%; "Expression evaluation failed");
                false
            }
        }
    }
}

impl FromStr for Expression {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Checks that `text` is a well-formed expression.
pub fn validate(text: &str) -> Result<(), ExprError> {
    Expression::parse(text).map(|_| ())
}

/// Parses and evaluates `text` in one go; malformed input yields `false`.
pub fn evaluate(text: &str, current: &Variables, previous: &Variables) -> bool {
    match Expression::parse(text) {
        Ok(expression) => expression.evaluate(current, previous),
        Err(err) => {
            debug!(expression = text, err:%; "Expression rejected");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(entries: &[(&str, Value)]) -> Variables {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    fn eval(text: &str, current: &Variables) -> bool {
        evaluate(text, current, &Variables::new())
    }

    #[test]
    fn test_literals() {
        let empty = Variables::new();
        assert!(eval("TRUE", &empty));
        assert!(eval("true", &empty));
        assert!(!eval("FALSE", &empty));
        assert!(eval("1", &empty));
        assert!(!eval("0", &empty));
    }

    #[test]
    fn test_unknown_variables_are_false() {
        let empty = Variables::new();
        assert!(!eval("MISSING", &empty));
        assert!(eval("NOT MISSING", &empty));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let current = vars(&[("A", true.into()), ("B", false.into()), ("C", false.into())]);

        assert!(eval("A OR B AND C", &current));
        assert!(!eval("(A OR B) AND C", &current));
        assert!(eval("A + B . C", &current));
        assert!(eval("A+B*C", &current));
    }

    #[test]
    fn test_not_binds_tightest() {
        let current = vars(&[("A", false.into()), ("B", true.into())]);

        assert!(eval("NOT A AND B", &current));
        assert!(!eval("NOT (A OR B)", &current));
        assert!(eval("not not B", &current));
    }

    #[test]
    fn test_comparisons() {
        let current = vars(&[("LEVEL", 75.0.into()), ("FULL", true.into())]);

        assert!(eval("LEVEL > 50", &current));
        assert!(eval("LEVEL>=75", &current));
        assert!(!eval("LEVEL < 75", &current));
        assert!(eval("LEVEL <= 75 AND FULL", &current));
        assert!(eval("FULL >= 1", &current));
        assert!(eval("MISSING < 1", &current));
    }

    #[test]
    fn test_time_literals_compare_in_seconds() {
        let current = vars(&[("X1.t", 2.5.into())]);

        assert!(eval("X1.t > 2s", &current));
        assert!(eval("X1.t >= 2500ms", &current));
        assert!(!eval("X1.t > 3s", &current));
    }

    #[test]
    fn test_rising_and_falling_edges() {
        let previous = vars(&[("A", false.into()), ("B", true.into())]);
        let current = vars(&[("A", true.into()), ("B", false.into())]);

        assert!(evaluate("RE A", &current, &previous));
        assert!(!evaluate("FE A", &current, &previous));
        assert!(evaluate("FE B", &current, &previous));
        assert!(!evaluate("RE A", &current, &current));
        assert!(evaluate("RE (A)", &current, &previous));
        assert!(!evaluate("RE (A AND A)", &current, &previous));
    }

    #[test]
    fn test_edge_of_unknown_previous_reads_false() {
        let current = vars(&[("START", true.into())]);
        assert!(evaluate("RE START", &current, &Variables::new()));
    }

    #[test]
    fn test_malformed_expressions_fail_closed() {
        let current = vars(&[("A", true.into()), ("B", true.into())]);

        for text in ["", "   ", "A AND", "(A", "A)", "A B", "AND", "1x > 0", "NOT"] {
            assert!(validate(text).is_err(), "{text:?} should be rejected");
            assert!(!eval(text, &current), "{text:?} should evaluate to false");
        }
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(validate("").unwrap_err(), ExprError::Empty);
        assert_eq!(validate("(A").unwrap_err(), ExprError::UnbalancedParenthesis);
        assert_eq!(validate("A OR").unwrap_err(), ExprError::MissingOperand);
        assert_eq!(validate("A B").unwrap_err(), ExprError::MissingOperator);
        assert_eq!(
            validate("3q").unwrap_err(),
            ExprError::InvalidNumber("3q".to_string())
        );
    }

    #[test]
    fn test_parsed_expression_is_reusable() {
        let expression: Expression = "A AND NOT B".parse().unwrap();
        let on = vars(&[("A", true.into())]);
        let off = vars(&[("A", true.into()), ("B", true.into())]);

        assert_eq!(expression.text(), "A AND NOT B");
        assert!(expression.evaluate(&on, &Variables::new()));
        assert!(!expression.evaluate(&off, &Variables::new()));
    }
}
