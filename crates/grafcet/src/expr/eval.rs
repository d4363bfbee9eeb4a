//! Postfix evaluation.

use super::{ExprError, tokenize::Token};
use crate::value::{Value, Variables};

/// A value on the evaluation stack, remembering the variable it was read from.
///
/// Only plain variable reads carry a source; edge operators need it to look
/// up the previous value.
struct Operand<'a> {
    value: Value,
    source: Option<&'a str>,
}

impl Operand<'_> {
    fn computed(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            source: None,
        }
    }
}

pub(super) fn evaluate(
    postfix: &[Token],
    current: &Variables,
    previous: &Variables,
) -> Result<Value, ExprError> {
    let mut stack: Vec<Operand<'_>> = Vec::with_capacity(postfix.len());
    let read = |variables: &Variables, name: &str| variables.get(name).copied().unwrap_or_default();

    for token in postfix {
        let operand = match token {
            Token::Literal(value) => Operand::computed(*value),
            Token::Variable(name) => Operand {
                value: read(current, name),
                source: Some(name.as_str()),
            },
            Token::Not => {
                let operand = pop(&mut stack)?;
                Operand::computed(!operand.value.is_truthy())
            }
            Token::RisingEdge | Token::FallingEdge => {
                let operand = pop(&mut stack)?;
                let rising = *token == Token::RisingEdge;
                let edge = operand.source.is_some_and(|name| {
                    let before = read(previous, name).is_truthy();
                    let now = operand.value.is_truthy();
                    if rising { !before && now } else { before && !now }
                });
                Operand::computed(edge)
            }
            Token::And | Token::Or => {
                let right = pop(&mut stack)?.value.is_truthy();
                let left = pop(&mut stack)?.value.is_truthy();
                let result = if *token == Token::And {
                    left && right
                } else {
                    left || right
                };
                Operand::computed(result)
            }
            Token::Compare(comparison) => {
                let right = pop(&mut stack)?.value.as_number();
                let left = pop(&mut stack)?.value.as_number();
                Operand::computed(comparison.apply(left, right))
            }
            Token::Open | Token::Close => return Err(ExprError::UnbalancedParenthesis),
        };
        stack.push(operand);
    }

    let result = pop(&mut stack)?;
    if stack.is_empty() {
        Ok(result.value)
    } else {
        Err(ExprError::MissingOperator)
    }
}

fn pop<'a>(stack: &mut Vec<Operand<'a>>) -> Result<Operand<'a>, ExprError> {
    stack.pop().ok_or(ExprError::MissingOperand)
}
