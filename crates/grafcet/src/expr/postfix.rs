//! Infix to postfix conversion (shunting-yard).

use super::{ExprError, tokenize::Token};

/// Reorders `tokens` into postfix and checks that every operator has its operands.
pub(super) fn to_postfix(tokens: Vec<Token>) -> Result<Vec<Token>, ExprError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Literal(_) | Token::Variable(_) => output.push(token),
            Token::Not | Token::RisingEdge | Token::FallingEdge | Token::Open => {
                operators.push(token)
            }
            Token::And | Token::Or | Token::Compare(_) => {
                let precedence = token.precedence();
                while operators
                    .last()
                    .is_some_and(|top| top.precedence().is_some() && top.precedence() >= precedence)
                {
                    output.extend(operators.pop());
                }
                operators.push(token);
            }
            Token::Close => {
                loop {
                    match operators.pop() {
                        Some(Token::Open) => break,
                        Some(operator) => output.push(operator),
                        None => return Err(ExprError::UnbalancedParenthesis),
                    }
                }
                // A prefix operator right before the group applies to the whole group.
                if operators.last().is_some_and(Token::is_prefix) {
                    output.extend(operators.pop());
                }
            }
        }
    }

    while let Some(operator) = operators.pop() {
        if operator == Token::Open {
            return Err(ExprError::UnbalancedParenthesis);
        }
        output.push(operator);
    }

    check_arity(&output)?;
    Ok(output)
}

fn check_arity(postfix: &[Token]) -> Result<(), ExprError> {
    let mut depth = 0usize;
    for token in postfix {
        let arity = token.arity();
        if depth < arity {
            return Err(ExprError::MissingOperand);
        }
        depth = depth - arity + 1;
    }

    match depth {
        0 => Err(ExprError::Empty),
        1 => Ok(()),
        _ => Err(ExprError::MissingOperator),
    }
}
