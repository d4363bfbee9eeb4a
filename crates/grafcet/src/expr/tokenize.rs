//! Splits expression text into tokens.

use grafcet_core::duration::parse_time_literal;

use super::ExprError;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Literal(Value),
    Variable(String),
    Not,
    RisingEdge,
    FallingEdge,
    And,
    Or,
    Compare(Comparison),
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Comparison {
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl Comparison {
    pub(super) fn apply(self, left: f64, right: f64) -> bool {
        match self {
            Comparison::Greater => left > right,
            Comparison::GreaterEqual => left >= right,
            Comparison::Less => left < right,
            Comparison::LessEqual => left <= right,
        }
    }
}

impl Token {
    /// Binding strength of operators; `None` for operands and parentheses.
    pub(super) fn precedence(&self) -> Option<u8> {
        match self {
            Token::Not | Token::RisingEdge | Token::FallingEdge => Some(4),
            Token::Compare(_) => Some(3),
            Token::And => Some(2),
            Token::Or => Some(1),
            Token::Literal(_) | Token::Variable(_) | Token::Open | Token::Close => None,
        }
    }

    pub(super) fn is_prefix(&self) -> bool {
        matches!(self, Token::Not | Token::RisingEdge | Token::FallingEdge)
    }

    /// Number of operands the token consumes once in postfix form.
    pub(super) fn arity(&self) -> usize {
        match self {
            Token::Not | Token::RisingEdge | Token::FallingEdge => 1,
            Token::And | Token::Or | Token::Compare(_) => 2,
            Token::Literal(_) | Token::Variable(_) | Token::Open | Token::Close => 0,
        }
    }
}

pub(super) fn tokenize(text: &str) -> Result<Vec<Token>, ExprError> {
    space_out(text).split_whitespace().map(classify).collect()
}

/// Surrounds parentheses, comparison operators, `*` and `+` with spaces.
fn space_out(text: &str) -> String {
    let mut spaced = String::with_capacity(text.len() * 2);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '(' | ')' | '*' | '+' => {
                spaced.push(' ');
                spaced.push(c);
                spaced.push(' ');
            }
            '>' | '<' => {
                spaced.push(' ');
                spaced.push(c);
                if chars.next_if_eq(&'=').is_some() {
                    spaced.push('=');
                }
                spaced.push(' ');
            }
            _ => spaced.push(c),
        }
    }
    spaced
}

fn classify(word: &str) -> Result<Token, ExprError> {
    let token = match word.to_ascii_uppercase().as_str() {
        "NOT" => Token::Not,
        "RE" => Token::RisingEdge,
        "FE" => Token::FallingEdge,
        "AND" | "." | "*" => Token::And,
        "OR" | "+" => Token::Or,
        "TRUE" => Token::Literal(Value::Bool(true)),
        "FALSE" => Token::Literal(Value::Bool(false)),
        "(" => Token::Open,
        ")" => Token::Close,
        ">" => Token::Compare(Comparison::Greater),
        ">=" => Token::Compare(Comparison::GreaterEqual),
        "<" => Token::Compare(Comparison::Less),
        "<=" => Token::Compare(Comparison::LessEqual),
        _ => return literal_or_variable(word),
    };
    Ok(token)
}

fn literal_or_variable(word: &str) -> Result<Token, ExprError> {
    if !word.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(Token::Variable(word.to_string()));
    }

    parse_time_literal(word)
        .or_else(|| word.parse::<f64>().ok().filter(|value| value.is_finite()))
        .map(|value| Token::Literal(Value::Number(value)))
        .ok_or_else(|| ExprError::InvalidNumber(word.to_string()))
}
