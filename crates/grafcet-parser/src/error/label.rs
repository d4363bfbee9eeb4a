//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A message attached to a span of the chart source.
///
/// A diagnostic normally has one primary label at the offending directive and
/// optional secondary labels pointing at related lines:
///
/// ```text
/// error[E208]: step 3 is declared more than once
///   --> chart.sfc:9:1
///    |
///  9 | Step 3
///    | ^^^^^^ duplicate step
///    |
///   --> chart.sfc:4:1
///    |
///  4 | Step 3 "Fill"
///    | ------------- first declared here
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_kinds() {
        let primary = Label::primary(Span::new(10..16), "duplicate step");
        let secondary = Label::secondary(Span::new(0..6), "first declared here");

        assert!(primary.is_primary());
        assert_eq!(primary.span().len(), 6);
        assert!(secondary.is_secondary());
        assert_eq!(secondary.message(), "first declared here");
    }
}
