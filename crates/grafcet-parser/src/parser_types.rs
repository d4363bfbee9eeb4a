//! Abstract syntax tree of a chart program.
//!
//! A [`Program`] is an ordered root [`Sequence`] of [`Element`]s. Parallel and
//! alternative sections are represented by [`Element::Divergence`], whose
//! branches are themselves sequences, so nesting is expressed directly in the
//! tree rather than by a mutable insertion point.

use grafcet_core::{action::ActionBlock, diagram::GateKind, diagram::StepKind};

use crate::span::{Span, Spanned};

/// A parsed chart program.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub title: Option<Spanned<String>>,
    pub sequence: Sequence,
}

/// An ordered list of chart elements.
pub type Sequence = Vec<Element>;

/// A node of the chart in document order.
#[derive(Debug, Clone)]
pub enum Element {
    Step(StepDecl),
    Transition(TransitionDecl),
    Jump(JumpDecl),
    Divergence(DivergenceDecl),
}

impl Element {
    /// Source span of the element's directive line (the opening line for divergences).
    pub fn span(&self) -> Span {
        match self {
            Element::Step(step) => step.span,
            Element::Transition(transition) => transition.span,
            Element::Jump(jump) => jump.span,
            Element::Divergence(divergence) => divergence.span,
        }
    }

    /// Short human-readable kind, used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Element::Step(_) => "step",
            Element::Transition(_) => "transition",
            Element::Jump(_) => "jump",
            Element::Divergence(divergence) => match divergence.kind {
                GateKind::And => "AND divergence",
                GateKind::Or => "OR divergence",
            },
        }
    }

    pub fn is_step(&self) -> bool {
        matches!(self, Element::Step(_))
    }

    pub fn is_transition(&self) -> bool {
        matches!(self, Element::Transition(_))
    }
}

/// `Step <n> [(kind)] ["label"]` with its attached actions.
#[derive(Debug, Clone)]
pub struct StepDecl {
    pub number: u32,
    pub kind: StepKind,
    pub label: Option<String>,
    pub actions: Vec<Spanned<ActionBlock>>,
    pub linked_file: Option<String>,
    pub span: Span,
}

/// `Transition [T<n>] <condition>`.
#[derive(Debug, Clone)]
pub struct TransitionDecl {
    /// Resolved number; explicit when `explicit` is set, else auto-assigned.
    pub number: u32,
    pub explicit: bool,
    pub condition: String,
    pub span: Span,
}

/// `Jump <step>`.
#[derive(Debug, Clone)]
pub struct JumpDecl {
    pub target: u32,
    pub span: Span,
}

/// `Divergence AND|OR` ... `EndDivergence`.
#[derive(Debug, Clone)]
pub struct DivergenceDecl {
    pub kind: GateKind,
    pub branches: Vec<Branch>,
    /// Span of the `Divergence` line.
    pub span: Span,
    /// Span of the closing `EndDivergence`/`Converge` line.
    pub end_span: Span,
}

/// One `Branch` ... `EndBranch` section.
#[derive(Debug, Clone)]
pub struct Branch {
    pub elements: Sequence,
    pub span: Span,
}

impl Program {
    /// Visits every element of the program depth-first in document order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        walk_sequence(&self.sequence, visit);
    }
}

fn walk_sequence<'a>(sequence: &'a [Element], visit: &mut impl FnMut(&'a Element)) {
    for element in sequence {
        visit(element);
        if let Element::Divergence(divergence) = element {
            for branch in &divergence.branches {
                walk_sequence(&branch.elements, visit);
            }
        }
    }
}
