//! AST construction from directive lines.
//!
//! The [`Builder`] keeps an explicit stack of open divergence [`Frame`]s. The
//! insertion cursor is the root sequence when no divergence is open, else the
//! open branch of the innermost frame. Closing a divergence pops its frame and
//! appends one [`Element::Divergence`] at the cursor of the enclosing level.

use std::collections::HashSet;

use grafcet_core::diagram::GateKind;
use log::{debug, trace};

use crate::{
    Parsed,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    lexer::{self, Line},
    parser::{self, Directive},
    parser_types::{
        Branch, DivergenceDecl, Element, JumpDecl, Program, Sequence, StepDecl, TransitionDecl,
    },
    span::{Span, Spanned},
};

const KNOWN_DIRECTIVES: &str = "SFC, Step, Transition, Action, LinkedFile, Jump, \
                                Divergence, Branch, EndBranch and EndDivergence";

/// An open `Divergence` waiting for its `EndDivergence`.
#[derive(Debug)]
struct Frame {
    kind: GateKind,
    span: Span,
    branches: Vec<Branch>,
    open: Option<Branch>,
}

impl Frame {
    fn close_branch(&mut self) -> bool {
        match self.open.take() {
            Some(branch) => {
                self.branches.push(branch);
                true
            }
            None => false,
        }
    }
}

/// Builds a [`Program`] from source text, collecting diagnostics on the way.
#[derive(Debug, Default)]
pub(crate) struct Builder {
    title: Option<Spanned<String>>,
    root: Sequence,
    frames: Vec<Frame>,
    diagnostics: DiagnosticCollector,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every line of `source` and returns the program or all syntax errors.
    pub fn build(mut self, source: &str) -> Result<Parsed, ParseError> {
        let lines = lexer::lines(source);
        debug!(lines = lines.len(); "Split chart source");

        for line in &lines {
            match parser::parse_line(line) {
                Ok(Some(directive)) => self.apply(line, directive),
                Ok(None) => self.unrecognized(line),
                Err(diagnostic) => self.diagnostics.emit(diagnostic),
            }
        }

        self.finish()
    }

    /// The sequence new elements go to, or `None` inside a divergence but
    /// outside any branch.
    fn cursor(&mut self) -> Option<&mut Sequence> {
        match self.frames.last_mut() {
            None => Some(&mut self.root),
            Some(frame) => frame.open.as_mut().map(|branch| &mut branch.elements),
        }
    }

    fn apply(&mut self, line: &Line<'_>, directive: Directive) {
        let span = line.span();
        match directive {
            Directive::Title(title) => {
                self.title = title.map(|title| Spanned::new(title, span));
            }
            Directive::Step {
                number,
                kind,
                label,
            } => self.push(
                Element::Step(StepDecl {
                    number,
                    kind,
                    label,
                    actions: Vec::new(),
                    linked_file: None,
                    span,
                }),
                "Step",
            ),
            Directive::Transition { number, condition } => self.push(
                Element::Transition(TransitionDecl {
                    number: number.unwrap_or_default(),
                    explicit: number.is_some(),
                    condition,
                    span,
                }),
                "Transition",
            ),
            Directive::Jump(target) => {
                self.push(Element::Jump(JumpDecl { target, span }), "Jump");
            }
            Directive::Action(action) => {
                let action = Spanned::new(action, span);
                self.attach("Action", span, |step| step.actions.push(action));
            }
            Directive::LinkedFile(file) => {
                self.attach("LinkedFile", span, |step| step.linked_file = Some(file));
            }
            Directive::Divergence(kind) => {
                if self.cursor().is_none() {
                    self.misplaced("`Divergence` must be inside a `Branch`", span);
                }
                self.frames.push(Frame {
                    kind,
                    span,
                    branches: Vec::new(),
                    open: None,
                });
            }
            Directive::Branch => match self.frames.last_mut() {
                Some(frame) => {
                    // An unterminated previous branch ends where the next one starts.
                    frame.close_branch();
                    frame.open = Some(Branch {
                        elements: Vec::new(),
                        span,
                    });
                }
                None => self.misplaced("`Branch` outside a divergence", span),
            },
            Directive::EndBranch => match self.frames.last_mut() {
                Some(frame) => {
                    if !frame.close_branch() {
                        self.misplaced("`EndBranch` without a matching `Branch`", span);
                    }
                }
                None => self.misplaced("`EndBranch` outside a divergence", span),
            },
            Directive::EndDivergence => self.close_divergence(span),
        }
    }

    fn push(&mut self, element: Element, keyword: &str) {
        let span = element.span();
        match self.cursor() {
            Some(sequence) => sequence.push(element),
            None => self.misplaced(&format!("`{keyword}` must be inside a `Branch`"), span),
        }
    }

    /// Applies `update` to the most recent step of the current sequence.
    fn attach(&mut self, keyword: &str, span: Span, update: impl FnOnce(&mut StepDecl)) {
        let step = self.cursor().and_then(|sequence| {
            sequence.iter_mut().rev().find_map(|element| match element {
                Element::Step(step) => Some(step),
                _ => None,
            })
        });

        match step {
            Some(step) => update(step),
            None => self.diagnostics.emit(
                Diagnostic::error(format!("`{keyword}` has no step to attach to"))
                    .with_code(ErrorCode::E105)
                    .with_label(span, "no preceding step in this sequence")
                    .with_help(format!("place `{keyword}` after the `Step` it belongs to")),
            ),
        }
    }

    fn close_divergence(&mut self, end_span: Span) {
        let Some(mut frame) = self.frames.pop() else {
            self.misplaced("`EndDivergence` outside a divergence", end_span);
            return;
        };
        frame.close_branch();

        trace!(kind:% = frame.kind, branches = frame.branches.len(); "Closed divergence");
        let divergence = Element::Divergence(DivergenceDecl {
            kind: frame.kind,
            branches: frame.branches,
            span: frame.span,
            end_span,
        });

        // A divergence opened outside any branch was already reported.
        if let Some(sequence) = self.cursor() {
            sequence.push(divergence);
        }
    }

    fn misplaced(&mut self, message: &str, span: Span) {
        self.diagnostics.emit(
            Diagnostic::error(message.to_string())
                .with_code(ErrorCode::E102)
                .with_label(span, "misplaced directive"),
        );
    }

    fn unrecognized(&mut self, line: &Line<'_>) {
        self.diagnostics.emit(
            Diagnostic::warning("unrecognized line is ignored")
                .with_code(ErrorCode::E106)
                .with_label(line.span(), "not a directive")
                .with_help(format!("known directives are {KNOWN_DIRECTIVES}")),
        );
    }

    fn finish(mut self) -> Result<Parsed, ParseError> {
        while let Some(frame) = self.frames.pop() {
            self.diagnostics.emit(
                Diagnostic::error(format!("{} divergence is never closed", frame.kind))
                    .with_code(ErrorCode::E101)
                    .with_label(frame.span, "opened here")
                    .with_help("add `EndDivergence` after the last `EndBranch`"),
            );
        }

        let warnings = self.diagnostics.finish()?;

        let mut sequence = self.root;
        number_transitions(&mut sequence);
        debug!(elements = sequence.len(), warnings = warnings.len(); "Built chart AST");

        Ok(Parsed::new(
            Program {
                title: self.title,
                sequence,
            },
            warnings,
        ))
    }
}

/// Gives every transition without an explicit `T<n>` the next unused number.
fn number_transitions(sequence: &mut Sequence) {
    let mut used = HashSet::new();
    for_each_transition(sequence, &mut |transition| {
        if transition.explicit {
            used.insert(transition.number);
        }
    });

    let mut next = 0;
    for_each_transition(sequence, &mut |transition| {
        if transition.explicit {
            return;
        }
        while used.contains(&next) {
            next += 1;
        }
        transition.number = next;
        used.insert(next);
    });
}

fn for_each_transition(sequence: &mut Sequence, visit: &mut impl FnMut(&mut TransitionDecl)) {
    for element in sequence {
        match element {
            Element::Transition(transition) => visit(transition),
            Element::Divergence(divergence) => {
                for branch in &mut divergence.branches {
                    for_each_transition(&mut branch.elements, visit);
                }
            }
            Element::Step(_) | Element::Jump(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use grafcet_core::diagram::StepKind;

    use super::*;

    fn build(source: &str) -> Result<Parsed, ParseError> {
        Builder::new().build(source)
    }

    fn codes(err: &ParseError) -> Vec<ErrorCode> {
        err.diagnostics().iter().filter_map(Diagnostic::code).collect()
    }

    #[test]
    fn test_straight_sequence() {
        let parsed = build(
            "SFC \"Press\"\nStep 0 (Initial)\nAction CLAMP (S)\nTransition START\nStep 1\n",
        )
        .unwrap();
        let program = parsed.program();

        assert_eq!(program.title.as_deref().map(String::as_str), Some("Press"));
        assert_eq!(program.sequence.len(), 3);
        let Element::Step(step) = &program.sequence[0] else {
            panic!("expected step");
        };
        assert_eq!(step.kind, StepKind::Initial);
        assert_eq!(step.actions.len(), 1);
        assert_eq!(step.actions[0].name(), "CLAMP");
    }

    #[test]
    fn test_nested_divergence() {
        let source = "\
Step 0 (Initial)
Transition GO
Divergence AND
Branch
  Step 1
  Transition A
  Divergence OR
  Branch
    Transition B
  EndBranch
  Branch
    Transition C
  EndBranch
  EndDivergence
  Step 2
EndBranch
Branch
  Step 3
EndBranch
EndDivergence
Transition DONE
";
        let parsed = build(source).unwrap();
        let sequence = &parsed.program().sequence;
        assert_eq!(sequence.len(), 4);

        let Element::Divergence(and) = &sequence[2] else {
            panic!("expected divergence");
        };
        assert_eq!(and.kind, GateKind::And);
        assert_eq!(and.branches.len(), 2);
        assert_eq!(and.branches[0].elements.len(), 4);

        let Element::Divergence(or) = &and.branches[0].elements[2] else {
            panic!("expected nested divergence");
        };
        assert_eq!(or.kind, GateKind::Or);
        assert_eq!(or.branches.len(), 2);
    }

    #[test]
    fn test_action_attaches_to_latest_step_in_branch() {
        let source = "\
Step 0
Transition GO
Divergence AND
Branch
  Step 1
  Action LEFT
EndBranch
Branch
  Step 2
  Action RIGHT
EndBranch
EndDivergence
";
        let parsed = build(source).unwrap();
        let Element::Divergence(and) = &parsed.program().sequence[2] else {
            panic!("expected divergence");
        };
        let Element::Step(step) = &and.branches[1].elements[0] else {
            panic!("expected step");
        };
        assert_eq!(step.actions[0].name(), "RIGHT");
    }

    #[test]
    fn test_transition_auto_numbering_skips_explicit() {
        let parsed =
            build("Step 0\nTransition A\nStep 1\nTransition T0 B\nStep 2\nTransition C\n")
                .unwrap();
        let numbers: Vec<_> = parsed
            .program()
            .sequence
            .iter()
            .filter_map(|element| match element {
                Element::Transition(transition) => Some(transition.number),
                _ => None,
            })
            .collect();

        assert_eq!(numbers, vec![1, 0, 2]);
    }

    #[test]
    fn test_unrecognized_line_is_a_warning() {
        let parsed = build("Step 0\nPause here\n").unwrap();

        assert_eq!(parsed.warnings().len(), 1);
        assert_eq!(parsed.warnings()[0].code(), Some(ErrorCode::E106));
        assert_eq!(parsed.program().sequence.len(), 1);
    }

    #[test]
    fn test_unclosed_divergence() {
        let err = build("Step 0\nTransition A\nDivergence AND\nBranch\nStep 1\n").unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::E101]);
    }

    #[test]
    fn test_misplaced_structure() {
        let err = build("Branch\nEndBranch\nEndDivergence\n").unwrap_err();
        assert_eq!(
            codes(&err),
            vec![ErrorCode::E102, ErrorCode::E102, ErrorCode::E102]
        );

        let err = build("Step 0\nTransition A\nDivergence OR\nStep 1\nEndDivergence\n")
            .unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::E102]);
    }

    #[test]
    fn test_action_without_step() {
        let err = build("Action PUMP\nStep 0\n").unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::E105]);
    }

    #[test]
    fn test_collects_all_syntax_errors() {
        let err = build("Step x\nJump\nDivergence XOR\n").unwrap_err();
        assert_eq!(err.diagnostics().len(), 3);
    }
}
