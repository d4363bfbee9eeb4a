//! Structural validation of a parsed chart.
//!
//! Walks the program in document order, descending into every branch. Each
//! sequence is identified by a dotted path: the root is `root`, branch `i` of
//! a divergence found in sequence `p` is `p.i`.
//!
//! ## Rules
//!
//! - **Placement**: an AND divergence follows a transition, an OR divergence
//!   follows a step; an AND convergence is followed by its synchronizing
//!   transition; a transition after an OR convergence is redundant.
//! - **Branches**: at least two per divergence; AND branches start and end
//!   with a step; OR branches start and end with a transition (an OR branch
//!   may close with a jump right after its last transition).
//! - **Sequencing**: two steps or two transitions in a row are suspicious;
//!   nothing may directly follow a jump; the chart starts with a step.
//! - **Numbering**: step numbers and explicit transition numbers are unique;
//!   jumps target a step declared above them.
//! - **Initial state**: at least one step is `Initial`.

use std::collections::{HashMap, HashSet};

use grafcet_core::diagram::{GateKind, StepKind};
use log::debug;

use crate::{
    error::{Diagnostic, ErrorCode},
    parser_types::{DivergenceDecl, Element, Program},
    span::Span,
};

/// Checks the structure of `program` and returns every finding.
///
/// An empty result, or one holding only warnings, means the program can be
/// laid out.
pub fn validate(program: &Program) -> Vec<Diagnostic> {
    let mut all_steps = HashSet::new();
    let mut has_initial = false;
    program.walk(&mut |element| {
        if let Element::Step(step) = element {
            all_steps.insert(step.number);
            has_initial |= step.kind == StepKind::Initial;
        }
    });

    let mut validator = Validator {
        all_steps,
        ..Validator::default()
    };

    if let Some(first) = program.sequence.first().filter(|first| !first.is_step()) {
        validator.emit(
            Diagnostic::error(format!("chart starts with a {}", first.describe()))
                .with_code(ErrorCode::E214)
                .with_label(first.span(), "expected a step here"),
            "root",
        );
    }

    validator.sequence(&program.sequence, "root");

    if !has_initial {
        validator.diagnostics.push(
            Diagnostic::warning("chart has no initial step")
                .with_code(ErrorCode::E211)
                .with_help("mark the starting step with `(Initial)`; no step is active at start"),
        );
    }

    debug!(diagnostics = validator.diagnostics.len(); "Validated chart structure");
    validator.diagnostics
}

#[derive(Debug, Default)]
struct Validator {
    /// Every step number in the program, for jump diagnostics.
    all_steps: HashSet<u32>,
    /// Steps declared so far in document order.
    declared_steps: HashMap<u32, Span>,
    /// Explicitly numbered transitions seen so far.
    numbered_transitions: HashMap<u32, Span>,
    diagnostics: Vec<Diagnostic>,
}

impl Validator {
    fn emit(&mut self, diagnostic: Diagnostic, path: &str) {
        self.diagnostics.push(diagnostic.with_path(path));
    }

    fn sequence(&mut self, elements: &[Element], path: &str) {
        for (index, element) in elements.iter().enumerate() {
            let previous = index.checked_sub(1).map(|i| &elements[i]);
            let next = elements.get(index + 1);

            if let Some(Element::Jump(jump)) = previous {
                self.emit(
                    Diagnostic::error(format!("{} after a jump is unreachable", element.describe()))
                        .with_code(ErrorCode::E213)
                        .with_label(element.span(), "nothing connects into this")
                        .with_secondary_label(jump.span, "the sequence ends at this jump"),
                    path,
                );
            }

            match element {
                Element::Step(step) => {
                    if let Some(prev @ Element::Step(_)) = previous {
                        self.consecutive(element, prev, path);
                    }
                    self.declare_step(step.number, step.span, path);
                }
                Element::Transition(transition) => {
                    if let Some(prev @ Element::Transition(_)) = previous {
                        self.consecutive(element, prev, path);
                    }
                    if transition.explicit {
                        self.number_transition(transition.number, transition.span, path);
                    }
                }
                Element::Jump(jump) => self.jump(jump.target, jump.span, path),
                Element::Divergence(divergence) => {
                    self.placement(divergence, previous, next, path);
                    self.divergence(divergence, path);
                }
            }
        }
    }

    fn consecutive(&mut self, element: &Element, previous: &Element, path: &str) {
        let kind = element.describe();
        self.emit(
            Diagnostic::warning(format!("two {kind}s in a row"))
                .with_code(ErrorCode::E207)
                .with_label(element.span(), format!("second {kind}"))
                .with_secondary_label(previous.span(), format!("first {kind}"))
                .with_help(if element.is_step() {
                    "steps are normally separated by a transition"
                } else {
                    "transitions are normally separated by a step"
                }),
            path,
        );
    }

    fn declare_step(&mut self, number: u32, span: Span, path: &str) {
        if let Some(first) = self.declared_steps.get(&number).copied() {
            self.emit(
                Diagnostic::error(format!("step {number} is declared more than once"))
                    .with_code(ErrorCode::E208)
                    .with_label(span, "duplicate step")
                    .with_secondary_label(first, "first declared here")
                    .with_help("give each step a unique number"),
                path,
            );
        } else {
            self.declared_steps.insert(number, span);
        }
    }

    fn number_transition(&mut self, number: u32, span: Span, path: &str) {
        if let Some(first) = self.numbered_transitions.get(&number).copied() {
            self.emit(
                Diagnostic::error(format!("transition T{number} is numbered more than once"))
                    .with_code(ErrorCode::E209)
                    .with_label(span, "duplicate transition number")
                    .with_secondary_label(first, "first used here"),
                path,
            );
        } else {
            self.numbered_transitions.insert(number, span);
        }
    }

    fn jump(&mut self, target: u32, span: Span, path: &str) {
        if self.declared_steps.contains_key(&target) {
            return;
        }

        let diagnostic = Diagnostic::error(format!("jump target step {target} is not declared above"))
            .with_code(ErrorCode::E210)
            .with_label(span, "unknown jump target");
        let diagnostic = if self.all_steps.contains(&target) {
            diagnostic.with_help(format!(
                "step {target} is declared below this jump; jumps can only target steps declared above them"
            ))
        } else {
            diagnostic.with_help(format!("no step {target} exists in this chart"))
        };
        self.emit(diagnostic, path);
    }

    /// Checks what surrounds a divergence in its own sequence.
    fn placement(
        &mut self,
        divergence: &DivergenceDecl,
        previous: Option<&Element>,
        next: Option<&Element>,
        path: &str,
    ) {
        match divergence.kind {
            GateKind::And => {
                if !previous.is_some_and(Element::is_transition) {
                    self.emit(
                        Diagnostic::error("AND divergence must follow a transition")
                            .with_code(ErrorCode::E200)
                            .with_label(divergence.span, "parallel branches start here")
                            .with_help("all branches start together when a single transition fires"),
                        path,
                    );
                }

                if let Some(next @ (Element::Step(_) | Element::Jump(_))) = next {
                    self.emit(
                        Diagnostic::error("AND convergence must be followed by a transition")
                            .with_code(ErrorCode::E205)
                            .with_label(next.span(), format!("{} follows the convergence", next.describe()))
                            .with_secondary_label(divergence.end_span, "branches converge here")
                            .with_help("add the transition that fires once every branch has completed"),
                        path,
                    );
                }
            }
            GateKind::Or => {
                if !previous.is_some_and(Element::is_step) {
                    self.emit(
                        Diagnostic::error("OR divergence must follow a step")
                            .with_code(ErrorCode::E201)
                            .with_label(divergence.span, "alternative branches start here")
                            .with_help("each branch opens with its own transition out of one step"),
                        path,
                    );
                }

                if let Some(next @ Element::Transition(_)) = next {
                    self.emit(
                        Diagnostic::warning("transition after an OR convergence is redundant")
                            .with_code(ErrorCode::E206)
                            .with_label(next.span(), "redundant transition")
                            .with_secondary_label(divergence.end_span, "branches converge here")
                            .with_help("OR branches already end with their own transitions"),
                        path,
                    );
                }
            }
        }
    }

    /// Checks the branches of a divergence, then descends into them.
    fn divergence(&mut self, divergence: &DivergenceDecl, path: &str) {
        let kind = divergence.kind;
        if divergence.branches.len() < 2 {
            self.emit(
                Diagnostic::error(format!(
                    "{kind} divergence has {} branch(es), at least 2 are required",
                    divergence.branches.len()
                ))
                .with_code(ErrorCode::E204)
                .with_label(divergence.span, "divergence declared here"),
                path,
            );
        }

        for (index, branch) in divergence.branches.iter().enumerate() {
            let branch_path = format!("{path}.{index}");
            let (code, expected, is_expected): (_, _, fn(&Element) -> bool) = match kind {
                GateKind::And => (ErrorCode::E202, "step", Element::is_step),
                GateKind::Or => (ErrorCode::E203, "transition", Element::is_transition),
            };

            let elements = &branch.elements;
            match (elements.first(), elements.last()) {
                (Some(first), Some(last)) => {
                    if !is_expected(first) {
                        self.emit(
                            Diagnostic::error(format!(
                                "{kind} branch {index} starts with a {}",
                                first.describe()
                            ))
                            .with_code(code)
                            .with_label(first.span(), format!("branch must start with a {expected}")),
                            &branch_path,
                        );
                    }

                    let closes_with_jump = kind == GateKind::Or
                        && matches!(last, Element::Jump(_))
                        && elements.len() >= 2
                        && elements[elements.len() - 2].is_transition();
                    if !is_expected(last) && !closes_with_jump {
                        let diagnostic = Diagnostic::error(format!(
                            "{kind} branch {index} ends with a {}",
                            last.describe()
                        ))
                        .with_code(code)
                        .with_label(last.span(), format!("branch must end with a {expected}"));
                        let diagnostic = if kind == GateKind::And && last.is_transition() {
                            diagnostic.with_help("move the synchronizing transition after `EndDivergence`")
                        } else {
                            diagnostic
                        };
                        self.emit(diagnostic, &branch_path);
                    }
                }
                _ => self.emit(
                    Diagnostic::error(format!("{kind} branch {index} is empty"))
                        .with_code(code)
                        .with_label(branch.span, "empty branch"),
                    &branch_path,
                ),
            }

            self.sequence(elements, &branch_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builder::Builder, error::Severity};

    fn check(source: &str) -> Vec<Diagnostic> {
        let parsed = Builder::new().build(source).expect("source should parse");
        validate(parsed.program())
    }

    fn codes(diagnostics: &[Diagnostic], severity: Severity) -> Vec<ErrorCode> {
        diagnostics
            .iter()
            .filter(|d| d.severity() == severity)
            .filter_map(Diagnostic::code)
            .collect()
    }

    #[test]
    fn test_valid_and_divergence() {
        let diagnostics = check(
            "Step 0 (Initial)\nTransition GO\nDivergence AND\nBranch\nStep 1\nEndBranch\n\
             Branch\nStep 2\nEndBranch\nEndDivergence\nTransition DONE\nStep 3\n",
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_and_branch_ending_with_transition() {
        let diagnostics = check(
            "Step 0 (Initial)\nTransition GO\nDivergence AND\nBranch\nStep 1\nEndBranch\n\
             Branch\nStep 2\nTransition B\nEndBranch\nEndDivergence\nTransition DONE\n",
        );

        assert_eq!(codes(&diagnostics, Severity::Error), vec![ErrorCode::E202]);
        assert_eq!(diagnostics[0].message(), "AND branch 1 ends with a transition");
        assert_eq!(diagnostics[0].path(), Some("root.1"));
    }

    #[test]
    fn test_and_divergence_after_step() {
        let diagnostics = check(
            "Step 0 (Initial)\nDivergence AND\nBranch\nStep 1\nEndBranch\n\
             Branch\nStep 2\nEndBranch\nEndDivergence\nTransition DONE\n",
        );
        assert_eq!(codes(&diagnostics, Severity::Error), vec![ErrorCode::E200]);
    }

    #[test]
    fn test_missing_synchronizing_transition() {
        let diagnostics = check(
            "Step 0 (Initial)\nTransition GO\nDivergence AND\nBranch\nStep 1\nEndBranch\n\
             Branch\nStep 2\nEndBranch\nEndDivergence\nStep 3\n",
        );
        assert_eq!(codes(&diagnostics, Severity::Error), vec![ErrorCode::E205]);
    }

    #[test]
    fn test_or_branch_starting_with_step() {
        let diagnostics = check(
            "Step 0 (Initial)\nDivergence OR\nBranch\nStep 1\nTransition A\nEndBranch\n\
             Branch\nTransition B\nEndBranch\nEndDivergence\nStep 2\n",
        );
        assert_eq!(codes(&diagnostics, Severity::Error), vec![ErrorCode::E203]);
        assert_eq!(diagnostics[0].path(), Some("root.0"));
    }

    #[test]
    fn test_or_branch_may_close_with_jump() {
        let diagnostics = check(
            "Step 0 (Initial)\nDivergence OR\nBranch\nTransition RETRY\nJump 0\nEndBranch\n\
             Branch\nTransition OK\nEndBranch\nEndDivergence\nStep 1\n",
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_redundant_transition_after_or() {
        let diagnostics = check(
            "Step 0 (Initial)\nDivergence OR\nBranch\nTransition A\nEndBranch\n\
             Branch\nTransition B\nEndBranch\nEndDivergence\nTransition C\nStep 1\n",
        );
        assert!(codes(&diagnostics, Severity::Error).is_empty());
        assert_eq!(codes(&diagnostics, Severity::Warning), vec![ErrorCode::E206]);
    }

    #[test]
    fn test_single_branch_divergence() {
        let diagnostics = check(
            "Step 0 (Initial)\nDivergence OR\nBranch\nTransition A\nEndBranch\nEndDivergence\nStep 1\n",
        );
        assert_eq!(codes(&diagnostics, Severity::Error), vec![ErrorCode::E204]);
    }

    #[test]
    fn test_jump_targets() {
        let diagnostics = check("Step 0 (Initial)\nTransition A\nStep 1\nTransition B\nJump 0\n");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");

        let diagnostics = check("Step 0 (Initial)\nTransition A\nJump 5\n");
        assert_eq!(codes(&diagnostics, Severity::Error), vec![ErrorCode::E210]);
        assert_eq!(diagnostics[0].help(), Some("no step 5 exists in this chart"));
    }

    #[test]
    fn test_numbering_conflicts() {
        let diagnostics = check(
            "Step 0 (Initial)\nTransition T1 A\nStep 0\nTransition T1 B\nStep 2\n",
        );
        assert_eq!(
            codes(&diagnostics, Severity::Error),
            vec![ErrorCode::E208, ErrorCode::E209]
        );
    }

    #[test]
    fn test_sequencing_warnings() {
        let diagnostics = check("Step 0\nStep 1\nTransition A\nTransition B\nStep 2\n");
        assert_eq!(
            codes(&diagnostics, Severity::Warning),
            vec![ErrorCode::E207, ErrorCode::E207, ErrorCode::E211]
        );
    }

    #[test]
    fn test_unreachable_after_jump() {
        let diagnostics =
            check("Step 0 (Initial)\nTransition A\nJump 0\nTransition B\nStep 1\n");
        assert_eq!(codes(&diagnostics, Severity::Error), vec![ErrorCode::E213]);
    }

    #[test]
    fn test_chart_must_start_with_step() {
        let diagnostics = check("Transition A\nStep 0 (Initial)\n");
        assert_eq!(codes(&diagnostics, Severity::Error), vec![ErrorCode::E214]);
    }
}
