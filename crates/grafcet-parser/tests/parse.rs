use grafcet_core::{
    action::Qualifier,
    diagram::{GateKind, StepKind},
};
use grafcet_parser::{
    ast::Element,
    check,
    error::{ErrorCode, Severity},
    parse,
};
use proptest::prelude::*;

#[test]
fn test_straight_line_chart() {
    let source = r#"
        SFC "Conveyor"
        Step 1 (Initial) "Idle"
        Transition START
        Step 2 "Running"
        Action BELT (N)
    "#;

    let parsed = check(source).expect("Failed to check");
    let program = parsed.program();

    assert_eq!(program.title.as_deref().map(String::as_str), Some("Conveyor"));
    assert_eq!(program.sequence.len(), 3);
    assert!(parsed.warnings().is_empty());

    match &program.sequence[0] {
        Element::Step(step) => {
            assert_eq!(step.number, 1);
            assert_eq!(step.kind, StepKind::Initial);
            assert_eq!(step.label.as_deref(), Some("Idle"));
        }
        other => panic!("Expected step, found {other:?}"),
    }

    match &program.sequence[1] {
        Element::Transition(transition) => {
            assert_eq!(transition.number, 0);
            assert!(!transition.explicit);
            assert_eq!(transition.condition, "START");
        }
        other => panic!("Expected transition, found {other:?}"),
    }

    match &program.sequence[2] {
        Element::Step(step) => {
            assert_eq!(step.actions.len(), 1);
            assert_eq!(step.actions[0].qualifier(), Qualifier::N);
        }
        other => panic!("Expected step, found {other:?}"),
    }
}

#[test]
fn test_all_qualifiers_are_accepted() {
    let source = r#"
        Step 0 (Initial)
        Action A (N)
        Action B (S)
        Action C (R)
        Action D (L, "2s")
        Action E (D, "1.5s")
        Action F (P)
        Action G (SD, "3s")
        Action H (DS, "3s")
        Action I (SL, 500ms)
        Action J (Type=Temporal, Duration="4s")
    "#;

    let parsed = check(source).expect("Failed to check");
    let Element::Step(step) = &parsed.program().sequence[0] else {
        panic!("Expected step");
    };

    let qualifiers: Vec<_> = step.actions.iter().map(|a| a.qualifier()).collect();
    assert_eq!(
        qualifiers,
        vec![
            Qualifier::N,
            Qualifier::S,
            Qualifier::R,
            Qualifier::L,
            Qualifier::D,
            Qualifier::P,
            Qualifier::SD,
            Qualifier::DS,
            Qualifier::SL,
            Qualifier::D,
        ]
    );
    assert_eq!(step.actions[8].duration(), Some(0.5));
}

#[test]
fn test_parallel_and_alternative_sections() {
    let source = r#"
        SFC "Mixer"
        Step 0 (Initial)
        Transition START
        Divergence AND
          Branch
            Step 1
            Action FILL_A (N)
            Transition LEVEL_A
            Step 2
          EndBranch
          Branch
            Step 3
            Action FILL_B (N)
            Transition LEVEL_B
            Step 4
          EndBranch
        EndDivergence
        Transition TRUE
        Step 5
        Divergence OR
          Branch
            Transition TEMP > 80
            Step 6
            Transition X6.t > 5s
          EndBranch
          Branch
            Transition TEMP <= 80
          EndBranch
        Converge
        Step 7
    "#;

    let parsed = check(source).expect("Failed to check");
    let sequence = &parsed.program().sequence;
    assert_eq!(sequence.len(), 7);

    let Element::Divergence(and) = &sequence[2] else {
        panic!("Expected AND divergence");
    };
    assert_eq!(and.kind, GateKind::And);
    assert_eq!(and.branches.len(), 2);

    let Element::Divergence(or) = &sequence[5] else {
        panic!("Expected OR divergence");
    };
    assert_eq!(or.kind, GateKind::Or);
    assert_eq!(or.branches[0].elements.len(), 3);
    assert_eq!(or.branches[1].elements.len(), 1);
}

#[test]
fn test_and_branch_ending_in_transition_is_rejected() {
    let source = r#"
        Step 0 (Initial)
        Transition START
        Divergence AND
          Branch
            Step 1
          EndBranch
          Branch
            Step 2
            Transition DONE
          EndBranch
        EndDivergence
        Transition TRUE
    "#;

    let err = check(source).expect_err("AND branch must end with a step");
    let error = err.errors().next().expect("at least one error");

    assert_eq!(error.code(), Some(ErrorCode::E202));
    assert!(error.message().contains("branch 1"));
    assert_eq!(error.path(), Some("root.1"));
}

#[test]
fn test_or_branch_starting_with_step_is_rejected() {
    let source = r#"
        Step 0 (Initial)
        Divergence OR
          Branch
            Step 1
            Transition A
          EndBranch
          Branch
            Transition B
          EndBranch
        EndDivergence
        Step 2
    "#;

    let err = check(source).expect_err("OR branch must start with a transition");
    assert!(err.errors().any(|e| e.code() == Some(ErrorCode::E203)));
}

#[test]
fn test_parse_without_validation_accepts_structural_errors() {
    let source = "Step 0\nDivergence AND\nBranch\nStep 1\nEndBranch\nEndDivergence\n";

    assert!(parse(source).is_ok());
    assert!(check(source).is_err());
}

#[test]
fn test_errors_carry_warnings_along() {
    let source = "Step 0\nStep 1\nJump 9\n";

    let err = check(source).expect_err("unknown jump target");
    let severities: Vec<_> = err.diagnostics().iter().map(|d| d.severity()).collect();

    assert!(severities.contains(&Severity::Error));
    assert!(severities.contains(&Severity::Warning));
}

#[test]
fn test_diagnostic_spans_point_at_source() {
    let source = "Step 0 (Initial)\nTransition A\nStep 0\n";

    let err = check(source).expect_err("duplicate step");
    let error = err.errors().next().expect("at least one error");
    let span = error.primary_span().expect("primary label");

    assert_eq!(&source[span.start()..span.end()], "Step 0");
    assert_eq!(span.start(), 30);
}

proptest! {
    #[test]
    fn prop_parser_never_panics(source in "\\PC{0,200}") {
        let _ = check(&source);
    }

    #[test]
    fn prop_directive_soup_never_panics(
        lines in proptest::collection::vec(
            prop_oneof![
                Just("Step 0 (Initial)".to_string()),
                (0u32..5).prop_map(|n| format!("Step {n}")),
                Just("Transition A".to_string()),
                Just("Transition T1 RE B".to_string()),
                Just("Divergence AND".to_string()),
                Just("Divergence OR".to_string()),
                Just("Branch".to_string()),
                Just("EndBranch".to_string()),
                Just("EndDivergence".to_string()),
                (0u32..5).prop_map(|n| format!("Jump {n}")),
                Just("Action PUMP (L, \"2s\")".to_string()),
            ],
            0..40,
        )
    ) {
        let _ = check(&lines.join("\n"));
    }
}
