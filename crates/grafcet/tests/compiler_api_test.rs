//! Integration tests for the Compiler API
//!
//! These tests compile complete charts and check the resulting diagram graph.

use grafcet::{
    Compiler, ErrorCode, GrafcetError,
    config::AppConfig,
    diagram::{GateKind, GateMode},
    identifier::Id,
};
use proptest::prelude::*;

fn edges(source: &str) -> Vec<(String, String)> {
    let compilation = Compiler::default().compile(source).expect("Failed to compile");
    compilation
        .diagram()
        .connections()
        .iter()
        .map(|c| (c.source().to_string(), c.target().to_string()))
        .collect()
}

fn edge(source: &str, target: &str) -> (String, String) {
    (source.to_string(), target.to_string())
}

#[test]
fn test_compiler_api_exists() {
    let _compiler = Compiler::default();
    let _compiler = Compiler::new(AppConfig::default());
}

#[test]
fn test_straight_line_compile() {
    let source = "Step 1 (Initial)\nTransition GO\nStep 2\n";
    let compilation = Compiler::default().compile(source).expect("Failed to compile");
    let diagram = compilation.diagram();

    assert_eq!(diagram.steps().len(), 2);
    assert_eq!(diagram.transitions().len(), 1);
    assert_eq!(diagram.connections().len(), 2);
    assert_eq!(edges(source), vec![edge("S1", "T0"), edge("T0", "S2")]);
    assert!(compilation.warnings().is_empty());
}

#[test]
fn test_and_divergence_compiles_two_gates() {
    let source = r#"
        Step 0 (Initial)
        Transition START
        Divergence AND
          Branch
            Step 1
          EndBranch
          Branch
            Step 2
          EndBranch
        EndDivergence
        Transition DONE
        Step 3
    "#;

    let compilation = Compiler::default().compile(source).expect("Failed to compile");
    let gates = compilation.diagram().gates();

    assert_eq!(gates.len(), 2);
    assert!(gates.iter().all(|gate| gate.kind() == GateKind::And));
    assert_eq!(gates[0].mode(), GateMode::Divergence);
    assert_eq!(gates[1].mode(), GateMode::Convergence);
}

#[test]
fn test_and_branch_ending_in_transition_cites_branch() {
    let source = r#"
        Step 0 (Initial)
        Transition START
        Divergence AND
          Branch
            Step 1
            Transition EXTRA
          EndBranch
          Branch
            Step 2
          EndBranch
        EndDivergence
        Transition DONE
        Step 3
    "#;

    let err = Compiler::default().compile(source).expect_err("invalid AND branch");
    let GrafcetError::Parse { err, .. } = err else {
        panic!("Expected parse error");
    };
    let error = err
        .errors()
        .find(|e| e.code() == Some(ErrorCode::E202))
        .expect("E202 error");
    assert!(error.message().contains("branch 0"), "{}", error.message());
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

    let err = Compiler::default().compile(source).expect_err("invalid OR branch");
    assert!(matches!(err, GrafcetError::Parse { .. }));
}

#[test]
fn test_jump_resolution() {
    let source = "Step 0 (Initial)\nTransition GO\nStep 1\nTransition BACK\nJump 0\n";

    assert_eq!(
        edges(source),
        vec![
            edge("S0", "T0"),
            edge("T0", "S1"),
            edge("S1", "T1"),
            edge("T1", "S0"),
        ]
    );
}

#[test]
fn test_step_details_survive_compilation() {
    let source = r#"
        SFC "Tank"
        Step 0 (Initial) "Idle"
        Action LAMP (S)
        Transition T5 FILL
        Step 1
    "#;

    let compilation = Compiler::default().compile(source).expect("Failed to compile");
    let diagram = compilation.diagram();

    assert!(diagram.transition(Id::transition(5)).is_some());
    assert_eq!(diagram.step(Id::step(0)).and_then(|s| s.label()), Some("Idle"));
    assert_eq!(diagram.title(), Some("Tank"));
    assert_eq!(diagram.step(Id::step(0)).unwrap().actions().len(), 1);
}

#[test]
fn test_custom_layout_spacing_is_applied() {
    let config: AppConfig = toml::from_str("[layout]\nstep_to_transition = 100.0\n").unwrap();
    let compilation = Compiler::new(config)
        .compile("Step 0 (Initial)\nTransition GO\nStep 1\n")
        .expect("Failed to compile");
    let diagram = compilation.diagram();

    let step = diagram.step(Id::step(0)).unwrap().bounds();
    let transition = diagram.transition(Id::transition(0)).unwrap().bounds();
    assert_eq!(transition.min_y() - step.max_y(), 100.0);
}

proptest! {
    #[test]
    fn prop_straight_chart_moves_down(length in 1usize..12) {
        let mut source = String::from("Step 0 (Initial)\n");
        for n in 1..=length {
            source.push_str(&format!("Transition C{n}\nStep {n}\n"));
        }

        let compilation = Compiler::default().compile(&source).unwrap();
        let diagram = compilation.diagram();
        prop_assert_eq!(diagram.steps().len(), length + 1);

        let mut ordered = Vec::new();
        for n in 0..=length as u32 {
            ordered.push(diagram.step(Id::step(n)).unwrap().bounds());
            if let Some(transition) = diagram.transition(Id::transition(n)) {
                ordered.push(transition.bounds());
            }
        }
        for pair in ordered.windows(2) {
            prop_assert!(pair[1].min_y() > pair[0].max_y());
        }
    }

    #[test]
    fn prop_branch_columns_never_overlap(branches in 2usize..6, depth in 1usize..4) {
        let mut source = String::from("Step 0 (Initial)\nTransition GO\nDivergence AND\n");
        let mut number = 1;
        for _ in 0..branches {
            source.push_str("Branch\n");
            for level in 0..depth {
                if level > 0 {
                    source.push_str("Transition NEXT\n");
                }
                source.push_str(&format!("Step {number}\n"));
                number += 1;
            }
            source.push_str("EndBranch\n");
        }
        source.push_str("EndDivergence\nTransition DONE\nStep 99\n");

        let compilation = Compiler::default().compile(&source).unwrap();
        let diagram = compilation.diagram();
        let gates = diagram.gates();
        prop_assert_eq!(gates.len(), 2);
        prop_assert!(gates[1].position().y() > gates[0].position().y());

        let mut firsts: Vec<f32> = (0..branches)
            .map(|b| diagram.step(Id::step((b * depth + 1) as u32)).unwrap().bounds().center_x())
            .collect();
        let sorted = {
            let mut sorted = firsts.clone();
            sorted.sort_by(f32::total_cmp);
            sorted
        };
        prop_assert_eq!(&firsts, &sorted);
        firsts.dedup();
        prop_assert_eq!(firsts.len(), branches);
    }
}
