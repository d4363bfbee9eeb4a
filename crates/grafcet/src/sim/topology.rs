//! Step neighbourhoods of transitions.
//!
//! Gates are transparent to the firing rule: a transition after an AND
//! convergence waits for every branch's last step, and a transition before
//! an AND divergence activates every branch's first step. Both are found by
//! walking the connection graph through gates until steps are reached.
//!
//! A transition written directly after an OR convergence is passed through
//! on the way forward, so the branch transitions activate the step after it.
//! It has no step of its own before it and is never enabled.

use std::collections::{HashMap, HashSet};

use log::trace;
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};

use grafcet_core::{
    diagram::{Diagram, NodeRef},
    identifier::Id,
};

#[derive(Debug, Default)]
pub(super) struct Topology {
    predecessors: HashMap<Id, Vec<Id>>,
    successors: HashMap<Id, Vec<Id>>,
}

impl Topology {
    pub(super) fn new(diagram: &Diagram) -> Self {
        let mut graph: DiGraph<Id, ()> = DiGraph::new();
        let mut node_id_map: HashMap<Id, NodeIndex> = HashMap::new();

        let ids = diagram
            .steps()
            .iter()
            .map(|step| step.id())
            .chain(diagram.transitions().iter().map(|t| t.id()))
            .chain(diagram.gates().iter().map(|gate| gate.id()));
        for id in ids {
            node_id_map.insert(id, graph.add_node(id));
        }

        for connection in diagram.connections() {
            let source = node_id_map.get(&connection.source());
            let target = node_id_map.get(&connection.target());
            if let (Some(&source), Some(&target)) = (source, target) {
                graph.add_edge(source, target, ());
            }
        }

        let mut topology = Self::default();
        for transition in diagram.transitions() {
            let id = transition.id();
            let Some(&index) = node_id_map.get(&id) else {
                continue;
            };

            let predecessors = resolve_steps(&graph, diagram, index, Direction::Incoming);
            let successors = resolve_steps(&graph, diagram, index, Direction::Outgoing);
            trace!(
                transition:% = id,
                predecessors:? = predecessors,
                successors:? = successors;
                "Transition neighbourhood"
            );
            topology.predecessors.insert(id, predecessors);
            topology.successors.insert(id, successors);
        }
        topology
    }

    /// Steps that must all be active for `transition` to be enabled.
    pub(super) fn predecessors(&self, transition: Id) -> &[Id] {
        self.predecessors
            .get(&transition)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Steps activated when `transition` fires.
    pub(super) fn successors(&self, transition: Id) -> &[Id] {
        self.successors
            .get(&transition)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Steps reachable from `start` in `direction`, passing through gates only.
///
/// Going forward, a transition reached through a gate is passed through too.
fn resolve_steps(
    graph: &DiGraph<Id, ()>,
    diagram: &Diagram,
    start: NodeIndex,
    direction: Direction,
) -> Vec<Id> {
    let mut steps = Vec::new();
    let mut visited = HashSet::new();
    let mut pending: Vec<(NodeIndex, bool)> = graph
        .neighbors_directed(start, direction)
        .map(|index| (index, false))
        .collect();

    while let Some((index, through_gate)) = pending.pop() {
        if index == start || !visited.insert(index) {
            continue;
        }
        let id = graph[index];
        match diagram.node(id) {
            Some(NodeRef::Step(_)) => {
                if !steps.contains(&id) {
                    steps.push(id);
                }
            }
            Some(NodeRef::Gate(_)) => pending.extend(
                graph
                    .neighbors_directed(index, direction)
                    .map(|next| (next, true)),
            ),
            Some(NodeRef::Transition(_)) if through_gate && direction == Direction::Outgoing => {
                pending.extend(
                    graph
                        .neighbors_directed(index, direction)
                        .map(|next| (next, false)),
                );
            }
            Some(NodeRef::Transition(_)) | None => {}
        }
    }

    steps.sort_by_key(|id| diagram.steps().iter().position(|step| step.id() == *id));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Compiler, config::AppConfig};

    fn topology(source: &str) -> Topology {
        let compilation = Compiler::new(AppConfig::default())
            .compile(source)
            .expect("Failed to compile");
        Topology::new(compilation.diagram())
    }

    #[test]
    fn test_straight_line_neighbours() {
        let topology = topology("Step 0 (Initial)\nTransition GO\nStep 1\n");

        assert_eq!(topology.predecessors(Id::transition(0)), &[Id::step(0)]);
        assert_eq!(topology.successors(Id::transition(0)), &[Id::step(1)]);
    }

    #[test]
    fn test_gates_are_transparent() {
        let topology = topology(
            r#"
            Step 0 (Initial)
            Transition GO
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
            "#,
        );

        assert_eq!(
            topology.successors(Id::transition(0)),
            &[Id::step(1), Id::step(2)]
        );
        assert_eq!(
            topology.predecessors(Id::transition(1)),
            &[Id::step(1), Id::step(2)]
        );
        assert_eq!(topology.successors(Id::transition(1)), &[Id::step(3)]);
    }

    #[test]
    fn test_jump_target_is_a_successor() {
        let topology = topology("Step 0 (Initial)\nTransition GO\nStep 1\nTransition BACK\nJump 0\n");

        assert_eq!(topology.successors(Id::transition(1)), &[Id::step(0)]);
    }

    #[test]
    fn test_transition_after_or_convergence_is_passed_through() {
        let topology = topology(
            r#"
            Step 0 (Initial)
            Divergence OR
              Branch
                Transition A
              EndBranch
              Branch
                Transition B
              EndBranch
            EndDivergence
            Transition C
            Step 1
            "#,
        );

        assert_eq!(topology.successors(Id::transition(0)), &[Id::step(1)]);
        assert_eq!(topology.successors(Id::transition(1)), &[Id::step(1)]);
        assert!(topology.predecessors(Id::transition(2)).is_empty());
        assert_eq!(topology.successors(Id::transition(2)), &[Id::step(1)]);
    }

    #[test]
    fn test_unknown_transition_has_no_neighbours() {
        let topology = topology("Step 0 (Initial)\n");
        assert!(topology.predecessors(Id::transition(9)).is_empty());
    }
}
