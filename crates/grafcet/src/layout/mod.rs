//! Recursive top-down layout of a validated program.
//!
//! The root sequence is stacked vertically along a single trunk. Every
//! divergence splits the current column into side-by-side branch columns
//! between a divergence gate and a convergence gate, and each branch is laid
//! out by the same routine, so nesting needs no special casing.
//!
//! # Vertical spacing
//!
//! Gaps are measured from the bottom edge of the previous element to the top
//! edge of the next one:
//!
//! | After       | Before                             | Gap                               |
//! |-------------|------------------------------------|-----------------------------------|
//! | step        | transition                         | `step_to_transition`              |
//! | step        | transition opening an AND section  | `step_to_transition_compressed`   |
//! | transition  | step                               | `transition_to_step`              |
//! | anything    | AND / OR divergence bar            | `and_gate_offset` / `or_gate_offset` |
//! | AND bar     | synchronizing transition           | `and_post_convergence`            |
//! | OR bar      | next step                          | `or_post_convergence`             |
//!
//! The first element of a branch has an explicit entry gap instead: AND
//! branches start `transition_to_step` below their divergence bar, while the
//! first transitions of OR branches sit `step_to_transition` below the step
//! that precedes the divergence, as if the bar were not there.
//!
//! # Jumps
//!
//! A jump ends its chain and is routed after everything else is placed: down
//! from its source, right past the diagram, up above the target step and
//! into its top edge.

mod gate;
mod sequence;

use std::collections::HashMap;

use log::debug;

use grafcet_core::{
    diagram::{Connection, Diagram, Gate, GateKind, GateMode, Step, Transition},
    geometry::{Bounds, Point, Size},
    identifier::Id,
};
use grafcet_parser::ast::Program;

use crate::{config::LayoutSpacing, error::GrafcetError};

/// Places every element of `program` and connects them.
///
/// `program` is expected to have passed structural validation.
///
/// # Errors
///
/// Returns [`GrafcetError::Layout`] when a jump names a step that was never
/// placed.
pub fn layout(program: &Program, spacing: &LayoutSpacing) -> Result<Diagram, GrafcetError> {
    let mut layout = Layout::new(spacing);

    let trunk = Cursor::new(
        spacing.origin_x() + spacing.step_width() / 2.0,
        spacing.origin_y(),
    );
    layout.place_sequence(&program.sequence, trunk)?;
    layout.route_jumps()?;

    let title = program.title.as_ref().map(|title| title.inner().clone());
    Ok(layout.finish(title))
}

/// What a placed node looks like to its neighbours.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AnchorKind {
    Step,
    Transition,
    Gate(GateKind),
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    id: Id,
    bounds: Bounds,
    kind: AnchorKind,
}

/// Placement state of one column.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    center_x: f32,
    /// Bottom edge the next gap is measured from.
    baseline: f32,
    /// Node the next element connects from; cleared by a jump.
    previous: Option<Anchor>,
    /// Kind of the last placed node, kept across jumps.
    last_kind: Option<AnchorKind>,
    /// Overrides the gap before the next element.
    entry_gap: Option<f32>,
}

impl Cursor {
    fn new(center_x: f32, top: f32) -> Self {
        Self {
            center_x,
            baseline: top,
            previous: None,
            last_kind: None,
            entry_gap: None,
        }
    }

    /// A branch column entered from `gate`, whose first element sits
    /// `entry_gap` below `baseline`.
    fn branch(center_x: f32, gate: Anchor, baseline: f32, entry_gap: f32) -> Self {
        Self {
            center_x,
            baseline,
            previous: Some(gate),
            last_kind: Some(gate.kind),
            entry_gap: Some(entry_gap),
        }
    }

    fn follow(&mut self, anchor: Anchor) {
        self.baseline = anchor.bounds.max_y();
        self.previous = Some(anchor);
        self.last_kind = Some(anchor.kind);
    }
}

/// Where a sequence ended up.
#[derive(Debug, Clone, Copy)]
struct SequenceEnd {
    bottom: f32,
    /// Last connectable node; `None` when the sequence ends with a jump.
    last: Option<Anchor>,
}

#[derive(Debug)]
struct PendingJump {
    source: Option<Anchor>,
    target: u32,
}

struct Layout<'a> {
    spacing: &'a LayoutSpacing,
    steps: Vec<Step>,
    transitions: Vec<Transition>,
    gates: Vec<Gate>,
    connections: Vec<Connection>,
    placed_steps: HashMap<u32, Anchor>,
    pending_jumps: Vec<PendingJump>,
}

impl<'a> Layout<'a> {
    fn new(spacing: &'a LayoutSpacing) -> Self {
        Self {
            spacing,
            steps: Vec::new(),
            transitions: Vec::new(),
            gates: Vec::new(),
            connections: Vec::new(),
            placed_steps: HashMap::new(),
            pending_jumps: Vec::new(),
        }
    }

    fn add_gate(
        &mut self,
        kind: GateKind,
        mode: GateMode,
        branch_count: usize,
        position: Point,
        size: Size,
    ) -> Anchor {
        let id = Id::gate(self.gates.len());
        let gate = Gate::new(id, kind, mode, branch_count, position, size);
        let anchor = Anchor {
            id,
            bounds: gate.bounds(),
            kind: AnchorKind::Gate(kind),
        };
        self.gates.push(gate);
        anchor
    }

    /// Connects the bottom edge of `from` to the top edge of `to`.
    ///
    /// Gate bars are wide, so the line runs at the column of the non-gate
    /// end; a horizontal jog is inserted when the two ends are not aligned.
    fn connect(&mut self, from: Anchor, to: Anchor) {
        let start_x = match from.kind {
            AnchorKind::Gate(_) => to.bounds.center_x(),
            _ => from.bounds.center_x(),
        };
        let end_x = match to.kind {
            AnchorKind::Gate(_) => start_x,
            _ => to.bounds.center_x(),
        };

        let start = Point::new(start_x, from.bounds.max_y());
        let end = Point::new(end_x, to.bounds.min_y());
        let points = if start_x == end_x {
            vec![start, end]
        } else {
            let middle = (start.y() + end.y()) / 2.0;
            vec![start, start.with_y(middle), end.with_y(middle), end]
        };

        self.connections.push(Connection::new(from.id, to.id, points));
    }

    /// Routes every jump around the right side of the placed diagram.
    fn route_jumps(&mut self) -> Result<(), GrafcetError> {
        let Some(extent) = self.extent() else {
            return Ok(());
        };

        let margin = self.spacing.jump_margin();
        let mut lane_x = extent.max_x() + margin;

        for jump in std::mem::take(&mut self.pending_jumps) {
            let target = self.placed_steps.get(&jump.target).copied().ok_or_else(|| {
                GrafcetError::Layout(format!("jump target step {} was never placed", jump.target))
            })?;
            let Some(source) = jump.source else {
                continue;
            };

            let start = source.bounds.bottom_center();
            let end = target.bounds.top_center();
            let below = start.y() + margin / 2.0;
            let above = end.y() - margin / 2.0;

            let points = vec![
                start,
                start.with_y(below),
                Point::new(lane_x, below),
                Point::new(lane_x, above),
                end.with_y(above),
                end,
            ];
            debug!(source:% = source.id, target:% = target.id, lane_x; "Jump routed");
            self.connections.push(Connection::new(source.id, target.id, points));

            lane_x += margin / 2.0;
        }
        Ok(())
    }

    fn extent(&self) -> Option<Bounds> {
        self.steps
            .iter()
            .map(Step::bounds)
            .chain(self.transitions.iter().map(Transition::bounds))
            .chain(self.gates.iter().map(Gate::bounds))
            .reduce(Bounds::merge)
    }

    fn finish(self, title: Option<String>) -> Diagram {
        debug!(
            steps = self.steps.len(),
            transitions = self.transitions.len(),
            gates = self.gates.len(),
            connections = self.connections.len();
            "Layout complete"
        );
        Diagram::new(
            title,
            self.steps,
            self.transitions,
            self.gates,
            self.connections,
        )
    }
}
