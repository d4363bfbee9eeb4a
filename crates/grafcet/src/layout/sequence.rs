//! Vertical stacking of a single sequence.

use log::trace;

use grafcet_core::{
    diagram::{GateKind, Step, Transition},
    geometry::{Point, Size},
    identifier::Id,
};
use grafcet_parser::ast::{Element, StepDecl, TransitionDecl};

use super::{Anchor, AnchorKind, Cursor, Layout, PendingJump, SequenceEnd};
use crate::error::GrafcetError;

impl Layout<'_> {
    /// Places `elements` top to bottom in the column described by `cursor`.
    pub(super) fn place_sequence(
        &mut self,
        elements: &[Element],
        mut cursor: Cursor,
    ) -> Result<SequenceEnd, GrafcetError> {
        for (index, element) in elements.iter().enumerate() {
            let gap = match cursor.entry_gap.take() {
                Some(gap) => gap,
                None => self.gap_before(cursor.last_kind, element, elements.get(index + 1)),
            };
            let top = cursor.baseline + gap;

            match element {
                Element::Step(step) => {
                    let anchor = self.place_step(step, cursor.center_x, top);
                    self.attach(&mut cursor, anchor);
                }
                Element::Transition(transition) => {
                    let anchor = self.place_transition(transition, cursor.center_x, top);
                    self.attach(&mut cursor, anchor);
                }
                Element::Jump(jump) => {
                    self.pending_jumps.push(PendingJump {
                        source: cursor.previous.take(),
                        target: jump.target,
                    });
                }
                Element::Divergence(divergence) => {
                    let convergence = self.place_divergence(divergence, &cursor, top)?;
                    cursor.follow(convergence);
                }
            }
        }

        Ok(SequenceEnd {
            bottom: cursor.baseline,
            last: cursor.previous,
        })
    }

    /// Gap between the previously placed node and `element`.
    fn gap_before(
        &self,
        last: Option<AnchorKind>,
        element: &Element,
        next: Option<&Element>,
    ) -> f32 {
        let spacing = self.spacing;
        if let Element::Divergence(divergence) = element {
            return match divergence.kind {
                GateKind::And => spacing.and_gate_offset(),
                GateKind::Or => spacing.or_gate_offset(),
            };
        }

        match last {
            None => 0.0,
            Some(AnchorKind::Step) => {
                let opens_and = matches!(
                    next,
                    Some(Element::Divergence(divergence)) if divergence.kind == GateKind::And
                );
                if element.is_transition() && opens_and {
                    spacing.step_to_transition_compressed()
                } else {
                    spacing.step_to_transition()
                }
            }
            Some(AnchorKind::Transition) => spacing.transition_to_step(),
            Some(AnchorKind::Gate(GateKind::And)) => spacing.and_post_convergence(),
            Some(AnchorKind::Gate(GateKind::Or)) => spacing.or_post_convergence(),
        }
    }

    fn attach(&mut self, cursor: &mut Cursor, anchor: Anchor) {
        if let Some(previous) = cursor.previous {
            self.connect(previous, anchor);
        }
        cursor.follow(anchor);
    }

    fn place_step(&mut self, decl: &StepDecl, center_x: f32, top: f32) -> Anchor {
        let size = Size::new(self.spacing.step_width(), self.spacing.step_height());
        let position = Point::new(center_x - size.width() / 2.0, top);

        let step = Step::new(decl.number, decl.kind, position, size)
            .with_label(decl.label.clone())
            .with_actions(decl.actions.iter().map(|action| action.inner().clone()).collect())
            .with_linked_file(decl.linked_file.clone());
        trace!(id:% = step.id(), x = position.x(), y = position.y(); "Step placed");

        let anchor = Anchor {
            id: step.id(),
            bounds: step.bounds(),
            kind: AnchorKind::Step,
        };
        self.placed_steps.insert(decl.number, anchor);
        self.steps.push(step);
        anchor
    }

    fn place_transition(&mut self, decl: &TransitionDecl, center_x: f32, top: f32) -> Anchor {
        let size = Size::new(
            self.spacing.transition_width(),
            self.spacing.transition_height(),
        );
        let position = Point::new(center_x - size.width() / 2.0, top);

        let transition = Transition::new(decl.number, decl.condition.as_str(), position, size);
        trace!(id:% = transition.id(), x = position.x(), y = position.y(); "Transition placed");

        let anchor = Anchor {
            id: Id::transition(decl.number),
            bounds: transition.bounds(),
            kind: AnchorKind::Transition,
        };
        self.transitions.push(transition);
        anchor
    }
}
