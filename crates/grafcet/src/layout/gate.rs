//! Divergence sections: branch columns between two gate bars.

use log::debug;

use grafcet_core::{
    diagram::{GateKind, GateMode},
    geometry::{Point, Size},
};
use grafcet_parser::ast::{DivergenceDecl, Element};

use super::{Anchor, Cursor, Layout};
use crate::error::GrafcetError;

impl Layout<'_> {
    /// Places a divergence bar at `top`, its branches below it and the
    /// matching convergence bar under the deepest branch.
    ///
    /// Returns the convergence bar, which the rest of the column continues from.
    pub(super) fn place_divergence(
        &mut self,
        divergence: &DivergenceDecl,
        cursor: &Cursor,
        top: f32,
    ) -> Result<Anchor, GrafcetError> {
        let kind = divergence.kind;
        let spacing = self.spacing;

        let widths: Vec<f32> = divergence
            .branches
            .iter()
            .map(|branch| self.measure(&branch.elements))
            .collect();
        let centers = self.branch_centers(cursor.center_x, &widths);
        let size = Size::new(
            self.gate_width(&centers),
            match kind {
                GateKind::And => spacing.and_gate_height(),
                GateKind::Or => spacing.or_gate_height(),
            },
        );
        let left = cursor.center_x - size.width() / 2.0;
        let branch_count = divergence.branches.len();

        let opening = self.add_gate(
            kind,
            GateMode::Divergence,
            branch_count,
            Point::new(left, top),
            size,
        );
        if let Some(previous) = cursor.previous {
            self.connect(previous, opening);
        }

        // OR branches open on transitions that sit where they would below the
        // preceding step; the bar itself takes no room.
        let (baseline, entry_gap) = match kind {
            GateKind::And => (opening.bounds.max_y(), spacing.transition_to_step()),
            GateKind::Or => {
                let gap = spacing
                    .step_to_transition()
                    .max(opening.bounds.max_y() - cursor.baseline);
                (cursor.baseline, gap)
            }
        };

        let mut bottom = opening.bounds.max_y();
        let mut ends = Vec::with_capacity(branch_count);
        for (branch, center_x) in divergence.branches.iter().zip(centers) {
            let column = Cursor::branch(center_x, opening, baseline, entry_gap);
            let end = self.place_sequence(&branch.elements, column)?;
            bottom = bottom.max(end.bottom);
            ends.push(end.last);
        }

        let offset = match kind {
            GateKind::And => spacing.and_gate_offset(),
            GateKind::Or => spacing.or_gate_offset(),
        };
        let closing = self.add_gate(
            kind,
            GateMode::Convergence,
            branch_count,
            Point::new(left, bottom + offset),
            size,
        );
        for end in ends.into_iter().flatten() {
            self.connect(end, closing);
        }

        debug!(
            kind:% = kind,
            branches = branch_count,
            divergence:% = opening.id,
            convergence:% = closing.id;
            "Divergence placed"
        );
        Ok(closing)
    }

    /// Horizontal room a sequence needs, including nested sections.
    fn measure(&self, elements: &[Element]) -> f32 {
        elements
            .iter()
            .map(|element| match element {
                Element::Step(_) => self.spacing.step_width(),
                Element::Transition(_) => self.spacing.transition_width(),
                Element::Jump(_) => 0.0,
                Element::Divergence(divergence) => {
                    let widths: Vec<f32> = divergence
                        .branches
                        .iter()
                        .map(|branch| self.measure(&branch.elements))
                        .collect();
                    let columns = widths.iter().sum::<f32>()
                        + self.spacing.branch_spacing() * widths.len().saturating_sub(1) as f32;
                    let centers = self.branch_centers(0.0, &widths);
                    columns.max(self.gate_width(&centers))
                }
            })
            .fold(0.0, f32::max)
    }

    /// Column centers laid side by side, shifted so that the outermost
    /// centers are symmetric around `center_x`.
    fn branch_centers(&self, center_x: f32, widths: &[f32]) -> Vec<f32> {
        let mut left = 0.0;
        let mut centers = Vec::with_capacity(widths.len());
        for width in widths {
            centers.push(left + width / 2.0);
            left += width + self.spacing.branch_spacing();
        }

        let (Some(first), Some(last)) = (centers.first(), centers.last()) else {
            return centers;
        };
        let shift = center_x - (first + last) / 2.0;
        centers.iter().map(|center| center + shift).collect()
    }

    fn gate_width(&self, centers: &[f32]) -> f32 {
        let span = match (centers.first(), centers.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };
        span + self.spacing.gate_margin()
    }
}
