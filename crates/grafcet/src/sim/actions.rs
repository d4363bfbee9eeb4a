//! Qualifier semantics.

use log::trace;

use grafcet_core::action::{ActionBlock, Qualifier};

use super::state::{ActionOutput, OutputKind};
use crate::{
    expr,
    value::{Value, Variables},
};

/// What an action sees when it is evaluated.
pub(super) struct ActionContext<'a> {
    /// Variables including the step namespace after firing.
    pub(super) current: &'a Variables,
    /// Variables as they were before the tick.
    pub(super) previous: &'a Variables,
    pub(super) pulse_duration: f64,
}

/// Applies one action of an active step that has been active for `elapsed` seconds.
///
/// Stored qualifiers write into `variables`; every action that is active
/// this tick is appended to `outputs`.
pub(super) fn apply(
    action: &ActionBlock,
    elapsed: f64,
    context: &ActionContext<'_>,
    variables: &mut Variables,
    outputs: &mut Vec<ActionOutput>,
) {
    let condition_met = action
        .condition()
        .is_none_or(|condition| expr::evaluate(condition, context.current, context.previous));
    if !condition_met {
        return;
    }

    let duration = action.duration().unwrap_or_default();
    let qualifier = action.qualifier();
    let active = match qualifier {
        Qualifier::N | Qualifier::S | Qualifier::R => true,
        Qualifier::L | Qualifier::SL => elapsed < duration,
        Qualifier::D | Qualifier::SD | Qualifier::DS => elapsed >= duration,
        Qualifier::P => elapsed < context.pulse_duration,
    };
    if !active {
        return;
    }

    trace!(action = action.name(), qualifier:% = qualifier, elapsed; "Action active");
    match qualifier {
        Qualifier::R => {
            variables.insert(action.name().to_string(), Value::Bool(false));
        }
        Qualifier::S | Qualifier::SD | Qualifier::DS | Qualifier::SL => {
            variables.insert(action.name().to_string(), Value::Bool(true));
            outputs.push(ActionOutput::new(action.name(), OutputKind::Qualified(qualifier)));
        }
        Qualifier::N | Qualifier::L | Qualifier::D | Qualifier::P => {
            outputs.push(ActionOutput::new(action.name(), OutputKind::Qualified(qualifier)));
        }
    }
}
