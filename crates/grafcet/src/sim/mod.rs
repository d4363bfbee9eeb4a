//! GRAFCET evolution engine.
//!
//! A tick takes the current [`SimulationState`], the tick's
//! [`SimulationInputs`] and optional global actions, fires every transition
//! that can clear, and reports the outputs of the resulting active steps.
//!
//! # Firing rule
//!
//! A transition is enabled when all of its predecessor steps are active,
//! looking through AND and OR gates. Enabled transitions fire when their
//! condition evaluates true or when they are listed as triggers. All
//! transitions of a tick are decided on the state from before the tick, so
//! firing one transition can never enable or disable another in the same
//! tick.
//!
//! # Step variables
//!
//! Conditions can read `X<n>`, true while step `n` is active, and `X<n>.t`,
//! the seconds since its activation. They are rebuilt on every tick and
//! never stored in the state. The state keeps the set of steps active when
//! the last tick started, so `RE X<n>` holds for a single evaluation after
//! step `n` is entered.

mod actions;
mod engine;
mod scenario;
mod state;
mod topology;

pub use engine::Simulator;
pub use scenario::{Scenario, ScenarioRun, Tick, TickReport};
pub use state::{ActionOutput, OutputKind, SimulationInputs, SimulationState, StepResult};

use grafcet_core::{action::ActionBlock, diagram::Diagram};

use crate::config::SimulationConfig;

/// Activates every initial step of `diagram`, timestamped with the wall clock.
pub fn init(diagram: &Diagram) -> SimulationState {
    Simulator::new(diagram, SimulationConfig::default()).init()
}

/// Executes one tick of `diagram` with the default [`SimulationConfig`].
///
/// Prefer a [`Simulator`] when running many ticks of the same diagram; it
/// parses conditions and resolves the step graph once.
pub fn execute_step(
    diagram: &Diagram,
    state: &SimulationState,
    inputs: &SimulationInputs,
    global_actions: &[ActionBlock],
) -> StepResult {
    Simulator::new(diagram, SimulationConfig::default()).execute_step(state, inputs, global_actions)
}
