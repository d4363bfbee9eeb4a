//! Simulation state and per-tick inputs and results.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize, Serializer};

use grafcet_core::{action::Qualifier, identifier::Id};

use crate::value::{Value, Variables};

/// Snapshot of a running chart.
///
/// A step has an activation time exactly when it is active. The snapshot is
/// plain data: it can be serialized, stored and fed back into the engine
/// later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    active_steps: IndexSet<Id>,
    /// Steps that were active when the last tick started.
    #[serde(default)]
    previous_steps: IndexSet<Id>,
    variables: Variables,
    /// Activation time of each active step, in seconds.
    activation_times: IndexMap<Id, f64>,
}

impl SimulationState {
    /// Active steps, in activation order.
    pub fn active_steps(&self) -> impl Iterator<Item = Id> + '_ {
        self.active_steps.iter().copied()
    }

    pub fn is_active(&self, step: Id) -> bool {
        self.active_steps.contains(&step)
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<Value> {
        self.variables.get(name).copied()
    }

    /// When `step` last became active, if it is active.
    pub fn activation_time(&self, step: Id) -> Option<f64> {
        self.activation_times.get(&step).copied()
    }

    pub(crate) fn activation_times(&self) -> impl Iterator<Item = (Id, f64)> + '_ {
        self.activation_times.iter().map(|(id, time)| (*id, *time))
    }

    /// Marks `step` active since `time`; an already active step restarts its timer.
    pub(crate) fn activate(&mut self, step: Id, time: f64) {
        self.active_steps.insert(step);
        self.activation_times.insert(step, time);
    }

    pub(crate) fn deactivate(&mut self, step: Id) {
        self.active_steps.shift_remove(&step);
        self.activation_times.shift_remove(&step);
    }

    /// Steps that were active when the last tick started; `X<n>` edges compare against them.
    pub(crate) fn previous_steps(&self) -> impl Iterator<Item = Id> + '_ {
        self.previous_steps.iter().copied()
    }

    pub(crate) fn set_previous_steps(&mut self, steps: impl IntoIterator<Item = Id>) {
        self.previous_steps = steps.into_iter().collect();
    }

    pub(crate) fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }
}

/// External inputs of one tick.
///
/// # Examples
///
/// ```
/// # use grafcet::sim::SimulationInputs;
/// # use grafcet_core::identifier::Id;
/// let inputs = SimulationInputs::new()
///     .with_variable("START", true)
///     .with_variable("LEVEL", 42.0)
///     .with_trigger(Id::transition(3))
///     .at(12.5);
///
/// assert_eq!(inputs.current_time(), Some(12.5));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulationInputs {
    /// Transitions forced to fire when enabled, whatever their condition.
    #[serde(default)]
    triggers: IndexSet<Id>,
    /// Variable overrides merged over the stored variables.
    #[serde(default)]
    variables: Variables,
    /// Tick time in seconds; the wall clock is used when absent.
    #[serde(default)]
    current_time: Option<f64>,
}

impl SimulationInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trigger(mut self, transition: Id) -> Self {
        self.triggers.insert(transition);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Sets the tick time in seconds.
    pub fn at(mut self, time: f64) -> Self {
        self.current_time = Some(time);
        self
    }

    pub fn triggers(&self) -> &IndexSet<Id> {
        &self.triggers
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn current_time(&self) -> Option<f64> {
        self.current_time
    }
}

/// How an output came to be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Driven this tick by an action with this qualifier.
    Qualified(Qualifier),
    /// Latched true by an earlier stored action and not driven this tick.
    Stored,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Qualified(qualifier) => f.write_str(qualifier.as_str()),
            OutputKind::Stored => f.write_str("stored"),
        }
    }
}

impl Serialize for OutputKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// An active output reported by a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutput {
    name: String,
    value: bool,
    kind: OutputKind,
}

impl ActionOutput {
    pub(crate) fn new(name: impl Into<String>, kind: OutputKind) -> Self {
        Self {
            name: name.into(),
            value: true,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn kind(&self) -> OutputKind {
        self.kind
    }
}

/// Outcome of [`execute_step`](super::Simulator::execute_step).
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    state: SimulationState,
    /// Transitions that fired, in diagram order.
    fired: Vec<Id>,
    actions: Vec<ActionOutput>,
}

impl StepResult {
    pub(crate) fn new(state: SimulationState, fired: Vec<Id>, actions: Vec<ActionOutput>) -> Self {
        Self {
            state,
            fired,
            actions,
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn fired(&self) -> &[Id] {
        &self.fired
    }

    pub fn actions(&self) -> &[ActionOutput] {
        &self.actions
    }

    /// Whether an output named `name` was reported this tick.
    pub fn is_output_active(&self, name: &str) -> bool {
        self.actions.iter().any(|action| action.name() == name)
    }

    pub fn into_state(self) -> SimulationState {
        self.state
    }
}
