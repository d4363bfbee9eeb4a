//! Tick execution.

use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexSet;
use log::{debug, info};

use grafcet_core::{action::ActionBlock, diagram::Diagram, identifier::Id};

use super::{
    actions::{self, ActionContext},
    state::{ActionOutput, OutputKind, SimulationInputs, SimulationState, StepResult},
    topology::Topology,
};
use crate::{
    config::SimulationConfig,
    expr::Expression,
    value::{Value, Variables},
};

/// Runs ticks of one compiled diagram.
///
/// The simulator holds no simulation state of its own: every tick takes a
/// [`SimulationState`] and returns a new one, so any number of independent
/// runs can share a simulator.
///
/// # Examples
///
/// ```
/// # use grafcet::{Compiler, config::{AppConfig, SimulationConfig}, sim::{SimulationInputs, Simulator}};
/// # use grafcet_core::identifier::Id;
/// let compilation = Compiler::new(AppConfig::default())
///     .compile("Step 0 (Initial)\nTransition START\nStep 1\nAction MOTOR (N)\n")
///     .unwrap();
/// let simulator = Simulator::new(compilation.diagram(), SimulationConfig::default());
///
/// let state = simulator.init_at(0.0);
/// let result = simulator.execute_step(
///     &state,
///     &SimulationInputs::new().with_variable("START", true).at(1.0),
///     &[],
/// );
///
/// assert_eq!(result.fired(), &[Id::transition(0)]);
/// assert!(result.state().is_active(Id::step(1)));
/// assert!(result.is_output_active("MOTOR"));
/// ```
#[derive(Debug)]
pub struct Simulator<'a> {
    diagram: &'a Diagram,
    config: SimulationConfig,
    topology: Topology,
    /// Parsed condition of every transition in diagram order; `None` when unparsable.
    conditions: Vec<(Id, Option<Expression>)>,
    /// Variables latched by stored actions of any step.
    stored_names: IndexSet<String>,
}

impl<'a> Simulator<'a> {
    pub fn new(diagram: &'a Diagram, config: SimulationConfig) -> Self {
        let conditions = diagram
            .transitions()
            .iter()
            .map(|transition| {
                let expression = Expression::parse(transition.condition())
                    .inspect_err(|err| {
                        debug!(
                            transition:% = transition.id(),
                            err:%;
                            "Condition can never clear"
                        )
                    })
                    .ok();
                (transition.id(), expression)
            })
            .collect();

        let stored_names = stored_names(diagram.steps().iter().flat_map(|step| step.actions()));

        Self {
            diagram,
            config,
            topology: Topology::new(diagram),
            conditions,
            stored_names,
        }
    }

    pub fn diagram(&self) -> &'a Diagram {
        self.diagram
    }

    /// Activates every initial step at the current wall-clock time.
    pub fn init(&self) -> SimulationState {
        self.init_at(wall_clock())
    }

    /// Activates every initial step at `time` seconds.
    pub fn init_at(&self, time: f64) -> SimulationState {
        let mut state = SimulationState::default();
        for step in self.diagram.initial_steps() {
            state.activate(step.id(), time);
        }
        info!(active = state.active_steps().count(), time; "Simulation initialized");
        state
    }

    /// Transitions whose predecessor steps are all active in `state`.
    pub fn enabled_transitions(&self, state: &SimulationState) -> Vec<Id> {
        self.conditions
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| self.is_enabled(*id, state))
            .collect()
    }

    fn is_enabled(&self, transition: Id, state: &SimulationState) -> bool {
        let predecessors = self.topology.predecessors(transition);
        !predecessors.is_empty() && predecessors.iter().all(|step| state.is_active(*step))
    }

    /// Executes one tick.
    ///
    /// 1. **Merge** - overlay the input variables on the stored ones and add
    ///    `X<n>` / `X<n>.t` for every active step
    /// 2. **Fire** - every enabled transition whose condition holds, or that
    ///    is triggered, fires; all are decided on the state before the tick
    /// 3. **Update** - deactivate the predecessors of fired transitions, then
    ///    activate their successors
    /// 4. **Act** - evaluate the actions of the active steps and `global_actions`
    ///
    /// Edge operators compare against the stored variables from before the
    /// tick. `X<n>` edges compare against the step set one evaluation
    /// earlier: the steps active at the start of the previous tick for
    /// conditions, the steps active at the start of this tick for actions.
    pub fn execute_step(
        &self,
        state: &SimulationState,
        inputs: &SimulationInputs,
        global_actions: &[ActionBlock],
    ) -> StepResult {
        let now = inputs.current_time().unwrap_or_else(wall_clock);
        let previous = self.step_flags(state.variables(), state.previous_steps());

        let mut next = state.clone();
        next.set_previous_steps(state.active_steps());
        let variables = next.variables_mut();
        for (name, value) in inputs.variables() {
            variables.insert(name.clone(), *value);
        }
        let current = self.step_namespace(next.variables(), state, now);

        let fired: Vec<Id> = self
            .conditions
            .iter()
            .filter(|(id, condition)| {
                self.is_enabled(*id, state)
                    && (inputs.triggers().contains(id)
                        || condition
                            .as_ref()
                            .is_some_and(|condition| condition.evaluate(&current, &previous)))
            })
            .map(|(id, _)| *id)
            .collect();

        for transition in &fired {
            for step in self.topology.predecessors(*transition) {
                next.deactivate(*step);
            }
        }
        for transition in &fired {
            for step in self.topology.successors(*transition) {
                next.activate(*step, now);
            }
        }

        let previous = self.step_flags(state.variables(), state.active_steps());
        let actions = self.run_actions(&mut next, &previous, global_actions, now);

        debug!(
            time = now,
            fired:? = fired,
            active:? = next.active_steps().collect::<Vec<_>>(),
            outputs = actions.len();
            "Tick executed"
        );
        StepResult::new(next, fired, actions)
    }

    fn run_actions(
        &self,
        state: &mut SimulationState,
        previous: &Variables,
        global_actions: &[ActionBlock],
        now: f64,
    ) -> Vec<ActionOutput> {
        let current = self.step_namespace(state.variables(), state, now);
        let context = ActionContext {
            current: &current,
            previous,
            pulse_duration: self.config.pulse_duration(),
        };

        let mut outputs = Vec::new();
        for step in self.diagram.steps() {
            let Some(since) = state.activation_time(step.id()) else {
                continue;
            };
            let elapsed = now - since;
            for action in step.actions() {
                actions::apply(action, elapsed, &context, state.variables_mut(), &mut outputs);
            }
        }
        for action in global_actions {
            actions::apply(action, 0.0, &context, state.variables_mut(), &mut outputs);
        }

        let mut latched = self.stored_names.clone();
        latched.extend(stored_names(global_actions));
        for name in latched {
            let is_set = state.variable(&name).is_some_and(Value::is_truthy);
            if is_set && !outputs.iter().any(|output| output.name() == name) {
                outputs.push(ActionOutput::new(name, OutputKind::Stored));
            }
        }
        outputs
    }

    /// `variables` plus `X<n>` (true) for every step in `steps`.
    fn step_flags(&self, variables: &Variables, steps: impl Iterator<Item = Id>) -> Variables {
        let mut namespace = variables.clone();
        for id in steps {
            if let Some(step) = self.diagram.step(id) {
                namespace.insert(format!("X{}", step.number()), Value::Bool(true));
            }
        }
        namespace
    }

    /// `variables` plus `X<n>` (true) and `X<n>.t` (seconds active) for every active step.
    fn step_namespace(&self, variables: &Variables, state: &SimulationState, now: f64) -> Variables {
        let mut namespace = variables.clone();
        for (id, since) in state.activation_times() {
            let Some(step) = self.diagram.step(id) else {
                continue;
            };
            let number = step.number();
            namespace.insert(format!("X{number}"), Value::Bool(true));
            namespace.insert(format!("X{number}.t"), Value::Number((now - since).max(0.0)));
        }
        namespace
    }
}

fn stored_names<'b>(actions: impl IntoIterator<Item = &'b ActionBlock>) -> IndexSet<String> {
    actions
        .into_iter()
        .filter(|action| action.qualifier().is_stored())
        .map(|action| action.name().to_string())
        .collect()
}

/// Seconds since the Unix epoch.
fn wall_clock() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}
