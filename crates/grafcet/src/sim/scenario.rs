//! Scripted simulation runs loaded from TOML.
//!
//! ```toml
//! name = "fill and drain"
//! interval = 0.5        # seconds between ticks without an explicit time
//!
//! [[action]]            # global actions, evaluated every tick
//! name = "ALARM"
//! qualifier = "N"
//! condition = "LEVEL > 95"
//!
//! [[tick]]
//! name = "start"
//! variables = { START = true }
//!
//! [[tick]]
//! time = 5.0
//! repeat = 4            # the same inputs for four ticks
//! triggers = ["T2"]     # forced on the first of them only
//! ```

use log::info;
use serde::{Deserialize, Serialize};

use grafcet_core::{action::ActionBlock, identifier::Id};

use super::{
    engine::Simulator,
    state::{ActionOutput, SimulationInputs, SimulationState},
};
use crate::{error::GrafcetError, value::Variables};

/// A sequence of ticks with their inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    name: Option<String>,
    /// Seconds between ticks that do not set their own time.
    #[serde(default = "default_interval")]
    interval: f64,
    /// Time of initialization.
    #[serde(default)]
    start_time: f64,
    #[serde(default, rename = "action")]
    global_actions: Vec<ActionBlock>,
    #[serde(default, rename = "tick")]
    ticks: Vec<Tick>,
}

fn default_interval() -> f64 {
    1.0
}

fn default_repeat() -> u32 {
    1
}

/// Inputs of one scripted tick.
#[derive(Debug, Clone, Deserialize)]
pub struct Tick {
    #[serde(default)]
    name: Option<String>,
    /// Absolute tick time in seconds.
    #[serde(default)]
    time: Option<f64>,
    #[serde(default)]
    variables: Variables,
    /// Transition identifiers such as `"T3"`.
    #[serde(default)]
    triggers: Vec<String>,
    #[serde(default = "default_repeat")]
    repeat: u32,
}

impl Tick {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn time(&self) -> Option<f64> {
        self.time
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn repeat(&self) -> u32 {
        self.repeat
    }
}

/// What happened in one executed tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    time: f64,
    fired: Vec<Id>,
    active_steps: Vec<Id>,
    actions: Vec<ActionOutput>,
}

impl TickReport {
    /// Position of the tick in the run, counting repetitions.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn fired(&self) -> &[Id] {
        &self.fired
    }

    pub fn active_steps(&self) -> &[Id] {
        &self.active_steps
    }

    pub fn actions(&self) -> &[ActionOutput] {
        &self.actions
    }
}

/// Every tick report of a run and the state it ended in.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioRun {
    ticks: Vec<TickReport>,
    state: SimulationState,
}

impl ScenarioRun {
    pub fn ticks(&self) -> &[TickReport] {
        &self.ticks
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }
}

impl Scenario {
    /// Parses a scenario from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`GrafcetError::Scenario`] for malformed TOML, a non-positive
    /// interval or a zero repeat count.
    pub fn from_toml(text: &str) -> Result<Self, GrafcetError> {
        let scenario: Scenario = toml::from_str(text)
            .map_err(|err| GrafcetError::Scenario(format!("invalid scenario file: {err}")))?;

        if !(scenario.interval.is_finite() && scenario.interval > 0.0) {
            return Err(GrafcetError::Scenario(format!(
                "interval must be a positive number of seconds, got {}",
                scenario.interval
            )));
        }
        if let Some(index) = scenario.ticks.iter().position(|tick| tick.repeat == 0) {
            return Err(GrafcetError::Scenario(format!(
                "tick {index} has a repeat count of zero"
            )));
        }
        Ok(scenario)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn global_actions(&self) -> &[ActionBlock] {
        &self.global_actions
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    /// Runs every tick against `simulator`, starting from its initial steps.
    ///
    /// # Errors
    ///
    /// Returns [`GrafcetError::Scenario`] when a trigger names a transition
    /// the diagram does not have, or when tick times go backwards.
    pub fn run(&self, simulator: &Simulator<'_>) -> Result<ScenarioRun, GrafcetError> {
        let diagram = simulator.diagram();
        let mut time = self.start_time;
        let mut state = simulator.init_at(time);
        let mut reports = Vec::new();

        for (tick_index, tick) in self.ticks.iter().enumerate() {
            let triggers = tick
                .triggers
                .iter()
                .map(|name| {
                    let id = Id::new(name);
                    diagram.transition(id).map(|_| id).ok_or_else(|| {
                        GrafcetError::Scenario(format!(
                            "tick {tick_index} triggers unknown transition `{name}`"
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            for repetition in 0..tick.repeat {
                time = match tick.time {
                    Some(at) if repetition == 0 => {
                        if at < time {
                            return Err(GrafcetError::Scenario(format!(
                                "tick {tick_index} at {at}s is earlier than the previous tick at {time}s"
                            )));
                        }
                        at
                    }
                    _ => time + self.interval,
                };

                let mut inputs = SimulationInputs::new()
                    .with_variables(tick.variables.clone())
                    .at(time);
                if repetition == 0 {
                    for trigger in &triggers {
                        inputs = inputs.with_trigger(*trigger);
                    }
                }

                let result = simulator.execute_step(&state, &inputs, &self.global_actions);
                reports.push(TickReport {
                    index: reports.len(),
                    name: tick.name.clone(),
                    time,
                    fired: result.fired().to_vec(),
                    active_steps: result.state().active_steps().collect(),
                    actions: result.actions().to_vec(),
                });
                state = result.into_state();
            }
        }

        info!(
            scenario = self.name.as_deref().unwrap_or("unnamed"),
            ticks = reports.len(),
            active = state.active_steps().count();
            "Scenario finished"
        );
        Ok(ScenarioRun {
            ticks: reports,
            state,
        })
    }
}
