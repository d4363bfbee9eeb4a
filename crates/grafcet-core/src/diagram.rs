//! The positioned GRAFCET diagram graph.
//!
//! A [`Diagram`] is produced once per compilation and is immutable afterwards.
//! It is consumed by external renderers (through its `serde` serialization)
//! and by the simulation engine, which only looks at node identities and the
//! source/target pairs of [`Connection`]s.
//!
//! # Node kinds
//!
//! - [`Step`] - a process state, optionally carrying [`ActionBlock`]s
//! - [`Transition`] - a guarded link between steps
//! - [`Gate`] - an AND/OR divergence or convergence bar synthesized by the compiler

use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    action::ActionBlock,
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

/// Kind of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Active when the program starts.
    Initial,
    #[default]
    Normal,
    /// Calls a task sub-program.
    Task,
    /// Expands into a linked sub-program.
    Macro,
}

impl FromStr for StepKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "initial" => Ok(StepKind::Initial),
            "normal" => Ok(StepKind::Normal),
            "task" => Ok(StepKind::Task),
            "macro" => Ok(StepKind::Macro),
            other => Err(format!("unknown step kind `{other}`")),
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Initial => "initial",
            StepKind::Normal => "normal",
            StepKind::Task => "task",
            StepKind::Macro => "macro",
        };
        f.write_str(name)
    }
}

/// Synchronization semantics of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    /// Parallel branches, drawn as a double bar.
    And,
    /// Mutually exclusive branches, drawn as a single thin bar.
    Or,
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateKind::And => f.write_str("AND"),
            GateKind::Or => f.write_str("OR"),
        }
    }
}

/// Whether a gate opens or closes a set of branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateMode {
    Divergence,
    Convergence,
}

/// A positioned step node.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    id: Id,
    number: u32,
    kind: StepKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    position: Point,
    size: Size,
    actions: Vec<ActionBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    linked_file: Option<String>,
}

impl Step {
    /// Creates a step; its identifier is derived from `number`.
    pub fn new(number: u32, kind: StepKind, position: Point, size: Size) -> Self {
        Self {
            id: Id::step(number),
            number,
            kind,
            label: None,
            position,
            size,
            actions: Vec::new(),
            linked_file: None,
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn with_actions(mut self, actions: Vec<ActionBlock>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_linked_file(mut self, linked_file: Option<String>) -> Self {
        self.linked_file = linked_file;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    pub fn is_initial(&self) -> bool {
        self.kind == StepKind::Initial
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn actions(&self) -> &[ActionBlock] {
        &self.actions
    }

    pub fn linked_file(&self) -> Option<&str> {
        self.linked_file.as_deref()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_position(self.position, self.size)
    }
}

/// A positioned transition node.
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    id: Id,
    number: u32,
    condition: String,
    position: Point,
    size: Size,
}

impl Transition {
    /// Creates a transition; its identifier is derived from `number`.
    pub fn new(number: u32, condition: impl Into<String>, position: Point, size: Size) -> Self {
        Self {
            id: Id::transition(number),
            number,
            condition: condition.into(),
            position,
            size,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Receptivity text, evaluated by the expression evaluator.
    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_position(self.position, self.size)
    }
}

/// A divergence or convergence bar.
#[derive(Debug, Clone, Serialize)]
pub struct Gate {
    id: Id,
    kind: GateKind,
    mode: GateMode,
    branch_count: usize,
    position: Point,
    size: Size,
}

impl Gate {
    pub fn new(
        id: Id,
        kind: GateKind,
        mode: GateMode,
        branch_count: usize,
        position: Point,
        size: Size,
    ) -> Self {
        Self {
            id,
            kind,
            mode,
            branch_count,
            position,
            size,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn mode(&self) -> GateMode {
        self.mode
    }

    pub fn branch_count(&self) -> usize {
        self.branch_count
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_position(self.position, self.size)
    }
}

/// A directed link between two nodes.
///
/// `points` is the routed polyline for display; simulation only uses
/// `source` and `target`.
#[derive(Debug, Clone, Serialize)]
pub struct Connection {
    source: Id,
    target: Id,
    points: Vec<Point>,
}

impl Connection {
    pub fn new(source: Id, target: Id, points: Vec<Point>) -> Self {
        Self {
            source,
            target,
            points,
        }
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// Borrowed view of any diagram node.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Step(&'a Step),
    Transition(&'a Transition),
    Gate(&'a Gate),
}

impl NodeRef<'_> {
    pub fn id(&self) -> Id {
        match self {
            NodeRef::Step(step) => step.id(),
            NodeRef::Transition(transition) => transition.id(),
            NodeRef::Gate(gate) => gate.id(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            NodeRef::Step(step) => step.bounds(),
            NodeRef::Transition(transition) => transition.bounds(),
            NodeRef::Gate(gate) => gate.bounds(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum NodeSlot {
    Step(usize),
    Transition(usize),
    Gate(usize),
}

/// A compiled GRAFCET chart.
///
/// Nodes are stored in placement order; lookups by [`Id`] go through an
/// index built once at construction.
#[derive(Debug, Clone, Serialize)]
pub struct Diagram {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    steps: Vec<Step>,
    transitions: Vec<Transition>,
    gates: Vec<Gate>,
    connections: Vec<Connection>,
    #[serde(skip)]
    index: HashMap<Id, NodeSlot>,
}

impl Diagram {
    /// Assembles a diagram from its placed parts.
    pub fn new(
        title: Option<String>,
        steps: Vec<Step>,
        transitions: Vec<Transition>,
        gates: Vec<Gate>,
        connections: Vec<Connection>,
    ) -> Self {
        let mut index = HashMap::with_capacity(steps.len() + transitions.len() + gates.len());
        for (i, step) in steps.iter().enumerate() {
            index.insert(step.id(), NodeSlot::Step(i));
        }
        for (i, transition) in transitions.iter().enumerate() {
            index.insert(transition.id(), NodeSlot::Transition(i));
        }
        for (i, gate) in gates.iter().enumerate() {
            index.insert(gate.id(), NodeSlot::Gate(i));
        }

        Self {
            title,
            steps,
            transitions,
            gates,
            connections,
            index,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Looks up any node by identifier.
    pub fn node(&self, id: Id) -> Option<NodeRef<'_>> {
        self.index.get(&id).map(|slot| match *slot {
            NodeSlot::Step(i) => NodeRef::Step(&self.steps[i]),
            NodeSlot::Transition(i) => NodeRef::Transition(&self.transitions[i]),
            NodeSlot::Gate(i) => NodeRef::Gate(&self.gates[i]),
        })
    }

    pub fn step(&self, id: Id) -> Option<&Step> {
        match self.index.get(&id) {
            Some(NodeSlot::Step(i)) => Some(&self.steps[*i]),
            _ => None,
        }
    }

    pub fn transition(&self, id: Id) -> Option<&Transition> {
        match self.index.get(&id) {
            Some(NodeSlot::Transition(i)) => Some(&self.transitions[*i]),
            _ => None,
        }
    }

    pub fn gate(&self, id: Id) -> Option<&Gate> {
        match self.index.get(&id) {
            Some(NodeSlot::Gate(i)) => Some(&self.gates[*i]),
            _ => None,
        }
    }

    pub fn step_by_number(&self, number: u32) -> Option<&Step> {
        self.step(Id::step(number))
    }

    /// Steps flagged [`StepKind::Initial`].
    pub fn initial_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|step| step.is_initial())
    }

    /// Connections ending at `id`.
    pub fn incoming(&self, id: Id) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.target() == id)
    }

    /// Connections leaving `id`.
    pub fn outgoing(&self, id: Id) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.source() == id)
    }

    /// Bounding box of all nodes, or `None` for an empty diagram.
    pub fn bounds(&self) -> Option<Bounds> {
        self.steps
            .iter()
            .map(Step::bounds)
            .chain(self.transitions.iter().map(Transition::bounds))
            .chain(self.gates.iter().map(Gate::bounds))
            .reduce(Bounds::merge)
    }
}
