//! GRAFCET - A chart language for sequential control programs.
//!
//! Compilation and simulation for GRAFCET (IEC 60848) sequential function
//! charts written in a line-oriented text DSL. Compilation turns source text
//! into a positioned [`Diagram`](grafcet_core::diagram::Diagram) of steps,
//! transitions, gates and connections; the [`sim`] module runs that diagram
//! tick by tick.

pub mod config;
pub mod expr;
pub mod layout;
pub mod sim;
pub mod value;

mod error;

pub use grafcet_core::{action, diagram, duration, geometry, identifier};
pub use grafcet_parser::error::{Diagnostic, ErrorCode, ParseError, Severity};

pub use error::GrafcetError;

use log::{debug, info, trace};

use grafcet_core::diagram::Diagram;
use grafcet_parser::ast::{Element, Program};

use config::AppConfig;
use sim::Simulator;

/// A compiled diagram and the warnings reported while compiling it.
#[derive(Debug, Clone)]
pub struct Compilation {
    diagram: Diagram,
    warnings: Vec<Diagnostic>,
}

impl Compilation {
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_diagram(self) -> Diagram {
        self.diagram
    }
}

/// Compiler for GRAFCET chart sources.
///
/// This provides an API for processing charts through the parsing,
/// validation and layout stages, and for simulating the result.
///
/// # Examples
///
/// ```rust
/// use grafcet::{Compiler, config::AppConfig};
///
/// let source = r#"
///     SFC "Door"
///     Step 0 (Initial)
///     Transition OPEN_BUTTON
///     Step 1
///     Action MOTOR_OPEN (N)
///     Transition RE LIMIT_OPEN
///     Jump 0
/// "#;
///
/// let compiler = Compiler::new(AppConfig::default());
/// let compilation = compiler.compile(source).expect("Failed to compile");
///
/// let diagram = compilation.diagram();
/// assert_eq!(diagram.title(), Some("Door"));
/// assert_eq!(diagram.steps().len(), 2);
/// assert_eq!(diagram.transitions().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Compiler {
    config: AppConfig,
}

impl Compiler {
    /// Create a new compiler with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including layout and simulation settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse and validate source code without laying it out.
    ///
    /// # Errors
    ///
    /// Returns [`GrafcetError::Parse`] carrying every diagnostic when any
    /// error-severity diagnostic is found.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grafcet::{Compiler, ErrorCode};
    ///
    /// let warnings = Compiler::default()
    ///     .check("Step 0 (Initial)\nTransition A AND\nStep 1\n")
    ///     .expect("Failed to check");
    ///
    /// assert_eq!(warnings[0].code(), Some(ErrorCode::E212));
    /// ```
    pub fn check(&self, source: &str) -> Result<Vec<Diagnostic>, GrafcetError> {
        self.front_end(source).map(|(_, warnings)| warnings)
    }

    /// Parse, validate and lay out source code.
    ///
    /// # Errors
    ///
    /// Returns [`GrafcetError::Parse`] for syntax or structure errors and
    /// [`GrafcetError::Layout`] when placement fails.
    pub fn compile(&self, source: &str) -> Result<Compilation, GrafcetError> {
        let (program, warnings) = self.front_end(source)?;

        info!("Laying out diagram");
        let diagram = layout::layout(&program, self.config.layout())?;
        info!(
            steps = diagram.steps().len(),
            transitions = diagram.transitions().len(),
            gates = diagram.gates().len(),
            warnings = warnings.len();
            "Diagram compiled"
        );
        trace!(diagram:?; "Compiled diagram");

        Ok(Compilation { diagram, warnings })
    }

    /// Create a simulator for `diagram` using the configured simulation settings.
    pub fn simulator<'a>(&self, diagram: &'a Diagram) -> Simulator<'a> {
        Simulator::new(diagram, self.config.simulation().clone())
    }

    fn front_end(&self, source: &str) -> Result<(Program, Vec<Diagnostic>), GrafcetError> {
        info!("Parsing chart");
        let (program, mut warnings) = grafcet_parser::check(source)
            .map_err(|err| GrafcetError::new_parse_error(err, source))?
            .into_parts();
        debug!(elements = program.sequence.len(); "Chart parsed successfully");

        warnings.extend(condition_warnings(&program));
        Ok((program, warnings))
    }
}

/// Warns about conditions that the expression evaluator rejects.
///
/// Such conditions are kept as written and simply never hold.
fn condition_warnings(program: &Program) -> Vec<Diagnostic> {
    let mut warnings = Vec::new();
    program.walk(&mut |element| match element {
        Element::Transition(transition) => {
            if let Err(err) = expr::validate(&transition.condition) {
                warnings.push(
                    Diagnostic::warning(format!(
                        "condition of transition T{} cannot be evaluated: {err}",
                        transition.number
                    ))
                    .with_code(ErrorCode::E212)
                    .with_label(transition.span, "never clears")
                    .with_help("the transition can still be fired by an explicit trigger"),
                );
            }
        }
        Element::Step(step) => {
            for action in &step.actions {
                let Some(condition) = action.condition() else {
                    continue;
                };
                if let Err(err) = expr::validate(condition) {
                    warnings.push(
                        Diagnostic::warning(format!(
                            "condition of action `{}` cannot be evaluated: {err}",
                            action.name()
                        ))
                        .with_code(ErrorCode::E212)
                        .with_label(action.span(), "never holds"),
                    );
                }
            }
        }
        Element::Jump(_) | Element::Divergence(_) => {}
    });
    warnings
}
