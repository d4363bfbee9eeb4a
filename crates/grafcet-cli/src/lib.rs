//! CLI logic for the GRAFCET chart tool.
//!
//! Each subcommand runs one part of the pipeline: `check` validates a chart,
//! `compile` lays it out, `simulate` runs a scenario against it and `eval`
//! evaluates a single condition expression.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};

use std::{
    fmt::{self, Display},
    fs,
    io::{self, Write},
};

use log::{info, warn};

use grafcet::{
    Compiler, Diagnostic, GrafcetError,
    expr::Expression,
    sim::{Scenario, ScenarioRun, TickReport},
    value::{Value, Variables},
};

use error_adapter::{DiagnosticAdapter, Reportable, render};

/// Run the GRAFCET CLI application, printing results to standard output.
///
/// # Errors
///
/// Returns `GrafcetError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing and structure errors
/// - Layout errors
/// - Scenario errors
/// - Malformed expressions
pub fn run(args: &Args) -> Result<(), GrafcetError> {
    let stdout = io::stdout();
    execute(args, &mut stdout.lock())
}

/// Run the application, writing results to `out`.
///
/// # Errors
///
/// See [`run`].
pub fn execute(args: &Args, out: &mut impl Write) -> Result<(), GrafcetError> {
    match &args.command {
        Command::Check { input } => {
            info!(input_path = input; "Checking chart");
            let compiler = compiler(args)?;
            let source = fs::read_to_string(input)?;

            let warnings = compiler.check(&source)?;
            report_warnings(&warnings, &source);
            writeln!(out, "{input}: ok ({} warning(s))", warnings.len())?;
        }
        Command::Compile { input, output } => {
            info!(input_path = input, output_path:? = output; "Compiling chart");
            let compiler = compiler(args)?;
            let source = fs::read_to_string(input)?;

            let compilation = compiler.compile(&source)?;
            report_warnings(compilation.warnings(), &source);

            let json =
                serde_json::to_string_pretty(compilation.diagram()).map_err(io::Error::from)?;
            match output {
                Some(path) => {
                    fs::write(path, json)?;
                    info!(output_file = path; "Diagram exported successfully");
                }
                None => writeln!(out, "{json}")?,
            }
        }
        Command::Simulate {
            input,
            scenario,
            json,
        } => {
            info!(input_path = input, scenario_path = scenario; "Simulating chart");
            let compiler = compiler(args)?;
            let source = fs::read_to_string(input)?;
            let scenario = Scenario::from_toml(&fs::read_to_string(scenario)?)?;

            let compilation = compiler.compile(&source)?;
            report_warnings(compilation.warnings(), &source);

            let run = scenario.run(&compiler.simulator(compilation.diagram()))?;
            info!(ticks = run.ticks().len(); "Scenario completed");

            if *json {
                let json = serde_json::to_string_pretty(&run).map_err(io::Error::from)?;
                writeln!(out, "{json}")?;
            } else {
                write_run(out, scenario.name(), &run)?;
            }
        }
        Command::Eval {
            expression,
            variables,
            previous,
        } => {
            let expression = Expression::parse(expression)?;
            let value = expression.value(&to_variables(variables), &to_variables(previous))?;
            info!(expression = expression.text(), value:%; "Expression evaluated");
            writeln!(out, "{value}")?;
        }
    }

    Ok(())
}

fn compiler(args: &Args) -> Result<Compiler, GrafcetError> {
    let app_config = config::load_config(args.config.as_ref())?;
    Ok(Compiler::new(app_config))
}

fn report_warnings(warnings: &[Diagnostic], source: &str) {
    for warning in warnings {
        let reportable = Reportable::Diagnostic(DiagnosticAdapter::new(warning, source));
        warn!("{}", render(&reportable));
    }
}

fn to_variables(assignments: &[(String, Value)]) -> Variables {
    assignments.iter().cloned().collect()
}

fn write_run(out: &mut impl Write, name: Option<&str>, run: &ScenarioRun) -> io::Result<()> {
    if let Some(name) = name {
        writeln!(out, "scenario: {name}")?;
    }
    for tick in run.ticks() {
        writeln!(out, "{}", TickLine(tick))?;
    }

    let state = run.state();
    let active: Vec<_> = state.active_steps().collect();
    writeln!(out, "final: active={}", List(&active))?;
    for (name, value) in state.variables() {
        writeln!(out, "  {name} = {value}")?;
    }
    Ok(())
}

/// One tick of a run in its text form.
struct TickLine<'a>(&'a TickReport);

impl Display for TickLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tick = self.0;
        let outputs: Vec<_> = tick
            .actions()
            .iter()
            .map(|action| format!("{}:{}", action.name(), action.kind()))
            .collect();

        write!(f, "#{} t={}s", tick.index(), tick.time())?;
        if let Some(name) = tick.name() {
            write!(f, " [{name}]")?;
        }
        write!(
            f,
            " fired={} active={} outputs={}",
            List(tick.fired()),
            List(tick.active_steps()),
            List(&outputs),
        )
    }
}

/// Comma-separated items between brackets.
struct List<'a, T>(&'a [T]);

impl<T: Display> Display for List<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, item) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_formatting() {
        assert_eq!(List(&[1, 2, 3]).to_string(), "[1, 2, 3]");
        assert_eq!(List::<u8>(&[]).to_string(), "[]");
    }

    #[test]
    fn test_eval_prints_value() {
        let args = Args {
            command: Command::Eval {
                expression: "LEVEL > 40 AND RE START".to_string(),
                variables: vec![
                    ("LEVEL".to_string(), Value::Number(50.0)),
                    ("START".to_string(), Value::Bool(true)),
                ],
                previous: vec![("START".to_string(), Value::Bool(false))],
            },
            config: None,
            log_level: "off".to_string(),
        };

        let mut out = Vec::new();
        execute(&args, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "true\n");
    }

    #[test]
    fn test_eval_rejects_malformed_expression() {
        let args = Args {
            command: Command::Eval {
                expression: "(A AND B".to_string(),
                variables: Vec::new(),
                previous: Vec::new(),
            },
            config: None,
            log_level: "off".to_string(),
        };

        let err = execute(&args, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, GrafcetError::Expression(_)));
    }
}
