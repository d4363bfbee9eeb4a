//! Command-line argument definitions for the GRAFCET CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects the pipeline stage to run; the
//! configuration file and logging verbosity apply to all of them.

use clap::{Parser, Subcommand};

use grafcet::value::Value;

/// Command-line arguments for the GRAFCET chart tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse and validate a chart, reporting every diagnostic
    Check {
        /// Path to the input chart
        input: String,
    },

    /// Compile a chart into its positioned diagram graph (JSON)
    Compile {
        /// Path to the input chart
        input: String,

        /// Path to the output JSON file; standard output when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run a TOML scenario against a chart
    Simulate {
        /// Path to the input chart
        input: String,

        /// Path to the scenario file
        scenario: String,

        /// Print the run as JSON instead of one line per tick
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a condition expression
    Eval {
        /// The expression, e.g. "RE START AND LEVEL > 50"
        expression: String,

        /// Current variable value as NAME=VALUE (repeatable)
        #[arg(short = 's', long = "set", value_parser = parse_assignment)]
        variables: Vec<(String, Value)>,

        /// Previous-tick variable value as NAME=VALUE, for RE/FE (repeatable)
        #[arg(short, long, value_parser = parse_assignment)]
        previous: Vec<(String, Value)>,
    },
}

/// Parses `NAME=VALUE` where the value is `true`, `false` or a number.
fn parse_assignment(text: &str) -> Result<(String, Value), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{text}`"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in `{text}`"));
    }

    let value = match value.trim().to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        number => number
            .parse()
            .map(Value::Number)
            .map_err(|_| format!("`{value}` is neither a boolean nor a number"))?,
    };
    Ok((name.to_string(), value))
}
