//! Directive parser.
//!
//! Turns one [`Line`] into a [`Directive`]. The leading keyword selects the
//! directive (case-insensitively); its arguments are parsed with `winnow`
//! combinators. Lines whose first word is not a keyword are reported as
//! unrecognized by returning `Ok(None)`, and the builder decides what to do
//! with them.

use grafcet_core::{
    action::{ActionBlock, Qualifier},
    diagram::{GateKind, StepKind},
    duration::parse_duration,
};
use log::trace;
use winnow::{
    Parser as _,
    ascii::{Caseless, dec_uint, space0, space1},
    combinator::{alt, delimited, opt, preceded, separated, terminated},
    error::{ContextError, ModalResult, StrContext, StrContextValue},
    token::{one_of, take_till, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    lexer::Line,
    span::Span,
};

type Input<'a> = &'a str;
type PResult<O> = ModalResult<O, ContextError>;

/// A single parsed line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Directive {
    /// `SFC ["title"]`
    Title(Option<String>),
    /// `Step <n> [(kind)] ["label"]`
    Step {
        number: u32,
        kind: StepKind,
        label: Option<String>,
    },
    /// `Transition [T<n>] <condition>`
    Transition {
        number: Option<u32>,
        condition: String,
    },
    /// `Action <name> [(attributes)]`
    Action(ActionBlock),
    /// `LinkedFile <name>`
    LinkedFile(String),
    /// `Jump <step>`
    Jump(u32),
    /// `Divergence AND|OR`
    Divergence(GateKind),
    Branch,
    EndBranch,
    /// `EndDivergence` or `Converge`
    EndDivergence,
}

/// Parses one directive line.
///
/// Returns `Ok(None)` when the line does not start with a known keyword.
pub(crate) fn parse_line(line: &Line<'_>) -> Result<Option<Directive>> {
    let text = line.text();
    let keyword_len = text
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let (keyword, remainder) = text.split_at(keyword_len);

    // A keyword must be followed by whitespace or end the line.
    if keyword.is_empty()
        || remainder
            .chars()
            .next()
            .is_some_and(|c| !c.is_whitespace())
    {
        return Ok(None);
    }

    let args = remainder.trim();
    let args_span = Span::new(text.len() - args.len()..text.len()).offset(line.span().start());
    let ctx = DirectiveContext {
        keyword,
        line_span: line.span(),
        args_span,
    };

    let directive = match keyword.to_ascii_lowercase().as_str() {
        "sfc" => Directive::Title(text_argument(args)),
        "step" => {
            let (number, kind, label) = ctx.run(
                step_args,
                args,
                "Step <number> [(Initial|Normal|Task|Macro)] [\"label\"]",
            )?;
            Directive::Step {
                number,
                kind,
                label,
            }
        }
        "transition" => transition(args, &ctx)?,
        "action" => {
            let (name, attributes) = ctx.run(
                action_args,
                args,
                "Action <name> [(Q)] | [(Q, \"5s\")] | [(Type=Q, Condition=\"...\", Duration=\"5s\")]",
            )?;
            Directive::Action(action_block(name, &attributes, &ctx)?)
        }
        "linkedfile" => match text_argument(args) {
            Some(file) => Directive::LinkedFile(file),
            None => return Err(ctx.malformed("missing file name", "LinkedFile \"name\"")),
        },
        "jump" => Directive::Jump(ctx.run(jump_args, args, "Jump <step number>")?),
        "divergence" => Directive::Divergence(ctx.run(gate_kind, args, "Divergence AND|OR")?),
        "branch" => ctx.no_arguments(args, Directive::Branch)?,
        "endbranch" => ctx.no_arguments(args, Directive::EndBranch)?,
        "enddivergence" | "converge" => ctx.no_arguments(args, Directive::EndDivergence)?,
        _ => return Ok(None),
    };

    trace!(line = line.number(), directive:? = directive; "Parsed directive");
    Ok(Some(directive))
}

/// Location data for building diagnostics about one directive.
struct DirectiveContext<'a> {
    keyword: &'a str,
    line_span: Span,
    args_span: Span,
}

impl DirectiveContext<'_> {
    /// Runs an argument parser over the whole argument text.
    fn run<'i, O>(
        &self,
        mut parser: impl winnow::Parser<Input<'i>, O, winnow::error::ErrMode<ContextError>>,
        args: &'i str,
        usage: &str,
    ) -> Result<O> {
        parser.parse(args).map_err(|err| {
            let expected = err
                .inner()
                .context()
                .find_map(|context| match context {
                    StrContext::Label(label) => Some(format!("expected {label}")),
                    StrContext::Expected(value) => Some(format!("expected {value}")),
                    _ => None,
                })
                .unwrap_or_else(|| "unexpected input".to_string());

            let start = self.args_span.start() + err.offset();
            Diagnostic::error(format!("malformed `{}` directive", self.keyword))
                .with_code(ErrorCode::E100)
                .with_label(Span::new(start..self.line_span.end()), expected)
                .with_help(format!("expected `{usage}`"))
        })
    }

    fn no_arguments(&self, args: &str, directive: Directive) -> Result<Directive> {
        if args.is_empty() {
            Ok(directive)
        } else {
            Err(Diagnostic::error(format!("`{}` takes no arguments", self.keyword))
                .with_code(ErrorCode::E100)
                .with_label(self.args_span, "unexpected argument"))
        }
    }

    fn malformed(&self, label: &str, usage: &str) -> Diagnostic {
        Diagnostic::error(format!("malformed `{}` directive", self.keyword))
            .with_code(ErrorCode::E100)
            .with_label(self.line_span, label)
            .with_help(format!("expected `{usage}`"))
    }

    fn invalid_attribute(&self, message: String, help: &str) -> Diagnostic {
        Diagnostic::error(message)
            .with_code(ErrorCode::E103)
            .with_label(self.args_span, "in this attribute list")
            .with_help(help.to_string())
    }
}

fn quoted<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    delimited('"', take_till(0.., '"'), '"').parse_next(input)
}

fn word<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || c == '_' || c == '.'
    })
    .parse_next(input)
}

fn step_kind(input: &mut Input<'_>) -> PResult<StepKind> {
    take_while(1.., |c: char| c.is_ascii_alphabetic())
        .verify_map(|kind: &str| kind.parse().ok())
        .context(StrContext::Expected(StrContextValue::Description(
            "Initial, Normal, Task or Macro",
        )))
        .parse_next(input)
}

fn step_args(input: &mut Input<'_>) -> PResult<(u32, StepKind, Option<String>)> {
    let number: u32 = dec_uint
        .context(StrContext::Label("step number"))
        .parse_next(input)?;
    space0.parse_next(input)?;
    let kind = opt(delimited(('(', space0), step_kind, (space0, ')'))).parse_next(input)?;
    space0.parse_next(input)?;
    let label = opt(quoted)
        .context(StrContext::Label("quoted label"))
        .parse_next(input)?;
    space0.parse_next(input)?;

    Ok((
        number,
        kind.unwrap_or_default(),
        label.map(str::to_string),
    ))
}

fn jump_args(input: &mut Input<'_>) -> PResult<u32> {
    let prefix = alt((
        terminated(Caseless("step"), space1).void(),
        one_of(['X', 'x']).void(),
    ));
    let number: u32 = preceded(opt(prefix), dec_uint)
        .context(StrContext::Label("target step number"))
        .parse_next(input)?;
    space0.parse_next(input)?;
    Ok(number)
}

fn gate_kind(input: &mut Input<'_>) -> PResult<GateKind> {
    let kind = alt((
        Caseless("and").value(GateKind::And),
        Caseless("or").value(GateKind::Or),
    ))
    .context(StrContext::Expected(StrContextValue::Description("AND or OR")))
    .parse_next(input)?;
    space0.parse_next(input)?;
    Ok(kind)
}

/// A quoted string or the bare remaining text, `None` when empty.
fn text_argument(args: &str) -> Option<String> {
    let text = strip_quotes(args);
    (!text.is_empty()).then(|| text.to_string())
}

fn strip_quotes(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
        .trim()
}

fn transition(args: &str, ctx: &DirectiveContext<'_>) -> Result<Directive> {
    let (number, condition) = split_transition_number(args);
    let condition = strip_quotes(condition);

    if condition.is_empty() {
        return Err(Diagnostic::error("transition has no condition")
            .with_code(ErrorCode::E100)
            .with_label(ctx.line_span, "condition expected")
            .with_help("write `Transition TRUE` for an unconditional transition"));
    }

    Ok(Directive::Transition {
        number,
        condition: condition.to_string(),
    })
}

/// Splits an explicit `T<n>` prefix from the condition.
///
/// `T3 START` names transition 3; `T3` alone or `T3 AND X` is a condition
/// reading variable `T3`.
fn split_transition_number(args: &str) -> (Option<u32>, &str) {
    let mut input = args;
    let parsed: PResult<u32> =
        terminated(preceded(one_of(['T', 't']), dec_uint), space1).parse_next(&mut input);

    match parsed {
        Ok(number) if starts_with_operand(input) => (Some(number), input),
        _ => (None, args),
    }
}

fn starts_with_operand(condition: &str) -> bool {
    let condition = condition.trim_start();
    let Some(first) = condition.chars().next() else {
        return false;
    };
    if ".*+<>=)".contains(first) {
        return false;
    }

    let first_word = condition
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default();
    !first_word.eq_ignore_ascii_case("and") && !first_word.eq_ignore_ascii_case("or")
}

/// An attribute as written: `value` or `key = value`.
#[derive(Debug, Clone, PartialEq)]
struct RawAttribute<'a> {
    key: Option<&'a str>,
    value: &'a str,
}

fn attribute<'a>(input: &mut Input<'a>) -> PResult<RawAttribute<'a>> {
    let key = opt(terminated(word, (space0, '=', space0))).parse_next(input)?;
    let value = alt((
        quoted,
        take_till(1.., [',', ')', '"']).map(str::trim_end),
    ))
    .context(StrContext::Label("attribute value"))
    .parse_next(input)?;
    Ok(RawAttribute { key, value })
}

fn attribute_list<'a>(input: &mut Input<'a>) -> PResult<Vec<RawAttribute<'a>>> {
    delimited(
        ('(', space0),
        separated(0.., terminated(attribute, space0), (',', space0)),
        ')',
    )
    .context(StrContext::Label("attribute list"))
    .parse_next(input)
}

fn action_args<'a>(input: &mut Input<'a>) -> PResult<(&'a str, Vec<RawAttribute<'a>>)> {
    let name = alt((quoted, word))
        .context(StrContext::Label("action name"))
        .parse_next(input)?;
    space0.parse_next(input)?;
    let attributes = opt(attribute_list).parse_next(input)?;
    space0.parse_next(input)?;
    Ok((name, attributes.unwrap_or_default()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Qualifier,
    Duration,
    Condition,
}

/// Interprets a parsed attribute list.
///
/// Positional attributes are read as qualifier, duration, condition. For a
/// qualifier that takes no duration, a second positional value that is not a
/// duration is read as the condition.
fn action_block(
    name: &str,
    attributes: &[RawAttribute<'_>],
    ctx: &DirectiveContext<'_>,
) -> Result<ActionBlock> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ctx.malformed("action name is empty", "Action <name> [(attributes)]"));
    }

    let mut qualifier = None;
    let mut duration = None;
    let mut condition = None;

    for (index, attribute) in attributes.iter().enumerate() {
        let slot = match attribute.key {
            Some(key) => match key.to_ascii_lowercase().as_str() {
                "type" | "qualifier" => Slot::Qualifier,
                "duration" | "time" => Slot::Duration,
                "condition" => Slot::Condition,
                _ => {
                    return Err(ctx.invalid_attribute(
                        format!("unknown action attribute `{key}`"),
                        "supported attributes are `Type`, `Condition` and `Duration`",
                    ));
                }
            },
            None => match index {
                0 => Slot::Qualifier,
                1 if qualifier.is_some_and(|q: Qualifier| !q.is_time_based())
                    && parse_duration(attribute.value).is_none() =>
                {
                    Slot::Condition
                }
                1 => Slot::Duration,
                2 => Slot::Condition,
                _ => {
                    return Err(ctx.invalid_attribute(
                        "too many positional action attributes".to_string(),
                        "use `(Q, \"duration\", \"condition\")` or the keyed form",
                    ));
                }
            },
        };

        match slot {
            Slot::Qualifier => {
                let parsed = attribute.value.parse::<Qualifier>().map_err(|err| {
                    ctx.invalid_attribute(
                        err.to_string(),
                        "qualifiers are N, S, R, L, D, P, SD, DS and SL",
                    )
                })?;
                qualifier = Some(parsed);
            }
            Slot::Duration => {
                let seconds = parse_duration(attribute.value).ok_or_else(|| {
                    ctx.invalid_attribute(
                        format!("invalid duration `{}`", attribute.value),
                        "write durations as `5s`, `250ms` or a number of seconds",
                    )
                })?;
                duration = Some(seconds);
            }
            Slot::Condition => condition = Some(attribute.value.trim().to_string()),
        }
    }

    let qualifier = qualifier.unwrap_or_default();
    if qualifier.is_time_based() && duration.is_none() {
        return Err(Diagnostic::error(format!(
            "qualifier `{qualifier}` requires a duration"
        ))
        .with_code(ErrorCode::E104)
        .with_label(ctx.line_span, "no duration given")
        .with_help(format!("for example `Action {name} ({qualifier}, \"5s\")`")));
    }

    let mut block = ActionBlock::new(name, qualifier);
    if let Some(seconds) = duration {
        block = block.with_duration(seconds);
    }
    if let Some(condition) = condition {
        block = block.with_condition(condition);
    }
    Ok(block)
}
