use anyhow::{Context, Result, bail};
use argweave::{ArgKind, ArgParser, ParseOutcome, ParsedValue, ParserConfig, Strictness};
use indexmap::IndexMap;
use serde::Serialize;

use crate::schema::CommandDef;

#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    /// Force strict parsing at every level regardless of the schema.
    pub strict: bool,
}

/// Values bound at one command level.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandReport {
    pub command: String,
    /// Bound values, with declared defaults filled in, in declaration order.
    pub values: IndexMap<String, ParsedValue>,
    pub defaulted: Vec<String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseReport {
    pub commands: Vec<CommandReport>,
    /// Tokens no level consumed.
    pub leftover: Vec<String>,
}

impl ParseReport {
    pub fn missing(&self) -> impl Iterator<Item = (&str, &str)> {
        self.commands.iter().flat_map(|c| {
            c.missing
                .iter()
                .map(move |m| (c.command.as_str(), m.as_str()))
        })
    }
}

/// Parse `tokens` against `root`, then hand the leftover tokens to the
/// subcommand named by the first positional value, repeating until a level
/// has no subcommands.
pub fn dispatch(
    root: &CommandDef,
    tokens: Vec<String>,
    opts: DispatchOptions,
) -> Result<ParseReport> {
    let mut commands = Vec::new();
    let mut command = root;
    let mut tokens = tokens;

    loop {
        tracing::debug!(command = %command.name, tokens = tokens.len(), "parsing command level");
        let parser = ArgParser::with_config(level_config(command, opts));
        let outcome = parser
            .parse(&command.args, tokens.as_slice())
            .with_context(|| format!("failed to parse arguments for `{}`", command.name))?;

        commands.push(command_report(command, &outcome));
        let selector = subcommand_selector(command, &outcome);
        tokens = outcome.into_leftover();

        let Some(selector) = selector else {
            break;
        };
        let Some(next) = command.subcommands.get(&selector) else {
            bail!("unknown subcommand `{selector}` for `{}`", command.name);
        };
        command = next;
    }

    Ok(ParseReport {
        commands,
        leftover: tokens,
    })
}

/// A level with subcommands always parses leniently: its excess tokens belong
/// to the subcommand.
fn level_config(command: &CommandDef, opts: DispatchOptions) -> ParserConfig {
    let config = command.parser.clone();
    if !command.subcommands.is_empty() {
        config.strictness(Strictness::Lenient)
    } else if opts.strict {
        config.strictness(Strictness::Strict)
    } else {
        config
    }
}

/// Name of the subcommand to run next, if this level has any.
fn subcommand_selector(command: &CommandDef, outcome: &ParseOutcome<'_>) -> Option<String> {
    if command.subcommands.is_empty() {
        return None;
    }
    let arg = command.dispatch_arg()?;
    outcome
        .get(&arg.name)
        .and_then(ParsedValue::as_scalar)
        .map(ToString::to_string)
}

fn command_report(command: &CommandDef, outcome: &ParseOutcome<'_>) -> CommandReport {
    let mut values = IndexMap::new();
    let mut defaulted = Vec::new();

    for spec in &command.args {
        if spec.kind == ArgKind::VariadicPositional {
            let all: Vec<ParsedValue> = outcome.values_of(&spec.name).cloned().collect();
            if !all.is_empty() {
                values.insert(spec.name.clone(), ParsedValue::Sequence(all));
            }
            continue;
        }
        if let Some(value) = outcome.get(&spec.name) {
            values.insert(spec.name.clone(), value.clone());
        } else if let Some(default) = &spec.default {
            values.insert(spec.name.clone(), default.clone());
            defaulted.push(spec.name.clone());
        }
    }

    CommandReport {
        command: command.name.clone(),
        values,
        defaulted,
        missing: outcome
            .missing(&command.args)
            .iter()
            .map(|s| s.name.clone())
            .collect(),
    }
}
