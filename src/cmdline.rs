//! Command-line phase built on a runtime-assembled clap command.
//!
//! Every descriptor with a command-line binding contributes one argument:
//! value-taking types become `-f value` / `--name=value` options, booleans
//! become bare flags that set `true` unconditionally. Help and version flags
//! are disabled so the descriptors own the entire option space, and trailing
//! operands are absorbed rather than rejected, the way a getopt loop leaves
//! them alone.

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, Command};

use crate::error::ParamError;
use crate::param::Param;
use crate::value::Value;

const OPERANDS: &str = "__operands";

fn build_command<'a>(params: impl Iterator<Item = &'a Param>) -> Command {
    let mut cmd = Command::new("confit")
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true);

    for param in params {
        let Some((short, long)) = param.cmd_line() else {
            continue;
        };
        let id = param.name().to_string();
        // Self-override lets a repeated option win with its last value
        // instead of erroring.
        let mut arg = Arg::new(id.clone()).overrides_with(id);
        if let Some(c) = short {
            arg = arg.short(c);
        }
        if let Some(l) = long {
            arg = arg.long(l.to_string());
        }
        arg = if param.param_type().takes_cmd_value() {
            arg.action(ArgAction::Set)
        } else {
            arg.action(ArgAction::SetTrue)
        };
        cmd = cmd.arg(arg);
    }

    cmd.arg(
        Arg::new(OPERANDS)
            .action(ArgAction::Append)
            .num_args(0..)
            .value_name("ARGS"),
    )
}

/// Parse `args` against the declared options and return the raw assignments
/// in declaration order. Boolean options assign `true` without consuming a
/// value.
pub(crate) fn parse_args<'a>(
    params: impl Iterator<Item = &'a Param> + Clone,
    args: &[String],
) -> Result<Vec<(String, Value)>, ParamError> {
    let matches = build_command(params.clone())
        .try_get_matches_from(args)
        .map_err(syntax_error)?;

    let mut assignments = Vec::new();
    for param in params {
        if param.cmd_line().is_none() {
            continue;
        }
        let id = param.name();
        if matches.value_source(id) != Some(ValueSource::CommandLine) {
            continue;
        }
        let value = if param.param_type().takes_cmd_value() {
            let Some(raw) = matches.get_one::<String>(id) else {
                continue;
            };
            Value::Str(raw.clone())
        } else {
            Value::Bool(true)
        };
        assignments.push((id.to_string(), value));
    }
    Ok(assignments)
}

/// Best-effort pre-scan for one option's value, ignoring every parse error.
/// Used to let a conf-file parameter pick the config file before the real
/// command-line phase runs.
pub(crate) fn prescan_value<'a>(
    params: impl Iterator<Item = &'a Param> + Clone,
    args: &[String],
    name: &str,
) -> Option<String> {
    // Only bound parameters exist as clap ids; querying an unbound name
    // would panic inside the matcher.
    params
        .clone()
        .find(|p| p.name() == name)?
        .cmd_line()?;
    let matches = build_command(params)
        .ignore_errors(true)
        .try_get_matches_from(args)
        .ok()?;
    if matches.value_source(name) != Some(ValueSource::CommandLine) {
        return None;
    }
    matches.get_one::<String>(name).cloned()
}

/// Reduce a clap error to its first line for command-line attribution.
fn syntax_error(err: clap::Error) -> ParamError {
    let rendered = err.to_string();
    let first = rendered
        .lines()
        .next()
        .unwrap_or("invalid arguments")
        .trim_start_matches("error: ")
        .to_string();
    ParamError::CommandLineSyntax(first)
}
