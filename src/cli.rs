//! Clap adapter for dotfig.
//!
//! This module is the **default parse engine**: it turns an [`OptionSet`]
//! into a [`clap::Command`] at parse time and reports which options were
//! given on the command line. It is compiled only when the `clap` Cargo
//! feature is enabled (on by default).
//!
//! Every option becomes one clap `Arg`:
//!
//! - named options get `--<name>` (dotted for config keys, e.g.
//!   `--arg2.obj2`) plus their short flag, if any;
//! - positional options become positional args, in declaration order;
//! - each arg takes exactly one value, decoded by [`codec::decode`] inside a
//!   clap value parser, so a bad token surfaces as
//!   [`DotfigError::TypeCoercion`].
//!
//! No clap defaults are set. Defaults and config values are layered on by
//! the resolver; the engine only reports explicitly supplied values.

use clap::error::{ContextKind, ErrorKind};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, Command};
use std::error::Error as _;

use crate::codec;
use crate::engine::{ParseEngine, ParsedLayer, split_known};
use crate::error::DotfigError;
use crate::infer::InferredType;
use crate::option::OptionSpec;
use crate::registrar::OptionSet;
use crate::value::Value;

/// [`ParseEngine`] backed by clap.
#[derive(Debug, Clone)]
pub struct ClapEngine {
    name: String,
    about: Option<String>,
}

impl ClapEngine {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            about: None,
        }
    }

    pub fn about(mut self, about: &str) -> Self {
        self.about = Some(about.to_string());
        self
    }

    /// Build the clap command for a registered option set.
    pub fn command(&self, options: &OptionSet) -> Command {
        // A repeated option keeps its last value.
        let mut cmd = Command::new(self.name.clone()).args_override_self(true);
        if let Some(about) = &self.about {
            cmd = cmd.about(about.clone());
        }
        // A config key named `help` replaces clap's help flag.
        if options.contains("help") {
            cmd = cmd.disable_help_flag(true);
        }
        for option in options.iter() {
            cmd = cmd.arg(build_arg(option));
        }
        cmd
    }
}

fn build_arg(option: &OptionSpec) -> Arg {
    let name = option.name().to_string();
    let kind = option.value_type();
    let parser_key = name.clone();

    let mut arg = Arg::new(name.clone())
        .value_name(kind.value_name())
        .num_args(1)
        .action(ArgAction::Set)
        .value_parser(move |token: &str| codec::decode(&parser_key, token, &kind));

    if matches!(kind, InferredType::Int | InferredType::Float) {
        arg = arg.allow_negative_numbers(true);
    }
    if option.is_positional() {
        arg = arg.required(option.is_required());
    } else {
        arg = arg.long(name).required(option.is_required());
        if let Some(short) = option.short_flag() {
            arg = arg.short(short);
        }
    }
    if let Some(help) = help_line(option) {
        arg = arg.help(help);
    }
    arg
}

/// Help text, with the config value appended for config-backed options.
fn help_line(option: &OptionSpec) -> Option<String> {
    let default = option
        .default_value()
        .filter(|v| !v.is_null())
        .map(|v| format!("[default: {v}]"));
    match (option.help_text(), default) {
        (Some(help), Some(default)) => Some(format!("{help} {default}")),
        (Some(help), None) => Some(help.to_string()),
        (None, default) => default,
    }
}

impl ParseEngine for ClapEngine {
    fn parse(&self, options: &OptionSet, tokens: &[String]) -> Result<ParsedLayer, DotfigError> {
        let argv = std::iter::once(self.name.clone()).chain(tokens.iter().cloned());
        let matches = self
            .command(options)
            .try_get_matches_from(argv)
            .map_err(map_clap_error)?;

        let mut parsed = ParsedLayer::new();
        for option in options.iter() {
            let name = option.name();
            if matches.value_source(name) != Some(ValueSource::CommandLine) {
                continue;
            }
            if let Some(value) = matches.get_one::<Value>(name) {
                parsed.insert(name, value.clone());
            }
        }
        Ok(parsed)
    }

    fn parse_known(
        &self,
        options: &OptionSet,
        tokens: &[String],
    ) -> Result<(ParsedLayer, Vec<String>), DotfigError> {
        let builtin: &[&str] = if options.contains("help") {
            &[]
        } else {
            &["--help", "-h"]
        };
        let (known, unknown) = split_known(options, tokens, builtin);
        Ok((self.parse(options, &known)?, unknown))
    }
}

/// Lift clap errors into the matching [`DotfigError`] kinds.
///
/// Coercion failures come back wrapped by clap; the original error is
/// recovered from the source chain. Anything else (help, missing required
/// args) stays a [`DotfigError::Cli`] so callers can `exit()` on it.
fn map_clap_error(err: clap::Error) -> DotfigError {
    match err.kind() {
        ErrorKind::UnknownArgument => {
            let arg = err
                .get(ContextKind::InvalidArg)
                .map(ToString::to_string)
                .unwrap_or_default();
            DotfigError::UnknownOption(arg)
        }
        ErrorKind::ValueValidation => {
            let coercion = err
                .source()
                .and_then(|source| source.downcast_ref::<DotfigError>())
                .and_then(|inner| match inner {
                    DotfigError::TypeCoercion {
                        key,
                        token,
                        expected,
                        reason,
                    } => Some(DotfigError::TypeCoercion {
                        key: key.clone(),
                        token: token.clone(),
                        expected: expected.clone(),
                        reason: reason.clone(),
                    }),
                    _ => None,
                });
            coercion.unwrap_or(DotfigError::Cli(err))
        }
        _ => DotfigError::Cli(err),
    }
}
