//! The seam between the merge engine and the command-line parser.
//!
//! A [`ParseEngine`] receives the full [`OptionSet`] and the raw tokens and
//! reports only the options that were explicitly supplied. Defaults and config
//! values are layered on afterwards by the resolver, so an engine never needs
//! to know about them.

use std::collections::BTreeMap;

use crate::error::DotfigError;
use crate::registrar::OptionSet;
use crate::value::Value;

/// Values supplied on the command line, keyed by option name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLayer {
    supplied: BTreeMap<String, Value>,
}

impl ParsedLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.supplied.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.supplied.get(name)
    }

    pub fn len(&self) -> usize {
        self.supplied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supplied.is_empty()
    }
}

/// A command-line parser the resolver can drive.
///
/// Implementations must decode each supplied token with the option's
/// [`value_type`](crate::OptionSpec::value_type) (see [`crate::codec::decode`]),
/// and must fail with [`DotfigError::UnknownOption`] for tokens that match no
/// option. `tokens` excludes the program name.
pub trait ParseEngine {
    fn parse(&self, options: &OptionSet, tokens: &[String]) -> Result<ParsedLayer, DotfigError>;

    /// Like [`parse`](Self::parse), but tokens that match no option are
    /// returned, in order, instead of failing the parse.
    fn parse_known(
        &self,
        options: &OptionSet,
        tokens: &[String],
    ) -> Result<(ParsedLayer, Vec<String>), DotfigError> {
        let (known, unknown) = split_known(options, tokens, &[]);
        Ok((self.parse(options, &known)?, unknown))
    }
}

/// Split `tokens` into those `options` can consume and the leftovers.
///
/// - `--name`, `--name=value`, `-s` and `-sVALUE` are kept when they address
///   a named option; the spaced forms keep the following token as the value.
/// - Bare tokens fill the positional options in order. Bare tokens beyond
///   the last positional are leftovers, as is any other dash-prefixed token.
/// - Tokens after `--` are positional only.
/// - `builtin` lists value-less flags the engine handles itself, such as
///   `--help`.
pub fn split_known(
    options: &OptionSet,
    tokens: &[String],
    builtin: &[&str],
) -> (Vec<String>, Vec<String>) {
    let mut known = Vec::new();
    let mut unknown = Vec::new();
    let mut free_slots = options.iter().filter(|o| o.is_positional()).count();
    let mut iter = tokens.iter();

    let mut positional = |token: &String, known: &mut Vec<String>, unknown: &mut Vec<String>| {
        if free_slots > 0 {
            free_slots -= 1;
            known.push(token.clone());
        } else {
            unknown.push(token.clone());
        }
    };

    while let Some(token) = iter.next() {
        if token == "--" {
            known.push(token.clone());
            for rest in iter.by_ref() {
                positional(rest, &mut known, &mut unknown);
            }
            break;
        }
        match claimed_by(options, token) {
            Some(Claim::WithNext) => {
                known.push(token.clone());
                if let Some(value) = iter.next() {
                    known.push(value.clone());
                }
            }
            Some(Claim::Inline) => known.push(token.clone()),
            None if builtin.contains(&token.as_str()) => known.push(token.clone()),
            None if is_flag_like(token) => unknown.push(token.clone()),
            None => positional(token, &mut known, &mut unknown),
        }
    }
    (known, unknown)
}

enum Claim {
    /// The value is the next token.
    WithNext,
    /// The value is part of the token.
    Inline,
}

fn claimed_by(options: &OptionSet, token: &str) -> Option<Claim> {
    let claim = |inline: bool| if inline { Claim::Inline } else { Claim::WithNext };
    if let Some(flag) = token.strip_prefix("--") {
        let (name, inline) = match flag.split_once('=') {
            Some((name, _)) => (name, true),
            None => (flag, false),
        };
        return options
            .get(name)
            .filter(|o| !o.is_positional())
            .map(|_| claim(inline));
    }
    let rest = token.strip_prefix('-')?;
    let short = rest.chars().next()?;
    options
        .iter()
        .find(|o| !o.is_positional() && o.short_flag() == Some(short))
        .map(|_| claim(rest.len() > short.len_utf8()))
}

/// Dash-prefixed and not a number, so never a positional value.
fn is_flag_like(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && token.parse::<f64>().is_err()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::OptionSpec;
    use crate::registrar::register;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn options() -> OptionSet {
        register(
            &[
                OptionSpec::positional("name"),
                OptionSpec::new("datafile").short('d'),
                OptionSpec::new("epochs").default(1),
            ],
            &[],
            None,
        )
    }

    fn split(args: &[&str]) -> (Vec<String>, Vec<String>) {
        split_known(&options(), &tokens(args), &[])
    }

    #[test]
    fn all_known_tokens_kept() {
        let (known, unknown) = split(&["run1", "--epochs", "3", "-d", "x.csv"]);
        assert_eq!(known, tokens(&["run1", "--epochs", "3", "-d", "x.csv"]));
        assert!(unknown.is_empty());
    }

    #[test]
    fn unknown_flags_set_aside() {
        let (known, unknown) = split(&["--lr", "run1", "--epochs=3", "-v"]);
        assert_eq!(known, tokens(&["run1", "--epochs=3"]));
        assert_eq!(unknown, tokens(&["--lr", "-v"]));
    }

    #[test]
    fn surplus_positionals_set_aside() {
        let (known, unknown) = split(&["run1", "extra", "-dx.csv", "more"]);
        assert_eq!(known, tokens(&["run1", "-dx.csv"]));
        assert_eq!(unknown, tokens(&["extra", "more"]));
    }

    #[test]
    fn option_value_is_never_a_leftover() {
        let (known, unknown) = split(&["--epochs", "-2", "--datafile", "--weird"]);
        assert_eq!(known, tokens(&["--epochs", "-2", "--datafile", "--weird"]));
        assert!(unknown.is_empty());
    }

    #[test]
    fn after_double_dash_only_positionals() {
        let (known, unknown) = split(&["--", "--epochs", "3"]);
        assert_eq!(known, tokens(&["--", "--epochs"]));
        assert_eq!(unknown, tokens(&["3"]));
    }

    #[test]
    fn builtin_flags_kept() {
        let (known, unknown) = split_known(&options(), &tokens(&["--help", "--nope"]), &["--help"]);
        assert_eq!(known, tokens(&["--help"]));
        assert_eq!(unknown, tokens(&["--nope"]));
    }
}
