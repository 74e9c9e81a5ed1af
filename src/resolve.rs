//! Core resolution pipeline: register config keys, parse the command line,
//! and merge the three layers per key.
//!
//! Operates on pre-loaded data (`ResolveInput`) with no I/O, making the full
//! pipeline testable with synthetic inputs. Steps:
//!
//! 1. Flatten the config tree into dotted keys (the config layer)
//! 2. Register an option for every config key on top of the declared options
//! 3. Parse the tokens through the engine (the command-line layer); with
//!    [`resolve_known`] unmatched tokens are set aside instead of failing
//! 4. For each option: command line, else config file, else its own default

use std::collections::BTreeMap;

use tracing::debug;

use crate::engine::{ParseEngine, ParsedLayer};
use crate::error::DotfigError;
use crate::flatten::flatten;
use crate::namespace::{Layer, Namespace};
use crate::option::OptionSpec;
use crate::registrar::{OptionSet, register};
use crate::value::{ConfigTree, Value};

/// All pre-loaded data needed to resolve one command line. No I/O happens here.
#[derive(Debug, Clone, Default)]
pub struct ResolveInput {
    /// Command-line tokens, without the program name.
    pub tokens: Vec<String>,
    /// The loaded config file.
    pub tree: ConfigTree,
    /// Options declared by the caller, including the config-file option.
    pub declared: Vec<OptionSpec>,
    /// Name of the config-file option, exempt from config derivation.
    pub reserved: Option<String>,
}

/// Resolve tokens and config into a [`Namespace`].
///
/// Precedence is decided per key, so `arg2.obj1` can come from the config
/// file while its sibling `arg2.obj2` comes from the command line. Nothing is
/// returned unless every step succeeds.
pub fn resolve<E: ParseEngine + ?Sized>(
    engine: &E,
    input: &ResolveInput,
) -> Result<Namespace, DotfigError> {
    resolve_layers(input, |options| engine.parse(options, &input.tokens))
}

/// Like [`resolve`], but tokens that match no option are returned next to
/// the namespace instead of failing.
pub fn resolve_known<E: ParseEngine + ?Sized>(
    engine: &E,
    input: &ResolveInput,
) -> Result<(Namespace, Vec<String>), DotfigError> {
    let mut leftover = Vec::new();
    let namespace = resolve_layers(input, |options| {
        let (parsed, rest) = engine.parse_known(options, &input.tokens)?;
        leftover = rest;
        Ok(parsed)
    })?;
    Ok((namespace, leftover))
}

fn resolve_layers<F>(input: &ResolveInput, parse: F) -> Result<Namespace, DotfigError>
where
    F: FnOnce(&OptionSet) -> Result<ParsedLayer, DotfigError>,
{
    // 1: Config layer
    let flat = flatten(&input.tree);
    let config_layer: BTreeMap<&str, &Value> =
        flat.iter().map(|e| (e.path.as_str(), &e.value)).collect();

    // 2: Full option set
    let options = register(&input.declared, &flat, input.reserved.as_deref());

    // 3: Command-line layer
    let parsed = parse(&options)?;

    // 4: Per-key precedence
    let mut namespace = Namespace::default();
    for option in options.iter() {
        let name = option.name();
        let exempt = input.reserved.as_deref() == Some(name);
        let (value, layer) = if let Some(v) = parsed.get(name) {
            (v.clone(), Layer::CommandLine)
        } else if let Some(v) = config_layer.get(name).filter(|_| !exempt) {
            ((*v).clone(), Layer::ConfigFile)
        } else {
            let v = option.default_value().cloned().unwrap_or(Value::Null);
            (v, Layer::Default)
        };
        debug!(key = name, layer = ?layer, "resolved");
        namespace.insert(name, value, layer);
    }

    Ok(namespace)
}
