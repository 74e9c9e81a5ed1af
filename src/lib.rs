//! Config files that extend your command line. Declare a few options, point
//! `-c` at a TOML or JSON file, and every key in it becomes an overridable
//! flag.
//!
//! ```ignore
//! let args = Dotfig::builder("train")
//!     .option(OptionSpec::positional("name"))
//!     .option(OptionSpec::new("datafile").short('d'))
//!     .option(OptionSpec::new("epochs").default(1))
//!     .parse()?;
//! ```
//!
//! Given `train.toml`:
//!
//! ```toml
//! arg1 = 4
//! epochs = 5
//!
//! [arg2]
//! obj1 = [3, 4]
//! obj2 = "foo"
//! ```
//!
//! `prog run1 -c train.toml --arg2.obj2 bar` yields `epochs = 5`,
//! `arg1 = 4`, `arg2.obj1 = [3,4]` and `arg2.obj2 = "bar"`.
//!
//! # Layer precedence
//!
//! ```text
//! Declared defaults     OptionSpec::default(...)
//!        ↑ overridden by
//! Config file           -c/--configfile PATH
//!        ↑ overridden by
//! Command line          --key value, --a.b.c value
//! ```
//!
//! Precedence is decided **per key**. Overriding `--arg2.obj2` leaves
//! `arg2.obj1` at its config value; the nested table is never replaced
//! wholesale. An option with no value in any layer resolves to
//! [`Value::Null`].
//!
//! # Options from config keys
//!
//! The config tree is flattened into dotted paths (see [`flatten`]), and each
//! leaf registers one option named after its path. The option's type is
//! inferred from the config value:
//!
//! | Config value        | Option type                | Accepted tokens            |
//! |---------------------|----------------------------|----------------------------|
//! | `4`                 | [`InferredType::Int`]      | `3`, `-2`                  |
//! | `0.5`               | [`InferredType::Float`]    | `1e-3`, `2`                |
//! | `"foo"` or `null`   | [`InferredType::Str`]      | anything                   |
//! | `true`              | [`InferredType::Bool`]     | `yes`, `no`, `1`, `f`...   |
//! | `[3, 4]`            | [`InferredType::Sequence`] | `[5,mode,35.6]`            |
//! | Rust tuple          | [`InferredType::FixedSequence`] | `(1,2)`, arity checked |
//!
//! When a config key names an option the caller already declared, the
//! config's type and value win, while the declared short flag and help text
//! are kept. Config keys containing `.` are rejected with
//! [`DotfigError::MalformedConfigKey`] since they could not be told apart
//! from nesting, as are keys containing `=` or starting with `-`, which
//! could never be addressed as `--key`.
//!
//! Repeating an option keeps the last value, so an override can be
//! appended to an existing command line. [`DotfigBuilder::parse_known_from`]
//! returns the tokens no option claimed instead of failing on them.
//!
//! # Parse engines
//!
//! The resolver talks to the command-line parser through [`ParseEngine`].
//! With the `clap` feature (on by default) [`ClapEngine`] builds a
//! [`clap::Command`] from the registered options, so `--help` lists the
//! config-derived flags with their current values. To plug in another
//! parser:
//!
//! ```toml
//! dotfig = { version = "...", default-features = false }
//! ```
//!
//! and call [`DotfigBuilder::parse_with`] with your own engine.
//!
//! # Reading the result
//!
//! [`Namespace`] is a flat view keyed by option name. Use
//! [`Namespace::to_dict`] for a plain mapping (dotted or re-nested),
//! [`Namespace::source`] to see which layer won, or
//! [`Namespace::extract`] to deserialize into your own struct.
//!
//! # Logging
//!
//! Registration, layer selection and file loading emit `tracing` events at
//! `debug` level; ignored reserved keys and merge collisions emit `warn`.
//! The library never installs a subscriber.

pub mod codec;
pub mod error;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod engine;
mod file;
mod flatten;
mod infer;
pub(crate) mod merge;
mod namespace;
mod option;
mod registrar;
mod resolve;
mod tree;
mod value;

#[cfg(test)]
mod fixtures;

pub use builder::{Dotfig, DotfigBuilder};
#[cfg(feature = "clap")]
pub use cli::ClapEngine;
pub use codec::{decode, encode};
pub use engine::{ParseEngine, ParsedLayer, split_known};
pub use error::DotfigError;
pub use file::{find_config_path, load_config_file, parse_config};
pub use flatten::{FlatEntry, flatten, unflatten};
pub use infer::{ElementKind, InferredType, infer};
pub use namespace::{Layer, Namespace};
pub use option::{ConfigFileFlag, OptionSpec, Origin};
pub use registrar::{OptionSet, register};
pub use resolve::{ResolveInput, resolve, resolve_known};
pub use tree::to_tree;
pub use value::{ConfigTree, Value};
