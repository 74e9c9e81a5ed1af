use tracing::debug;

use crate::engine::ParseEngine;
use crate::error::DotfigError;
use crate::file;
use crate::namespace::Namespace;
use crate::option::{ConfigFileFlag, OptionSpec};
use crate::resolve::{self, ResolveInput};
use crate::value::ConfigTree;

#[cfg(feature = "clap")]
use crate::cli::ClapEngine;

/// Entry point for building a dotfig command line.
pub struct Dotfig;

impl Dotfig {
    pub fn builder(name: &str) -> DotfigBuilder {
        DotfigBuilder::new(name)
    }
}

/// Builder for a command line whose options are extended by a config file.
///
/// Declared options are the caller's own; every leaf of the config file
/// named by `-c/--configfile` adds (or updates) one more. Each parse call
/// reloads the file and rebuilds the option set, so the builder can be
/// reused.
#[derive(Debug, Clone)]
pub struct DotfigBuilder {
    name: String,
    about: Option<String>,
    options: Vec<OptionSpec>,
    config_flag: ConfigFileFlag,
    config_required: bool,
}

impl DotfigBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            about: None,
            options: Vec::new(),
            config_flag: ConfigFileFlag::default(),
            config_required: true,
        }
    }

    /// One-line description shown by `--help`.
    pub fn about(mut self, about: &str) -> Self {
        self.about = Some(about.to_string());
        self
    }

    /// Declare an option. Declaring a name twice keeps the later one.
    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.options.push(spec);
        self
    }

    pub fn options<I: IntoIterator<Item = OptionSpec>>(mut self, specs: I) -> Self {
        self.options.extend(specs);
        self
    }

    /// Replace the reserved config-file option (default: `-c/--configfile`).
    pub fn config_flag(mut self, flag: ConfigFileFlag) -> Self {
        self.config_flag = flag;
        self
    }

    /// Whether a missing config-file option is an error (default: `true`).
    /// When `false`, the command line runs on declared options alone.
    pub fn config_required(mut self, required: bool) -> Self {
        self.config_required = required;
        self
    }

    /// Locate and load the config file named on the command line.
    fn load_tree(&self, tokens: &[String]) -> Result<ConfigTree, DotfigError> {
        match file::find_config_path(tokens, &self.config_flag) {
            Some(path) => file::load_config_file(&path),
            None if self.config_required => Err(DotfigError::MissingConfigFile {
                flag: self.config_flag.long.clone(),
            }),
            None => {
                debug!("no config file given, using declared options only");
                Ok(ConfigTree::new())
            }
        }
    }

    /// Build the `ResolveInput` from current builder state.
    fn build_input(&self, tokens: Vec<String>, tree: ConfigTree) -> ResolveInput {
        let mut declared = Vec::with_capacity(self.options.len() + 1);
        declared.push(self.config_flag.to_option_spec());
        declared.extend(self.options.iter().cloned());
        ResolveInput {
            tokens,
            tree,
            declared,
            reserved: Some(self.config_flag.long.clone()),
        }
    }

    /// Load the config file and resolve `tokens` with a custom engine.
    pub fn parse_with<E, I, T>(&self, engine: &E, tokens: I) -> Result<Namespace, DotfigError>
    where
        E: ParseEngine + ?Sized,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let tree = self.load_tree(&tokens)?;
        resolve::resolve(engine, &self.build_input(tokens, tree))
    }

    /// Like [`parse_with`](Self::parse_with), but tokens that match no option
    /// come back next to the namespace instead of failing.
    pub fn parse_known_with<E, I, T>(
        &self,
        engine: &E,
        tokens: I,
    ) -> Result<(Namespace, Vec<String>), DotfigError>
    where
        E: ParseEngine + ?Sized,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let tree = self.load_tree(&tokens)?;
        let (namespace, rest) = resolve::resolve_known(engine, &self.build_input(tokens, tree))?;
        if !rest.is_empty() {
            debug!(count = rest.len(), "leaving unrecognized tokens to the caller");
        }
        Ok((namespace, rest))
    }

    /// Resolve `tokens` against an already loaded tree with a custom engine.
    pub fn resolve_tree_with<E, I, T>(
        &self,
        engine: &E,
        tokens: I,
        tree: ConfigTree,
    ) -> Result<Namespace, DotfigError>
    where
        E: ParseEngine + ?Sized,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tokens = tokens.into_iter().map(Into::into).collect();
        resolve::resolve(engine, &self.build_input(tokens, tree))
    }
}

#[cfg(feature = "clap")]
impl DotfigBuilder {
    /// The clap engine for this builder's name and about text.
    pub fn engine(&self) -> ClapEngine {
        let engine = ClapEngine::new(&self.name);
        match &self.about {
            Some(about) => engine.about(about),
            None => engine,
        }
    }

    /// Parse the process arguments.
    ///
    /// Help requests and clap usage errors come back as
    /// [`DotfigError::Cli`]; call `exit()` on the inner error to print them
    /// the way clap does.
    pub fn parse(&self) -> Result<Namespace, DotfigError> {
        self.parse_from(std::env::args().skip(1))
    }

    /// Parse explicit tokens, program name excluded.
    pub fn parse_from<I, T>(&self, tokens: I) -> Result<Namespace, DotfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.parse_with(&self.engine(), tokens)
    }

    /// Parse the process arguments, returning unrecognized tokens instead of
    /// failing on them.
    pub fn parse_known(&self) -> Result<(Namespace, Vec<String>), DotfigError> {
        self.parse_known_from(std::env::args().skip(1))
    }

    /// Parse explicit tokens, returning unrecognized ones in order.
    ///
    /// With one positional and no `lr` option, `run1 -c train.toml --lr 0.1`
    /// leaves `["--lr", "0.1"]`: `--lr` matches nothing and `0.1` finds no
    /// free positional slot. Values of known options are never leftovers.
    pub fn parse_known_from<I, T>(&self, tokens: I) -> Result<(Namespace, Vec<String>), DotfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.parse_known_with(&self.engine(), tokens)
    }

    /// Parse explicit tokens against a tree, skipping the config-file lookup.
    pub fn resolve_with_tree<I, T>(&self, tokens: I, tree: ConfigTree) -> Result<Namespace, DotfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.resolve_tree_with(&self.engine(), tokens, tree)
    }
}
